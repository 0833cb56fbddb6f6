//! Command-line front end for the task board.
//!
//! # Responsibility
//! - Translate one invocation into one board command.
//! - Load the board at startup and let the service save on change.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use taskboard_core::db::open_db;
use taskboard_core::{
    default_log_level, init_logging, Board, BoardConfig, BoardService, ColumnId,
    FileSnapshotStore, Priority, SnapshotStore, SqliteSnapshotStore, TaskDraft, TaskId,
};

#[derive(Debug, Parser)]
#[command(name = "taskboard", version, about = "Three-lane task board")]
struct Cli {
    /// SQLite database holding the board snapshot.
    #[arg(long, default_value = "taskboard.sqlite3")]
    store: PathBuf,

    /// Use a JSON snapshot file instead of SQLite.
    #[arg(long, conflicts_with = "store")]
    json: Option<PathBuf>,

    /// TOML config with column layout and storage key.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long)]
    log_dir: Option<String>,

    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every column and its tasks.
    Show,
    /// Add a task to the front of the first column.
    Add {
        title: String,
        #[arg(long, value_parser = parse_priority, default_value = "medium")]
        priority: Priority,
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDate>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Change fields of an existing task.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,
        #[arg(long, value_parser = parse_date, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,
        #[arg(long)]
        clear_due: bool,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a task from a column.
    Delete { column: String, id: String },
    /// Move a task by position, within or across columns.
    Move {
        source_column: String,
        source_index: usize,
        dest_column: String,
        dest_index: usize,
    },
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::parse(value).ok_or_else(|| format!("expected low|medium|high, got `{value}`"))
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD, got `{value}`: {err}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("taskboard: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(|err| err.to_string())?;
    }

    let config = match cli.config.as_deref() {
        Some(path) => BoardConfig::load(path).map_err(|err| err.to_string())?,
        None => BoardConfig::default(),
    };

    if let Some(path) = cli.json {
        let store = FileSnapshotStore::new(path).with_layout(config.columns.clone());
        return execute(store, &config, cli.command);
    }

    let conn = open_db(&cli.store).map_err(|err| err.to_string())?;
    let store = SqliteSnapshotStore::try_new(&conn, config.storage_key.clone())
        .map_err(|err| err.to_string())?
        .with_layout(config.columns.clone());
    execute(store, &config, cli.command)
}

fn execute<S: SnapshotStore>(
    store: S,
    config: &BoardConfig,
    command: Command,
) -> Result<(), String> {
    let mut service = BoardService::open(store, config).map_err(|err| err.to_string())?;

    let changed = match command {
        Command::Show => {
            print_board(service.board());
            return Ok(());
        }
        Command::Add {
            title,
            priority,
            due,
            description,
        } => {
            let draft = TaskDraft::new(title, priority)
                .due(due)
                .described(description);
            match service.add_task(draft).map_err(|err| err.to_string())? {
                Some(id) => {
                    println!("added {id}");
                    true
                }
                None => false,
            }
        }
        Command::Edit {
            id,
            title,
            priority,
            due,
            clear_due,
            description,
        } => {
            let id = TaskId::new(id);
            let mut task = service
                .find_task(&id)
                .cloned()
                .ok_or_else(|| format!("no task with id `{id}`"))?;
            if let Some(title) = title {
                task.title = title;
            }
            if let Some(priority) = priority {
                task.priority = priority;
            }
            if clear_due {
                task.due_date = None;
            } else if due.is_some() {
                task.due_date = due;
            }
            if let Some(description) = description {
                task.description = description;
            }
            service.edit_task(task).map_err(|err| err.to_string())?
        }
        Command::Delete { column, id } => service
            .delete_task(&ColumnId::new(column), &TaskId::new(id))
            .map_err(|err| err.to_string())?,
        Command::Move {
            source_column,
            source_index,
            dest_column,
            dest_index,
        } => service
            .move_task(
                &ColumnId::new(source_column),
                source_index,
                &ColumnId::new(dest_column),
                dest_index,
            )
            .map_err(|err| err.to_string())?,
    };

    println!("{}", if changed { "board updated" } else { "no change" });
    Ok(())
}

fn print_board(board: &Board) {
    for column in board.columns() {
        println!("{} [{}] ({})", column.title(), column.id(), column.len());
        for (index, task) in column.tasks().iter().enumerate() {
            let due = task
                .due_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {index:>2}. {} ({}, due {due}) {}",
                task.title, task.priority, task.id
            );
            if !task.description.is_empty() {
                println!("      {}", task.description);
            }
        }
    }
}
