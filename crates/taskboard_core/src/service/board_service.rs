//! Board use-case service.
//!
//! # Responsibility
//! - Own the single current board and chain every command off it.
//! - Load once at startup and save after every change.
//!
//! # Invariants
//! - Only `Outcome::Changed` results replace the board or touch storage.
//! - A failed save keeps the new in-memory board and marks the service dirty.
//! - Unreadable snapshots never prevent startup; the seed board is used.

use crate::config::{BoardConfig, ConfigError};
use crate::engine::{BoardCommand, Outcome};
use crate::model::board::Board;
use crate::model::column::ColumnId;
use crate::model::task::{Task, TaskDraft, TaskId};
use crate::repo::snapshot_repo::{SnapshotStore, StoreResult};
use log::{error, info, warn};

/// Where the board held at startup came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardOrigin {
    /// Decoded from the stored snapshot.
    Snapshot,
    /// No snapshot existed; first run.
    Seed,
    /// A snapshot existed but could not be loaded.
    Recovered,
}

/// Current-board holder that enforces load/save discipline.
pub struct BoardService<S: SnapshotStore> {
    store: S,
    board: Board,
    origin: BoardOrigin,
    dirty: bool,
}

impl<S: SnapshotStore> BoardService<S> {
    /// Loads the board from `store`, or seeds one from `config`.
    ///
    /// # Errors
    /// - Returns `ConfigError` only when the configured layout cannot form a
    ///   board. Load failures are logged and recovered from.
    pub fn open(store: S, config: &BoardConfig) -> Result<Self, ConfigError> {
        let (board, origin) = match store.load() {
            Ok(Some(board)) => (board, BoardOrigin::Snapshot),
            Ok(None) => (config.seed_board()?, BoardOrigin::Seed),
            Err(err) => {
                warn!(
                    "event=board_open module=service status=recovered error_code=snapshot_load_failed error={err}"
                );
                (config.seed_board()?, BoardOrigin::Recovered)
            }
        };
        info!(
            "event=board_open module=service status=ok origin={origin:?} columns={} tasks={}",
            board.columns().len(),
            board.task_count()
        );

        Ok(Self {
            store,
            board,
            origin,
            dirty: false,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn origin(&self) -> BoardOrigin {
        self.origin
    }

    /// Whether the in-memory board is newer than the last successful save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Applies one command and saves when the board changed.
    ///
    /// Returns whether the board changed. On a save error the change is kept
    /// in memory and the error is returned; `flush` retries the save.
    pub fn apply(&mut self, command: &BoardCommand) -> StoreResult<bool> {
        match command.apply(&self.board) {
            Outcome::Changed(board) => {
                info!(
                    "event=board_command module=service command={} status=changed tasks={}",
                    command.name(),
                    board.task_count()
                );
                self.board = board;
                self.dirty = true;
                self.flush()?;
                Ok(true)
            }
            Outcome::Unchanged => {
                info!(
                    "event=board_command module=service command={} status=noop",
                    command.name()
                );
                Ok(false)
            }
        }
    }

    /// Adds a task to the intake column and returns its id.
    ///
    /// `Ok(None)` means the title was blank. On a save error the task still
    /// sits at the front of the intake column.
    pub fn add_task(&mut self, draft: TaskDraft) -> StoreResult<Option<TaskId>> {
        if !self.apply(&BoardCommand::Add(draft))? {
            return Ok(None);
        }
        Ok(self
            .board
            .intake_column()
            .tasks()
            .first()
            .map(|task| task.id.clone()))
    }

    pub fn delete_task(&mut self, column: &ColumnId, task: &TaskId) -> StoreResult<bool> {
        self.apply(&BoardCommand::Delete {
            column: column.clone(),
            task: task.clone(),
        })
    }

    pub fn edit_task(&mut self, task: Task) -> StoreResult<bool> {
        self.apply(&BoardCommand::Edit(task))
    }

    pub fn move_task(
        &mut self,
        source_column: &ColumnId,
        source_index: usize,
        dest_column: &ColumnId,
        dest_index: usize,
    ) -> StoreResult<bool> {
        self.apply(&BoardCommand::Move {
            source_column: source_column.clone(),
            source_index,
            dest_column: dest_column.clone(),
            dest_index,
        })
    }

    /// Saves the current board if it has unsaved changes.
    pub fn flush(&mut self) -> StoreResult<()> {
        if !self.dirty {
            return Ok(());
        }
        match self.store.save(&self.board) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=board_save module=service status=error error_code=snapshot_save_failed error={err}"
                );
                Err(err)
            }
        }
    }

    /// Looks up a task by id across all columns.
    pub fn find_task(&self, id: &TaskId) -> Option<&Task> {
        self.board.find_task(id).map(|(_, _, task)| task)
    }
}

/// Applies `commands` in order to `board` without persistence.
///
/// Useful for previews and replaying queued gestures.
pub fn replay(board: &Board, commands: &[BoardCommand]) -> Board {
    commands.iter().fold(board.clone(), |current, command| {
        match command.apply(&current) {
            Outcome::Changed(next) => next,
            Outcome::Unchanged => current,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::replay;
    use crate::engine::BoardCommand;
    use crate::model::board::Board;
    use crate::model::column::ColumnId;
    use crate::model::task::{Priority, TaskDraft, TaskId};

    #[test]
    fn replay_applies_commands_in_order() {
        let board = Board::seed();
        let commands = [
            BoardCommand::Add(TaskDraft::new("Ship it", Priority::High)),
            BoardCommand::Move {
                source_column: ColumnId::new("todo"),
                source_index: 0,
                dest_column: ColumnId::new("done"),
                dest_index: 0,
            },
            BoardCommand::Delete {
                column: ColumnId::new("done"),
                task: TaskId::new("task-4"),
            },
        ];

        let result = replay(&board, &commands);
        let done = result.column(&ColumnId::new("done")).unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done.tasks()[0].title, "Ship it");
        assert_eq!(result.task_count(), board.task_count());
    }
}
