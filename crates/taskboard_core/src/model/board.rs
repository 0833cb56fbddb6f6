//! Board aggregate.
//!
//! # Responsibility
//! - Hold every column in display order.
//! - Reject column/task layouts that break membership invariants.
//!
//! # Invariants
//! - At least one column exists; column ids are unique.
//! - Every task id appears exactly once across all columns.
//! - Columns are never added or removed after construction.
//! - The first column is the intake column for new tasks.

use crate::model::column::{Column, ColumnId};
use crate::model::task::{Priority, Task, TaskId, TaskValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Display label plus key for one configured column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub id: ColumnId,
    pub title: String,
}

impl ColumnSpec {
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Returns the default three-lane layout.
pub fn default_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("todo", "To Do"),
        ColumnSpec::new("inProgress", "In Progress"),
        ColumnSpec::new("done", "Done"),
    ]
}

/// Structural errors raised when assembling a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    NoColumns,
    BlankColumnId,
    DuplicateColumn(ColumnId),
    DuplicateTask(TaskId),
    InvalidTask {
        column: ColumnId,
        source: TaskValidationError,
    },
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoColumns => write!(f, "board must contain at least one column"),
            Self::BlankColumnId => write!(f, "column id must not be blank"),
            Self::DuplicateColumn(id) => write!(f, "duplicate column id: {id}"),
            Self::DuplicateTask(id) => write!(f, "task id appears more than once: {id}"),
            Self::InvalidTask { column, source } => {
                write!(f, "invalid task in column {column}: {source}")
            }
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTask { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Ordered mapping from column id to column.
///
/// Engine operations never mutate a published board; they clone and return a
/// new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    columns: Vec<Column>,
}

impl Board {
    /// Builds a board and validates membership invariants.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, BoardError> {
        if columns.is_empty() {
            return Err(BoardError::NoColumns);
        }

        let mut column_ids = HashSet::new();
        let mut task_ids = HashSet::new();
        for column in &columns {
            if column.id.as_str().trim().is_empty() {
                return Err(BoardError::BlankColumnId);
            }
            if !column_ids.insert(column.id.clone()) {
                return Err(BoardError::DuplicateColumn(column.id.clone()));
            }
            for task in &column.tasks {
                task.validate().map_err(|source| BoardError::InvalidTask {
                    column: column.id.clone(),
                    source,
                })?;
                if !task_ids.insert(task.id.clone()) {
                    return Err(BoardError::DuplicateTask(task.id.clone()));
                }
            }
        }

        Ok(Self { columns })
    }

    /// Builds a board with the given layout and no tasks.
    pub fn empty(specs: &[ColumnSpec]) -> Result<Self, BoardError> {
        Self::from_columns(
            specs
                .iter()
                .map(|spec| Column::new(spec.id.clone(), spec.title.clone()))
                .collect(),
        )
    }

    /// Sample board shown on first run.
    pub fn seed() -> Self {
        let columns = vec![
            Column::new("todo", "To Do").with_tasks(vec![
                Task::with_id("task-1", "Create project structure", Priority::High)
                    .due(seed_date(15))
                    .described("Set up the initial project structure and dependencies"),
                Task::with_id("task-2", "Implement drag and drop", Priority::Medium)
                    .due(seed_date(20))
                    .described("Add drag and drop functionality for tasks"),
            ]),
            Column::new("inProgress", "In Progress").with_tasks(vec![Task::with_id(
                "task-3",
                "Design UI components",
                Priority::High,
            )
            .due(seed_date(18))
            .described("Create and style UI components for the app")]),
            Column::new("done", "Done").with_tasks(vec![Task::with_id(
                "task-4",
                "Set up development environment",
                Priority::Low,
            )
            .due(seed_date(10))
            .described("Configure development tools and environment")]),
        ];
        Self { columns }
    }

    /// Wraps columns that the caller already proved valid.
    pub(crate) fn from_validated(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub(crate) fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    /// Columns in display order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|column| &column.id == id)
    }

    pub(crate) fn column_index(&self, id: &ColumnId) -> Option<usize> {
        self.columns.iter().position(|column| &column.id == id)
    }

    /// Column that receives newly added tasks.
    pub fn intake_column(&self) -> &Column {
        &self.columns[0]
    }

    pub fn column_ids(&self) -> impl Iterator<Item = &ColumnId> {
        self.columns.iter().map(|column| &column.id)
    }

    /// Locates a task by id: `(column id, index, task)`.
    pub fn find_task(&self, id: &TaskId) -> Option<(&ColumnId, usize, &Task)> {
        self.columns.iter().find_map(|column| {
            column
                .position_of(id)
                .map(|index| (&column.id, index, &column.tasks[index]))
        })
    }

    /// Total task count across all columns.
    pub fn task_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::seed()
    }
}

fn seed_date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, day).unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::{default_columns, Board, BoardError, ColumnSpec};
    use crate::model::column::Column;
    use crate::model::task::{Priority, Task, TaskId};

    #[test]
    fn seed_has_three_lanes_and_four_tasks() {
        let board = Board::seed();
        let ids: Vec<&str> = board.column_ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, ["todo", "inProgress", "done"]);
        assert_eq!(board.task_count(), 4);
        assert_eq!(board.intake_column().id().as_str(), "todo");
        assert!(Board::from_columns(board.columns().to_vec()).is_ok());
    }

    #[test]
    fn empty_board_uses_layout_order() {
        let board = Board::empty(&default_columns()).unwrap();
        assert_eq!(board.task_count(), 0);
        assert_eq!(board.columns()[1].title(), "In Progress");
    }

    #[test]
    fn from_columns_rejects_duplicate_task_across_columns() {
        let task = Task::with_id("task-1", "dup", Priority::Low);
        let err = Board::from_columns(vec![
            Column::new("a", "A").with_tasks(vec![task.clone()]),
            Column::new("b", "B").with_tasks(vec![task]),
        ])
        .unwrap_err();
        assert_eq!(err, BoardError::DuplicateTask(TaskId::new("task-1")));
    }

    #[test]
    fn from_columns_rejects_duplicate_column() {
        let err = Board::empty(&[ColumnSpec::new("a", "A"), ColumnSpec::new("a", "again")])
            .unwrap_err();
        assert!(matches!(err, BoardError::DuplicateColumn(id) if id.as_str() == "a"));
        assert_eq!(Board::empty(&[]).unwrap_err(), BoardError::NoColumns);
    }

    #[test]
    fn find_task_reports_column_and_index() {
        let board = Board::seed();
        let (column, index, task) = board.find_task(&TaskId::new("task-2")).unwrap();
        assert_eq!(column.as_str(), "todo");
        assert_eq!(index, 1);
        assert_eq!(task.title, "Implement drag and drop");
        assert!(board.find_task(&TaskId::new("missing")).is_none());
    }
}
