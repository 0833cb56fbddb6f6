//! Board engine: pure transforms from one board value to the next.
//!
//! # Responsibility
//! - Apply add/delete/edit/move commands without touching the input board.
//! - Report no-ops explicitly so callers can skip persistence writes.
//!
//! # Invariants
//! - Operations never fail; rejected or trivial input yields `Outcome::Unchanged`.
//! - Column membership changes only through `move_task`.
//! - Total task count is preserved by `move_task`.
//! - No task id is ever duplicated or resurrected.

use crate::model::board::Board;
use crate::model::column::ColumnId;
use crate::model::task::{Task, TaskDraft, TaskId};

/// Result of applying one engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// The operation produced a new board.
    Changed(Board),
    /// The operation was a no-op; the input board stands.
    Unchanged,
}

impl Outcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }

    /// Returns the resulting board, cloning `previous` for no-ops.
    pub fn into_board(self, previous: &Board) -> Board {
        match self {
            Self::Changed(board) => board,
            Self::Unchanged => previous.clone(),
        }
    }

    pub fn changed(self) -> Option<Board> {
        match self {
            Self::Changed(board) => Some(board),
            Self::Unchanged => None,
        }
    }
}

/// One user-level command, as issued by a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCommand {
    Add(TaskDraft),
    Delete {
        column: ColumnId,
        task: TaskId,
    },
    Edit(Task),
    Move {
        source_column: ColumnId,
        source_index: usize,
        dest_column: ColumnId,
        dest_index: usize,
    },
}

impl BoardCommand {
    /// Short verb used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Delete { .. } => "delete",
            Self::Edit(_) => "edit",
            Self::Move { .. } => "move",
        }
    }

    pub fn apply(&self, board: &Board) -> Outcome {
        match self {
            Self::Add(draft) => add_task(board, draft.clone()),
            Self::Delete { column, task } => delete_task(board, column, task),
            Self::Edit(task) => edit_task(board, task.clone()),
            Self::Move {
                source_column,
                source_index,
                dest_column,
                dest_index,
            } => move_task(
                board,
                source_column,
                *source_index,
                dest_column,
                *dest_index,
            ),
        }
    }
}

/// Prepends a new task to the intake column.
///
/// A blank title (after trim) is a silent no-op.
pub fn add_task(board: &Board, draft: TaskDraft) -> Outcome {
    let Ok(task) = draft.into_task() else {
        return Outcome::Unchanged;
    };

    let mut columns = board.clone().into_columns();
    columns[0].tasks.insert(0, task);
    Outcome::Changed(Board::from_validated(columns))
}

/// Removes `task_id` from `column_id`, keeping the order of the rest.
///
/// Unknown column or a task not present in that column is a no-op.
pub fn delete_task(board: &Board, column_id: &ColumnId, task_id: &TaskId) -> Outcome {
    let Some(column_index) = board.column_index(column_id) else {
        return Outcome::Unchanged;
    };
    let Some(task_index) = board.columns()[column_index].position_of(task_id) else {
        return Outcome::Unchanged;
    };

    let mut columns = board.clone().into_columns();
    columns[column_index].tasks.remove(task_index);
    Outcome::Changed(Board::from_validated(columns))
}

/// Replaces the task with `updated.id` in place.
///
/// Column and index never change. Unknown ids, blank titles and identical
/// values are no-ops.
pub fn edit_task(board: &Board, updated: Task) -> Outcome {
    if updated.title.trim().is_empty() {
        return Outcome::Unchanged;
    }
    let located = board.columns().iter().enumerate().find_map(|(column_index, column)| {
        column
            .position_of(&updated.id)
            .map(|task_index| (column_index, task_index))
    });
    let Some((column_index, task_index)) = located else {
        return Outcome::Unchanged;
    };
    if board.columns()[column_index].tasks[task_index] == updated {
        return Outcome::Unchanged;
    }

    let mut columns = board.clone().into_columns();
    columns[column_index].tasks[task_index] = updated;
    Outcome::Changed(Board::from_validated(columns))
}

/// Moves one task to `dest_index` of `dest_column`.
///
/// Same-column moves use splice semantics: `dest_index` addresses the
/// sequence after the task was removed, so `[A, B, C]` with `0 -> 2` becomes
/// `[B, C, A]`. Cross-column moves insert before the task currently at
/// `dest_index`. `dest_index` is clamped to the target length. Unknown columns
/// and out-of-range source indices are no-ops.
pub fn move_task(
    board: &Board,
    source_column: &ColumnId,
    source_index: usize,
    dest_column: &ColumnId,
    dest_index: usize,
) -> Outcome {
    let Some(source) = board.column_index(source_column) else {
        return Outcome::Unchanged;
    };
    let Some(dest) = board.column_index(dest_column) else {
        return Outcome::Unchanged;
    };
    let source_len = board.columns()[source].len();
    if source_index >= source_len {
        return Outcome::Unchanged;
    }

    if source == dest {
        let target = dest_index.min(source_len - 1);
        if target == source_index {
            return Outcome::Unchanged;
        }
        let mut columns = board.clone().into_columns();
        let tasks = &mut columns[source].tasks;
        let task = tasks.remove(source_index);
        tasks.insert(target, task);
        return Outcome::Changed(Board::from_validated(columns));
    }

    let mut columns = board.clone().into_columns();
    let task = columns[source].tasks.remove(source_index);
    let dest_tasks = &mut columns[dest].tasks;
    let target = dest_index.min(dest_tasks.len());
    dest_tasks.insert(target, task);
    Outcome::Changed(Board::from_validated(columns))
}
