//! Snapshot JSON codec.
//!
//! # Responsibility
//! - Convert a `Board` to and from the persisted snapshot document.
//! - Keep wire naming (`content`, `dueDate`) out of the domain model.
//!
//! # Invariants
//! - Object key order is the column display order, both ways.
//! - `dueDate` is always decoded into a date value, never kept as text.
//! - Decoded boards pass the same invariant checks as `Board::from_columns`.

use crate::model::board::{Board, BoardError, ColumnSpec};
use crate::model::column::{Column, ColumnId};
use crate::model::task::{Priority, Task, TaskId};
use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors raised while encoding or decoding a snapshot.
#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    /// Object key does not match the embedded column `id`.
    KeyMismatch { key: String, id: String },
    Board(BoardError),
    /// Snapshot columns differ from the configured layout.
    LayoutMismatch {
        expected: Vec<ColumnId>,
        found: Vec<ColumnId>,
    },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed snapshot: {err}"),
            Self::KeyMismatch { key, id } => {
                write!(f, "snapshot key `{key}` holds column with id `{id}`")
            }
            Self::Board(err) => write!(f, "invalid snapshot board: {err}"),
            Self::LayoutMismatch { expected, found } => write!(
                f,
                "snapshot columns [{}] do not match configured columns [{}]",
                join_ids(found),
                join_ids(expected)
            ),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Board(err) => Some(err),
            Self::KeyMismatch { .. } | Self::LayoutMismatch { .. } => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<BoardError> for CodecError {
    fn from(value: BoardError) -> Self {
        Self::Board(value)
    }
}

/// Serializes a board into its snapshot document.
pub fn encode_board(board: &Board) -> Result<String, CodecError> {
    Ok(serde_json::to_string(&BoardRef(board))?)
}

/// Parses a snapshot document into a board.
///
/// # Errors
/// - `Json` for syntax errors, unknown priorities and unparsable dates.
/// - `KeyMismatch` when a column's key and `id` differ.
/// - `Board` when the decoded columns break board invariants.
pub fn decode_board(payload: &str) -> Result<Board, CodecError> {
    let wire: WireBoard = serde_json::from_str(payload)?;
    let mut columns = Vec::with_capacity(wire.0.len());
    for (key, column) in wire.0 {
        if key != column.id {
            return Err(CodecError::KeyMismatch { key, id: column.id });
        }
        columns.push(column.into_column());
    }
    Ok(Board::from_columns(columns)?)
}

/// Parses a snapshot and checks its columns against a configured layout.
///
/// Column ids must match the layout exactly, in order. Titles come from the
/// snapshot.
pub fn decode_board_with_layout(payload: &str, layout: &[ColumnSpec]) -> Result<Board, CodecError> {
    let board = decode_board(payload)?;
    let found: Vec<ColumnId> = board.column_ids().cloned().collect();
    let expected: Vec<ColumnId> = layout.iter().map(|spec| spec.id.clone()).collect();
    if found != expected {
        return Err(CodecError::LayoutMismatch { expected, found });
    }
    Ok(board)
}

fn join_ids(ids: &[ColumnId]) -> String {
    ids.iter()
        .map(ColumnId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

struct BoardRef<'a>(&'a Board);

impl Serialize for BoardRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns = self.0.columns();
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for column in columns {
            map.serialize_entry(column.id().as_str(), &ColumnRef(column))?;
        }
        map.end()
    }
}

struct ColumnRef<'a>(&'a Column);

impl Serialize for ColumnRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tasks: Vec<WireTaskRef<'_>> = self.0.tasks().iter().map(WireTaskRef::from).collect();
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("id", self.0.id().as_str())?;
        map.serialize_entry("title", self.0.title())?;
        map.serialize_entry("tasks", &tasks)?;
        map.end()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTaskRef<'a> {
    id: &'a str,
    content: &'a str,
    priority: Priority,
    #[serde(serialize_with = "due_date::serialize")]
    due_date: Option<NaiveDate>,
    description: &'a str,
}

impl<'a> From<&'a Task> for WireTaskRef<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            id: task.id.as_str(),
            content: task.title.as_str(),
            priority: task.priority,
            due_date: task.due_date,
            description: task.description.as_str(),
        }
    }
}

/// Snapshot root, kept as an ordered list of `(key, column)` entries.
struct WireBoard(Vec<(String, WireColumn)>);

impl<'de> Deserialize<'de> for WireBoard {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedColumns;

        impl<'de> Visitor<'de> for OrderedColumns {
            type Value = WireBoard;

            fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str("an object mapping column ids to columns")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<WireBoard, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(3));
                while let Some(entry) = access.next_entry::<String, WireColumn>()? {
                    entries.push(entry);
                }
                Ok(WireBoard(entries))
            }
        }

        deserializer.deserialize_map(OrderedColumns)
    }
}

#[derive(Deserialize)]
struct WireColumn {
    id: String,
    title: String,
    #[serde(default)]
    tasks: Vec<WireTask>,
}

impl WireColumn {
    fn into_column(self) -> Column {
        Column::new(self.id, self.title)
            .with_tasks(self.tasks.into_iter().map(WireTask::into_task).collect())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTask {
    id: String,
    content: String,
    priority: Priority,
    #[serde(default, deserialize_with = "due_date::deserialize")]
    due_date: Option<NaiveDate>,
    #[serde(default)]
    description: String,
}

impl WireTask {
    fn into_task(self) -> Task {
        Task {
            id: TaskId::new(self.id),
            title: self.content,
            priority: self.priority,
            due_date: self.due_date,
            description: self.description,
        }
    }
}

/// `dueDate` wire handling.
///
/// Older snapshots stored full timestamps (`2025-02-15T00:00:00.000Z`); only
/// the calendar date of such values is kept.
mod due_date {
    use chrono::{DateTime, NaiveDate};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    const DATE_FORMAT: &str = "%Y-%m-%d";

    pub(super) fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let Some(text) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        parse(&text)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid dueDate `{text}`")))
    }

    pub(super) fn parse(text: &str) -> Option<NaiveDate> {
        let trimmed = text.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            return Some(date);
        }
        DateTime::parse_from_rfc3339(trimmed)
            .ok()
            .map(|timestamp| timestamp.date_naive())
    }
}
