//! Task domain model.
//!
//! # Responsibility
//! - Define the unit of work carried by board columns.
//! - Provide id generation and title validation shared by engine paths.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `title` is non-blank for every task created or edited through the engine.
//! - `due_date` is a calendar date; time-of-day is never stored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_ID_PREFIX: &str = "task-";

/// Opaque, board-wide unique task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh identifier (`task-<uuid v4>`).
    pub fn generate() -> Self {
        Self(format!("{TASK_ID_PREFIX}{}", Uuid::new_v4()))
    }

    /// Wraps an existing identifier, e.g. one read from a snapshot.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Task urgency marker. Independent from position inside a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses the wire spelling (`low|medium|high`), case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for task values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty after trimming whitespace.
    BlankTitle,
    /// Identifier is empty after trimming whitespace.
    BlankId,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "task title must not be blank"),
            Self::BlankId => write!(f, "task id must not be blank"),
        }
    }
}

impl Error for TaskValidationError {}

/// One unit of work on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub description: String,
}

impl Task {
    /// Creates a task with a caller-provided id.
    ///
    /// Used by seed data and snapshot decoding where identity already exists.
    pub fn with_id(id: impl Into<TaskId>, title: impl Into<String>, priority: Priority) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            priority,
            due_date: None,
            description: String::new(),
        }
    }

    pub fn due(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Checks field-level invariants.
    ///
    /// # Errors
    /// - `BlankId` when the id is empty after trim.
    /// - `BlankTitle` when the title is empty after trim.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(TaskValidationError::BlankId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        Ok(())
    }
}

/// Input for creating a new task; the engine assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub description: String,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: title.into(),
            priority,
            ..Self::default()
        }
    }

    pub fn due(mut self, date: Option<NaiveDate>) -> Self {
        self.due_date = date;
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builds a task with a freshly generated id.
    ///
    /// Returns `BlankTitle` when the trimmed title is empty. The stored title
    /// is the trimmed text.
    pub fn into_task(self) -> Result<Task, TaskValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        Ok(Task {
            id: TaskId::generate(),
            title: title.to_string(),
            priority: self.priority,
            due_date: self.due_date,
            description: self.description,
        })
    }
}
