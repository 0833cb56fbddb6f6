//! Board domain model.
//!
//! # Responsibility
//! - Define the task, column and board values the engine transforms.
//! - Keep column layout as data so lanes are configuration, not code.
//!
//! # Invariants
//! - Every task is identified by a board-wide unique `TaskId`.
//! - A task belongs to exactly one column at a time.

pub mod board;
pub mod column;
pub mod task;
