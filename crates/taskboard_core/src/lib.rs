//! Board state engine for a single-board task tracker.
//! This crate is the single source of truth for board invariants.

pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{BoardConfig, ConfigError};
pub use engine::{add_task, delete_task, edit_task, move_task, BoardCommand, Outcome};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::board::{default_columns, Board, BoardError, ColumnSpec};
pub use model::column::{Column, ColumnId};
pub use model::task::{Priority, Task, TaskDraft, TaskId, TaskValidationError};
pub use repo::codec::{decode_board, decode_board_with_layout, encode_board, CodecError};
pub use repo::snapshot_repo::{
    FileSnapshotStore, SnapshotStore, SqliteSnapshotStore, StoreError, StoreResult,
    DEFAULT_SNAPSHOT_KEY,
};
pub use service::board_service::{replay, BoardOrigin, BoardService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
