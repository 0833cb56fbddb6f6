//! Board snapshot stores.
//!
//! # Responsibility
//! - Load and save full-board snapshots at process boundaries.
//! - Keep storage details (SQLite rows, files) behind `SnapshotStore`.
//!
//! # Invariants
//! - Save overwrites the whole previous snapshot; there is no partial state.
//! - A failed save leaves the previous durable snapshot readable.
//! - Load never returns a board that breaks board invariants.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::board::{Board, ColumnSpec};
use crate::repo::codec::{decode_board, decode_board_with_layout, encode_board, CodecError};
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Default snapshot key, matching the key used by earlier browser builds.
pub const DEFAULT_SNAPSHOT_KEY: &str = "taskColumns";

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from snapshot load/save.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Codec(CodecError),
    Io { path: PathBuf, source: std::io::Error },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Snapshot key is blank after trim.
    BlankKey,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "{err}"),
            Self::Io { path, source } => {
                write!(f, "snapshot file `{}`: {source}", path.display())
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "snapshot store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::BlankKey => write!(f, "snapshot key must not be blank"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::UninitializedConnection { .. } | Self::BlankKey => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<CodecError> for StoreError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// Durable storage for full-board snapshots.
pub trait SnapshotStore {
    /// Reads the last saved board. `Ok(None)` means nothing was saved yet.
    fn load(&self) -> StoreResult<Option<Board>>;
    /// Replaces the stored snapshot with `board`.
    fn save(&self, board: &Board) -> StoreResult<()>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn load(&self) -> StoreResult<Option<Board>> {
        (**self).load()
    }

    fn save(&self, board: &Board) -> StoreResult<()> {
        (**self).save(board)
    }
}

fn decode(payload: &str, layout: Option<&[ColumnSpec]>) -> Result<Board, CodecError> {
    match layout {
        Some(layout) => decode_board_with_layout(payload, layout),
        None => decode_board(payload),
    }
}

/// SQLite-backed snapshot store keyed by `snapshot_key`.
pub struct SqliteSnapshotStore<'conn> {
    conn: &'conn Connection,
    key: String,
    layout: Option<Vec<ColumnSpec>>,
}

impl<'conn> SqliteSnapshotStore<'conn> {
    /// Creates a store over a migrated connection.
    ///
    /// # Errors
    /// - `BlankKey` when `key` is empty after trim.
    /// - `UninitializedConnection` when migrations have not been applied.
    pub fn try_new(conn: &'conn Connection, key: impl Into<String>) -> StoreResult<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(StoreError::BlankKey);
        }

        let actual_version =
            conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        Ok(Self {
            conn,
            key,
            layout: None,
        })
    }

    /// Rejects loaded snapshots whose columns differ from `layout`.
    pub fn with_layout(mut self, layout: Vec<ColumnSpec>) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Deletes the stored snapshot, if any.
    pub fn clear(&self) -> StoreResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM board_snapshots WHERE snapshot_key = ?1;",
            [self.key.as_str()],
        )?;
        Ok(removed > 0)
    }
}

impl SnapshotStore for SqliteSnapshotStore<'_> {
    fn load(&self) -> StoreResult<Option<Board>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM board_snapshots WHERE snapshot_key = ?1;",
                [self.key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(payload) = payload else {
            info!(
                "event=board_load module=repo status=missing store=sqlite key={}",
                self.key
            );
            return Ok(None);
        };

        match decode(&payload, self.layout.as_deref()) {
            Ok(board) => {
                info!(
                    "event=board_load module=repo status=ok store=sqlite key={} tasks={}",
                    self.key,
                    board.task_count()
                );
                Ok(Some(board))
            }
            Err(err) => {
                warn!(
                    "event=board_load module=repo status=error store=sqlite key={} error_code=snapshot_invalid error={err}",
                    self.key
                );
                Err(err.into())
            }
        }
    }

    fn save(&self, board: &Board) -> StoreResult<()> {
        let started_at = Instant::now();
        let payload = encode_board(board)?;

        self.conn.execute(
            "INSERT INTO board_snapshots (snapshot_key, payload)
             VALUES (?1, ?2)
             ON CONFLICT(snapshot_key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![self.key.as_str(), payload.as_str()],
        )?;

        info!(
            "event=board_save module=repo status=ok store=sqlite key={} bytes={} duration_ms={}",
            self.key,
            payload.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

/// Single JSON file snapshot store.
///
/// Saves go to a sibling temp file that is renamed over the target.
pub struct FileSnapshotStore {
    path: PathBuf,
    layout: Option<Vec<ColumnSpec>>,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            layout: None,
        }
    }

    /// Rejects loaded snapshots whose columns differ from `layout`.
    pub fn with_layout(mut self, layout: Vec<ColumnSpec>) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> StoreResult<Option<Board>> {
        let payload = match std::fs::read_to_string(&self.path) {
            Ok(payload) => payload,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "event=board_load module=repo status=missing store=file path={}",
                    self.path.display()
                );
                return Ok(None);
            }
            Err(err) => return Err(self.io_error(err)),
        };

        let board = decode(&payload, self.layout.as_deref()).map_err(|err| {
            warn!(
                "event=board_load module=repo status=error store=file path={} error_code=snapshot_invalid error={err}",
                self.path.display()
            );
            err
        })?;
        info!(
            "event=board_load module=repo status=ok store=file path={} tasks={}",
            self.path.display(),
            board.task_count()
        );
        Ok(Some(board))
    }

    fn save(&self, board: &Board) -> StoreResult<()> {
        let started_at = Instant::now();
        let payload = encode_board(board)?;

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;

        let mut staged =
            tempfile::NamedTempFile::new_in(parent).map_err(|err| self.io_error(err))?;
        staged
            .write_all(payload.as_bytes())
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|err| self.io_error(err))?;
        staged
            .persist(&self.path)
            .map_err(|err| self.io_error(err.error))?;

        info!(
            "event=board_save module=repo status=ok store=file path={} bytes={} duration_ms={}",
            self.path.display(),
            payload.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}
