//! Board configuration.
//!
//! # Responsibility
//! - Describe the column layout and snapshot key as data.
//! - Load overrides from a TOML file, falling back to defaults.
//!
//! # Invariants
//! - A validated config always yields a constructible board.

use crate::model::board::{default_columns, Board, BoardError, ColumnSpec};
use crate::repo::snapshot_repo::DEFAULT_SNAPSHOT_KEY;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Errors from config loading and validation.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    BlankStorageKey,
    Layout(BoardError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::BlankStorageKey => write!(f, "storage_key must not be blank"),
            Self::Layout(err) => write!(f, "invalid column layout: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Layout(err) => Some(err),
            Self::BlankStorageKey => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<BoardError> for ConfigError {
    fn from(value: BoardError) -> Self {
        Self::Layout(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Key under which the snapshot is stored.
    pub storage_key: String,
    /// Start first runs with the sample tasks (default layout only).
    pub seed_sample_tasks: bool,
    /// Columns in display order; the first one receives new tasks.
    pub columns: Vec<ColumnSpec>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_SNAPSHOT_KEY.to_string(),
            seed_sample_tasks: true,
            columns: default_columns(),
        }
    }
}

impl BoardConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads config from `path`; a missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    "event=config_load module=config status=missing path={}",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = Self::from_toml_str(&text)?;
        info!(
            "event=config_load module=config status=ok path={} columns={}",
            path.display(),
            config.columns.len()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::BlankStorageKey);
        }
        Board::empty(&self.columns)?;
        Ok(())
    }

    pub fn uses_default_layout(&self) -> bool {
        self.columns == default_columns()
    }

    /// Board used when no snapshot can be loaded.
    pub fn seed_board(&self) -> Result<Board, ConfigError> {
        if self.seed_sample_tasks && self.uses_default_layout() {
            return Ok(Board::seed());
        }
        Ok(Board::empty(&self.columns)?)
    }
}
