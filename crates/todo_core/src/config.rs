//! Runtime configuration for the todo store.
//!
//! # Responsibility
//! - Resolve where the store snapshot lives (or that it lives nowhere).
//! - Resolve logging level and target from the process environment.
//!
//! # Invariants
//! - A location starting with [`EPHEMERAL_MARKER_PREFIX`] never touches disk.
//! - Parsing never fails; an unrecognized value is treated as a file path.

use crate::logging::default_log_level;
use std::path::{Path, PathBuf};

/// Prefix that marks a location as in-memory only (e.g. `:memory:`).
pub const EPHEMERAL_MARKER_PREFIX: &str = ":";

/// Snapshot file used when `DB_PATH` is not set.
pub const DEFAULT_DB_PATH: &str = "todo.db";

const DB_PATH_ENV: &str = "DB_PATH";
const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
const LOG_DIR_ENV: &str = "LOG_DIR";

/// Where the store snapshot is loaded from and saved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotLocation {
    /// Engine lives only in memory; loads start empty and saves are no-ops.
    Ephemeral,
    /// Snapshot file on disk.
    File(PathBuf),
}

impl SnapshotLocation {
    /// Parses a path-like setting, honoring the ephemeral marker prefix.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with(EPHEMERAL_MARKER_PREFIX) {
            Self::Ephemeral
        } else {
            Self::File(PathBuf::from(raw))
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Self::Ephemeral)
    }

    /// Returns the snapshot file path, or `None` for ephemeral locations.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Ephemeral => None,
            Self::File(path) => Some(path.as_path()),
        }
    }
}

/// Process-level settings consumed by the composition root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub snapshot: SnapshotLocation,
    pub log_level: String,
    /// Absolute log directory; `None` logs to stderr.
    pub log_dir: Option<String>,
}

impl StoreConfig {
    /// Reads `DB_PATH`, `LOG_LEVEL` and `LOG_DIR` from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup(DB_PATH_ENV)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let log_level = lookup(LOG_LEVEL_ENV)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| default_log_level().to_string());
        let log_dir = lookup(LOG_DIR_ENV).filter(|value| !value.trim().is_empty());

        Self {
            snapshot: SnapshotLocation::parse(&db_path),
            log_level,
            log_dir,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot: SnapshotLocation::parse(DEFAULT_DB_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}
