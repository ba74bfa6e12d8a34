//! Whole-store snapshot writes.
//!
//! # Responsibility
//! - Serialize the live engine to bytes and replace the snapshot file.
//!
//! # Invariants
//! - Ephemeral locations never touch the filesystem.
//! - The snapshot file is replaced by rename; readers see the old or the new
//!   image, never a truncated one.
//! - A failed save leaves the in-memory engine untouched.

use super::DbError;
use crate::config::SnapshotLocation;
use log::{error, info};
use rusqlite::{Connection, DatabaseName};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tempfile::NamedTempFile;

/// Snapshot write failure; the mutation that triggered it stays applied.
#[derive(Debug)]
pub struct SaveError(pub DbError);

impl Display for SaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "database save failed: {}", self.0)
    }
}

impl Error for SaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl From<rusqlite::Error> for SaveError {
    fn from(value: rusqlite::Error) -> Self {
        Self(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for SaveError {
    fn from(value: std::io::Error) -> Self {
        Self(DbError::Io(value))
    }
}

/// Writes engine snapshots to the configured location.
#[derive(Debug, Clone)]
pub struct SnapshotManager {
    location: SnapshotLocation,
}

impl SnapshotManager {
    pub fn new(location: SnapshotLocation) -> Self {
        Self { location }
    }

    pub fn location(&self) -> &SnapshotLocation {
        &self.location
    }

    /// Saves the full state of `conn` to the snapshot file.
    ///
    /// No-op for ephemeral locations.
    pub fn persist(&self, conn: &Connection) -> Result<(), SaveError> {
        let Some(path) = self.location.path() else {
            return Ok(());
        };

        let started_at = Instant::now();
        match write_snapshot(conn, path) {
            Ok(bytes) => {
                info!(
                    "event=snapshot_save module=db status=ok bytes={} duration_ms={}",
                    bytes,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=snapshot_save module=db status=error duration_ms={} error_code=snapshot_write_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn write_snapshot(conn: &Connection, path: &Path) -> Result<usize, SaveError> {
    let image = conn.serialize(DatabaseName::Main)?;
    let bytes: &[u8] = &image;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|err| err.error)?;

    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::SnapshotManager;
    use crate::config::SnapshotLocation;
    use crate::db::{open_in_memory, open_snapshot};

    #[test]
    fn ephemeral_persist_is_a_noop() {
        let conn = open_in_memory().unwrap();
        let manager = SnapshotManager::new(SnapshotLocation::Ephemeral);
        manager.persist(&conn).unwrap();
    }

    #[test]
    fn persist_replaces_existing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todo.db");
        let manager = SnapshotManager::new(SnapshotLocation::File(path.clone()));

        let conn = open_in_memory().unwrap();
        conn.execute("INSERT INTO todos (title) VALUES ('one');", [])
            .unwrap();
        manager.persist(&conn).unwrap();
        conn.execute("INSERT INTO todos (title) VALUES ('two');", [])
            .unwrap();
        manager.persist(&conn).unwrap();

        let reloaded = open_snapshot(&path).unwrap();
        let count: i64 = reloaded
            .query_row("SELECT COUNT(*) FROM todos;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "staging files must not be left behind");
    }

    #[test]
    fn persist_into_missing_directory_fails_with_save_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("todo.db");
        let manager = SnapshotManager::new(SnapshotLocation::File(path));

        let conn = open_in_memory().unwrap();
        let err = manager.persist(&conn).unwrap_err();
        assert!(err.to_string().starts_with("database save failed"));
    }
}
