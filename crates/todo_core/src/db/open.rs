//! Engine bootstrap for in-memory and snapshot-backed stores.
//!
//! # Responsibility
//! - Create the in-memory SQLite engine.
//! - Restore snapshot contents into it when a snapshot file is given.
//! - Apply schema migrations before returning a usable connection.
//!
//! # Invariants
//! - The engine is always in-memory; a snapshot file is only read here.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::backup::Progress;
use rusqlite::{Connection, DatabaseName};
use std::path::Path;
use std::time::Instant;

/// Opens an empty in-memory engine and applies all migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    match Connection::open_in_memory()
        .map_err(DbError::from)
        .and_then(|mut conn| bootstrap_connection(&mut conn).map(|()| conn))
    {
        Ok(conn) => {
            info!(
                "event=db_open module=db status=ok mode=memory duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=memory duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens an in-memory engine seeded from the snapshot file at `path`.
///
/// A missing file yields an empty engine. A file that exists but cannot be
/// read, or is not a SQLite database, is an error.
///
/// # Side effects
/// - Reads the snapshot file once.
/// - Emits `snapshot_load` and `db_open` logging events.
pub fn open_snapshot(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    if !path.exists() {
        info!("event=snapshot_load module=db status=skipped reason=missing_file");
        return open_in_memory();
    }

    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=snapshot");

    let mut conn = Connection::open_in_memory()?;
    if let Err(err) = restore_snapshot(&mut conn, path) {
        error!(
            "event=snapshot_load module=db status=error duration_ms={} error_code=snapshot_unreadable error={}",
            started_at.elapsed().as_millis(),
            err
        );
        return Err(err);
    }

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode=snapshot duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=snapshot duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn restore_snapshot(conn: &mut Connection, path: &Path) -> DbResult<()> {
    // Unreadable files must fail as I/O errors, not restore as empty.
    std::fs::File::open(path)?;
    conn.restore(DatabaseName::Main, path, None::<fn(Progress)>)?;
    Ok(())
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    apply_migrations(conn)?;
    Ok(())
}
