//! The single live engine instance and its lazy initialization.
//!
//! # Responsibility
//! - Create or load the engine on first use and memoize it.
//! - Serialize access so "execute + snapshot" spans never interleave.
//!
//! # Invariants
//! - At most one engine exists per handle; the snapshot file is read at most
//!   once per successful initialization.
//! - A failed initialization leaves the handle uninitialized; it never keeps a
//!   partially bootstrapped engine.
//! - Ephemeral locations never read or write files.

use super::snapshot::{SaveError, SnapshotManager};
use super::{open_in_memory, open_snapshot, DbError};
use crate::config::{SnapshotLocation, StoreConfig};
use log::warn;
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Engine creation failure (unreadable snapshot, newer schema, DDL error).
#[derive(Debug)]
pub struct InitError(pub DbError);

impl Display for InitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "database initialization failed: {}", self.0)
    }
}

impl Error for InitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

/// Owner of the process-wide engine.
///
/// Construct one at the composition root and pass it by reference to every
/// service; all reads and writes must go through the same handle.
pub struct StorageHandle {
    engine: OnceCell<Mutex<Connection>>,
    snapshot: SnapshotManager,
}

impl StorageHandle {
    /// Creates an uninitialized handle; no I/O happens until first use.
    pub fn new(location: SnapshotLocation) -> Self {
        Self {
            engine: OnceCell::new(),
            snapshot: SnapshotManager::new(location),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.snapshot.clone())
    }

    /// Handle whose engine lives only in memory.
    pub fn ephemeral() -> Self {
        Self::new(SnapshotLocation::Ephemeral)
    }

    pub fn location(&self) -> &SnapshotLocation {
        self.snapshot.location()
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.get().is_some()
    }

    /// Returns the live engine, creating or loading it on the first call.
    pub fn acquire(&self) -> Result<&Mutex<Connection>, InitError> {
        self.engine.get_or_try_init(|| {
            let conn = match self.snapshot.location() {
                SnapshotLocation::Ephemeral => open_in_memory(),
                SnapshotLocation::File(path) => open_snapshot(path),
            };
            conn.map(Mutex::new).map_err(InitError)
        })
    }

    /// Acquires the engine and locks it for one logical operation.
    pub fn session(&self) -> Result<Session<'_>, InitError> {
        let engine = self.acquire()?;
        Ok(Session {
            conn: lock_engine(engine),
            snapshot: &self.snapshot,
        })
    }

    /// Saves the current engine state.
    ///
    /// No-op when the engine was never initialized or the location is
    /// ephemeral. Useful to retry durability after a failed mutation save.
    pub fn persist(&self) -> Result<(), SaveError> {
        match self.engine.get() {
            Some(engine) => self.snapshot.persist(&lock_engine(engine)),
            None => Ok(()),
        }
    }
}

fn lock_engine(engine: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    engine.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
        // Statements are atomic; a panicked holder leaves no partial write.
        warn!("event=engine_lock module=db status=recovered reason=poisoned");
        poisoned.into_inner()
    })
}

/// Exclusive access to the engine for the span of one operation.
pub struct Session<'h> {
    conn: MutexGuard<'h, Connection>,
    snapshot: &'h SnapshotManager,
}

impl Session<'_> {
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Saves the engine state while the lock is still held.
    pub fn persist(&self) -> Result<(), SaveError> {
        self.snapshot.persist(&self.conn)
    }
}

impl Deref for Session<'_> {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}
