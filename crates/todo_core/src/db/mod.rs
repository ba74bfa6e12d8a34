//! Embedded SQLite engine, snapshot persistence and raw query primitives.
//!
//! # Responsibility
//! - Own the single live engine instance ([`StorageHandle`]).
//! - Load the engine from, and save it to, a snapshot file.
//! - Expose generic `query`/`execute` primitives returning tabular results.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No data is read or written before migrations succeed.
//! - The generic [`QueryResult`] shape does not leave the repository layer.

use rusqlite::types::Value;
use rusqlite::{Connection, Params};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod handle;
pub mod migrations;
mod open;
mod snapshot;

pub use handle::{InitError, Session, StorageHandle};
pub use open::{open_in_memory, open_snapshot};
pub use snapshot::{SaveError, SnapshotManager};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    Io(std::io::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<std::io::Error> for DbError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Generic tabular result: column names plus positional value rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Runs a read statement and collects every row into a [`QueryResult`].
pub fn query<P: Params>(conn: &Connection, sql: &str, params: P) -> DbResult<QueryResult> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_owned)
        .collect();
    let width = columns.len();

    let mut rows = stmt.query(params)?;
    let mut values = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Vec::with_capacity(width);
        for index in 0..width {
            record.push(row.get::<_, Value>(index)?);
        }
        values.push(record);
    }

    Ok(QueryResult {
        columns,
        rows: values,
    })
}

/// Runs a write statement and returns the number of changed rows.
pub fn execute<P: Params>(conn: &Connection, sql: &str, params: P) -> DbResult<usize> {
    Ok(conn.execute(sql, params)?)
}

#[cfg(test)]
mod tests {
    use super::{execute, open_in_memory, query};
    use rusqlite::types::Value;
    use rusqlite::params;

    #[test]
    fn query_returns_columns_and_positional_rows() {
        let conn = open_in_memory().unwrap();
        execute(
            &conn,
            "INSERT INTO todos (title) VALUES (?1), (?2);",
            params!["first", "second"],
        )
        .unwrap();

        let result = query(&conn, "SELECT id, title, status FROM todos ORDER BY id;", []).unwrap();
        assert_eq!(result.columns, vec!["id", "title", "status"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0][1], Value::Text("first".to_string()));
        assert_eq!(result.rows[1][2], Value::Text("pending".to_string()));
    }

    #[test]
    fn query_without_matches_keeps_columns() {
        let conn = open_in_memory().unwrap();
        let result = query(&conn, "SELECT id, title FROM todos WHERE id = ?1;", [42]).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.columns, vec!["id", "title"]);
    }

    #[test]
    fn execute_reports_changed_rows() {
        let conn = open_in_memory().unwrap();
        let changed = execute(&conn, "DELETE FROM todos WHERE id = ?1;", [1]).unwrap();
        assert_eq!(changed, 0);
    }
}
