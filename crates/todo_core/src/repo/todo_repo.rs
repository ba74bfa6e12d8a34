//! Todo repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and search primitives over the `todos` table.
//! - Keep SQL text inside the persistence boundary.
//!
//! # Invariants
//! - Reads go through `db::query` and the record mapper; the tabular shape
//!   never escapes this module.
//! - Listing and search return rows in insertion (`id`) order.
//! - Writes accept only validated inputs (`NewTodo`, merged `Todo`).

use super::mapper::{map_all, map_one};
use crate::db::{execute, query, DbError};
use crate::model::todo::{NewTodo, Todo, TodoId};
use crate::model::validation::{Page, SearchTerm};
use rusqlite::{params, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TODO_SELECT_SQL: &str = "SELECT id, title, description, status FROM todos";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for todo persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(TodoId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for todo operations.
pub trait TodoRepository {
    fn insert_todo(&self, todo: &NewTodo) -> RepoResult<TodoId>;
    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>>;
    fn list_todos(&self, page: Page) -> RepoResult<Vec<Todo>>;
    fn search_todos(&self, term: &SearchTerm) -> RepoResult<Vec<Todo>>;
    fn replace_todo(&self, todo: &Todo) -> RepoResult<()>;
    fn delete_todo(&self, id: TodoId) -> RepoResult<()>;
    fn count_todos(&self) -> RepoResult<u64>;
}

/// SQLite-backed todo repository.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn insert_todo(&self, todo: &NewTodo) -> RepoResult<TodoId> {
        execute(
            self.conn,
            "INSERT INTO todos (title, description, status) VALUES (?1, ?2, ?3);",
            params![
                todo.title.as_str(),
                todo.description.as_deref(),
                todo.status.as_str()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        let result = query(
            self.conn,
            &format!("{TODO_SELECT_SQL} WHERE id = ?1;"),
            [id],
        )?;
        map_one(&result)
    }

    fn list_todos(&self, page: Page) -> RepoResult<Vec<Todo>> {
        // Offsets past i64::MAX cannot address a row; clamping keeps them empty.
        let offset = i64::try_from(page.skip).unwrap_or(i64::MAX);
        let result = query(
            self.conn,
            &format!("{TODO_SELECT_SQL} ORDER BY id ASC LIMIT ?1 OFFSET ?2;"),
            params![i64::from(page.limit), offset],
        )?;
        map_all(&result)
    }

    fn search_todos(&self, term: &SearchTerm) -> RepoResult<Vec<Todo>> {
        let pattern = format!("%{}%", escape_like(term.as_str()));
        let result = query(
            self.conn,
            &format!("{TODO_SELECT_SQL} WHERE title LIKE ?1 ESCAPE '\\' ORDER BY id ASC;"),
            [pattern],
        )?;
        map_all(&result)
    }

    fn replace_todo(&self, todo: &Todo) -> RepoResult<()> {
        let changed = execute(
            self.conn,
            "UPDATE todos SET title = ?1, description = ?2, status = ?3 WHERE id = ?4;",
            params![
                todo.title.as_str(),
                todo.description.as_deref(),
                todo.status.as_str(),
                todo.id
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(todo.id));
        }

        Ok(())
    }

    fn delete_todo(&self, id: TodoId) -> RepoResult<()> {
        let changed = execute(self.conn, "DELETE FROM todos WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn count_todos(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM todos;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
    }
}

/// Escapes `LIKE` wildcards so the term matches as a literal substring.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
