//! Todo use-case service.
//!
//! # Responsibility
//! - Provide create/get/list/search/update/delete entry points for callers.
//! - Validate inputs before any mutation reaches storage.
//! - Snapshot the store after every successful mutation.
//!
//! # Invariants
//! - Each operation holds the engine lock from first statement to snapshot.
//! - `update` and `delete` check existence before validating the body.
//! - A failed snapshot never rolls back the mutation; it is reported as
//!   [`TodoServiceError::NotDurable`] carrying the applied outcome.

use crate::db::{InitError, SaveError, StorageHandle};
use crate::model::request::{
    CreateTodoRequest, ListTodosRequest, SearchTodosRequest, UpdateTodoRequest,
};
use crate::model::todo::{Todo, TodoId};
use crate::model::validation::{
    validate_create, validate_page, validate_search, validate_update, ValidationError,
};
use crate::repo::todo_repo::{RepoError, SqliteTodoRepository, TodoRepository};
use log::{debug, info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, TodoServiceError>;

/// A mutation that was applied to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MutationOutcome {
    Created(Todo),
    Updated(Todo),
    Deleted(TodoId),
}

/// Confirmation returned by a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deleted {
    pub id: TodoId,
    pub detail: &'static str,
}

impl Deleted {
    fn new(id: TodoId) -> Self {
        Self {
            id,
            detail: "Todo deleted",
        }
    }
}

/// Service error for todo use-cases.
#[derive(Debug)]
pub enum TodoServiceError {
    /// Input violates field constraints; storage was not touched.
    Validation(ValidationError),
    /// No todo with this id.
    NotFound(TodoId),
    /// Engine could not be created or loaded.
    Init(InitError),
    /// Query failure or malformed stored data.
    Repo(RepoError),
    /// Mutation applied in memory but the snapshot write failed.
    NotDurable {
        outcome: MutationOutcome,
        source: SaveError,
    },
    /// Internal mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl TodoServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl Display for TodoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::Init(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::NotDurable { source, .. } => write!(f, "{source}"),
            Self::InconsistentState(details) => write!(f, "inconsistent todo state: {details}"),
        }
    }
}

impl Error for TodoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Init(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotDurable { source, .. } => Some(source),
            Self::NotFound(_) | Self::InconsistentState(_) => None,
        }
    }
}

impl From<ValidationError> for TodoServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<InitError> for TodoServiceError {
    fn from(value: InitError) -> Self {
        Self::Init(value)
    }
}

impl From<RepoError> for TodoServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Todo service over a shared storage handle.
pub struct TodoService<'h> {
    store: &'h StorageHandle,
}

impl<'h> TodoService<'h> {
    pub fn new(store: &'h StorageHandle) -> Self {
        Self { store }
    }

    /// Creates a todo and returns it as persisted, including its new id.
    pub fn create(&self, request: &CreateTodoRequest) -> ServiceResult<Todo> {
        let new_todo = validate_create(request)?;

        let session = self.store.session()?;
        let repo = SqliteTodoRepository::new(session.conn());
        let id = repo.insert_todo(&new_todo)?;
        let todo = repo
            .get_todo(id)?
            .ok_or(TodoServiceError::InconsistentState(
                "created todo not found in read-back",
            ))?;
        info!("event=todo_create module=service status=ok id={id}");

        finish_mutation(session.persist(), MutationOutcome::Created(todo.clone()))?;
        Ok(todo)
    }

    pub fn get(&self, id: TodoId) -> ServiceResult<Todo> {
        let session = self.store.session()?;
        let repo = SqliteTodoRepository::new(session.conn());
        let todo = repo.get_todo(id)?.ok_or(TodoServiceError::NotFound(id))?;
        Ok(todo)
    }

    /// Lists one page of todos in insertion order; may be empty.
    pub fn list(&self, request: &ListTodosRequest) -> ServiceResult<Vec<Todo>> {
        let page = validate_page(request)?;

        let session = self.store.session()?;
        let items = SqliteTodoRepository::new(session.conn()).list_todos(page)?;
        debug!(
            "event=todo_list module=service status=ok skip={} limit={} count={}",
            page.skip,
            page.limit,
            items.len()
        );
        Ok(items)
    }

    /// Case-insensitive substring search on titles; no match is `[]`.
    pub fn search(&self, request: &SearchTodosRequest) -> ServiceResult<Vec<Todo>> {
        let term = validate_search(request)?;

        let session = self.store.session()?;
        let items = SqliteTodoRepository::new(session.conn()).search_todos(&term)?;
        debug!(
            "event=todo_search module=service status=ok count={}",
            items.len()
        );
        Ok(items)
    }

    /// Applies a partial update and returns the merged record.
    ///
    /// Absent fields keep their stored value; `description: null` clears it.
    pub fn update(&self, id: TodoId, request: &UpdateTodoRequest) -> ServiceResult<Todo> {
        let session = self.store.session()?;
        let repo = SqliteTodoRepository::new(session.conn());

        let existing = repo.get_todo(id)?.ok_or(TodoServiceError::NotFound(id))?;
        let patch = validate_update(request)?;

        repo.replace_todo(&patch.apply(existing))?;
        let todo = repo
            .get_todo(id)?
            .ok_or(TodoServiceError::InconsistentState(
                "updated todo not found in read-back",
            ))?;
        info!("event=todo_update module=service status=ok id={id}");

        finish_mutation(session.persist(), MutationOutcome::Updated(todo.clone()))?;
        Ok(todo)
    }

    /// Permanently removes a todo.
    pub fn delete(&self, id: TodoId) -> ServiceResult<Deleted> {
        let session = self.store.session()?;
        let repo = SqliteTodoRepository::new(session.conn());

        if repo.get_todo(id)?.is_none() {
            return Err(TodoServiceError::NotFound(id));
        }
        repo.delete_todo(id)?;
        info!("event=todo_delete module=service status=ok id={id}");

        finish_mutation(session.persist(), MutationOutcome::Deleted(id))?;
        Ok(Deleted::new(id))
    }

    /// Total number of stored todos.
    pub fn count(&self) -> ServiceResult<u64> {
        let session = self.store.session()?;
        let count = SqliteTodoRepository::new(session.conn()).count_todos()?;
        Ok(count)
    }
}

fn finish_mutation(saved: Result<(), SaveError>, outcome: MutationOutcome) -> ServiceResult<()> {
    saved.map_err(|source| {
        warn!("event=todo_mutation module=service status=not_durable error={source}");
        TodoServiceError::NotDurable { outcome, source }
    })
}
