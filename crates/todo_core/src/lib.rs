//! Persistence and query core for the todo service.
//! This crate is the single source of truth for todo invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{SnapshotLocation, StoreConfig, EPHEMERAL_MARKER_PREFIX};
pub use db::{InitError, SaveError, StorageHandle};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::request::{
    CreateTodoRequest, ListTodosRequest, SearchTodosRequest, UpdateTodoRequest,
};
pub use model::todo::{Field, Todo, TodoId, TodoStatus};
pub use model::validation::{ValidationError, ValidationIssue};
pub use repo::todo_repo::{RepoError, RepoResult, SqliteTodoRepository, TodoRepository};
pub use service::todo_service::{
    Deleted, MutationOutcome, ServiceResult, TodoService, TodoServiceError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
