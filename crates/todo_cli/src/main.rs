//! Command-line entry point for the todo store.
//!
//! # Responsibility
//! - Build the single `StorageHandle` for this process from flags/env.
//! - Map each subcommand onto one `TodoService` operation and print JSON.
//!
//! Exit codes: 0 success, 1 storage or output failure, 2 validation failure,
//! 3 not found, 4 applied but not saved.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::process::ExitCode;
use todo_core::{
    init_logging, CreateTodoRequest, Field, ListTodosRequest, SearchTodosRequest, StorageHandle,
    StoreConfig, TodoId, TodoService, TodoServiceError, UpdateTodoRequest,
};

#[derive(Debug, Parser)]
#[command(name = "todo", version = todo_core::core_version(), about = "Manage todos in a snapshot-backed store")]
struct Cli {
    /// Snapshot file; values starting with `:` keep the store in memory.
    #[arg(long, global = true)]
    db_path: Option<String>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute directory for rotating log files (default: stderr).
    #[arg(long, global = true)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a todo.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// pending | in-progress | done
        #[arg(long)]
        status: Option<String>,
    },
    /// Show one todo.
    Get { id: TodoId },
    /// List todos in insertion order.
    List {
        #[arg(long, allow_negative_numbers = true)]
        skip: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
    /// Find todos whose title contains the text, ignoring case.
    Search { q: String },
    /// Change only the given fields of a todo.
    Update {
        id: TodoId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(long)]
        status: Option<String>,
    },
    /// Permanently remove a todo.
    Delete { id: TodoId },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let env_config = StoreConfig::from_env();
    let config = StoreConfig {
        snapshot: cli
            .db_path
            .as_deref()
            .map(todo_core::SnapshotLocation::parse)
            .unwrap_or(env_config.snapshot),
        log_level: cli.log_level.unwrap_or(env_config.log_level),
        log_dir: cli.log_dir.or(env_config.log_dir),
    };

    if let Err(err) = init_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    let store = StorageHandle::from_config(&config);
    let service = TodoService::new(&store);

    let outcome = match cli.command {
        Command::Create {
            title,
            description,
            status,
        } => {
            let request = CreateTodoRequest {
                title: Field::Value(title),
                description: description.map_or(Field::Missing, Field::Value),
                status: status.map_or(Field::Missing, Field::Value),
            };
            service.create(&request).map(|value| render(&value))
        }
        Command::Get { id } => service.get(id).map(|value| render(&value)),
        Command::List { skip, limit } => service
            .list(&ListTodosRequest { skip, limit })
            .map(|value| render(&value)),
        Command::Search { q } => service
            .search(&SearchTodosRequest::new(q))
            .map(|value| render(&value)),
        Command::Update {
            id,
            title,
            description,
            clear_description,
            status,
        } => {
            let description = match (description, clear_description) {
                (_, true) => Field::Null,
                (Some(value), false) => Field::Value(value),
                (None, false) => Field::Missing,
            };
            let request = UpdateTodoRequest {
                title: title.map_or(Field::Missing, Field::Value),
                description,
                status: status.map_or(Field::Missing, Field::Value),
            };
            service.update(id, &request).map(|value| render(&value))
        }
        Command::Delete { id } => service.delete(id).map(|value| render(&value)),
    };

    match outcome {
        Ok(Ok(json)) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Ok(Err(err)) => {
            log::error!("event=cli_output module=cli status=error error={err}");
            eprintln!(
                "{}",
                serde_json::json!({ "detail": format!("failed to render output: {err}") })
            );
            ExitCode::FAILURE
        }
        Err(err) => report(&err),
    }
}

fn render<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

fn report(err: &TodoServiceError) -> ExitCode {
    let (detail, code) = match err {
        TodoServiceError::Validation(validation) => (serde_json::json!(validation), 2),
        TodoServiceError::NotFound(_) => (serde_json::json!("Todo not found"), 3),
        TodoServiceError::NotDurable { outcome, source } => {
            // The change is live in memory; show it so the caller knows what
            // to re-save.
            if let Ok(applied) = serde_json::to_string_pretty(outcome) {
                println!("{applied}");
            }
            (serde_json::json!(source.to_string()), 4)
        }
        other => (serde_json::json!(other.to_string()), 1),
    };

    eprintln!("{}", serde_json::json!({ "detail": detail }));
    ExitCode::from(code)
}

#[cfg(test)]
mod tests {
    use super::render;
    use std::collections::BTreeMap;
    use todo_core::{Todo, TodoStatus};

    #[test]
    fn render_prints_todo_as_pretty_json() {
        let todo = Todo {
            id: 3,
            title: "Water plants".to_string(),
            description: None,
            status: TodoStatus::Done,
        };
        let json = render(&todo).unwrap();
        assert!(json.contains("\"title\": \"Water plants\""));
        assert!(json.contains("\"status\": \"done\""));
    }

    #[test]
    fn render_reports_unserializable_output() {
        let mut keyed_by_pair = BTreeMap::new();
        keyed_by_pair.insert((1, 2), "x");
        assert!(render(&keyed_by_pair).is_err());
    }
}
