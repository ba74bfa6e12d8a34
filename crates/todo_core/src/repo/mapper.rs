//! Tabular result to `Todo` mapping.
//!
//! # Responsibility
//! - Key each row's values by column name, positionally.
//! - Convert keyed rows into typed `Todo` records.
//!
//! # Invariants
//! - Zero rows is `None` for single-record reads and `[]` for list reads;
//!   neither is an error.
//! - Malformed results (width mismatch, missing column, wrong type, invalid
//!   stored value) are `RepoError::InvalidData`, never silently masked.

use super::todo_repo::{RepoError, RepoResult};
use crate::db::QueryResult;
use crate::model::todo::{Todo, TodoStatus};
use crate::model::validation::check_record_fields;
use rusqlite::types::Value;
use std::collections::HashMap;

/// One row keyed by column name.
type Record<'a> = HashMap<&'a str, &'a Value>;

/// Maps the first row, or returns `None` when the result has no rows.
pub fn map_one(result: &QueryResult) -> RepoResult<Option<Todo>> {
    match result.rows.first() {
        Some(values) => keyed(&result.columns, values)
            .and_then(|record| to_todo(&record))
            .map(Some),
        None => Ok(None),
    }
}

/// Maps every row in order.
pub fn map_all(result: &QueryResult) -> RepoResult<Vec<Todo>> {
    result
        .rows
        .iter()
        .map(|values| keyed(&result.columns, values).and_then(|record| to_todo(&record)))
        .collect()
}

fn keyed<'a>(columns: &'a [String], values: &'a [Value]) -> RepoResult<Record<'a>> {
    if columns.len() != values.len() {
        return Err(RepoError::InvalidData(format!(
            "row has {} values for {} columns",
            values.len(),
            columns.len()
        )));
    }
    Ok(columns
        .iter()
        .map(String::as_str)
        .zip(values.iter())
        .collect())
}

fn to_todo(record: &Record<'_>) -> RepoResult<Todo> {
    let id = match column(record, "id")? {
        Value::Integer(id) => *id,
        other => return Err(type_mismatch("id", "integer", other)),
    };

    let title = match column(record, "title")? {
        Value::Text(title) => title.clone(),
        other => return Err(type_mismatch("title", "text", other)),
    };

    let description = match column(record, "description")? {
        Value::Null => None,
        Value::Text(description) => Some(description.clone()),
        other => return Err(type_mismatch("description", "text or null", other)),
    };

    let status = match column(record, "status")? {
        // Rows inserted without a status take the column default.
        Value::Null => TodoStatus::default(),
        Value::Text(raw) => TodoStatus::parse(raw).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid status `{raw}` in todos.status"))
        })?,
        other => return Err(type_mismatch("status", "text", other)),
    };

    if let Some(issue) = check_record_fields(&title, description.as_deref()).first() {
        return Err(RepoError::InvalidData(format!(
            "todo {id} violates `{}` constraint: {}",
            issue.field(),
            issue.message
        )));
    }

    Ok(Todo {
        id,
        title,
        description,
        status,
    })
}

fn column<'r>(record: &'r Record<'_>, name: &str) -> RepoResult<&'r Value> {
    record
        .get(name)
        .copied()
        .ok_or_else(|| RepoError::InvalidData(format!("missing column `{name}` in todos result")))
}

fn type_mismatch(name: &str, expected: &str, actual: &Value) -> RepoError {
    RepoError::InvalidData(format!(
        "expected {expected} in todos.{name}, found {:?}",
        actual.data_type()
    ))
}

#[cfg(test)]
mod tests {
    use super::{map_all, map_one};
    use crate::db::QueryResult;
    use crate::model::todo::TodoStatus;
    use crate::repo::todo_repo::RepoError;
    use rusqlite::types::Value;

    fn columns() -> Vec<String> {
        ["id", "title", "description", "status"]
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn row(id: i64, title: &str, status: &str) -> Vec<Value> {
        vec![
            Value::Integer(id),
            Value::Text(title.to_string()),
            Value::Null,
            Value::Text(status.to_string()),
        ]
    }

    #[test]
    fn empty_result_maps_to_none_and_empty_list() {
        let result = QueryResult {
            columns: columns(),
            rows: Vec::new(),
        };
        assert_eq!(map_one(&result).unwrap(), None);
        assert!(map_all(&result).unwrap().is_empty());
    }

    #[test]
    fn single_read_takes_first_row() {
        let result = QueryResult {
            columns: columns(),
            rows: vec![row(1, "first", "done"), row(2, "second", "pending")],
        };
        let todo = map_one(&result).unwrap().unwrap();
        assert_eq!(todo.id, 1);
        assert_eq!(todo.status, TodoStatus::Done);
        assert_eq!(todo.description, None);

        let all = map_all(&result).unwrap();
        assert_eq!(all.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn mapping_is_by_column_name_not_fixed_position() {
        let result = QueryResult {
            columns: ["status", "title", "id", "description"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            rows: vec![vec![
                Value::Text("in-progress".to_string()),
                Value::Text("reordered".to_string()),
                Value::Integer(9),
                Value::Text("notes".to_string()),
            ]],
        };
        let todo = map_one(&result).unwrap().unwrap();
        assert_eq!(todo.id, 9);
        assert_eq!(todo.title, "reordered");
        assert_eq!(todo.description.as_deref(), Some("notes"));
        assert_eq!(todo.status, TodoStatus::InProgress);
    }

    #[test]
    fn malformed_results_are_invalid_data() {
        let short_row = QueryResult {
            columns: columns(),
            rows: vec![vec![Value::Integer(1)]],
        };
        assert!(matches!(map_one(&short_row), Err(RepoError::InvalidData(_))));

        let bad_status = QueryResult {
            columns: columns(),
            rows: vec![row(1, "title", "archived")],
        };
        assert!(matches!(map_all(&bad_status), Err(RepoError::InvalidData(_))));

        let empty_title = QueryResult {
            columns: columns(),
            rows: vec![row(1, "", "pending")],
        };
        assert!(matches!(map_one(&empty_title), Err(RepoError::InvalidData(_))));

        let missing_column = QueryResult {
            columns: vec!["id".to_string()],
            rows: vec![vec![Value::Integer(1)]],
        };
        assert!(matches!(map_one(&missing_column), Err(RepoError::InvalidData(_))));
    }
}
