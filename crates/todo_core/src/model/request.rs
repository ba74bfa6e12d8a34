//! Unvalidated operation inputs as decoded by the routing layer.
//!
//! Fields are deliberately loose (`status` as text, numbers as `i64`) so every
//! bad value reaches validation and is reported as a field-level issue.

use super::todo::Field;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: Field<String>,
    #[serde(default)]
    pub description: Field<String>,
    #[serde(default)]
    pub status: Field<String>,
}

impl CreateTodoRequest {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Field::Value(title.into()),
            ..Self::default()
        }
    }
}

/// Partial update body; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: Field<String>,
    /// `Null` clears the stored description.
    #[serde(default)]
    pub description: Field<String>,
    #[serde(default)]
    pub status: Field<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListTodosRequest {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchTodosRequest {
    pub q: Option<String>,
}

impl SearchTodosRequest {
    pub fn new(q: impl Into<String>) -> Self {
        Self { q: Some(q.into()) }
    }
}

#[cfg(test)]
mod tests {
    use super::{CreateTodoRequest, ListTodosRequest, UpdateTodoRequest};
    use crate::model::todo::Field;

    #[test]
    fn update_request_distinguishes_missing_from_null() {
        let request: UpdateTodoRequest =
            serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(request.title, Field::Missing);
        assert_eq!(request.description, Field::Null);
        assert_eq!(request.status, Field::Missing);
    }

    #[test]
    fn create_request_decodes_unknown_status_as_text() {
        let request: CreateTodoRequest =
            serde_json::from_str(r#"{"title":"ok","status":"archived"}"#).unwrap();
        assert_eq!(request.title, Field::Value("ok".to_string()));
        assert_eq!(request.status, Field::Value("archived".to_string()));
    }

    #[test]
    fn list_request_defaults_to_none() {
        let request: ListTodosRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, ListTodosRequest::default());
    }
}
