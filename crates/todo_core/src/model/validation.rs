//! Field-level validation of operation inputs.
//!
//! # Responsibility
//! - Turn loose requests into validated inputs (`NewTodo`, `TodoPatch`,
//!   `Page`, `SearchTerm`).
//! - Report every violated constraint at once, addressed by field path.
//!
//! # Invariants
//! - Validation is pure; it never touches storage.
//! - Lengths are counted in Unicode scalar values.

use super::request::{CreateTodoRequest, ListTodosRequest, SearchTodosRequest, UpdateTodoRequest};
use super::todo::{Field, NewTodo, TodoPatch, TodoStatus};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const QUERY_MAX_CHARS: usize = 200;
pub const DEFAULT_SKIP: u64 = 0;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// One violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: Vec<String>,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            path: vec![field.to_string()],
            message: message.into(),
        }
    }

    /// Top-level field name, or `""` for issues without a path.
    pub fn field(&self) -> &str {
        self.path.first().map_or("", String::as_str)
    }
}

/// Non-empty list of issues for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationError {
    issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field() == field)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid input:")?;
        for issue in &self.issues {
            write!(f, " {}: {};", issue.path.join("."), issue.message)?;
        }
        Ok(())
    }
}

impl Error for ValidationError {}

/// Validated pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: DEFAULT_SKIP,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Validated, non-empty search text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Default)]
struct Issues(Vec<ValidationIssue>);

impl Issues {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(ValidationIssue::new(field, message));
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError { issues: self.0 })
        }
    }
}

pub fn validate_create(request: &CreateTodoRequest) -> Result<NewTodo, ValidationError> {
    let mut issues = Issues::default();

    let title = match &request.title {
        Field::Value(title) if title.is_empty() => {
            issues.push("title", "title is required");
            None
        }
        Field::Value(title) => check_title(title, &mut issues),
        Field::Missing => {
            issues.push("title", "title is required");
            None
        }
        Field::Null => {
            issues.push("title", "title cannot be null");
            None
        }
    };

    let description = match &request.description {
        Field::Value(description) => check_description(description, &mut issues),
        Field::Missing | Field::Null => None,
    };

    let status = match &request.status {
        Field::Value(raw) => check_status(raw, &mut issues),
        Field::Missing => Some(TodoStatus::default()),
        Field::Null => {
            issues.push("status", "status cannot be null");
            None
        }
    };

    match (title, status) {
        (Some(title), Some(status)) => issues.finish(NewTodo {
            title,
            description,
            status,
        }),
        _ => Err(ValidationError { issues: issues.0 }),
    }
}

pub fn validate_update(request: &UpdateTodoRequest) -> Result<TodoPatch, ValidationError> {
    let mut issues = Issues::default();
    let mut patch = TodoPatch::default();

    match &request.title {
        Field::Value(title) => patch.title = check_title(title, &mut issues),
        Field::Null => issues.push("title", "title cannot be null"),
        Field::Missing => {}
    }

    match &request.description {
        Field::Value(description) => {
            patch.description = check_description(description, &mut issues).map(Some);
        }
        Field::Null => patch.description = Some(None),
        Field::Missing => {}
    }

    match &request.status {
        Field::Value(raw) => patch.status = check_status(raw, &mut issues),
        Field::Null => issues.push("status", "status cannot be null"),
        Field::Missing => {}
    }

    issues.finish(patch)
}

pub fn validate_page(request: &ListTodosRequest) -> Result<Page, ValidationError> {
    let mut issues = Issues::default();

    let skip = match request.skip {
        None => DEFAULT_SKIP,
        Some(value) => u64::try_from(value).unwrap_or_else(|_| {
            issues.push("skip", "skip must be an integer greater than or equal to 0");
            DEFAULT_SKIP
        }),
    };

    let limit = match request.limit {
        None => DEFAULT_LIMIT,
        Some(value) if (1..=i64::from(MAX_LIMIT)).contains(&value) => value as u32,
        Some(_) => {
            issues.push(
                "limit",
                format!("limit must be an integer between 1 and {MAX_LIMIT}"),
            );
            DEFAULT_LIMIT
        }
    };

    issues.finish(Page { skip, limit })
}

pub fn validate_search(request: &SearchTodosRequest) -> Result<SearchTerm, ValidationError> {
    let mut issues = Issues::default();

    match request.q.as_deref() {
        None => issues.push("q", "q is required"),
        Some("") => issues.push("q", "q must contain at least 1 character"),
        Some(q) if q.chars().count() > QUERY_MAX_CHARS => issues.push(
            "q",
            format!("q must contain at most {QUERY_MAX_CHARS} characters"),
        ),
        Some(q) => return Ok(SearchTerm(q.to_string())),
    }

    Err(ValidationError { issues: issues.0 })
}

/// Re-checks field constraints on an already built record.
pub(crate) fn check_record_fields(title: &str, description: Option<&str>) -> Vec<ValidationIssue> {
    let mut issues = Issues::default();
    check_title(title, &mut issues);
    if let Some(description) = description {
        check_description(description, &mut issues);
    }
    issues.0
}

fn check_title(title: &str, issues: &mut Issues) -> Option<String> {
    match title.chars().count() {
        0 => {
            issues.push("title", "title must contain at least 1 character");
            None
        }
        count if count > TITLE_MAX_CHARS => {
            issues.push(
                "title",
                format!("title must contain at most {TITLE_MAX_CHARS} characters"),
            );
            None
        }
        _ => Some(title.to_string()),
    }
}

fn check_description(description: &str, issues: &mut Issues) -> Option<String> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        issues.push(
            "description",
            format!("description must contain at most {DESCRIPTION_MAX_CHARS} characters"),
        );
        return None;
    }
    Some(description.to_string())
}

fn check_status(raw: &str, issues: &mut Issues) -> Option<TodoStatus> {
    let status = TodoStatus::parse(raw);
    if status.is_none() {
        issues.push(
            "status",
            "status must be one of 'pending', 'in-progress', 'done'",
        );
    }
    status
}
