//! Todo domain model.
//!
//! # Responsibility
//! - Define the canonical todo record and its status lifecycle.
//! - Define the tri-state [`Field`] used by partial updates.
//!
//! # Invariants
//! - `id` is assigned by storage, never reused and never mutated.
//! - `title` holds 1..=200 chars; `description` at most 1000 chars when set.
//! - Deletion is permanent; there is no tombstone state.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};

/// Storage-assigned identifier; strictly increasing in insertion order.
pub type TodoId = i64;

/// Workflow state of a todo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl TodoStatus {
    pub const ALL: [TodoStatus; 3] = [Self::Pending, Self::InProgress, Self::Done];

    /// Wire and storage spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

impl Display for TodoStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored todo as seen by services and their callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub status: TodoStatus,
}

/// Validated input for a new todo; `id` is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub status: TodoStatus,
}

/// Validated partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub status: Option<TodoStatus>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }

    /// Merges this patch over `current`; `id` is always kept.
    pub fn apply(self, current: Todo) -> Todo {
        Todo {
            id: current.id,
            title: self.title.unwrap_or(current.title),
            description: self.description.unwrap_or(current.description),
            status: self.status.unwrap_or(current.status),
        }
    }
}

/// Request field that distinguishes "absent" from "explicitly null".
///
/// Use with `#[serde(default)]` so an absent key decodes as `Missing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Missing,
    Null,
    Value(T),
}

impl<T> Field<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Missing
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Value)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}
