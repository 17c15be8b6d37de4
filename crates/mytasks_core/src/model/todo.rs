//! Todo domain model and pure projections.
//!
//! # Responsibility
//! - Define the canonical task record and its mutation shapes.
//! - Provide the derived statistics and filter projections used by callers.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - Stored `text` is trimmed and never empty.
//! - A task belongs to exactly one owner for its whole lifetime.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TodoId = Uuid;

/// One task record owned by a single identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Stable global ID, assigned by the backing store or synthesized on
    /// the local-fallback path.
    pub id: TodoId,
    /// Task text, trimmed and non-empty in stored state.
    pub text: String,
    /// Completion flag toggled by the user.
    pub completed: bool,
    /// Owning identity; rows never cross identities.
    pub owner: UserId,
    /// Creation time in unix epoch milliseconds.
    pub created_at: i64,
}

/// Insert shape submitted to a backing store.
///
/// The store assigns `id` and `created_at` and returns the full row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub text: String,
    pub completed: bool,
    pub owner: UserId,
}

/// Partial-update shape for a single task.
///
/// `None` fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// Patch that replaces only the task text.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            text: Some(value.into()),
            completed: None,
        }
    }

    /// Patch that replaces only the completion flag.
    pub fn completed(value: bool) -> Self {
        Self {
            text: None,
            completed: Some(value),
        }
    }

    /// Returns whether the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.completed.is_none()
    }
}

/// Validation failure for task input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    /// Task text is empty after trimming.
    EmptyText,
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text cannot be empty"),
        }
    }
}

impl Error for TodoValidationError {}

impl Todo {
    /// Applies patch fields in place, leaving `None` fields untouched.
    pub fn apply_patch(&mut self, patch: &TodoPatch) {
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }

    /// Checks stored-state invariants.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        validate_text(&self.text)?;
        Ok(())
    }
}

/// Normalizes raw task text for storage.
///
/// Returns the trimmed text, or `EmptyText` when nothing remains.
pub fn normalize_text(raw: &str) -> Result<String, TodoValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TodoValidationError::EmptyText);
    }
    Ok(trimmed.to_string())
}

fn validate_text(text: &str) -> Result<(), TodoValidationError> {
    if text.trim().is_empty() || text.trim() != text {
        return Err(TodoValidationError::EmptyText);
    }
    Ok(())
}

/// View filter over a task collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// Full collection, order unchanged.
    All,
    /// Only `completed = false` records.
    Active,
    /// Only `completed = true` records.
    Completed,
}

/// Derived counters over a task collection. Recomputed on every read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

/// Counts total/active/completed records. Pure.
pub fn todo_stats(todos: &[Todo]) -> TodoStats {
    let completed = todos.iter().filter(|todo| todo.completed).count();
    TodoStats {
        total: todos.len(),
        active: todos.len() - completed,
        completed,
    }
}

/// Projects the subsequence matching `filter`, relative order preserved. Pure.
pub fn filter_todos(todos: &[Todo], filter: Filter) -> Vec<&Todo> {
    todos
        .iter()
        .filter(|todo| match filter {
            Filter::All => true,
            Filter::Active => !todo.completed,
            Filter::Completed => todo.completed,
        })
        .collect()
}
