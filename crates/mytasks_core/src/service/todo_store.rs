//! Session-scoped task store with reconciliation policy.
//!
//! # Responsibility
//! - Hold the in-memory ordered collection for the signed-in identity.
//! - Mediate every mutation: attempt the backing store first, then update
//!   memory only from confirmed state.
//! - Degrade `load` and `add` to local fallback storage when the backend is
//!   unreachable.
//!
//! # Invariants
//! - Memory is never mutated by a failed backend call; failures are returned
//!   to the caller instead of being swallowed.
//! - New records always enter at the head, matching the newest-first order
//!   used by `reload`.
//! - Fallback data is never pushed back to the backend.
//!
//! # Concurrency
//! - One logical control flow per session; mutations take `&mut self` and
//!   run to completion including their storage round trip. No timeouts or
//!   optimistic-concurrency tokens exist at this layer.

use crate::fallback::FallbackStore;
use crate::model::time::now_epoch_ms;
use crate::model::todo::{
    filter_todos, normalize_text, todo_stats, Filter, NewTodo, Todo, TodoId, TodoPatch,
    TodoStats, TodoValidationError,
};
use crate::model::user::{User, UserId};
use crate::repo::todo_repo::{RepoError, TodoRepository};
use log::{error, info, warn};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error returned to callers.
///
/// Every mutation reports its outcome; the in-memory collection only changes
/// on the `Ok` paths.
#[derive(Debug)]
pub enum StoreError {
    /// No identity is signed in; mutations are rejected up front.
    NotSignedIn,
    /// Input validation failed (empty text after trim).
    Validation(TodoValidationError),
    /// The id is not present in the loaded collection.
    UnknownTask(TodoId),
    /// Backing-store failure on a path with no fallback.
    Repo(RepoError),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSignedIn => write!(f, "no identity is signed in"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::UnknownTask(id) => write!(f, "task not loaded: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TodoValidationError> for StoreError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Which storage confirmed the collection or record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Primary backing store.
    Backend,
    /// Local fallback storage (degraded path).
    LocalFallback,
}

/// Result of a (re)load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
    pub source: DataSource,
    pub count: usize,
}

/// Result of an `add`, carrying the stored record and which path kept it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub todo: Todo,
    pub persisted_to: DataSource,
}

/// Session-scoped task store over one backing store and one fallback store.
pub struct TodoStore<R: TodoRepository, F: FallbackStore> {
    repo: R,
    fallback: F,
    user: Option<User>,
    todos: Vec<Todo>,
    loading: bool,
}

impl<R: TodoRepository, F: FallbackStore> TodoStore<R, F> {
    /// Creates a signed-out store with an empty collection.
    pub fn new(repo: R, fallback: F) -> Self {
        Self {
            repo,
            fallback,
            user: None,
            todos: Vec::new(),
            loading: false,
        }
    }

    /// Current identity, or `None` when signed out.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// In-memory collection, newest first.
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    /// Whether a load round trip is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Derived counters, recomputed from the current collection.
    pub fn stats(&self) -> TodoStats {
        todo_stats(&self.todos)
    }

    /// Filter projection over the current collection, order preserved.
    pub fn filtered(&self, filter: Filter) -> Vec<&Todo> {
        filter_todos(&self.todos, filter)
    }

    /// Binds an identity and loads its collection.
    pub fn sign_in(&mut self, user: User) -> StoreResult<LoadOutcome> {
        info!(
            "event=session_sign_in module=store status=ok user_id={}",
            user.id
        );
        self.user = Some(user);
        self.reload()
    }

    /// Drops the identity and clears the in-memory collection.
    pub fn sign_out(&mut self) {
        if let Some(user) = self.user.take() {
            info!(
                "event=session_sign_out module=store status=ok user_id={}",
                user.id
            );
        }
        self.todos.clear();
    }

    /// Fetches the signed-in identity's collection, newest first.
    ///
    /// On backend failure the collection is replaced from local fallback
    /// storage; a missing fallback key yields an empty collection. The
    /// loading flag is set for the duration and always cleared.
    pub fn reload(&mut self) -> StoreResult<LoadOutcome> {
        let owner = self.require_owner()?;
        self.loading = true;
        info!("event=todo_load module=store status=start user_id={owner}");

        let outcome = match self.repo.list_by_owner(&owner) {
            Ok(todos) => {
                self.todos = todos;
                info!(
                    "event=todo_load module=store status=ok user_id={owner} count={}",
                    self.todos.len()
                );
                LoadOutcome {
                    source: DataSource::Backend,
                    count: self.todos.len(),
                }
            }
            Err(err) => {
                warn!(
                    "event=todo_load module=store status=fallback user_id={owner} error={err}"
                );
                self.todos = self.read_fallback(&owner);
                LoadOutcome {
                    source: DataSource::LocalFallback,
                    count: self.todos.len(),
                }
            }
        };

        self.loading = false;
        Ok(outcome)
    }

    /// Adds one task with trimmed text at the head of the collection.
    ///
    /// The record is submitted to the backing store first; on success the
    /// store-assigned row is prepended. On backend failure a locally
    /// synthesized record (fresh id, current timestamp) is prepended and the
    /// whole collection is written to fallback storage. Fallback records are
    /// not retried against the backend later.
    pub fn add(&mut self, text: &str) -> StoreResult<AddOutcome> {
        let owner = self.require_owner()?;
        let text = normalize_text(text)?;

        let new_todo = NewTodo {
            text,
            completed: false,
            owner: owner.clone(),
        };

        match self.repo.insert(&new_todo) {
            Ok(todo) => {
                info!(
                    "event=todo_add module=store status=ok user_id={owner} id={}",
                    todo.id
                );
                self.todos.insert(0, todo.clone());
                Ok(AddOutcome {
                    todo,
                    persisted_to: DataSource::Backend,
                })
            }
            Err(err) => {
                warn!("event=todo_add module=store status=fallback user_id={owner} error={err}");
                let todo = Todo {
                    id: Uuid::new_v4(),
                    text: new_todo.text,
                    completed: false,
                    owner: owner.clone(),
                    created_at: now_epoch_ms(),
                };
                self.todos.insert(0, todo.clone());
                self.write_fallback(&owner);
                Ok(AddOutcome {
                    todo,
                    persisted_to: DataSource::LocalFallback,
                })
            }
        }
    }

    /// Applies a partial update to one task, backend first.
    ///
    /// A text patch is trimmed and rejected when empty, same rule as `add`.
    /// On backend failure memory is left unchanged and the error is
    /// returned.
    pub fn update(&mut self, id: TodoId, patch: TodoPatch) -> StoreResult<()> {
        let owner = self.require_owner()?;

        let patch = TodoPatch {
            text: match patch.text {
                Some(raw) => Some(normalize_text(&raw)?),
                None => None,
            },
            completed: patch.completed,
        };

        if let Err(err) = self.repo.update(id, &owner, &patch) {
            error!("event=todo_update module=store status=error user_id={owner} id={id} error={err}");
            return Err(err.into());
        }

        if let Some(todo) = self.todos.iter_mut().find(|todo| todo.id == id) {
            todo.apply_patch(&patch);
        }
        info!("event=todo_update module=store status=ok user_id={owner} id={id}");
        Ok(())
    }

    /// Flips the completion flag of one loaded task. Returns the new value.
    pub fn toggle(&mut self, id: TodoId) -> StoreResult<bool> {
        let completed = self
            .todos
            .iter()
            .find(|todo| todo.id == id)
            .map(|todo| todo.completed)
            .ok_or(StoreError::UnknownTask(id))?;

        let next = !completed;
        self.update(id, TodoPatch::completed(next))?;
        Ok(next)
    }

    /// Deletes one task, backend first; memory changes only on success.
    pub fn delete(&mut self, id: TodoId) -> StoreResult<()> {
        let owner = self.require_owner()?;

        if let Err(err) = self.repo.delete(id, &owner) {
            error!("event=todo_delete module=store status=error user_id={owner} id={id} error={err}");
            return Err(err.into());
        }

        self.todos.retain(|todo| todo.id != id);
        info!("event=todo_delete module=store status=ok user_id={owner} id={id}");
        Ok(())
    }

    /// Deletes every completed task for the signed-in identity.
    ///
    /// Zero completed rows is a successful no-op. Returns the count removed
    /// by the backing store.
    pub fn clear_completed(&mut self) -> StoreResult<usize> {
        let owner = self.require_owner()?;

        let removed = match self.repo.delete_completed(&owner) {
            Ok(removed) => removed,
            Err(err) => {
                error!(
                    "event=todo_clear_completed module=store status=error user_id={owner} error={err}"
                );
                return Err(err.into());
            }
        };

        self.todos.retain(|todo| !todo.completed);
        info!(
            "event=todo_clear_completed module=store status=ok user_id={owner} count={removed}"
        );
        Ok(removed)
    }

    fn require_owner(&self) -> StoreResult<UserId> {
        self.user
            .as_ref()
            .map(|user| user.id.clone())
            .ok_or(StoreError::NotSignedIn)
    }

    fn read_fallback(&self, owner: &UserId) -> Vec<Todo> {
        match self.fallback.read(owner) {
            Ok(Some(todos)) => {
                info!(
                    "event=fallback_read module=store status=ok user_id={owner} count={}",
                    todos.len()
                );
                todos
            }
            Ok(None) => {
                info!("event=fallback_read module=store status=miss user_id={owner}");
                Vec::new()
            }
            Err(err) => {
                error!("event=fallback_read module=store status=error user_id={owner} error={err}");
                Vec::new()
            }
        }
    }

    // Fallback write failures are logged, not returned: the record already
    // lives in memory and the add itself has succeeded on the degraded path.
    fn write_fallback(&mut self, owner: &UserId) {
        match self.fallback.write(owner, &self.todos) {
            Ok(()) => info!(
                "event=fallback_write module=store status=ok user_id={owner} count={}",
                self.todos.len()
            ),
            Err(err) => {
                error!("event=fallback_write module=store status=error user_id={owner} error={err}");
            }
        }
    }
}
