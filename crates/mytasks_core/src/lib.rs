//! Core domain logic for the task-list application.
//! This crate is the single source of truth for task-state invariants.

pub mod config;
pub mod db;
pub mod fallback;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use config::{AppConfig, BackendKind, ConfigError};
pub use fallback::{fallback_key, FallbackError, FallbackStore, JsonFileFallback, MemoryFallback};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::todo::{
    filter_todos, normalize_text, todo_stats, Filter, NewTodo, Todo, TodoId, TodoPatch,
    TodoStats, TodoValidationError,
};
pub use model::user::{User, UserId};
pub use repo::memory::MemoryTodoRepository;
pub use repo::todo_repo::{RepoError, RepoResult, SqliteTodoRepository, TodoRepository};
pub use service::todo_store::{
    AddOutcome, DataSource, LoadOutcome, StoreError, StoreResult, TodoStore,
};
pub use session::{LocalSession, SessionProvider};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
