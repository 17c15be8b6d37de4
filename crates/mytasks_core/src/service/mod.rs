//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate backing-store and fallback calls into the session-scoped
//!   task store.
//! - Keep callers decoupled from storage details.

pub mod todo_store;
