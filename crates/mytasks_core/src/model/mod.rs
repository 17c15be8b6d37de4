//! Domain model for the task-list core.
//!
//! # Responsibility
//! - Define the canonical task record, identity types, and pure projections.
//! - Keep validation rules for stored state in one place.
//!
//! # Invariants
//! - Every task is identified by a stable `TodoId`.
//! - For any collection, `stats.active + stats.completed == stats.total`.

pub mod time;
pub mod todo;
pub mod user;
