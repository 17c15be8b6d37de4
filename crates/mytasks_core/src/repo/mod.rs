//! Backing-store abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract the task store reconciles against.
//! - Isolate SQLite query details from store orchestration.
//!
//! # Invariants
//! - Write paths enforce text validation before persistence.
//! - Every row-level operation is filtered by owner as well as id, so one
//!   identity can never read or mutate another identity's rows.

pub mod memory;
pub mod todo_repo;
