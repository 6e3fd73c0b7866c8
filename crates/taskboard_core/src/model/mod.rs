//! Board domain model.
//!
//! # Responsibility
//! - Define the persisted `Task` record and the fixed list configuration.
//! - Define the derived per-list view handed to presentation code.
//!
//! # Invariants
//! - The flat task collection is the only owned task state.
//! - Lists are constant configuration; their task views are derived.

pub mod list;
pub mod task;
