//! Typed persistence over key-value backends.
//!
//! # Responsibility
//! - Serialize values to JSON text under fixed keys.
//! - Recover from unreadable stored data with caller defaults.
//!
//! # Invariants
//! - Loads never fail; saves report failure without touching caller state.

pub mod persistent_store;
