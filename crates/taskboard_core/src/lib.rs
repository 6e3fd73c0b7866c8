//! Core state management for the task board.
//! The flat task collection held here is the single source of truth.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::list::{BoardSnapshot, List, ListSpec, DEFAULT_LISTS};
pub use model::task::{ListId, Task, TaskId, TaskIdAllocator};
pub use repo::persistent_store::{PersistError, PersistResult, PersistentStore};
pub use service::board_state::{BoardState, TASKS_STORAGE_KEY};
pub use service::input::normalize_task_name;
pub use store::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StoreError, StoreResult,
};

/// Minimal health-check API for front-end wiring.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
