//! Key-value backends with local-storage semantics.
//!
//! # Responsibility
//! - Define the string-keyed, string-valued store contract the board
//!   persists through.
//! - Provide in-memory and SQLite implementations.
//!
//! # Invariants
//! - `set_item` replaces any previous value for the key.
//! - A failed `set_item` leaves the previous value readable.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend failure while reading or writing one item.
#[derive(Debug)]
pub enum StoreError {
    /// The write would push the store past its byte quota.
    QuotaExceeded { key: String, limit_bytes: usize },
    Db(DbError),
    /// Connection schema is older than the backend requires.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded { key, limit_bytes } => write!(
                f,
                "writing `{key}` exceeds the store quota of {limit_bytes} bytes"
            ),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is older than required {expected_version}; open it with open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String key-value store shaped like browser local storage.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()>;
    fn remove_item(&mut self, key: &str) -> StoreResult<()>;
    fn clear(&mut self) -> StoreResult<()>;
}
