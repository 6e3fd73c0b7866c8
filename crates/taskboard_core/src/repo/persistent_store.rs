//! JSON write-through mirror over a `KeyValueStore`.
//!
//! # Responsibility
//! - `load`: read and decode one key, falling back to a default.
//! - `save`: encode and write one key, logging and returning failures.
//!
//! # Invariants
//! - `load` never returns an error; absence, backend read failure and
//!   decode failure all yield the caller's default.
//! - A failed `save` leaves the previously stored value in place.

use crate::logging::single_line;
use crate::store::{KeyValueStore, StoreError};
use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const MAX_LOGGED_ERROR_CHARS: usize = 200;

pub type PersistResult<T> = Result<T, PersistError>;

/// Failure to mirror a value into the backend.
#[derive(Debug)]
pub enum PersistError {
    Serialize(serde_json::Error),
    Store(StoreError),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "failed to serialize value: {err}"),
            Self::Store(err) => write!(f, "failed to write value: {err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

impl From<StoreError> for PersistError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Typed JSON access to one backend.
pub struct PersistentStore<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> PersistentStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Decodes the value at `key`, or returns `default`.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.backend.get_item(key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => {
                debug!("event=store_load module=repo status=miss key={key}");
                return default;
            }
            Err(err) => {
                warn!(
                    "event=store_load module=repo status=fallback key={key} reason=read_failed error={}",
                    single_line(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
                );
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(
                    "event=store_load module=repo status=ok key={key} bytes={}",
                    raw.len()
                );
                value
            }
            Err(err) => {
                warn!(
                    "event=store_load module=repo status=fallback key={key} reason=decode_failed bytes={} error={}",
                    raw.len(),
                    single_line(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
                );
                default
            }
        }
    }

    /// Encodes `value` and writes it under `key`.
    ///
    /// # Errors
    /// Returns the serialization or backend failure after logging it.
    pub fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> PersistResult<()> {
        let result = serde_json::to_string(value)
            .map_err(PersistError::from)
            .and_then(|raw| {
                self.backend.set_item(key, &raw)?;
                Ok(raw.len())
            });

        match result {
            Ok(bytes) => {
                debug!("event=store_save module=repo status=ok key={key} bytes={bytes}");
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_save module=repo status=error key={key} error={}",
                    single_line(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PersistError, PersistentStore};
    use crate::store::{KeyValueStore, MemoryKeyValueStore, StoreError};

    #[test]
    fn load_returns_default_for_missing_and_empty_values() {
        let mut store = PersistentStore::new(MemoryKeyValueStore::new());
        assert_eq!(store.load("n", 7_i64), 7);

        store.backend_mut().set_item("n", "").unwrap();
        assert_eq!(store.load("n", 7_i64), 7);
    }

    #[test]
    fn load_returns_default_for_wrong_shape() {
        let mut store = PersistentStore::new(MemoryKeyValueStore::new());
        store.backend_mut().set_item("v", r#"{"a":1}"#).unwrap();
        let loaded: Vec<i64> = store.load("v", vec![42]);
        assert_eq!(loaded, vec![42]);
    }

    #[test]
    fn save_failure_is_reported_and_old_value_survives() {
        let mut store = PersistentStore::new(MemoryKeyValueStore::with_quota(16));
        store.save("v", &vec![1, 2]).unwrap();

        let err = store.save("v", &vec![1_000_000, 2_000_000, 3_000_000]).unwrap_err();
        assert!(matches!(
            err,
            PersistError::Store(StoreError::QuotaExceeded { .. })
        ));
        assert_eq!(store.load("v", Vec::<i64>::new()), vec![1, 2]);
    }
}
