//! In-memory key-value store with an optional byte quota.

use super::{KeyValueStore, StoreError, StoreResult};
use std::collections::BTreeMap;

/// `BTreeMap`-backed store.
///
/// With a quota set, a write that would make the summed key and value
/// lengths exceed it fails with `StoreError::QuotaExceeded` and leaves the
/// store unchanged, the way a full browser storage area behaves.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    items: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: BTreeMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Changes or lifts the quota. Existing items are kept even if over it.
    pub fn set_quota(&mut self, quota_bytes: Option<usize>) {
        self.quota_bytes = quota_bytes;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.items
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, value)| existing.len() + value.len())
            .sum()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()> {
        if let Some(limit_bytes) = self.quota_bytes {
            let needed = self.used_bytes_without(key) + key.len() + value.len();
            if needed > limit_bytes {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    limit_bytes,
                });
            }
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StoreResult<()> {
        self.items.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.items.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKeyValueStore;
    use crate::store::{KeyValueStore, StoreError};

    #[test]
    fn set_get_remove() {
        let mut store = MemoryKeyValueStore::new();
        store.set_item("k", "v1").unwrap();
        store.set_item("k", "v2").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v2"));

        store.remove_item("k").unwrap();
        store.remove_item("k").unwrap();
        assert_eq!(store.get_item("k").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn quota_rejects_oversize_write_and_keeps_previous_value() {
        let mut store = MemoryKeyValueStore::with_quota(8);
        store.set_item("k", "1234").unwrap();

        let err = store.set_item("k", "123456789").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { limit_bytes: 8, .. }));
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("1234"));
    }

    #[test]
    fn replacing_a_value_does_not_count_the_old_one() {
        let mut store = MemoryKeyValueStore::with_quota(6);
        store.set_item("k", "12345").unwrap();
        store.set_item("k", "54321").unwrap();
        assert_eq!(store.len(), 1);
    }
}
