//! Durable slot store abstraction and the in-memory implementation.

use campusdb_core::{Error, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// A durable string-slot store, the only persistence mechanism the database
/// uses. Values are whole slots: a `set` replaces the previous value.
pub trait KvStore: Send + Sync {
    /// Reads a slot. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a slot, overwriting any prior value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a slot, returning whether it existed.
    fn remove(&self, key: &str) -> Result<bool>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> Result<Vec<String>>;
}

#[derive(Default)]
struct MemoryInner {
    slots: HashMap<String, String>,
    used: usize,
}

/// In-memory slot store with an optional byte quota.
///
/// The quota counts key and value lengths, the way a browser's local store
/// does. A write that would exceed it fails with [`Error::Storage`] and
/// leaves the previous value in place.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Creates an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that holds at most `bytes` of keys and values.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            inner: RwLock::new(MemoryInner::default()),
            quota: Some(bytes),
        }
    }

    /// Bytes currently used by keys and values.
    pub fn used_bytes(&self) -> Result<usize> {
        let inner = self.inner.read().map_err(|_| Error::LockPoisoned)?;
        Ok(inner.used)
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let inner = self.inner.read().map_err(|_| Error::LockPoisoned)?;
        Ok(inner.slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| Error::LockPoisoned)?;

        let old = inner.slots.get(key).map_or(0, |v| key.len() + v.len());
        let used = inner.used - old + key.len() + value.len();
        if let Some(quota) = self.quota {
            if used > quota {
                return Err(Error::Storage(format!(
                    "Setting '{}' would use {} bytes, exceeding the quota of {}",
                    key, used, quota
                )));
            }
        }

        inner.slots.insert(key.to_string(), value.to_string());
        inner.used = used;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut inner = self.inner.write().map_err(|_| Error::LockPoisoned)?;
        match inner.slots.remove(key) {
            Some(value) => {
                inner.used -= key.len() + value.len();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let inner = self.inner.read().map_err(|_| Error::LockPoisoned)?;
        let mut keys: Vec<String> = inner.slots.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v2".to_string()));
        assert_eq!(store.used_bytes().unwrap(), 3);

        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
        assert_eq!(store.used_bytes().unwrap(), 0);
    }

    #[test]
    fn test_keys_sorted() {
        let store = MemoryStore::new();
        store.set("b", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_quota_rejects_and_keeps_old_value() {
        let store = MemoryStore::with_quota(10);
        store.set("key", "1234").unwrap();

        let err = store.set("key", "12345678").unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(store.get("key").unwrap(), Some("1234".to_string()));

        // Replacing a slot only counts the difference.
        store.set("key", "1234567").unwrap();
    }
}
