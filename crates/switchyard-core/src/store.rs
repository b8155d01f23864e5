//! Key-value store contract and the default in-memory implementation.
//!
//! The framework only depends on `get`/`set`: an absent key reads as the
//! empty string and setting `None` deletes. Atomicity of a read-then-write
//! sequence is whatever the backing store provides; the in-memory store makes
//! single-key operations atomic but not sequences of them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};

/// A string key-value store shared by all requests.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `""` if absent.
    async fn get(&self, key: &str) -> StoreResult<String>;

    /// Stores `value` under `key`; `None` removes the key.
    async fn set(&self, key: &str, value: Option<&str>) -> StoreResult<()>;
}

/// A shared, type-erased key-value store.
pub type BoxedStore = Arc<dyn KeyValueStore>;

/// Process-local store backed by a hash map.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> StoreResult<String> {
        Ok(self.entries.read().get(key).cloned().unwrap_or_default())
    }

    async fn set(&self, key: &str, value: Option<&str>) -> StoreResult<()> {
        if key.trim().is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let mut entries = self.entries.write();
        match value {
            Some(value) => {
                entries.insert(key.to_string(), value.to_string());
            }
            None => {
                entries.remove(key);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_absent_key_reads_empty() {
        let store = InMemoryKeyValueStore::new();
        assert_eq!(store.get("missing").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_set_then_overwrite_then_delete() {
        let store = InMemoryKeyValueStore::new();
        store.set("Counter:1", Some("3")).await.unwrap();
        store.set("Counter:1", Some("4")).await.unwrap();
        assert_eq!(store.get("Counter:1").await.unwrap(), "4");
        assert_eq!(store.len(), 1);

        store.set("Counter:1", None).await.unwrap();
        assert_eq!(store.get("Counter:1").await.unwrap(), "");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_blank_key_is_rejected() {
        let store = InMemoryKeyValueStore::new();
        let err = store.set("  ", Some("x")).await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyKey));
    }
}
