//! Configuration store seam
//!
//! The engine never talks to persistence directly; everything goes through
//! [`ConfigStore`]. Timeouts and retries are the store client's concern.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value as JsonValue;

/// Store errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Store backend unreachable
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// Write rejected by the backend
    #[error("write failed for key {key}: {reason}")]
    WriteFailed {
        /// Store key
        key: String,
        /// Backend-reported reason
        reason: String,
    },
}

/// Key-value configuration store with get/set/delete semantics
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read a value; `None` when the key has never been written
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError>;

    /// Write a value
    async fn set(&self, key: &str, value: JsonValue) -> Result<(), StoreError>;

    /// Delete a key; no-op when absent
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory configuration store
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    entries: DashMap<String, JsonValue>,
}

impl InMemoryConfigStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        Ok(self.entries.get(key).map(|v| v.clone()))
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn store_set_get_delete() {
        let store = InMemoryConfigStore::new();

        assert_eq!(store.get("config:storage").await.unwrap(), None);

        store.set("config:storage", json!({"primaryBackend": "local"})).await.unwrap();
        assert_eq!(
            store.get("config:storage").await.unwrap(),
            Some(json!({"primaryBackend": "local"}))
        );

        store.delete("config:storage").await.unwrap();
        assert_eq!(store.get("config:storage").await.unwrap(), None);
    }

    #[tokio::test]
    async fn store_delete_missing_is_noop() {
        let store = InMemoryConfigStore::new();
        store.delete("config:absent").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn store_overwrite_replaces() {
        let store = InMemoryConfigStore::new();
        store.set("k", json!(1)).await.unwrap();
        store.set("k", json!(2)).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(json!(2)));
        assert_eq!(store.len(), 1);
    }
}
