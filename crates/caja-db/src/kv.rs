//! # Key-Value Store
//!
//! The persistence seam used by the cash box: JSON documents addressed by
//! string keys.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │   trait KeyValueStore        │
//! │   get / set / set_many       │
//! └──────────────┬───────────────┘
//!        ┌───────┴────────┐
//!        ▼                ▼
//!  SqliteKvStore      MemoryKv
//!  (kv_store table)   (HashMap, tests)
//! ```
//!
//! Storing `null` is the same as removing the key: `get` returns `None`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::DbResult;

/// Async key-value store holding JSON values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value for `key`, or `None` if absent or `null`.
    async fn get(&self, key: &str) -> DbResult<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &Value) -> DbResult<()>;

    /// Stores several entries. Implementations backed by a database write
    /// them in one transaction.
    async fn set_many(&self, entries: &[(&str, Value)]) -> DbResult<()> {
        for (key, value) in entries {
            self.set(key, value).await?;
        }
        Ok(())
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Process-local store for tests and for running without a database file.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        MemoryKv::default()
    }

    /// Number of non-null entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> DbResult<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &Value) -> DbResult<()> {
        let mut entries = self.entries.write().await;
        if value.is_null() {
            entries.remove(key);
        } else {
            entries.insert(key.to_string(), value.clone());
        }
        Ok(())
    }

    async fn set_many(&self, batch: &[(&str, Value)]) -> DbResult<()> {
        let mut entries = self.entries.write().await;
        for (key, value) in batch {
            if value.is_null() {
                entries.remove(*key);
            } else {
                entries.insert(key.to_string(), value.clone());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_roundtrip_and_null_removes() {
        let kv = MemoryKv::new();
        assert_eq!(kv.get("a").await.unwrap(), None);

        kv.set("a", &json!({"x": 1})).await.unwrap();
        assert_eq!(kv.get("a").await.unwrap(), Some(json!({"x": 1})));

        kv.set("a", &Value::Null).await.unwrap();
        assert_eq!(kv.get("a").await.unwrap(), None);
        assert!(kv.is_empty().await);
    }

    #[tokio::test]
    async fn test_memory_set_many() {
        let kv = MemoryKv::new();
        kv.set("gone", &json!(true)).await.unwrap();

        kv.set_many(&[("a", json!(1)), ("b", json!([1, 2])), ("gone", Value::Null)])
            .await
            .unwrap();

        assert_eq!(kv.len().await, 2);
        assert_eq!(kv.get("b").await.unwrap(), Some(json!([1, 2])));
        assert_eq!(kv.get("gone").await.unwrap(), None);
    }
}
