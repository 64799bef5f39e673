//! # Key-Value Store
//!
//! The storage contract the mobile client persists against: string blobs
//! under fixed string keys.
//!
//! ## Implementations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   KeyValueStore (trait)                                 │
//! │                   get_item / set_item / remove_item                     │
//! │                          │                                              │
//! │          ┌───────────────┴───────────────┐                              │
//! │          ▼                               ▼                              │
//! │  KeyValueRepository              MemoryKeyValueStore                    │
//! │  (SQLite, survives restarts)     (HashMap, tests / ephemeral)           │
//! │                                                                         │
//! │  Typed helpers (any implementation):                                    │
//! │    load_json::<T>(store, key)   → Option<T>                             │
//! │    save_json(store, key, &T)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Trait
// =============================================================================

/// A persistent key-value store of string blobs.
///
/// Implementations must be shareable across tasks: the cart ledger reads
/// from one background task and writes from another.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value under `key`; `None` if absent.
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Deletes `key`. Deleting an absent key is not an error.
    async fn remove_item(&self, key: &str) -> StoreResult<()>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> StoreResult<()> {
        (**self).remove_item(key).await
    }
}

// =============================================================================
// JSON Helpers
// =============================================================================

/// Reads and deserializes the JSON blob under `key`.
pub async fn load_json<T, S>(store: &S, key: &str) -> StoreResult<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get_item(key).await? {
        Some(raw) => {
            let value =
                serde_json::from_str(&raw).map_err(|e| StoreError::serialization(key, e))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Serializes `value` as JSON and writes it under `key`.
pub async fn save_json<T, S>(store: &S, key: &str, value: &T) -> StoreResult<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|e| StoreError::serialization(key, e))?;
    store.set_item(key, &raw).await
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Store kept in process memory.
///
/// Nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one entry.
    pub fn with_item(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut items = HashMap::new();
        items.insert(key.into(), value.into());
        MemoryKeyValueStore {
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Whether `key` is currently present.
    pub async fn contains(&self, key: &str) -> bool {
        self.items.read().await.contains_key(key)
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        debug!(key, bytes = value.len(), "memory store set");
        self.items
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StoreResult<()> {
        debug!(key, "memory store remove");
        self.items.write().await.remove(key);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
