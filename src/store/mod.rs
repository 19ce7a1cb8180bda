//! Persisted record store
//!
//! The extension keeps a handful of named records (options, history, parsing
//! status, ...) in an async key-value map. Every record has a default value
//! that is written back the first time the record is read, so callers never
//! observe a missing record.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bili2vrc::store::{FjallStore, Storage, StoreKey};
//!
//! let storage = Storage::new(Arc::new(FjallStore::open("data/store")?));
//! let history: Vec<HistoryItem> = storage.load(StoreKey::History).await?;
//! storage.save(StoreKey::History, &history).await?;
//! ```

pub mod error;
mod fjall_store;
pub mod keys;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

pub use error::{Result, StoreError};
pub use fjall_store::{FjallStore, StoreStats};
pub use keys::{StoreArea, StoreKey};
pub use memory::{MemoryStore, UnavailableStore};

/// Raw byte-level record storage supplied by the host
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, area: StoreArea, key: StoreKey) -> Result<Option<Vec<u8>>>;

    async fn put(&self, area: StoreArea, key: StoreKey, value: Vec<u8>) -> Result<()>;
}

/// Typed JSON facade over a [`KeyValueStore`]
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStore>,
}

impl Storage {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Load a record, materializing and persisting its default when absent
    pub async fn load<T: DeserializeOwned>(&self, key: StoreKey) -> Result<T> {
        let value = self.load_value(key).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Load a record as raw JSON
    pub async fn load_value(&self, key: StoreKey) -> Result<Value> {
        if let Some(bytes) = self.backend.get(key.area(), key).await? {
            let value: Value = serde_json::from_slice(&bytes)?;
            if !value.is_null() {
                return Ok(value);
            }
        }

        let default = key.default_value();
        self.write(key, &default).await?;
        info!(record = key.name(), "Created default record");
        Ok(default)
    }

    /// Replace a record
    pub async fn save<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        if value.is_null() {
            return Err(StoreError::NullValue(key.name()));
        }
        self.write(key, &value).await
    }

    async fn write(&self, key: StoreKey, value: &Value) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.backend.put(key.area(), key, bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_materializes_default() {
        let backend = Arc::new(MemoryStore::new());
        let storage = Storage::new(backend.clone());

        let timestamp: i64 = storage.load(StoreKey::LastParsingTimestamp).await.unwrap();
        assert_eq!(timestamp, 0);

        let raw = backend
            .get(StoreArea::Local, StoreKey::LastParsingTimestamp)
            .await
            .unwrap();
        assert_eq!(raw.as_deref(), Some(&b"0"[..]));
    }

    #[tokio::test]
    async fn test_options_default_lands_in_synced_area() {
        let backend = Arc::new(MemoryStore::new());
        let storage = Storage::new(backend.clone());

        storage.load_value(StoreKey::Options).await.unwrap();

        assert!(
            backend
                .get(StoreArea::Synced, StoreKey::Options)
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            backend
                .get(StoreArea::Local, StoreKey::Options)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_stored_null_is_replaced_by_default() {
        let backend = Arc::new(MemoryStore::new());
        backend
            .put(StoreArea::Local, StoreKey::History, b"null".to_vec())
            .await
            .unwrap();
        let storage = Storage::new(backend);

        let history: Vec<Value> = storage.load(StoreKey::History).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_save_rejects_null() {
        let storage = Storage::in_memory();
        let result = storage.save(StoreKey::History, &Option::<Vec<u8>>::None).await;
        assert!(matches!(result, Err(StoreError::NullValue("history"))));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let storage = Storage::in_memory();
        storage
            .save(StoreKey::FinishedTutorialIds, &vec!["basics".to_string()])
            .await
            .unwrap();

        let ids: Vec<String> = storage.load(StoreKey::FinishedTutorialIds).await.unwrap();
        assert_eq!(ids, vec!["basics".to_string()]);
    }

    #[tokio::test]
    async fn test_unavailable_store_propagates() {
        let storage = Storage::new(Arc::new(UnavailableStore::new("locked")));
        let result = storage.load_value(StoreKey::History).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
