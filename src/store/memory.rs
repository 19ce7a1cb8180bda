use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::KeyValueStore;
use super::error::{Result, StoreError};
use super::keys::{StoreArea, StoreKey};

/// In-memory record map for tests and `--ephemeral` runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<(StoreArea, StoreKey), Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, area: StoreArea, key: StoreKey) -> Result<Option<Vec<u8>>> {
        Ok(self.records.read().await.get(&(area, key)).cloned())
    }

    async fn put(&self, area: StoreArea, key: StoreKey, value: Vec<u8>) -> Result<()> {
        self.records.write().await.insert((area, key), value);
        Ok(())
    }
}

/// Store whose every access fails, for exercising error paths
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl KeyValueStore for UnavailableStore {
    async fn get(&self, _area: StoreArea, _key: StoreKey) -> Result<Option<Vec<u8>>> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }

    async fn put(&self, _area: StoreArea, _key: StoreKey, _value: Vec<u8>) -> Result<()> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }
}
