use std::path::Path;

use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use tracing::{debug, info};

use super::KeyValueStore;
use super::error::Result;
use super::keys::{StoreArea, StoreKey, decode_record_key, encode_record_key};

/// Fjall-backed persistent storage for the extension records
#[derive(Clone)]
pub struct FjallStore {
    keyspace: Keyspace,
    local: PartitionHandle,
    synced: PartitionHandle,
}

impl FjallStore {
    /// Open or create a Fjall store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening Fjall store at: {}", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let keyspace = Config::new(path).open()?;

        let local = keyspace.open_partition(
            StoreArea::Local.partition_name(),
            PartitionCreateOptions::default(),
        )?;
        let synced = keyspace.open_partition(
            StoreArea::Synced.partition_name(),
            PartitionCreateOptions::default(),
        )?;

        info!("Fjall store opened successfully");
        Ok(Self {
            keyspace,
            local,
            synced,
        })
    }

    fn partition(&self, area: StoreArea) -> &PartitionHandle {
        match area {
            StoreArea::Local => &self.local,
            StoreArea::Synced => &self.synced,
        }
    }

    /// Persist all pending writes to disk
    pub fn persist(&self) -> Result<()> {
        self.keyspace.persist(fjall::PersistMode::SyncAll)?;
        Ok(())
    }

    /// Records currently present in each area
    pub fn stats(&self) -> Result<StoreStats> {
        let mut stats = StoreStats::default();

        for item in self.local.iter() {
            let (key, _) = item?;
            if let Some(record) = decode_record_key(&key) {
                stats.local.push(record);
            }
        }

        for item in self.synced.iter() {
            let (key, _) = item?;
            if let Some(record) = decode_record_key(&key) {
                stats.synced.push(record);
            }
        }

        Ok(stats)
    }
}

#[async_trait]
impl KeyValueStore for FjallStore {
    async fn get(&self, area: StoreArea, key: StoreKey) -> Result<Option<Vec<u8>>> {
        let value = self.partition(area).get(encode_record_key(key))?;
        Ok(value.map(|bytes| bytes.to_vec()))
    }

    async fn put(&self, area: StoreArea, key: StoreKey, value: Vec<u8>) -> Result<()> {
        let size = value.len();
        self.partition(area).insert(encode_record_key(key), value)?;
        self.persist()?;
        debug!(record = key.name(), size, "Saved record");
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub local: Vec<StoreKey>,
    pub synced: Vec<StoreKey>,
}
