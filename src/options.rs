//! User options record

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::ledger::DEFAULT_RETENTION_HOURS;
use crate::store::{Result, Storage, StoreKey};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    pub language: String,
    /// Zero or less disables history. May be fractional.
    pub history_retention_period_hours: f64,
    pub insert_button_into_video_page: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            language: "default".to_string(),
            history_retention_period_hours: DEFAULT_RETENTION_HOURS,
            insert_button_into_video_page: true,
        }
    }
}

impl Options {
    pub fn history_enabled(&self) -> bool {
        self.history_retention_period_hours > 0.0
    }
}

/// Fill keys missing from `stored` with their default values. Returns true
/// when anything was added.
fn backfill(stored: &mut Value, defaults: &Value) -> bool {
    let (Some(stored), Some(defaults)) = (stored.as_object_mut(), defaults.as_object()) else {
        return false;
    };

    let mut changed = false;
    for (name, value) in defaults {
        if !stored.contains_key(name) {
            stored.insert(name.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

#[derive(Clone)]
pub struct OptionsStore {
    storage: Storage,
}

impl OptionsStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Read options, writing back any defaults that were missing
    pub async fn load(&self) -> Result<Options> {
        let mut stored = self.storage.load_value(StoreKey::Options).await?;
        if backfill(&mut stored, &StoreKey::Options.default_value()) {
            self.storage.save(StoreKey::Options, &stored).await?;
            info!("Backfilled missing options");
        }
        Ok(serde_json::from_value(stored)?)
    }

    pub async fn save(&self, options: &Options) -> Result<()> {
        self.storage.save(StoreKey::Options, options).await
    }

    pub async fn history_retention_hours(&self) -> Result<f64> {
        Ok(self.load().await?.history_retention_period_hours)
    }

    pub async fn set_history_retention_hours(&self, hours: f64) -> Result<Options> {
        let mut options = self.load().await?;
        options.history_retention_period_hours = hours;
        self.save(&options).await?;
        info!(hours, "History retention updated");
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_matches_store_default() {
        let default = serde_json::to_value(Options::default()).unwrap();
        assert_eq!(default, StoreKey::Options.default_value());
    }

    #[tokio::test]
    async fn test_load_defaults() {
        let options = OptionsStore::new(Storage::in_memory()).load().await.unwrap();
        assert_eq!(options, Options::default());
        assert!(options.history_enabled());
    }

    #[tokio::test]
    async fn test_missing_keys_are_backfilled() {
        let storage = Storage::in_memory();
        storage
            .save(StoreKey::Options, &json!({ "historyRetentionPeriodHours": 24 }))
            .await
            .unwrap();

        let options = OptionsStore::new(storage.clone()).load().await.unwrap();
        assert_eq!(options.history_retention_period_hours, 24.0);
        assert_eq!(options.language, "default");
        assert!(options.insert_button_into_video_page);

        let raw = storage.load_value(StoreKey::Options).await.unwrap();
        assert_eq!(raw["language"], "default");
        assert_eq!(raw["historyRetentionPeriodHours"], 24);
    }

    #[tokio::test]
    async fn test_set_retention() {
        let store = OptionsStore::new(Storage::in_memory());
        let options = store.set_history_retention_hours(0.0).await.unwrap();
        assert!(!options.history_enabled());
        assert_eq!(store.history_retention_hours().await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_fractional_retention_is_accepted() {
        let storage = Storage::in_memory();
        storage
            .save(
                StoreKey::Options,
                &json!({
                    "language": "default",
                    "historyRetentionPeriodHours": 1.5,
                    "insertButtonIntoVideoPage": false,
                }),
            )
            .await
            .unwrap();

        let options = OptionsStore::new(storage).load().await.unwrap();
        assert_eq!(options.history_retention_period_hours, 1.5);
        assert!(options.history_enabled());
    }
}
