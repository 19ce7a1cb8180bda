//! Startup housekeeping and tutorial progress

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::clock::Clock;
use crate::ledger::{HistoryLedger, PurgeStats};
use crate::options::OptionsStore;
use crate::parsing::ParsingStateMachine;
use crate::store::{Result, Storage, StoreKey};

/// Tutorials shipped with this version
pub const TUTORIAL_IDS: &[&str] = &["parse-video", "parsing-history", "options"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StartupReport {
    pub purged_history_items: usize,
    pub new_version_installed: bool,
    /// Empty on first run
    pub previous_version: String,
    pub unfinished_tutorials: Vec<String>,
}

pub struct Lifecycle {
    storage: Storage,
    state: Arc<ParsingStateMachine>,
    ledger: HistoryLedger,
    options: OptionsStore,
    clock: Arc<dyn Clock>,
}

impl Lifecycle {
    pub fn new(
        storage: Storage,
        state: Arc<ParsingStateMachine>,
        ledger: HistoryLedger,
        options: OptionsStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            state,
            ledger,
            options,
            clock,
        }
    }

    /// Reset the parsing status, purge expired history and record the
    /// running version.
    pub async fn on_startup(&self, current_version: &str) -> Result<StartupReport> {
        self.state.initialize().await?;

        let purge = self.purge_expired_history().await?;

        let previous_version: String = self.storage.load(StoreKey::LastExtensionVersion).await?;
        let new_version_installed = self.record_version(current_version).await?;

        let unfinished_tutorials = if new_version_installed {
            self.unfinished_tutorials(TUTORIAL_IDS).await?
        } else {
            Vec::new()
        };

        let report = StartupReport {
            purged_history_items: purge.purged,
            new_version_installed,
            previous_version,
            unfinished_tutorials,
        };
        info!(
            purged = report.purged_history_items,
            new_version = report.new_version_installed,
            "Startup complete"
        );
        Ok(report)
    }

    pub async fn purge_expired_history(&self) -> Result<PurgeStats> {
        let retention_hours = self.options.history_retention_hours().await?;
        self.ledger
            .purge_older_than(retention_hours, self.clock.now_ms())
            .await
    }

    /// Store `current_version`; true when it differs from the previous one
    pub async fn record_version(&self, current_version: &str) -> Result<bool> {
        let previous: String = self.storage.load(StoreKey::LastExtensionVersion).await?;
        self.storage
            .save(StoreKey::LastExtensionVersion, current_version)
            .await?;
        Ok(previous != current_version)
    }

    pub async fn finished_tutorials(&self) -> Result<Vec<String>> {
        self.storage.load(StoreKey::FinishedTutorialIds).await
    }

    /// Mark tutorials complete, keeping the stored list free of duplicates
    pub async fn complete_tutorials<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<String>> {
        let mut finished = self.finished_tutorials().await?;
        for id in ids {
            let id = id.as_ref();
            if !finished.iter().any(|done| done == id) {
                finished.push(id.to_string());
            }
        }
        self.storage
            .save(StoreKey::FinishedTutorialIds, &finished)
            .await?;
        Ok(finished)
    }

    /// Entries of `catalog` not yet completed, in catalog order
    pub async fn unfinished_tutorials<S: AsRef<str>>(&self, catalog: &[S]) -> Result<Vec<String>> {
        let finished = self.finished_tutorials().await?;
        Ok(catalog
            .iter()
            .map(|id| id.as_ref())
            .filter(|id| !finished.iter().any(|done| done == id))
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::ledger::{HistoryItem, MS_PER_HOUR};
    use crate::parsing::{DEFAULT_COOLDOWN_MS, ParsingStatus};
    use serde_json::json;

    fn lifecycle(storage: Storage, now: i64) -> Lifecycle {
        Lifecycle::new(
            storage.clone(),
            Arc::new(ParsingStateMachine::new(storage.clone(), DEFAULT_COOLDOWN_MS)),
            HistoryLedger::new(storage.clone()),
            OptionsStore::new(storage),
            Arc::new(ManualClock::new(now)),
        )
    }

    fn item(parsed_at: i64) -> HistoryItem {
        HistoryItem {
            history_id: parsed_at,
            video_id: format!("BV{:010}", parsed_at % 10_000_000_000),
            page_number: 1,
            title: "title".to_string(),
            subtitle: None,
            uploader_name: "uploader".to_string(),
            thumbnail_url: None,
            content_id: None,
            page_url: String::new(),
            parsed_media_url: "https://cdn/x.mp4".to_string(),
            parsed_media_quality_code: 80,
            last_parsing_timestamp: parsed_at,
            last_used_timestamp: parsed_at,
        }
    }

    #[tokio::test]
    async fn test_startup_resets_state_and_purges() {
        let storage = Storage::in_memory();
        let now = 1_000 * MS_PER_HOUR;
        storage
            .save(StoreKey::ParsingStatus, &ParsingStatus::Parsing)
            .await
            .unwrap();
        storage
            .save(
                StoreKey::History,
                &vec![item(now - 200 * MS_PER_HOUR), item(now - MS_PER_HOUR)],
            )
            .await
            .unwrap();

        let lifecycle = lifecycle(storage.clone(), now);
        let report = lifecycle.on_startup("1.0.0").await.unwrap();

        assert_eq!(report.purged_history_items, 1);
        let status: ParsingStatus = storage.load(StoreKey::ParsingStatus).await.unwrap();
        assert_eq!(status, ParsingStatus::Parsable);
        let history: Vec<HistoryItem> = storage.load(StoreKey::History).await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_startup_with_fractional_retention() {
        let storage = Storage::in_memory();
        let now = 1_000 * MS_PER_HOUR;
        storage
            .save(
                StoreKey::Options,
                &json!({
                    "language": "default",
                    "historyRetentionPeriodHours": 1.5,
                    "insertButtonIntoVideoPage": true,
                }),
            )
            .await
            .unwrap();
        storage
            .save(
                StoreKey::History,
                &vec![item(now - 2 * MS_PER_HOUR), item(now - MS_PER_HOUR)],
            )
            .await
            .unwrap();

        let report = lifecycle(storage, now).on_startup("1.0.0").await.unwrap();
        assert_eq!(report.purged_history_items, 1);
    }

    #[tokio::test]
    async fn test_version_change_detection() {
        let lifecycle = lifecycle(Storage::in_memory(), 0);

        let first = lifecycle.on_startup("1.0.0").await.unwrap();
        assert!(first.new_version_installed);
        assert_eq!(first.previous_version, "");
        assert_eq!(first.unfinished_tutorials.len(), TUTORIAL_IDS.len());

        let again = lifecycle.on_startup("1.0.0").await.unwrap();
        assert!(!again.new_version_installed);
        assert!(again.unfinished_tutorials.is_empty());

        let upgraded = lifecycle.on_startup("1.1.0").await.unwrap();
        assert!(upgraded.new_version_installed);
        assert_eq!(upgraded.previous_version, "1.0.0");
    }

    #[tokio::test]
    async fn test_tutorial_completion_deduplicates() {
        let lifecycle = lifecycle(Storage::in_memory(), 0);

        lifecycle.complete_tutorials(&["parse-video"]).await.unwrap();
        let finished = lifecycle
            .complete_tutorials(&["parse-video", "options"])
            .await
            .unwrap();
        assert_eq!(finished, vec!["parse-video", "options"]);

        let unfinished = lifecycle.unfinished_tutorials(TUTORIAL_IDS).await.unwrap();
        assert_eq!(unfinished, vec!["parsing-history"]);
    }
}
