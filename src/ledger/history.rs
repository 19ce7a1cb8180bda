use chrono::{Local, TimeZone};
use tracing::{debug, info};

use crate::store::{Result, Storage, StoreKey};

use super::grouping::{HistoryGroup, group_by_period, sort_by_recent_use};
use super::models::HistoryItem;
use super::pruning::{PurgeStats, retain_unexpired, retention_cutoff};

/// Whether two epoch-ms timestamps fall on the same local calendar day
pub fn same_local_day(a: i64, b: i64) -> bool {
    match (
        Local.timestamp_millis_opt(a).single(),
        Local.timestamp_millis_opt(b).single(),
    ) {
        (Some(a), Some(b)) => a.date_naive() == b.date_naive(),
        _ => false,
    }
}

/// Index of the item for (video, page) parsed on the same local day as `as_of`
pub fn position_of(items: &[HistoryItem], video_id: &str, page_number: u32, as_of: i64) -> Option<usize> {
    items.iter().position(|item| {
        item.video_id == video_id
            && item.page_number == page_number
            && same_local_day(item.last_parsing_timestamp, as_of)
    })
}

/// Queries and whole-collection updates over the `history` record.
///
/// Every mutation reads the full collection, edits a copy and writes it
/// back. Concurrent writers are not isolated; the last write wins.
#[derive(Clone)]
pub struct HistoryLedger {
    storage: Storage,
}

impl HistoryLedger {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// All stored items in storage order
    pub async fn items(&self) -> Result<Vec<HistoryItem>> {
        self.storage.load(StoreKey::History).await
    }

    async fn write(&self, items: &[HistoryItem]) -> Result<()> {
        self.storage.save(StoreKey::History, items).await?;
        debug!(count = items.len(), "History saved");
        Ok(())
    }

    pub async fn find_item(
        &self,
        video_id: &str,
        page_number: u32,
        as_of: i64,
    ) -> Result<Option<HistoryItem>> {
        let mut items = self.items().await?;
        Ok(position_of(&items, video_id, page_number, as_of).map(|index| items.swap_remove(index)))
    }

    pub async fn find_by_id(&self, history_id: i64) -> Result<Option<HistoryItem>> {
        let items = self.items().await?;
        Ok(items.into_iter().find(|item| item.history_id == history_id))
    }

    /// Insert `item`, replacing the same-day entry for its video and page
    pub async fn upsert(&self, item: HistoryItem) -> Result<()> {
        let mut items = self.items().await?;
        if let Some(index) = position_of(
            &items,
            &item.video_id,
            item.page_number,
            item.last_parsing_timestamp,
        ) {
            let replaced = items.remove(index);
            debug!(
                history_id = replaced.history_id,
                video_id = %replaced.video_id,
                "Replacing same-day history item"
            );
        }
        items.push(item);
        self.write(&items).await
    }

    /// Stamp `last_used_timestamp` on the matching item. Returns false when
    /// there is nothing to touch.
    pub async fn touch_last_used(
        &self,
        video_id: &str,
        page_number: u32,
        as_of: i64,
        now: i64,
    ) -> Result<bool> {
        let mut items = self.items().await?;
        let Some(index) = position_of(&items, video_id, page_number, as_of) else {
            return Ok(false);
        };
        items[index].last_used_timestamp = now;
        self.write(&items).await?;
        Ok(true)
    }

    /// Delete by id. Returns false when no item carries that id.
    pub async fn remove(&self, history_id: i64) -> Result<bool> {
        let mut items = self.items().await?;
        let Some(index) = items.iter().position(|item| item.history_id == history_id) else {
            return Ok(false);
        };
        items.remove(index);
        self.write(&items).await?;
        Ok(true)
    }

    /// Drop items parsed at or before `now - retention_hours`. Non-positive
    /// retention keeps everything.
    pub async fn purge_older_than(&self, retention_hours: f64, now: i64) -> Result<PurgeStats> {
        if retention_cutoff(retention_hours, now).is_none() {
            return Ok(PurgeStats::default());
        }

        let items = self.items().await?;
        let (retained, stats) = retain_unexpired(items, retention_hours, now);
        if stats.purged > 0 {
            self.write(&retained).await?;
        }
        info!(
            examined = stats.examined,
            purged = stats.purged,
            retention_hours,
            "History purge complete"
        );
        Ok(stats)
    }

    pub async fn sorted_by_recent_use(&self) -> Result<Vec<HistoryItem>> {
        let mut items = self.items().await?;
        sort_by_recent_use(&mut items);
        Ok(items)
    }

    pub async fn grouped(&self, now: i64) -> Result<Vec<HistoryGroup>> {
        Ok(group_by_period(self.items().await?, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::pruning::MS_PER_HOUR;

    fn local_ms(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        Local
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .earliest()
            .unwrap()
            .timestamp_millis()
    }

    fn item(video_id: &str, page_number: u32, parsed_at: i64, media_url: &str) -> HistoryItem {
        HistoryItem {
            history_id: parsed_at,
            video_id: video_id.to_string(),
            page_number,
            title: "title".to_string(),
            subtitle: None,
            uploader_name: "uploader".to_string(),
            thumbnail_url: None,
            content_id: None,
            page_url: format!("https://www.bilibili.com/video/{video_id}/?p={page_number}"),
            parsed_media_url: media_url.to_string(),
            parsed_media_quality_code: 80,
            last_parsing_timestamp: parsed_at,
            last_used_timestamp: parsed_at,
        }
    }

    fn ledger() -> HistoryLedger {
        HistoryLedger::new(Storage::in_memory())
    }

    #[test]
    fn test_same_local_day() {
        assert!(same_local_day(
            local_ms(2024, 5, 1, 0, 1),
            local_ms(2024, 5, 1, 23, 59)
        ));
        assert!(!same_local_day(
            local_ms(2024, 5, 1, 23, 59),
            local_ms(2024, 5, 2, 0, 1)
        ));
    }

    #[tokio::test]
    async fn test_same_day_upsert_replaces() {
        let ledger = ledger();
        let morning = local_ms(2024, 5, 1, 9, 0);
        let evening = local_ms(2024, 5, 1, 18, 0);

        ledger.upsert(item("BV1xx411c7mD", 1, morning, "https://cdn/a.mp4")).await.unwrap();
        ledger.upsert(item("BV1xx411c7mD", 1, evening, "https://cdn/b.mp4")).await.unwrap();

        let items = ledger.items().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].parsed_media_url, "https://cdn/b.mp4");
        assert_eq!(items[0].history_id, evening);
    }

    #[tokio::test]
    async fn test_replaced_item_moves_to_end() {
        let ledger = ledger();
        let t = local_ms(2024, 5, 1, 9, 0);

        ledger.upsert(item("BV1xx411c7mD", 1, t, "a")).await.unwrap();
        ledger.upsert(item("BV1GJ411x7h7", 1, t + 1, "b")).await.unwrap();
        ledger.upsert(item("BV1xx411c7mD", 1, t + 2, "c")).await.unwrap();

        let items = ledger.items().await.unwrap();
        let urls: Vec<&str> = items.iter().map(|item| item.parsed_media_url.as_str()).collect();
        assert_eq!(urls, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_different_days_and_pages_are_kept() {
        let ledger = ledger();
        let day_one = local_ms(2024, 5, 1, 9, 0);
        let day_two = local_ms(2024, 5, 2, 9, 0);

        ledger.upsert(item("BV1xx411c7mD", 1, day_one, "a")).await.unwrap();
        ledger.upsert(item("BV1xx411c7mD", 1, day_two, "b")).await.unwrap();
        ledger.upsert(item("BV1xx411c7mD", 2, day_two, "c")).await.unwrap();

        assert_eq!(ledger.items().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_find_item_requires_same_day() {
        let ledger = ledger();
        let parsed_at = local_ms(2024, 5, 1, 9, 0);
        ledger.upsert(item("BV1xx411c7mD", 1, parsed_at, "a")).await.unwrap();

        let found = ledger
            .find_item("BV1xx411c7mD", 1, local_ms(2024, 5, 1, 22, 0))
            .await
            .unwrap();
        assert!(found.is_some());

        let next_day = ledger
            .find_item("BV1xx411c7mD", 1, local_ms(2024, 5, 2, 9, 0))
            .await
            .unwrap();
        assert!(next_day.is_none());

        let other_page = ledger
            .find_item("BV1xx411c7mD", 2, parsed_at)
            .await
            .unwrap();
        assert!(other_page.is_none());
    }

    #[tokio::test]
    async fn test_touch_last_used() {
        let ledger = ledger();
        let parsed_at = local_ms(2024, 5, 1, 9, 0);
        let used_at = parsed_at + 600_000;
        ledger.upsert(item("BV1xx411c7mD", 1, parsed_at, "a")).await.unwrap();

        let touched = ledger
            .touch_last_used("BV1xx411c7mD", 1, used_at, used_at)
            .await
            .unwrap();
        assert!(touched);

        let stored = ledger.find_by_id(parsed_at).await.unwrap().unwrap();
        assert_eq!(stored.last_used_timestamp, used_at);
        assert_eq!(stored.last_parsing_timestamp, parsed_at);

        let missing = ledger
            .touch_last_used("BV1GJ411x7h7", 1, used_at, used_at)
            .await
            .unwrap();
        assert!(!missing);
    }

    #[tokio::test]
    async fn test_remove_by_id() {
        let ledger = ledger();
        let t = local_ms(2024, 5, 1, 9, 0);
        ledger.upsert(item("BV1xx411c7mD", 1, t, "a")).await.unwrap();
        ledger.upsert(item("BV1GJ411x7h7", 1, t + 5, "b")).await.unwrap();

        assert!(ledger.remove(t).await.unwrap());
        assert!(!ledger.remove(t).await.unwrap());

        let items = ledger.items().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].video_id, "BV1GJ411x7h7");
    }

    #[tokio::test]
    async fn test_purge_older_than() {
        let ledger = ledger();
        let now = local_ms(2024, 5, 10, 12, 0);
        ledger.upsert(item("BV1xx411c7mD", 1, now - 3 * MS_PER_HOUR, "old")).await.unwrap();
        ledger.upsert(item("BV1GJ411x7h7", 1, now - 2 * MS_PER_HOUR, "edge")).await.unwrap();
        ledger.upsert(item("BV1Ab411c7mZ", 1, now - MS_PER_HOUR, "new")).await.unwrap();

        let stats = ledger.purge_older_than(2.0, now).await.unwrap();
        assert_eq!(stats.purged, 2);

        let items = ledger.items().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].parsed_media_url, "new");
    }

    #[tokio::test]
    async fn test_purge_with_fractional_retention() {
        let ledger = ledger();
        let now = local_ms(2024, 5, 10, 12, 0);
        ledger.upsert(item("BV1xx411c7mD", 1, now - 2 * MS_PER_HOUR, "old")).await.unwrap();
        ledger.upsert(item("BV1GJ411x7h7", 1, now - MS_PER_HOUR, "new")).await.unwrap();

        let stats = ledger.purge_older_than(1.5, now).await.unwrap();
        assert_eq!(stats.purged, 1);
        assert_eq!(ledger.items().await.unwrap()[0].parsed_media_url, "new");
    }

    #[tokio::test]
    async fn test_purge_disabled_for_non_positive_retention() {
        let ledger = ledger();
        let now = local_ms(2024, 5, 10, 12, 0);
        ledger.upsert(item("BV1xx411c7mD", 1, 0, "ancient")).await.unwrap();

        let stats = ledger.purge_older_than(0.0, now).await.unwrap();
        assert_eq!(stats.purged, 0);
        assert_eq!(ledger.items().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sorted_by_recent_use() {
        let ledger = ledger();
        let t = local_ms(2024, 5, 1, 9, 0);
        ledger.upsert(item("BV1xx411c7mD", 1, t, "a")).await.unwrap();
        ledger.upsert(item("BV1GJ411x7h7", 1, t + 10, "b")).await.unwrap();
        ledger.touch_last_used("BV1xx411c7mD", 1, t, t + 20).await.unwrap();

        let sorted = ledger.sorted_by_recent_use().await.unwrap();
        assert_eq!(sorted[0].parsed_media_url, "a");
        assert_eq!(sorted[1].parsed_media_url, "b");
    }
}
