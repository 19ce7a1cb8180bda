//! Retention policy for parsing history

use super::models::HistoryItem;

pub const MS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Default retention (one week)
pub const DEFAULT_RETENTION_HOURS: f64 = 168.0;

/// Pruning statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PurgeStats {
    pub examined: usize,
    pub purged: usize,
}

/// Newest `last_parsing_timestamp` that is already expired, or `None` when
/// retention is disabled. Hours may be fractional.
pub fn retention_cutoff(retention_hours: f64, now: i64) -> Option<i64> {
    if retention_hours.is_nan() || retention_hours <= 0.0 {
        return None;
    }
    // float to int casts saturate
    let span_ms = (retention_hours * MS_PER_HOUR as f64) as i64;
    Some(now.saturating_sub(span_ms))
}

/// Split off expired items, returning the retained ones and how many were dropped
pub fn retain_unexpired(
    items: Vec<HistoryItem>,
    retention_hours: f64,
    now: i64,
) -> (Vec<HistoryItem>, PurgeStats) {
    let examined = items.len();
    let Some(cutoff) = retention_cutoff(retention_hours, now) else {
        return (
            items,
            PurgeStats {
                examined,
                purged: 0,
            },
        );
    };

    let retained: Vec<HistoryItem> = items
        .into_iter()
        .filter(|item| item.last_parsing_timestamp > cutoff)
        .collect();
    let purged = examined - retained.len();

    (retained, PurgeStats { examined, purged })
}
