//! Display buckets for the history list

use chrono::{Local, TimeZone};
use serde::Serialize;

use super::models::HistoryItem;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryPeriod {
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
    Earlier,
}

impl HistoryPeriod {
    pub fn label(&self) -> &'static str {
        match self {
            HistoryPeriod::Today => "Today",
            HistoryPeriod::Yesterday => "Yesterday",
            HistoryPeriod::Last7Days => "Last 7 days",
            HistoryPeriod::Last30Days => "Last 30 days",
            HistoryPeriod::Earlier => "Earlier",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryGroup {
    pub period: HistoryPeriod,
    pub items: Vec<HistoryItem>,
}

/// Local midnight at the start of the day containing `now`
pub fn start_of_local_day(now: i64) -> i64 {
    let Some(current) = Local.timestamp_millis_opt(now).single() else {
        return now;
    };
    current
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
        .map(|midnight| midnight.timestamp_millis())
        .unwrap_or(now)
}

/// Most recently used first
pub fn sort_by_recent_use(items: &mut [HistoryItem]) {
    items.sort_by(|a, b| b.last_used_timestamp.cmp(&a.last_used_timestamp));
}

/// Bucket history by parse date relative to `now`, most recently used first
/// within each bucket. Empty buckets are omitted.
pub fn group_by_period(mut items: Vec<HistoryItem>, now: i64) -> Vec<HistoryGroup> {
    sort_by_recent_use(&mut items);

    let today = start_of_local_day(now);
    let yesterday = today - MS_PER_DAY;
    let week_ago = today - 7 * MS_PER_DAY;
    let month_ago = today - 30 * MS_PER_DAY;

    let period_of = |item: &HistoryItem| {
        let parsed_at = item.last_parsing_timestamp;
        if parsed_at >= today {
            HistoryPeriod::Today
        } else if parsed_at >= yesterday {
            HistoryPeriod::Yesterday
        } else if parsed_at >= week_ago {
            HistoryPeriod::Last7Days
        } else if parsed_at >= month_ago {
            HistoryPeriod::Last30Days
        } else {
            HistoryPeriod::Earlier
        }
    };

    let mut groups: Vec<HistoryGroup> = [
        HistoryPeriod::Today,
        HistoryPeriod::Yesterday,
        HistoryPeriod::Last7Days,
        HistoryPeriod::Last30Days,
        HistoryPeriod::Earlier,
    ]
    .into_iter()
    .map(|period| HistoryGroup {
        period,
        items: Vec::new(),
    })
    .collect();

    for item in items {
        let period = period_of(&item);
        if let Some(group) = groups.iter_mut().find(|group| group.period == period) {
            group.items.push(item);
        }
    }

    groups.retain(|group| !group.items.is_empty());
    groups
}
