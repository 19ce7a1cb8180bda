use std::fmt;

use serde::Serialize;
use tracing::info;

use super::outcome::ParseOutcome;
use super::parser::VideoParser;

/// Where a parse request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    IconClick,
    ContextMenu,
    PageButton,
    HistoryEntry,
    CommandLine,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TriggerSource::IconClick => "icon_click",
            TriggerSource::ContextMenu => "context_menu",
            TriggerSource::PageButton => "page_button",
            TriggerSource::HistoryEntry => "history_entry",
            TriggerSource::CommandLine => "command_line",
        };
        f.write_str(name)
    }
}

/// The two-valued status a trigger surface relays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerStatus {
    Successful,
    Failed,
}

impl From<&ParseOutcome> for TriggerStatus {
    fn from(outcome: &ParseOutcome) -> Self {
        if outcome.is_success() {
            TriggerStatus::Successful
        } else {
            TriggerStatus::Failed
        }
    }
}

/// Handle a parse request from a page-bound trigger
pub async fn trigger_parse(
    parser: &VideoParser,
    source: TriggerSource,
    page_url: &str,
) -> (TriggerStatus, ParseOutcome) {
    info!(%source, page_url, "Parse triggered");
    let outcome = parser.parse(page_url).await;
    let status = TriggerStatus::from(&outcome);
    info!(%source, ?status, %outcome, "Trigger finished");
    (status, outcome)
}

/// Handle the history page's "parse again" button
pub async fn trigger_reparse(
    parser: &VideoParser,
    history_id: i64,
) -> (TriggerStatus, ParseOutcome) {
    let source = TriggerSource::HistoryEntry;
    info!(%source, history_id, "Parse triggered");
    let outcome = parser.reparse_history_item(history_id).await;
    let status = TriggerStatus::from(&outcome);
    info!(%source, ?status, %outcome, "Trigger finished");
    (status, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_outcome() {
        let reused = ParseOutcome::Reused {
            media_url: "https://cdn/x.mp4".to_string(),
            quality_code: 80,
        };
        assert_eq!(TriggerStatus::from(&reused), TriggerStatus::Successful);
        assert_eq!(
            TriggerStatus::from(&ParseOutcome::Cooldown { remaining_ms: 10 }),
            TriggerStatus::Failed
        );
        assert_eq!(
            TriggerStatus::from(&ParseOutcome::ClipboardFailed),
            TriggerStatus::Failed
        );
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TriggerStatus::Successful).unwrap(),
            "\"successful\""
        );
    }
}
