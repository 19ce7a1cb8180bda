use serde::{Deserialize, Serialize};

use crate::video::{VideoRef, quality_text};

/// One past successful parse
///
/// Stored with the extension's field names, including the `ID`/`URL`
/// acronyms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    /// Parsing timestamp at creation
    #[serde(rename = "historyID")]
    pub history_id: i64,
    #[serde(rename = "videoID")]
    pub video_id: String,
    pub page_number: u32,
    pub title: String,
    /// Only present for multi-page videos
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub uploader_name: String,
    #[serde(rename = "thumbnailURL", default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "contentID", default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<i64>,
    #[serde(rename = "pageURL")]
    pub page_url: String,
    #[serde(rename = "parsedMediaURL")]
    pub parsed_media_url: String,
    pub parsed_media_quality_code: i64,
    pub last_parsing_timestamp: i64,
    pub last_used_timestamp: i64,
}

impl HistoryItem {
    pub fn video(&self) -> VideoRef {
        VideoRef::new(self.video_id.clone(), self.page_number)
    }

    pub fn quality_text(&self) -> &'static str {
        quality_text(self.parsed_media_quality_code)
    }
}
