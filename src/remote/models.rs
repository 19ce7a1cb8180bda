//! Wire shapes of the metadata and parsing endpoints

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Envelope of the video metadata endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ViewResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<ViewData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewData {
    pub title: String,
    pub owner: Owner,
    #[serde(default)]
    pub pic: Option<String>,
    #[serde(default)]
    pub pages: Vec<PageEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageEntry {
    pub page: u32,
    #[serde(default)]
    pub cid: Option<i64>,
    #[serde(default)]
    pub part: Option<String>,
}

/// Body of the parsing endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ParseApiResponse {
    #[serde(deserialize_with = "lenient_i64")]
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub quality: Option<i64>,
}

/// Integer that some deployments send as a numeric string
fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_i64(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected integer, got {value}")))
}

fn lenient_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_i64))
}

/// Display metadata for one video page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    /// Page title, only for multi-page videos
    pub subtitle: Option<String>,
    pub uploader_name: String,
    pub thumbnail_url: Option<String>,
    pub content_id: Option<i64>,
}

pub const PLACEHOLDER_TEXT: &str = "---";

impl VideoMetadata {
    /// Stand-in used when metadata could not be fetched
    pub fn placeholder() -> Self {
        Self {
            title: PLACEHOLDER_TEXT.to_string(),
            subtitle: None,
            uploader_name: PLACEHOLDER_TEXT.to_string(),
            thumbnail_url: None,
            content_id: None,
        }
    }
}

/// Classified parsing endpoint reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseReply {
    Success { media_url: String, quality_code: i64 },
    Failed { message: String },
    UnknownCode(i64),
    /// Code 0 without a media URL
    MissingMediaUrl,
}

impl From<ParseApiResponse> for ParseReply {
    fn from(response: ParseApiResponse) -> Self {
        match response.code {
            0 => match response.url.filter(|url| !url.is_empty()) {
                Some(media_url) => ParseReply::Success {
                    media_url,
                    quality_code: response.quality.unwrap_or_default(),
                },
                None => ParseReply::MissingMediaUrl,
            },
            1 => ParseReply::Failed {
                message: response.message.unwrap_or_default(),
            },
            code => ParseReply::UnknownCode(code),
        }
    }
}
