use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use url::Url;

pub const VIDEO_PAGE_PREFIX: &str = "https://www.bilibili.com/";

static VIDEO_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://www\.bilibili\.com/.*(BV[a-zA-Z0-9]{10})").expect("video id pattern is valid")
});

#[derive(Debug, Error)]
pub enum UrlError {
    #[error("not a bilibili video page: {0}")]
    NotVideoPage(String),

    #[error("malformed URL: {0}")]
    Malformed(#[from] url::ParseError),
}

/// A (video id, page number) pair identifying one playable part
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoRef {
    pub video_id: String,
    pub page_number: u32,
}

impl VideoRef {
    pub fn new(video_id: impl Into<String>, page_number: u32) -> Self {
        Self {
            video_id: video_id.into(),
            page_number,
        }
    }

    /// Extract the video id and the `p` query parameter from a video page URL.
    ///
    /// The page defaults to 1 when `p` is absent or not a positive integer.
    pub fn from_page_url(page_url: &str) -> Result<Self, UrlError> {
        if !page_url.starts_with(VIDEO_PAGE_PREFIX) {
            return Err(UrlError::NotVideoPage(page_url.to_string()));
        }

        let video_id = VIDEO_ID_PATTERN
            .captures(page_url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| UrlError::NotVideoPage(page_url.to_string()))?;

        let url = Url::parse(page_url)?;
        let page_number = url
            .query_pairs()
            .find(|(name, _)| name == "p")
            .and_then(|(_, value)| value.parse::<u32>().ok())
            .filter(|page| *page > 0)
            .unwrap_or(1);

        Ok(Self {
            video_id,
            page_number,
        })
    }

    /// Canonical page URL for this video part
    pub fn page_url(&self) -> String {
        format!(
            "{}video/{}/?p={}",
            VIDEO_PAGE_PREFIX, self.video_id, self.page_number
        )
    }
}

impl fmt::Display for VideoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} p{}", self.video_id, self.page_number)
    }
}

pub fn is_valid_video_page(page_url: &str) -> bool {
    VideoRef::from_page_url(page_url).is_ok()
}
