use std::fmt;

use serde::Serialize;

/// Terminal result of one parse request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ParseOutcome {
    /// Served from today's history entry
    Reused { media_url: String, quality_code: i64 },
    Parsed { media_url: String, quality_code: i64 },
    InvalidUrl,
    Busy,
    Cooldown { remaining_ms: i64 },
    FetchFailed,
    ParseFailed { message: String },
    ClipboardFailed,
    UnknownError { message: String },
}

impl ParseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ParseOutcome::Reused { .. } | ParseOutcome::Parsed { .. })
    }

    /// Rejections that are expected traffic rather than failures
    pub fn is_rejection(&self) -> bool {
        matches!(self, ParseOutcome::Busy | ParseOutcome::Cooldown { .. })
    }

    pub fn media_url(&self) -> Option<&str> {
        match self {
            ParseOutcome::Reused { media_url, .. } | ParseOutcome::Parsed { media_url, .. } => {
                Some(media_url)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ParseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseOutcome::Reused { media_url, .. } => write!(f, "reused {media_url}"),
            ParseOutcome::Parsed { media_url, .. } => write!(f, "parsed {media_url}"),
            ParseOutcome::InvalidUrl => write!(f, "invalid video page URL"),
            ParseOutcome::Busy => write!(f, "another parse is in progress"),
            ParseOutcome::Cooldown { remaining_ms } => {
                write!(f, "too frequent, retry in {remaining_ms} ms")
            }
            ParseOutcome::FetchFailed => write!(f, "failed to reach the parsing API"),
            ParseOutcome::ParseFailed { message } => write!(f, "parsing failed: {message}"),
            ParseOutcome::ClipboardFailed => write!(f, "failed to write the clipboard"),
            ParseOutcome::UnknownError { message } => write!(f, "unknown error: {message}"),
        }
    }
}
