//! User-facing notifications ("popups")

use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification surface unavailable: {0}")]
    Unavailable(String),
}

/// Round milliseconds up to whole seconds
pub fn ceil_secs(ms: i64) -> i64 {
    if ms <= 0 { 0 } else { (ms + 999) / 1_000 }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    InvalidUrl,
    Busy,
    TooFrequent {
        cooldown_secs: i64,
        remaining_secs: i64,
    },
    Processing,
    ParsingSuccessful {
        quality: String,
        title: String,
    },
    /// A cached history result was copied again
    ClipboardWriteSuccessful {
        quality: String,
        title: String,
    },
    ParsingFailed {
        message: String,
    },
    FetchFailed {
        message: String,
    },
    ClipboardWriteFailed {
        message: String,
    },
    UnknownError {
        message: String,
    },
    HistoryDeleted,
}

impl Notification {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notification::InvalidUrl
                | Notification::ParsingFailed { .. }
                | Notification::FetchFailed { .. }
                | Notification::ClipboardWriteFailed { .. }
                | Notification::UnknownError { .. }
        )
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::InvalidUrl => write!(f, "This page is not a bilibili video page"),
            Notification::Busy => write!(f, "Another video is being parsed, please wait"),
            Notification::TooFrequent {
                cooldown_secs,
                remaining_secs,
            } => write!(
                f,
                "Parsing is limited to once every {cooldown_secs}s, try again in {remaining_secs}s"
            ),
            Notification::Processing => write!(f, "Parsing the video..."),
            Notification::ParsingSuccessful { quality, title } => {
                write!(f, "Parsed \"{title}\" ({quality}), URL copied to the clipboard")
            }
            Notification::ClipboardWriteSuccessful { quality, title } => write!(
                f,
                "Copied the recently parsed URL of \"{title}\" ({quality}) to the clipboard"
            ),
            Notification::ParsingFailed { message } => write!(f, "Parsing failed: {message}"),
            Notification::FetchFailed { message } => {
                write!(f, "Could not reach the parsing API: {message}")
            }
            Notification::ClipboardWriteFailed { message } => {
                write!(f, "Could not write the clipboard: {message}")
            }
            Notification::UnknownError { message } => write!(f, "Unknown error: {message}"),
            Notification::HistoryDeleted => write!(f, "History item deleted"),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Last-resort display that depends on nothing else
    fn critical(&self, message: &str) {
        error!(error = message, "Critical error");
    }
}

/// Prints notifications to the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if notification.is_error() {
            eprintln!("{notification}");
        } else {
            println!("{notification}");
        }
        Ok(())
    }

    fn critical(&self, message: &str) {
        eprintln!("Critical error: {message}");
    }
}

/// Keeps every notification; optionally fails on unknown-error popups
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Notification>>,
    critical: Mutex<Vec<String>>,
    fail_unknown_errors: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose unknown-error popup itself fails
    pub fn failing_unknown_errors() -> Self {
        Self {
            fail_unknown_errors: true,
            ..Self::default()
        }
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().map(|shown| shown.clone()).unwrap_or_default()
    }

    pub fn critical_messages(&self) -> Vec<String> {
        self.critical
            .lock()
            .map(|critical| critical.clone())
            .unwrap_or_default()
    }

    /// Everything except the processing notice
    pub fn terminal(&self) -> Vec<Notification> {
        self.shown()
            .into_iter()
            .filter(|notification| *notification != Notification::Processing)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.fail_unknown_errors && matches!(notification, Notification::UnknownError { .. }) {
            return Err(NotifyError::Unavailable("popup rendering failed".to_string()));
        }
        self.shown
            .lock()
            .map_err(|e| NotifyError::Unavailable(e.to_string()))?
            .push(notification.clone());
        Ok(())
    }

    fn critical(&self, message: &str) {
        if let Ok(mut critical) = self.critical.lock() {
            critical.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceil_secs() {
        assert_eq!(ceil_secs(4_000), 4);
        assert_eq!(ceil_secs(4_001), 5);
        assert_eq!(ceil_secs(1), 1);
        assert_eq!(ceil_secs(0), 0);
        assert_eq!(ceil_secs(-10), 0);
    }

    #[test]
    fn test_too_frequent_text() {
        let text = Notification::TooFrequent {
            cooldown_secs: 5,
            remaining_secs: 3,
        }
        .to_string();
        assert!(text.contains("5s"));
        assert!(text.contains("3s"));
    }

    #[tokio::test]
    async fn test_recording_notifier() {
        let notifier = RecordingNotifier::failing_unknown_errors();
        notifier.notify(&Notification::Processing).await.unwrap();
        notifier.notify(&Notification::Busy).await.unwrap();
        assert!(
            notifier
                .notify(&Notification::UnknownError {
                    message: "x".to_string()
                })
                .await
                .is_err()
        );

        assert_eq!(notifier.shown().len(), 2);
        assert_eq!(notifier.terminal(), vec![Notification::Busy]);
    }
}
