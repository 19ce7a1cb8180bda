//! Write-only clipboard sink

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Clipboard write failed: {0}")]
    WriteFailed(String),
}

pub type Result<T> = std::result::Result<T, ClipboardError>;

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<()>;
}

/// Desktop clipboard via `arboard`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        let text = text.to_string();
        tokio::task::spawn_blocking(move || {
            let mut clipboard = arboard::Clipboard::new()
                .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            clipboard
                .set_text(text)
                .map_err(|e| ClipboardError::WriteFailed(e.to_string()))
        })
        .await
        .map_err(|e| ClipboardError::WriteFailed(format!("clipboard task failed: {e}")))??;

        debug!("Clipboard written");
        Ok(())
    }
}

/// Records every write; used by tests and headless runs
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    writes: Mutex<Vec<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().map(|writes| writes.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.writes().pop()
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        self.writes
            .lock()
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()))?
            .push(text.to_string());
        Ok(())
    }
}

/// Clipboard that rejects every write
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableClipboard;

#[async_trait]
impl Clipboard for UnavailableClipboard {
    async fn write_text(&self, _text: &str) -> Result<()> {
        Err(ClipboardError::Unavailable("no clipboard".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_clipboard_records_writes() {
        let clipboard = MemoryClipboard::new();
        clipboard.write_text("a").await.unwrap();
        clipboard.write_text("b").await.unwrap();

        assert_eq!(clipboard.writes(), vec!["a", "b"]);
        assert_eq!(clipboard.last().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_unavailable_clipboard_fails() {
        assert!(UnavailableClipboard.write_text("a").await.is_err());
    }
}
