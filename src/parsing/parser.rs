use std::sync::Arc;

use bon::Builder;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::outcome::ParseOutcome;
use super::state::{BeginParse, ParseLease, ParsingStateMachine, Rejection};
use crate::clipboard::Clipboard;
use crate::clock::Clock;
use crate::ledger::{HistoryItem, HistoryLedger};
use crate::notify::{Notification, Notifier, ceil_secs};
use crate::observability::Metrics;
use crate::options::OptionsStore;
use crate::remote::{BiliClient, ParseReply, VideoMetadata};
use crate::store::StoreError;
use crate::video::{VideoRef, quality_text};

/// Default window in which today's history entry is served instead of re-parsing
pub const DEFAULT_REUSE_WINDOW_MS: i64 = 60 * 60 * 1000;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Parsing history not found")]
    HistoryNotFound(i64),
}

/// Parse pipeline: URL check, history reuse, gating, remote calls, history
/// write, clipboard write and exactly one terminal notification.
#[derive(Builder)]
pub struct VideoParser {
    client: BiliClient,
    ledger: HistoryLedger,
    state: Arc<ParsingStateMachine>,
    options: OptionsStore,
    clipboard: Arc<dyn Clipboard>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    #[builder(default = DEFAULT_REUSE_WINDOW_MS)]
    reuse_window_ms: i64,
    #[builder(default)]
    metrics: Arc<Metrics>,
}

impl VideoParser {
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    pub fn state(&self) -> &ParsingStateMachine {
        &self.state
    }

    /// Resolve `page_url` to a media URL and copy it to the clipboard.
    /// Never fails; every error becomes an outcome.
    pub async fn parse(&self, page_url: &str) -> ParseOutcome {
        let outcome = match self.run(page_url).await {
            Ok(outcome) => outcome,
            Err(e) => self.unknown_error(e.to_string()).await,
        };
        self.record(&outcome);
        outcome
    }

    /// Parse the page behind a history entry again
    pub async fn reparse_history_item(&self, history_id: i64) -> ParseOutcome {
        match self.ledger.find_by_id(history_id).await {
            Ok(Some(item)) => {
                info!(history_id, video = %item.video(), "Re-parsing history item");
                self.parse(&item.page_url).await
            }
            Ok(None) => {
                let outcome = self
                    .unknown_error(PipelineError::HistoryNotFound(history_id).to_string())
                    .await;
                self.record(&outcome);
                outcome
            }
            Err(e) => {
                let outcome = self.unknown_error(PipelineError::from(e).to_string()).await;
                self.record(&outcome);
                outcome
            }
        }
    }

    async fn run(&self, page_url: &str) -> Result<ParseOutcome, PipelineError> {
        let video = match VideoRef::from_page_url(page_url) {
            Ok(video) => video,
            Err(e) => {
                debug!(page_url, error = %e, "Rejected page URL");
                self.show(Notification::InvalidUrl).await;
                return Ok(ParseOutcome::InvalidUrl);
            }
        };

        let now = self.clock.now_ms();
        if let Some(item) = self
            .ledger
            .find_item(&video.video_id, video.page_number, now)
            .await?
        {
            if now - item.last_parsing_timestamp <= self.reuse_window_ms {
                return self.reuse(&video, item, now).await;
            }
        }

        match self.state.try_begin_parse(now).await? {
            BeginParse::Accepted => {}
            BeginParse::Rejected(Rejection::Busy) => {
                debug!(video = %video, "Parse rejected while another is in flight");
                self.show(Notification::Busy).await;
                return Ok(ParseOutcome::Busy);
            }
            BeginParse::Rejected(Rejection::Cooldown { remaining_ms }) => {
                debug!(video = %video, remaining_ms, "Parse rejected during cooldown");
                self.show(Notification::TooFrequent {
                    cooldown_secs: ceil_secs(self.state.cooldown_ms()),
                    remaining_secs: ceil_secs(remaining_ms),
                })
                .await;
                return Ok(ParseOutcome::Cooldown { remaining_ms });
            }
        }

        let lease = ParseLease::new(self.state.clone(), self.clock.clone());
        let outcome = self.parse_remote(&video).await;
        if let Err(e) = lease.release().await {
            error!(error = %e, "Failed to release parsing status");
        }

        Ok(outcome)
    }

    async fn reuse(
        &self,
        video: &VideoRef,
        item: HistoryItem,
        now: i64,
    ) -> Result<ParseOutcome, PipelineError> {
        info!(video = %video, history_id = item.history_id, "Reusing parsed media URL");
        self.ledger
            .touch_last_used(&video.video_id, video.page_number, now, now)
            .await?;

        let outcome = match self.clipboard.write_text(&item.parsed_media_url).await {
            Ok(()) => {
                self.show(Notification::ClipboardWriteSuccessful {
                    quality: item.quality_text().to_string(),
                    title: item.title.clone(),
                })
                .await;
                ParseOutcome::Reused {
                    media_url: item.parsed_media_url,
                    quality_code: item.parsed_media_quality_code,
                }
            }
            Err(e) => {
                warn!(error = %e, "Clipboard write failed");
                self.show(Notification::ClipboardWriteFailed {
                    message: e.to_string(),
                })
                .await;
                ParseOutcome::ClipboardFailed
            }
        };
        Ok(outcome)
    }

    /// The network branch; runs only while the parsing status is held
    async fn parse_remote(&self, video: &VideoRef) -> ParseOutcome {
        self.show(Notification::Processing).await;
        info!(video = %video, "Parsing video");

        let (metadata, reply) = tokio::join!(
            self.client.video_metadata(video),
            self.client.parse_media(video)
        );

        let metadata = metadata.unwrap_or_else(|e| {
            warn!(video = %video, error = %e, "Video metadata unavailable, using placeholders");
            VideoMetadata::placeholder()
        });

        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                warn!(video = %video, error = %e, "Parsing endpoint unreachable");
                self.show(Notification::FetchFailed {
                    message: e.to_string(),
                })
                .await;
                return ParseOutcome::FetchFailed;
            }
        };

        match reply {
            ParseReply::Success {
                media_url,
                quality_code,
            } => self.complete(video, metadata, media_url, quality_code).await,
            ParseReply::Failed { message } => {
                info!(video = %video, api_message = %message, "Parsing endpoint refused the video");
                self.show(Notification::ParsingFailed {
                    message: message.clone(),
                })
                .await;
                ParseOutcome::ParseFailed { message }
            }
            ParseReply::UnknownCode(code) => {
                self.unknown_error(format!("API returned unknown code {code}"))
                    .await
            }
            ParseReply::MissingMediaUrl => {
                self.unknown_error("API returned no media URL".to_string())
                    .await
            }
        }
    }

    async fn complete(
        &self,
        video: &VideoRef,
        metadata: VideoMetadata,
        media_url: String,
        quality_code: i64,
    ) -> ParseOutcome {
        let now = self.clock.now_ms();
        let item = HistoryItem {
            history_id: now,
            video_id: video.video_id.clone(),
            page_number: video.page_number,
            title: metadata.title,
            subtitle: metadata.subtitle,
            uploader_name: metadata.uploader_name,
            thumbnail_url: metadata.thumbnail_url,
            content_id: metadata.content_id,
            page_url: video.page_url(),
            parsed_media_url: media_url.clone(),
            parsed_media_quality_code: quality_code,
            last_parsing_timestamp: now,
            last_used_timestamp: now,
        };
        let title = item.title.clone();

        if let Err(e) = self.save_history(item).await {
            warn!(video = %video, error = %e, "Failed to save parsing history");
        }

        match self.clipboard.write_text(&media_url).await {
            Ok(()) => {
                info!(video = %video, quality_code, "Parsed media URL copied");
                self.show(Notification::ParsingSuccessful {
                    quality: quality_text(quality_code).to_string(),
                    title,
                })
                .await;
                ParseOutcome::Parsed {
                    media_url,
                    quality_code,
                }
            }
            Err(e) => {
                warn!(error = %e, "Clipboard write failed");
                self.show(Notification::ClipboardWriteFailed {
                    message: e.to_string(),
                })
                .await;
                ParseOutcome::ClipboardFailed
            }
        }
    }

    async fn save_history(&self, item: HistoryItem) -> Result<(), StoreError> {
        let options = self.options.load().await?;
        if !options.history_enabled() {
            debug!("History disabled, not recording parse");
            return Ok(());
        }
        self.ledger.upsert(item).await
    }

    async fn unknown_error(&self, message: String) -> ParseOutcome {
        error!(error = %message, "Parse ended with an unknown error");
        self.show(Notification::UnknownError {
            message: message.clone(),
        })
        .await;
        ParseOutcome::UnknownError { message }
    }

    /// Show a notification, falling back to the unknown-error popup and then
    /// to the critical display when rendering fails.
    async fn show(&self, notification: Notification) {
        let Err(e) = self.notifier.notify(&notification).await else {
            return;
        };

        match notification {
            Notification::UnknownError { message } => {
                warn!(error = %e, "Unknown-error popup failed");
                self.notifier.critical(&message);
            }
            Notification::Processing => {
                warn!(error = %e, "Processing popup failed");
            }
            other => {
                warn!(error = %e, notification = ?other, "Popup failed");
                let fallback = Notification::UnknownError {
                    message: e.to_string(),
                };
                if self.notifier.notify(&fallback).await.is_err() {
                    self.notifier.critical(&e.to_string());
                }
            }
        }
    }

    fn record(&self, outcome: &ParseOutcome) {
        match outcome {
            ParseOutcome::Parsed { .. } => self.metrics.parse_completed(),
            ParseOutcome::Reused { .. } => self.metrics.history_reused(),
            rejected if rejected.is_rejection() => self.metrics.request_rejected(),
            _ => self.metrics.parse_failed(),
        }
    }
}
