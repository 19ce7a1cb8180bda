use crate::humanize::DurationSpec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub parsing: ParsingConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Remote API endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointsConfig {
    /// Video metadata (title, uploader, pages)
    #[serde(default = "default_metadata_url")]
    pub metadata_url: String,
    /// Third-party media URL resolver
    #[serde(default = "default_parsing_url")]
    pub parsing_url: String,
    #[serde(default = "default_media_format")]
    pub media_format: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            metadata_url: default_metadata_url(),
            parsing_url: default_parsing_url(),
            media_format: default_media_format(),
        }
    }
}

fn default_metadata_url() -> String {
    "https://api.bilibili.com/x/web-interface/view".to_string()
}

fn default_parsing_url() -> String {
    "https://api.injahow.cn/bparse/".to_string()
}

fn default_media_format() -> String {
    "mp4".to_string()
}

/// Parse pipeline time windows
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParsingConfig {
    /// Minimum spacing between network parses
    #[serde(default = "default_cooldown")]
    pub cooldown: DurationSpec,
    /// How long a same-day history entry is served instead of re-parsing
    #[serde(default = "default_reuse_window")]
    pub reuse_window: DurationSpec,
    /// Age after which a `parsing` status nobody released is reclaimed
    #[serde(default = "default_lease")]
    pub lease: DurationSpec,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            cooldown: default_cooldown(),
            reuse_window: default_reuse_window(),
            lease: default_lease(),
        }
    }
}

fn default_cooldown() -> DurationSpec {
    DurationSpec::from_secs(5)
}

fn default_reuse_window() -> DurationSpec {
    DurationSpec::from_secs(60 * 60)
}

fn default_lease() -> DurationSpec {
    DurationSpec::from_secs(5 * 60)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_fjall_path")]
    pub fjall_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            fjall_path: default_fjall_path(),
        }
    }
}

fn default_fjall_path() -> PathBuf {
    PathBuf::from("data/store")
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: DurationSpec,
    /// Whole-request timeout; unset means wait indefinitely
    #[serde(default)]
    pub request_timeout: Option<DurationSpec>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout: default_connect_timeout(),
            request_timeout: None,
        }
    }
}

fn default_user_agent() -> String {
    format!("bili2vrc/{}", env!("CARGO_PKG_VERSION"))
}

fn default_connect_timeout() -> DurationSpec {
    DurationSpec::from_secs(10)
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "bili2vrc=info".to_string()
}
