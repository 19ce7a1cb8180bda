//! HTTP client for the metadata and parsing endpoints

use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::models::{ParseApiResponse, ParseReply, VideoMetadata, ViewResponse};
use crate::config::{EndpointsConfig, HttpConfig};
use crate::video::VideoRef;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Page {0} not found in video metadata")]
    PageNotFound(u32),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Client for the two remote endpoints
#[derive(Debug, Clone)]
pub struct BiliClient {
    client: Client,
    endpoints: EndpointsConfig,
}

impl BiliClient {
    pub fn new(endpoints: EndpointsConfig, http: &HttpConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(http.connect_timeout.as_duration())
            .user_agent(&http.user_agent);

        if let Some(timeout) = http.request_timeout {
            builder = builder.timeout(timeout.as_duration());
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;

        Ok(Self { client, endpoints })
    }

    /// Title, uploader, thumbnail and page info for `video`
    pub async fn video_metadata(&self, video: &VideoRef) -> Result<VideoMetadata> {
        let url = build_url(
            &self.endpoints.metadata_url,
            &[("bvid", video.video_id.clone())],
        )?;
        let response: ViewResponse = self.get_json(url).await?;

        let Some(data) = response.data else {
            return Err(ClientError::Api {
                code: response.code,
                message: response.message.unwrap_or_default(),
            });
        };

        let page_count = data.pages.len();
        let page = data
            .pages
            .into_iter()
            .find(|page| page.page == video.page_number)
            .ok_or(ClientError::PageNotFound(video.page_number))?;

        Ok(VideoMetadata {
            title: data.title,
            subtitle: if page_count > 1 { page.part } else { None },
            uploader_name: data.owner.name,
            thumbnail_url: data.pic,
            content_id: page.cid,
        })
    }

    /// Ask the parsing endpoint for a direct media URL
    pub async fn parse_media(&self, video: &VideoRef) -> Result<ParseReply> {
        let url = build_url(
            &self.endpoints.parsing_url,
            &[
                ("bv", video.video_id.clone()),
                ("p", video.page_number.to_string()),
                ("format", self.endpoints.media_format.clone()),
                ("otype", "json".to_string()),
            ],
        )?;
        let response: ParseApiResponse = self.get_json(url).await?;
        debug!(code = response.code, "Parsing endpoint replied");
        Ok(response.into())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(url = %url, "Sending request");

        let response = self.client.get(url.as_str()).send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout
            } else {
                ClientError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::RequestFailed(format!("Failed to read body: {}", e)))?;

        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn build_url(base: &str, params: &[(&str, String)]) -> Result<Url> {
    Url::parse_with_params(base, params).map_err(|e| ClientError::InvalidUrl(format!("{base}: {e}")))
}
