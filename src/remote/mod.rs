//! Remote endpoints: video metadata and the media URL resolver

mod client;
pub mod models;

pub use client::{BiliClient, ClientError, Result};
pub use models::{PLACEHOLDER_TEXT, ParseReply, VideoMetadata};
