//! Video identifiers and display helpers

mod page;
mod quality;

pub use page::{UrlError, VIDEO_PAGE_PREFIX, VideoRef, is_valid_video_page};
pub use quality::quality_text;
