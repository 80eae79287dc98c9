//! Adapter interfaces for the video platform.
//!
//! The sync pipeline only talks to the platform through [`PlaylistApi`],
//! so tests can swap in an in-memory implementation.

pub mod oauth;
pub mod youtube;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{PlaylistEntry, VideoRecord};

pub use oauth::{AccessToken, AuthError, OAuthClient, OAuthCredentials};
pub use youtube::YouTubeClient;

/// Maximum number of ids accepted by a single `videos.list` call
pub const MAX_IDS_PER_CALL: usize = 50;

/// One page of a paginated list call
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items on this page, in platform order
    pub items: Vec<T>,

    /// Cursor for the next page (`None` on the last page)
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    /// A page with no successor
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: None,
        }
    }
}

/// Errors raised by platform API calls
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {message} ({reason})")]
    Status {
        status: u16,
        reason: String,
        message: String,
    },

    #[error("Failed to decode API response: {0}")]
    Decode(String),
}

/// Error reasons the platform uses for quota and rate limiting
const QUOTA_REASONS: &[&str] = &[
    "quotaExceeded",
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "dailyLimitExceeded",
];

impl ApiError {
    /// Build a status error from its parts
    pub fn status(status: u16, reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            reason: reason.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the quota or rate limit is used up.
    ///
    /// Such failures are not retried and end the current phase.
    pub fn is_quota_exhausted(&self) -> bool {
        match self {
            ApiError::Status { status, reason, .. } => {
                *status == 429 || QUOTA_REASONS.contains(&reason.as_str())
            }
            _ => false,
        }
    }
}

/// Operations the sync pipeline needs from the video platform
#[async_trait]
pub trait PlaylistApi: Send + Sync {
    /// List the authenticated user's liked videos
    async fn list_liked_videos(
        &self,
        page_token: Option<String>,
    ) -> Result<Page<VideoRecord>, ApiError>;

    /// Fetch full metadata for up to [`MAX_IDS_PER_CALL`] ids
    async fn list_videos(
        &self,
        ids: &[String],
        page_token: Option<String>,
    ) -> Result<Page<VideoRecord>, ApiError>;

    /// List the entries of a playlist
    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<String>,
    ) -> Result<Page<PlaylistEntry>, ApiError>;

    /// Insert a video into a playlist (appends when `position` is `None`)
    async fn insert_playlist_item(
        &self,
        playlist_id: &str,
        video_id: &str,
        position: Option<u32>,
    ) -> Result<PlaylistEntry, ApiError>;

    /// Delete a playlist entry by its entry id
    async fn delete_playlist_item(&self, entry_id: &str) -> Result<(), ApiError>;
}
