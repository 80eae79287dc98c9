//! YouTube Data API v3 client.
//!
//! Thin reqwest wrapper over the four calls the sync job needs. Responses
//! are decoded into wire structs and converted to domain types here so the
//! rest of the crate never sees the raw JSON shape.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::oauth::AccessToken;
use super::{ApiError, Page, PlaylistApi, MAX_IDS_PER_CALL};
use crate::domain::{parse_duration, PlaylistEntry, PrivacyStatus, VideoRecord};

/// Default API root
pub const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

const VIDEO_PARTS: &str = "snippet,contentDetails,status";
const PAGE_SIZE: &str = "50";

/// Authenticated YouTube Data API client
pub struct YouTubeClient {
    base_url: String,
    token: AccessToken,
    client: reqwest::Client,
}

// ----------------------------------------------------------------------------
// Wire format
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    id: String,
    snippet: Option<VideoSnippet>,
    content_details: Option<VideoContentDetails>,
    status: Option<VideoStatus>,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoContentDetails {
    #[serde(default)]
    duration: String,
    region_restriction: Option<RegionRestriction>,
}

#[derive(Debug, Deserialize)]
struct RegionRestriction {
    #[serde(default)]
    blocked: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatus {
    #[serde(default)]
    privacy_status: PrivacyStatus,
    embeddable: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemResource {
    id: String,
    content_details: Option<PlaylistItemContentDetails>,
    snippet: Option<PlaylistItemSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemContentDetails {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippet {
    resource_id: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: String,
}

impl From<VideoResource> for VideoRecord {
    fn from(resource: VideoResource) -> Self {
        let (duration_secs, blocked_regions) = match resource.content_details {
            Some(details) => (
                parse_duration(&details.duration),
                details
                    .region_restriction
                    .map(|r| r.blocked)
                    .unwrap_or_default(),
            ),
            None => (0, Vec::new()),
        };
        let (privacy, embeddable) = match resource.status {
            Some(status) => (status.privacy_status, status.embeddable),
            None => (PrivacyStatus::Unknown, None),
        };

        VideoRecord {
            id: resource.id,
            title: resource.snippet.map(|s| s.title).unwrap_or_default(),
            duration_secs,
            privacy,
            embeddable,
            blocked_regions,
        }
    }
}

impl PlaylistItemResource {
    fn into_entry(self) -> Option<PlaylistEntry> {
        let video_id = self
            .content_details
            .and_then(|d| d.video_id)
            .or_else(|| self.snippet.and_then(|s| s.resource_id).and_then(|r| r.video_id))?;
        Some(PlaylistEntry::new(self.id, video_id))
    }
}

/// Empty-string cursors mean "no more pages"
fn normalize_token(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Turn a non-success response into an [`ApiError::Status`]
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

fn status_error(status: StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let reason = envelope
                .error
                .errors
                .into_iter()
                .map(|d| d.reason)
                .find(|r| !r.is_empty())
                .unwrap_or_default();
            ApiError::status(status.as_u16(), reason, envelope.error.message)
        }
        Err(_) => ApiError::status(status.as_u16(), "", body.trim()),
    }
}

impl YouTubeClient {
    /// Create a client against the public API
    pub fn new(token: AccessToken) -> Self {
        Self::with_base_url(token, API_BASE)
    }

    /// Create a client against a different API root
    pub fn with_base_url(token: AccessToken, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.endpoint(resource))
            .bearer_auth(self.token.secret())
            .query(query)
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;
        decode(&body)
    }

    async fn list_video_page(
        &self,
        mut query: Vec<(&str, String)>,
        page_token: Option<String>,
    ) -> Result<Page<VideoRecord>, ApiError> {
        query.push(("part", VIDEO_PARTS.to_string()));
        query.push(("maxResults", PAGE_SIZE.to_string()));
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response: ListResponse<VideoResource> = self.get_json("videos", &query).await?;
        Ok(Page {
            items: response.items.into_iter().map(VideoRecord::from).collect(),
            next_page_token: normalize_token(response.next_page_token),
        })
    }
}

#[async_trait]
impl PlaylistApi for YouTubeClient {
    #[instrument(skip(self))]
    async fn list_liked_videos(
        &self,
        page_token: Option<String>,
    ) -> Result<Page<VideoRecord>, ApiError> {
        self.list_video_page(vec![("myRating", "like".to_string())], page_token)
            .await
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn list_videos(
        &self,
        ids: &[String],
        page_token: Option<String>,
    ) -> Result<Page<VideoRecord>, ApiError> {
        if ids.len() > MAX_IDS_PER_CALL {
            return Err(ApiError::status(
                400,
                "tooManyIds",
                format!("{} ids exceeds the limit of {}", ids.len(), MAX_IDS_PER_CALL),
            ));
        }
        self.list_video_page(vec![("id", ids.join(","))], page_token)
            .await
    }

    #[instrument(skip(self))]
    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<String>,
    ) -> Result<Page<PlaylistEntry>, ApiError> {
        let mut query = vec![
            ("part", "contentDetails".to_string()),
            ("playlistId", playlist_id.to_string()),
            ("maxResults", PAGE_SIZE.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response: ListResponse<PlaylistItemResource> =
            self.get_json("playlistItems", &query).await?;
        let total = response.items.len();
        let items: Vec<PlaylistEntry> = response
            .items
            .into_iter()
            .filter_map(PlaylistItemResource::into_entry)
            .collect();
        if items.len() < total {
            debug!(skipped = total - items.len(), "Playlist items without a video id");
        }

        Ok(Page {
            items,
            next_page_token: normalize_token(response.next_page_token),
        })
    }

    #[instrument(skip(self))]
    async fn insert_playlist_item(
        &self,
        playlist_id: &str,
        video_id: &str,
        position: Option<u32>,
    ) -> Result<PlaylistEntry, ApiError> {
        let mut snippet = serde_json::json!({
            "playlistId": playlist_id,
            "resourceId": {
                "kind": "youtube#video",
                "videoId": video_id,
            },
        });
        if let Some(position) = position {
            snippet["position"] = serde_json::json!(position);
        }

        let response = self
            .client
            .post(self.endpoint("playlistItems"))
            .bearer_auth(self.token.secret())
            .query(&[("part", "snippet")])
            .json(&serde_json::json!({ "snippet": snippet }))
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;
        let item: PlaylistItemResource = decode(&body)?;
        let entry_id = item.id.clone();
        Ok(item
            .into_entry()
            .unwrap_or_else(|| PlaylistEntry::new(entry_id, video_id)))
    }

    #[instrument(skip(self))]
    async fn delete_playlist_item(&self, entry_id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.endpoint("playlistItems"))
            .bearer_auth(self.token.secret())
            .query(&[("id", entry_id)])
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}
