//! In-memory PlaylistApi used by the integration tests.
//!
//! Paginates every list call (small page size by default so cursors are
//! exercised) and records each call for later assertions.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use mixtape::{ApiError, Page, PlaylistApi, PlaylistEntry, VideoRecord};

/// A call made against the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListLiked(Option<String>),
    ListVideos(Vec<String>),
    ListItems(String, Option<String>),
    Insert { playlist_id: String, video_id: String },
    Delete(String),
}

#[derive(Debug, Clone, Copy)]
enum InsertFailure {
    NotFound,
    Quota,
}

#[derive(Default)]
struct State {
    liked: Vec<VideoRecord>,
    catalog: HashMap<String, VideoRecord>,
    playlists: HashMap<String, Vec<PlaylistEntry>>,
    liked_fails: bool,
    failing_playlists: HashSet<String>,
    insert_failures: HashMap<String, InsertFailure>,
    calls: Vec<Call>,
    next_entry: u64,
}

pub struct FakeApi {
    state: Mutex<State>,
    page_size: usize,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self::new()
    }
}

fn paginate<T: Clone>(items: &[T], page_token: Option<&str>, page_size: usize) -> Page<T> {
    let start: usize = page_token
        .map(|t| t.trim_start_matches("offset:").parse().unwrap())
        .unwrap_or(0);
    let end = (start + page_size).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        next_page_token: (end < items.len()).then(|| format!("offset:{}", end)),
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::with_page_size(7)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size,
        }
    }

    /// Liked videos (also added to the metadata catalog)
    pub fn liked(self, videos: Vec<VideoRecord>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for video in &videos {
                state.catalog.insert(video.id.clone(), video.clone());
            }
            state.liked = videos;
        }
        self
    }

    /// Videos known to `videos.list`
    pub fn catalog(self, videos: Vec<VideoRecord>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for video in videos {
                state.catalog.insert(video.id.clone(), video);
            }
        }
        self
    }

    /// A playlist whose entries point at `video_ids`
    pub fn playlist(self, playlist_id: &str, video_ids: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let entries = video_ids
                .iter()
                .enumerate()
                .map(|(i, v)| PlaylistEntry::new(format!("{}-e{}", playlist_id, i), *v))
                .collect();
            state.playlists.insert(playlist_id.to_string(), entries);
        }
        self
    }

    pub fn fail_liked(self) -> Self {
        self.state.lock().unwrap().liked_fails = true;
        self
    }

    pub fn fail_playlist(self, playlist_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_playlists
            .insert(playlist_id.to_string());
        self
    }

    pub fn fail_insert(self, video_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .insert_failures
            .insert(video_id.to_string(), InsertFailure::NotFound);
        self
    }

    pub fn exhaust_quota_on_insert(self, video_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .insert_failures
            .insert(video_id.to_string(), InsertFailure::Quota);
        self
    }

    pub fn entries(&self, playlist_id: &str) -> Vec<PlaylistEntry> {
        self.state
            .lock()
            .unwrap()
            .playlists
            .get(playlist_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn video_ids(&self, playlist_id: &str) -> Vec<String> {
        self.entries(playlist_id)
            .into_iter()
            .map(|e| e.video_id)
            .collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn inserted(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Insert { video_id, .. } => Some(video_id),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(entry_id) => Some(entry_id),
                _ => None,
            })
            .collect()
    }

    pub fn playlist_reads(&self, playlist_id: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::ListItems(id, None) if id == playlist_id))
            .count()
    }
}

#[async_trait]
impl PlaylistApi for FakeApi {
    async fn list_liked_videos(
        &self,
        page_token: Option<String>,
    ) -> Result<Page<VideoRecord>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListLiked(page_token.clone()));
        if state.liked_fails {
            return Err(ApiError::status(401, "authError", "Liked videos unavailable"));
        }
        Ok(paginate(&state.liked, page_token.as_deref(), self.page_size))
    }

    async fn list_videos(
        &self,
        ids: &[String],
        page_token: Option<String>,
    ) -> Result<Page<VideoRecord>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListVideos(ids.to_vec()));
        let found: Vec<VideoRecord> = ids
            .iter()
            .filter_map(|id| state.catalog.get(id).cloned())
            .collect();
        Ok(paginate(&found, page_token.as_deref(), self.page_size))
    }

    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<String>,
    ) -> Result<Page<PlaylistEntry>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::ListItems(playlist_id.to_string(), page_token.clone()));
        if state.failing_playlists.contains(playlist_id) {
            return Err(ApiError::status(404, "playlistNotFound", "Playlist not found"));
        }
        let entries = state.playlists.get(playlist_id).cloned().unwrap_or_default();
        Ok(paginate(&entries, page_token.as_deref(), self.page_size))
    }

    async fn insert_playlist_item(
        &self,
        playlist_id: &str,
        video_id: &str,
        position: Option<u32>,
    ) -> Result<PlaylistEntry, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Insert {
            playlist_id: playlist_id.to_string(),
            video_id: video_id.to_string(),
        });

        match state.insert_failures.get(video_id) {
            Some(InsertFailure::NotFound) => {
                return Err(ApiError::status(404, "videoNotFound", "Video not found"))
            }
            Some(InsertFailure::Quota) => {
                return Err(ApiError::status(403, "quotaExceeded", "Quota exceeded"))
            }
            None => {}
        }

        state.next_entry += 1;
        let entry = PlaylistEntry::new(format!("new-e{}", state.next_entry), video_id);
        let entries = state.playlists.entry(playlist_id.to_string()).or_default();
        match position {
            Some(pos) => entries.insert((pos as usize).min(entries.len()), entry.clone()),
            None => entries.push(entry.clone()),
        }
        Ok(entry)
    }

    async fn delete_playlist_item(&self, entry_id: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete(entry_id.to_string()));

        for entries in state.playlists.values_mut() {
            if let Some(pos) = entries.iter().position(|e| e.entry_id == entry_id) {
                entries.remove(pos);
                return Ok(());
            }
        }
        Err(ApiError::status(404, "playlistItemNotFound", "Entry not found"))
    }
}

/// An eligible track with the given id
pub fn track(id: &str) -> VideoRecord {
    VideoRecord::new(id, format!("Artist - Song {}", id), 200)
}

pub fn ids(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}
