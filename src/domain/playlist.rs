//! Playlist membership snapshots.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One row of a playlist.
///
/// The entry id is assigned per insertion and is what deletion needs; the
/// same video inserted twice gets two different entry ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    /// Platform-assigned playlist item id
    pub entry_id: String,

    /// Id of the video this row points at
    pub video_id: String,
}

impl PlaylistEntry {
    pub fn new(entry_id: impl Into<String>, video_id: impl Into<String>) -> Self {
        Self {
            entry_id: entry_id.into(),
            video_id: video_id.into(),
        }
    }
}

/// Ordered snapshot of a playlist's entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistMembership {
    entries: Vec<PlaylistEntry>,
}

impl PlaylistMembership {
    pub fn new(entries: Vec<PlaylistEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    /// Distinct video ids currently in the playlist
    pub fn video_ids(&self) -> HashSet<&str> {
        self.entries.iter().map(|e| e.video_id.as_str()).collect()
    }

    pub fn contains_video(&self, video_id: &str) -> bool {
        self.entries.iter().any(|e| e.video_id == video_id)
    }

    /// Entries at positions `max..`, in ascending position order
    pub fn overflow(&self, max: usize) -> &[PlaylistEntry] {
        self.entries.get(max..).unwrap_or(&[])
    }
}

impl FromIterator<PlaylistEntry> for PlaylistMembership {
    fn from_iter<I: IntoIterator<Item = PlaylistEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
