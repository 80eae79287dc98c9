//! Deduplication and random selection.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::VideoRecord;

/// Eligible videos keyed by id.
///
/// Iterates in id order so that a seeded shuffle is reproducible.
#[derive(Debug, Clone, Default)]
pub struct Pool {
    videos: BTreeMap<String, VideoRecord>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record; a later record with the same id replaces the earlier one
    pub fn insert(&mut self, video: VideoRecord) {
        self.videos.insert(video.id.clone(), video);
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn contains(&self, video_id: &str) -> bool {
        self.videos.contains_key(video_id)
    }

    pub fn get(&self, video_id: &str) -> Option<&VideoRecord> {
        self.videos.get(video_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.videos.keys().map(String::as_str)
    }

    /// Uniformly shuffle the pool and keep at most `max_items` ids
    pub fn select<R: Rng + ?Sized>(&self, max_items: usize, rng: &mut R) -> Vec<String> {
        let mut ids: Vec<String> = self.videos.keys().cloned().collect();
        ids.shuffle(rng);
        ids.truncate(max_items);
        ids
    }
}

impl Extend<VideoRecord> for Pool {
    fn extend<I: IntoIterator<Item = VideoRecord>>(&mut self, iter: I) {
        for video in iter {
            self.insert(video);
        }
    }
}

impl FromIterator<VideoRecord> for Pool {
    fn from_iter<I: IntoIterator<Item = VideoRecord>>(iter: I) -> Self {
        let mut pool = Self::new();
        pool.extend(iter);
        pool
    }
}
