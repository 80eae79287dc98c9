//! Candidate collection from liked videos and seed playlists.
//!
//! Each source yields an explicit [`SourceOutcome`]. A failing source is
//! recorded and skipped instead of aborting the run; the caller decides what
//! to do with the partial [`Collection`].

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::adapters::{ApiError, PlaylistApi, MAX_IDS_PER_CALL};
use crate::config::PlaylistSettings;
use crate::domain::{PlaylistEntry, PlaylistMembership, VideoRecord};

use super::filter::BanSet;
use super::paginate::Paginator;

/// Where a batch of candidates came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "playlist_id", rename_all = "snake_case")]
pub enum Source {
    /// The authenticated user's liked videos
    Liked,

    /// A curated seed playlist
    Seed(String),
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Liked => write!(f, "liked videos"),
            Source::Seed(id) => write!(f, "seed playlist {}", id),
        }
    }
}

/// Result of reading one source
#[derive(Debug, Clone)]
pub enum SourceOutcome {
    Fetched {
        source: Source,
        videos: Vec<VideoRecord>,
    },
    Failed {
        source: Source,
        reason: String,
    },
}

impl SourceOutcome {
    fn from_result(source: Source, result: Result<Vec<VideoRecord>, ApiError>) -> Self {
        match result {
            Ok(videos) => {
                info!(%source, count = videos.len(), "Fetched source");
                SourceOutcome::Fetched { source, videos }
            }
            Err(e) => {
                warn!(%source, error = %e, "Failed to fetch source, skipping");
                SourceOutcome::Failed {
                    source,
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn source(&self) -> &Source {
        match self {
            SourceOutcome::Fetched { source, .. } | SourceOutcome::Failed { source, .. } => source,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SourceOutcome::Failed { .. })
    }
}

/// Outcomes of every source read in one run
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub outcomes: Vec<SourceOutcome>,
}

impl Collection {
    /// Every fetched record, source by source (duplicates included)
    pub fn videos(&self) -> impl Iterator<Item = &VideoRecord> {
        self.outcomes.iter().flat_map(|outcome| match outcome {
            SourceOutcome::Fetched { videos, .. } => videos.as_slice(),
            SourceOutcome::Failed { .. } => &[][..],
        })
    }

    pub fn into_videos(self) -> impl Iterator<Item = VideoRecord> {
        self.outcomes.into_iter().flat_map(|outcome| match outcome {
            SourceOutcome::Fetched { videos, .. } => videos,
            SourceOutcome::Failed { .. } => Vec::new(),
        })
    }

    /// Failed sources with their reasons
    pub fn failures(&self) -> impl Iterator<Item = (&Source, &str)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            SourceOutcome::Failed { source, reason } => Some((source, reason.as_str())),
            SourceOutcome::Fetched { .. } => None,
        })
    }

    pub fn fetched_sources(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_failed()).count()
    }
}

/// Reads candidate videos through a [`PlaylistApi`]
pub struct Collector<'a, A: PlaylistApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: PlaylistApi + ?Sized> Collector<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Read every configured source, skipping the ones that fail
    #[instrument(skip_all, fields(seeds = settings.seeds.len()))]
    pub async fn collect(&self, settings: &PlaylistSettings) -> Collection {
        let mut collection = Collection::default();

        if settings.include_liked {
            let result = self.liked_videos().await;
            collection
                .outcomes
                .push(SourceOutcome::from_result(Source::Liked, result));
        }

        let mut seen = HashSet::new();
        for seed in &settings.seeds {
            if seed == &settings.target {
                warn!(playlist_id = %seed, "Seed playlist is the target playlist, skipping");
                continue;
            }
            if !seen.insert(seed.as_str()) {
                debug!(playlist_id = %seed, "Duplicate seed playlist, skipping");
                continue;
            }

            let result = self.seed_playlist(seed).await;
            collection
                .outcomes
                .push(SourceOutcome::from_result(Source::Seed(seed.clone()), result));
        }

        collection
    }

    /// All liked videos, with full metadata
    pub async fn liked_videos(&self) -> Result<Vec<VideoRecord>, ApiError> {
        let api = self.api;
        Paginator::new(move |token| api.list_liked_videos(token))
            .try_collect()
            .await
    }

    /// Full metadata for every video in a playlist
    pub async fn seed_playlist(&self, playlist_id: &str) -> Result<Vec<VideoRecord>, ApiError> {
        let ids: Vec<String> = self
            .membership(playlist_id)
            .await?
            .entries()
            .iter()
            .map(|e| e.video_id.clone())
            .collect();
        self.videos_by_id(&ids).await
    }

    /// Current entries of a playlist, in playlist order
    pub async fn membership(&self, playlist_id: &str) -> Result<PlaylistMembership, ApiError> {
        let api = self.api;
        let entries: Vec<PlaylistEntry> =
            Paginator::new(move |token| api.list_playlist_items(playlist_id, token))
                .try_collect()
                .await?;
        Ok(PlaylistMembership::new(entries))
    }

    /// Batch-fetch metadata, at most [`MAX_IDS_PER_CALL`] ids per request
    pub async fn videos_by_id(&self, ids: &[String]) -> Result<Vec<VideoRecord>, ApiError> {
        let api = self.api;
        let mut videos = Vec::with_capacity(ids.len());
        for batch in ids.chunks(MAX_IDS_PER_CALL) {
            let fetched = Paginator::new(move |token| api.list_videos(batch, token))
                .try_collect()
                .await?;
            videos.extend(fetched);
        }
        Ok(videos)
    }

    /// Video ids in the ban playlist (empty when none is configured)
    pub async fn ban_set(&self, ban_playlist: Option<&str>) -> Result<BanSet, ApiError> {
        let Some(playlist_id) = ban_playlist else {
            return Ok(BanSet::new());
        };

        let membership = self.membership(playlist_id).await?;
        let bans: BanSet = membership
            .entries()
            .iter()
            .map(|e| e.video_id.as_str())
            .collect();
        info!(playlist_id, count = bans.len(), "Loaded ban list");
        Ok(bans)
    }
}
