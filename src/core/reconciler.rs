//! Target playlist reconciliation.
//!
//! Two phases against the live playlist:
//! 1. Insert: add every desired video that is not already present
//! 2. Trim: delete every entry positioned beyond the cap
//!
//! Entries within the cap are never removed, even if they were not selected
//! this run. Pruning is purely size-driven.

use std::collections::HashSet;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::adapters::PlaylistApi;
use crate::domain::{PlaylistEntry, PlaylistMembership};

use super::collector::Collector;

/// Where new videos go in the target playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
    /// Append at the end (platform default)
    #[default]
    Append,

    /// Insert at position 0, so the oldest entries fall past the cap
    Top,
}

impl InsertPosition {
    /// Explicit position to send with the insert call
    pub fn as_position(self) -> Option<u32> {
        match self {
            InsertPosition::Append => None,
            InsertPosition::Top => Some(0),
        }
    }
}

/// What one reconciliation pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    /// Video ids inserted, in issuance order
    pub inserted: Vec<String>,

    /// Video ids whose insert failed (not added this run)
    pub failed_inserts: Vec<String>,

    /// Entry ids deleted by the trim phase, in position order
    pub deleted: Vec<String>,

    /// Playlist size after trimming
    pub final_size: usize,
}

/// What a pass would change, computed without mutating anything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcilePlan {
    /// Video ids that would be inserted
    pub to_add: Vec<String>,

    /// Existing entries that would be trimmed.
    ///
    /// Inserted videos never show up here because they get entry ids only
    /// once inserted; `projected_overflow` accounts for them.
    pub to_trim: Vec<PlaylistEntry>,

    /// Total number of rows that would be trimmed
    pub projected_overflow: usize,

    /// Size before any change
    pub current_size: usize,

    /// Size after inserts and trim
    pub projected_size: usize,
}

/// Desired ids missing from `current`, in desired order and without repeats
pub fn missing_videos(desired: &[String], current: &PlaylistMembership) -> Vec<String> {
    let mut present: HashSet<&str> = current.video_ids();
    desired
        .iter()
        .filter(|id| present.insert(id.as_str()))
        .cloned()
        .collect()
}

/// Converges one playlist toward a desired set under a size cap
pub struct Reconciler<'a, A: PlaylistApi + ?Sized> {
    api: &'a A,
    playlist_id: &'a str,
    max_items: usize,
    insert_position: InsertPosition,
}

impl<'a, A: PlaylistApi + ?Sized> Reconciler<'a, A> {
    pub fn new(api: &'a A, playlist_id: &'a str, max_items: usize) -> Self {
        Self {
            api,
            playlist_id,
            max_items,
            insert_position: InsertPosition::default(),
        }
    }

    pub fn with_insert_position(mut self, insert_position: InsertPosition) -> Self {
        self.insert_position = insert_position;
        self
    }

    async fn read_membership(&self) -> Result<PlaylistMembership> {
        Collector::new(self.api)
            .membership(self.playlist_id)
            .await
            .with_context(|| format!("Failed to read target playlist {}", self.playlist_id))
    }

    /// Run the insert phase then the trim phase
    #[instrument(skip(self, desired), fields(playlist_id = %self.playlist_id, desired = desired.len()))]
    pub async fn reconcile(&self, desired: &[String]) -> Result<ReconcileOutcome> {
        let (inserted, failed_inserts) = self.insert_missing(desired).await?;
        let (deleted, final_size) = self.trim_overflow().await?;

        Ok(ReconcileOutcome {
            inserted,
            failed_inserts,
            deleted,
            final_size,
        })
    }

    /// Insert desired videos absent from the playlist.
    ///
    /// A failed insert is skipped unless it signals quota exhaustion, which
    /// ends the phase with an error.
    pub async fn insert_missing(&self, desired: &[String]) -> Result<(Vec<String>, Vec<String>)> {
        let current = self.read_membership().await?;
        let to_add = missing_videos(desired, &current);
        info!(
            current = current.len(),
            to_add = to_add.len(),
            "Starting insert phase"
        );

        let mut inserted = Vec::with_capacity(to_add.len());
        let mut failed = Vec::new();
        for video_id in to_add {
            match self
                .api
                .insert_playlist_item(self.playlist_id, &video_id, self.insert_position.as_position())
                .await
            {
                Ok(entry) => {
                    info!(%video_id, entry_id = %entry.entry_id, "Inserted video");
                    inserted.push(video_id);
                }
                Err(e) if e.is_quota_exhausted() => {
                    return Err(anyhow::Error::new(e)
                        .context(format!("Quota exhausted while inserting {}", video_id)));
                }
                Err(e) => {
                    warn!(%video_id, error = %e, "Insert failed, skipping video");
                    failed.push(video_id);
                }
            }
        }

        Ok((inserted, failed))
    }

    /// Delete every entry beyond the cap, by entry id.
    ///
    /// Returns the deleted entry ids and the resulting size.
    pub async fn trim_overflow(&self) -> Result<(Vec<String>, usize)> {
        let current = self.read_membership().await?;
        let overflow = current.overflow(self.max_items);
        if overflow.is_empty() {
            return Ok((Vec::new(), current.len()));
        }

        info!(
            current = current.len(),
            max_items = self.max_items,
            overflow = overflow.len(),
            "Trimming playlist"
        );

        // Deletion is by entry id, so the order within one snapshot is irrelevant
        let mut deleted = Vec::with_capacity(overflow.len());
        for entry in overflow {
            self.api
                .delete_playlist_item(&entry.entry_id)
                .await
                .with_context(|| {
                    format!(
                        "Failed to delete entry {} (video {})",
                        entry.entry_id, entry.video_id
                    )
                })?;
            info!(entry_id = %entry.entry_id, video_id = %entry.video_id, "Deleted entry");
            deleted.push(entry.entry_id.clone());
        }

        let final_size = current.len() - deleted.len();
        Ok((deleted, final_size))
    }

    /// Compute the changes a pass would make, without calling any mutation
    pub async fn plan(&self, desired: &[String]) -> Result<ReconcilePlan> {
        let current = self.read_membership().await?;
        let to_add = missing_videos(desired, &current);

        let grown = current.len() + to_add.len();
        let projected_overflow = grown.saturating_sub(self.max_items);
        let to_trim = match self.insert_position {
            InsertPosition::Append => current.overflow(self.max_items),
            // New rows push existing ones down by `to_add.len()` positions
            InsertPosition::Top => current.overflow(self.max_items.saturating_sub(to_add.len())),
        }
        .to_vec();

        Ok(ReconcilePlan {
            current_size: current.len(),
            projected_size: grown - projected_overflow,
            projected_overflow,
            to_add,
            to_trim,
        })
    }
}
