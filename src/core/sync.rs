//! Main sync job.
//!
//! Runs Collector → Filter → Selector → Reconciler once, strictly in order,
//! and reports what happened.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::PlaylistApi;
use crate::config::PlaylistSettings;

use super::collector::{Collector, Source};
use super::filter::FilterRules;
use super::reconciler::Reconciler;
use super::selector::Pool;

/// Per-run switches that are not part of the configuration
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Compute the changes without inserting or deleting anything
    pub dry_run: bool,

    /// Fixed shuffle seed (system entropy when `None`)
    pub seed: Option<u64>,
}

/// A source that was skipped
#[derive(Debug, Clone, Serialize)]
pub struct FailedSource {
    pub source: Source,
    pub reason: String,
}

/// Summary of one run
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,

    /// Sources read successfully
    pub sources_fetched: usize,

    /// Sources skipped because they failed
    pub sources_failed: Vec<FailedSource>,

    /// Records fetched across all sources, before filtering
    pub candidates: usize,

    /// Rejection counts by reason
    pub rejected: BTreeMap<&'static str, usize>,

    /// Distinct eligible videos
    pub pool_size: usize,

    /// Size of the selected desired set
    pub desired: usize,

    /// Videos inserted (or that would be, in a dry run)
    pub added: usize,

    /// Videos whose insert failed
    pub failed_inserts: usize,

    /// Entries trimmed (or that would be, in a dry run)
    pub deleted: usize,

    /// Approximate playlist size after the run
    pub final_size: usize,
}

impl SyncReport {
    /// The one-line summary printed on success
    pub fn summary_line(&self) -> String {
        let line = format!(
            "Desired {} | Added {} | Final size ~{}",
            self.desired, self.added, self.final_size
        );
        if self.dry_run {
            format!("Dry run: {}", line)
        } else {
            line
        }
    }
}

/// One pass of the playlist sync
pub struct SyncJob<'a, A: PlaylistApi + ?Sized> {
    api: &'a A,
    playlist: &'a PlaylistSettings,
    rules: &'a FilterRules,
}

impl<'a, A: PlaylistApi + ?Sized> SyncJob<'a, A> {
    pub fn new(api: &'a A, playlist: &'a PlaylistSettings, rules: &'a FilterRules) -> Self {
        Self {
            api,
            playlist,
            rules,
        }
    }

    /// Run the job, seeding the shuffle from `options.seed` or system entropy
    pub async fn run(&self, options: &SyncOptions) -> Result<SyncReport> {
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run_with_rng(options.dry_run, &mut rng).await
    }

    /// Run the job with a caller-supplied random source
    #[instrument(
        skip_all,
        fields(run_id = tracing::field::Empty, playlist_id = %self.playlist.target, dry_run = dry_run)
    )]
    pub async fn run_with_rng<R: Rng + Send>(&self, dry_run: bool, rng: &mut R) -> Result<SyncReport> {
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));
        let started_at = Utc::now();
        info!("Starting playlist sync");

        let collector = Collector::new(self.api);

        // A ban list that cannot be read must not be silently ignored
        let bans = collector
            .ban_set(self.playlist.ban.as_deref())
            .await
            .context("Failed to read ban playlist")?;

        let collection = collector.collect(self.playlist).await;
        let sources_failed: Vec<FailedSource> = collection
            .failures()
            .map(|(source, reason)| FailedSource {
                source: source.clone(),
                reason: reason.to_string(),
            })
            .collect();
        let sources_fetched = collection.fetched_sources();
        let candidates = collection.videos().count();

        let filtered = self.rules.apply(collection.into_videos(), &bans);
        debug!(
            candidates,
            eligible = filtered.eligible.len(),
            rejected = ?filtered.rejected,
            "Filtered candidates"
        );

        let pool: Pool = filtered.eligible.into_iter().collect();
        if pool.is_empty() {
            warn!("No eligible videos in pool");
        }

        let desired = pool.select(self.playlist.max_items, rng);
        info!(
            pool = pool.len(),
            desired = desired.len(),
            max_items = self.playlist.max_items,
            "Selected desired set"
        );

        let reconciler = Reconciler::new(self.api, &self.playlist.target, self.playlist.max_items)
            .with_insert_position(self.playlist.insert_position);
        let (added, failed_inserts, deleted, final_size) = if dry_run {
            let plan = reconciler.plan(&desired).await?;
            info!(
                to_add = plan.to_add.len(),
                to_trim = plan.projected_overflow,
                "Dry run, playlist left unchanged"
            );
            (plan.to_add.len(), 0, plan.projected_overflow, plan.projected_size)
        } else {
            let outcome = reconciler.reconcile(&desired).await?;
            (
                outcome.inserted.len(),
                outcome.failed_inserts.len(),
                outcome.deleted.len(),
                outcome.final_size,
            )
        };

        let report = SyncReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            dry_run,
            sources_fetched,
            sources_failed,
            candidates,
            rejected: filtered.rejected,
            pool_size: pool.len(),
            desired: desired.len(),
            added,
            failed_inserts,
            deleted,
            final_size,
        };
        info!(
            added = report.added,
            deleted = report.deleted,
            final_size = report.final_size,
            "Playlist sync finished"
        );
        Ok(report)
    }
}
