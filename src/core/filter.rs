//! Eligibility rules for candidate videos.
//!
//! Rejects anything that is not a plausible, playable music track:
//! - Banned ids
//! - Non-public or non-embeddable videos
//! - Titles that look like live recordings
//! - Clips and long-form content (outside the duration window)
//! - Region-blocked videos

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{PrivacyStatus, VideoRecord};

/// Thresholds for the eligibility checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterRules {
    /// Shortest accepted duration in seconds, inclusive (default: 90)
    #[serde(default = "default_min_duration")]
    pub min_duration_secs: u64,

    /// Longest accepted duration in seconds, inclusive (default: 540 = 9 min)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: u64,

    /// Case-insensitive title substring that marks a video as a live recording
    #[serde(default = "default_title_keyword")]
    pub title_keyword: String,
}

fn default_min_duration() -> u64 {
    90
}
fn default_max_duration() -> u64 {
    540
}
fn default_title_keyword() -> String {
    "live".to_string()
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            min_duration_secs: default_min_duration(),
            max_duration_secs: default_max_duration(),
            title_keyword: default_title_keyword(),
        }
    }
}

/// Why a video was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Video is on the ban list")]
    Banned,

    #[error("Video is {0}, not public")]
    NotPublic(PrivacyStatus),

    #[error("Video cannot be embedded")]
    NotEmbeddable,

    #[error("Title looks like a live recording")]
    LiveTitle,

    #[error("Duration {actual}s is below the {limit}s minimum")]
    TooShort { actual: u64, limit: u64 },

    #[error("Duration {actual}s is above the {limit}s maximum")]
    TooLong { actual: u64, limit: u64 },

    #[error("Video is blocked in {0} region(s)")]
    RegionBlocked(usize),
}

impl Rejection {
    /// Stable short name used for rejection statistics
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::Banned => "banned",
            Rejection::NotPublic(_) => "not_public",
            Rejection::NotEmbeddable => "not_embeddable",
            Rejection::LiveTitle => "live_title",
            Rejection::TooShort { .. } => "too_short",
            Rejection::TooLong { .. } => "too_long",
            Rejection::RegionBlocked(_) => "region_blocked",
        }
    }
}

/// Video ids excluded unconditionally
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BanSet(HashSet<String>);

impl BanSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, video_id: &str) -> bool {
        self.0.contains(video_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for BanSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl FilterRules {
    /// Check one record; the first failing rule wins
    pub fn check(&self, video: &VideoRecord, bans: &BanSet) -> Result<(), Rejection> {
        if bans.contains(&video.id) {
            return Err(Rejection::Banned);
        }

        if video.privacy != PrivacyStatus::Public {
            return Err(Rejection::NotPublic(video.privacy));
        }

        // Absent flag means embeddable
        if video.embeddable == Some(false) {
            return Err(Rejection::NotEmbeddable);
        }

        if self.is_live_title(&video.title) {
            return Err(Rejection::LiveTitle);
        }

        if video.duration_secs < self.min_duration_secs {
            return Err(Rejection::TooShort {
                actual: video.duration_secs,
                limit: self.min_duration_secs,
            });
        }
        if video.duration_secs > self.max_duration_secs {
            return Err(Rejection::TooLong {
                actual: video.duration_secs,
                limit: self.max_duration_secs,
            });
        }

        if video.is_region_blocked() {
            return Err(Rejection::RegionBlocked(video.blocked_regions.len()));
        }

        Ok(())
    }

    pub fn is_eligible(&self, video: &VideoRecord, bans: &BanSet) -> bool {
        self.check(video, bans).is_ok()
    }

    fn is_live_title(&self, title: &str) -> bool {
        !self.title_keyword.is_empty()
            && title
                .to_lowercase()
                .contains(&self.title_keyword.to_lowercase())
    }

    /// Split candidates into eligible records and rejection counts
    pub fn apply<I>(&self, candidates: I, bans: &BanSet) -> FilterOutcome
    where
        I: IntoIterator<Item = VideoRecord>,
    {
        let mut outcome = FilterOutcome::default();
        for video in candidates {
            match self.check(&video, bans) {
                Ok(()) => outcome.eligible.push(video),
                Err(rejection) => {
                    *outcome.rejected.entry(rejection.kind()).or_default() += 1;
                }
            }
        }
        outcome
    }
}

/// Result of filtering a batch of candidates
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Records that passed every rule, in input order
    pub eligible: Vec<VideoRecord>,

    /// Rejection counts keyed by [`Rejection::kind`]
    pub rejected: BTreeMap<&'static str, usize>,
}

impl FilterOutcome {
    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }
}
