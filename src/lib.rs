//! mixtape - Periodic music playlist rebuilder
//!
//! Pools a user's liked videos and curated seed playlists, filters out
//! anything that is not a playable music track, samples a random subset
//! and reconciles a target playlist toward it.
//!
//! # Architecture
//!
//! One run is a strictly sequential pass:
//! - Collector: liked videos + seed playlists (failed sources are skipped)
//! - Filter: ban list, privacy, embeddability, title, duration, region
//! - Selector: dedup by id, uniform shuffle, cap at `max_items`
//! - Reconciler: append missing videos, then trim everything past the cap
//!
//! # Modules
//!
//! - `adapters`: Platform API (YouTube Data API v3, OAuth refresh)
//! - `core`: Pipeline stages and the sync job
//! - `domain`: Data structures (VideoRecord, PlaylistMembership)
//! - `config`: Config file + environment resolution
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Rebuild the playlist (typically from cron)
//! mixtape sync
//!
//! # Preview without changing anything
//! mixtape sync --dry-run --json
//!
//! # Show resolved configuration
//! mixtape config
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{ApiError, Page, PlaylistApi};
pub use config::{PlaylistSettings, Settings};
pub use core::{SyncJob, SyncOptions, SyncReport};
pub use domain::{PlaylistEntry, PlaylistMembership, PrivacyStatus, VideoRecord};
