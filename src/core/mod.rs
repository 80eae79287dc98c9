//! Core sync logic.
//!
//! This module contains:
//! - Paginator: Cursor-following list reads
//! - Collector: Liked-video and seed-playlist collection
//! - Filter: Eligibility rules and the ban set
//! - Selector: Deduplicated pool and random selection
//! - Reconciler: Insert and trim against the target playlist
//! - SyncJob: Runs the stages in order

pub mod collector;
pub mod filter;
pub mod paginate;
pub mod reconciler;
pub mod selector;
pub mod sync;

// Re-export commonly used types
pub use collector::{Collection, Collector, Source, SourceOutcome};
pub use filter::{BanSet, FilterOutcome, FilterRules, Rejection};
pub use paginate::Paginator;
pub use reconciler::{missing_videos, InsertPosition, ReconcileOutcome, ReconcilePlan, Reconciler};
pub use selector::Pool;
pub use sync::{FailedSource, SyncJob, SyncOptions, SyncReport};
