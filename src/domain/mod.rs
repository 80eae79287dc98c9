//! Domain types for the playlist sync job.
//!
//! This module contains the core data structures:
//! - VideoRecord: Video metadata used for eligibility checks
//! - PlaylistEntry / PlaylistMembership: Snapshot of a playlist
//! - parse_duration: `PT#H#M#S` duration decoding

pub mod duration;
pub mod playlist;
pub mod video;

// Re-export commonly used types
pub use duration::parse_duration;
pub use playlist::{PlaylistEntry, PlaylistMembership};
pub use video::{PrivacyStatus, VideoRecord};
