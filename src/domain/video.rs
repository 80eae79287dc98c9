//! Video metadata as seen by the sync pipeline.

use serde::{Deserialize, Serialize};

/// Visibility of a video on the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    Public,
    Unlisted,
    Private,

    /// Missing or unrecognised status
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for PrivacyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrivacyStatus::Public => write!(f, "public"),
            PrivacyStatus::Unlisted => write!(f, "unlisted"),
            PrivacyStatus::Private => write!(f, "private"),
            PrivacyStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for PrivacyStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "public" => PrivacyStatus::Public,
            "unlisted" => PrivacyStatus::Unlisted,
            "private" => PrivacyStatus::Private,
            _ => PrivacyStatus::Unknown,
        })
    }
}

/// A video and the metadata needed to decide whether it is eligible.
///
/// Records are built once from an API response and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Platform video id
    pub id: String,

    /// Video title
    pub title: String,

    /// Duration in whole seconds
    pub duration_secs: u64,

    /// Privacy status
    pub privacy: PrivacyStatus,

    /// Embeddable flag (`None` when the platform omitted it)
    pub embeddable: Option<bool>,

    /// Region codes where the video is blocked
    #[serde(default)]
    pub blocked_regions: Vec<String>,
}

impl VideoRecord {
    /// Create a public, unrestricted record
    pub fn new(id: impl Into<String>, title: impl Into<String>, duration_secs: u64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            duration_secs,
            privacy: PrivacyStatus::Public,
            embeddable: None,
            blocked_regions: Vec::new(),
        }
    }

    pub fn with_privacy(mut self, privacy: PrivacyStatus) -> Self {
        self.privacy = privacy;
        self
    }

    pub fn with_embeddable(mut self, embeddable: Option<bool>) -> Self {
        self.embeddable = embeddable;
        self
    }

    pub fn with_blocked_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_regions = regions.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the platform blocks this video in at least one region
    pub fn is_region_blocked(&self) -> bool {
        !self.blocked_regions.is_empty()
    }
}
