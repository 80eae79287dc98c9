//! Configuration for mixtape.
//!
//! Configuration sources (highest priority first):
//! 1. CLI flags / environment variables (CLIENT_ID, TARGET_PLAYLIST_ID, ...)
//! 2. Config file (.mixtape/config.yaml, or --config)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .mixtape/config.yaml
//! - Credentials are never read from the file
//!
//! Everything is resolved once at startup into an immutable [`Settings`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::OAuthCredentials;
use crate::core::{FilterRules, InsertPosition};

/// Default cap on the target playlist size
pub const DEFAULT_MAX_ITEMS: usize = 150;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub playlist: PlaylistSection,
    #[serde(default)]
    pub filter: FilterRules,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaylistSection {
    /// Playlist to rebuild
    pub target: Option<String>,
    /// Playlists whose contents feed the pool
    #[serde(default)]
    pub seeds: Vec<String>,
    /// Playlist whose videos are never selected
    pub ban: Option<String>,
    /// Cap on the target playlist size
    pub max_items: Option<usize>,
    /// Whether liked videos feed the pool (default: true)
    pub include_liked: Option<bool>,
    /// Where new videos are inserted (default: append)
    pub insert_position: Option<InsertPosition>,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub target_playlist: Option<String>,
    /// Comma-separated playlist ids
    pub seed_playlists: Option<String>,
    pub max_items: Option<usize>,
    pub ban_playlist: Option<String>,
}

/// Which playlists to read and write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSettings {
    pub target: String,
    pub seeds: Vec<String>,
    pub ban: Option<String>,
    pub max_items: usize,
    pub include_liked: bool,
    pub insert_position: InsertPosition,
}

impl PlaylistSettings {
    /// Settings for `target` with no seeds, no ban list and the default cap
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            seeds: Vec::new(),
            ban: None,
            max_items: DEFAULT_MAX_ITEMS,
            include_liked: true,
            insert_position: InsertPosition::default(),
        }
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: OAuthCredentials,
    pub playlist: PlaylistSettings,
    pub filter: FilterRules,
    /// Path to config file (if one was used)
    pub config_file: Option<PathBuf>,
}

impl std::fmt::Display for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let config_file = self
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string());
        let seeds = if self.playlist.seeds.is_empty() {
            "(none)".to_string()
        } else {
            self.playlist.seeds.join(", ")
        };

        writeln!(f, "Config file:    {}", config_file)?;
        writeln!(f, "Client id:      {}", self.credentials.client_id)?;
        writeln!(f, "Client secret:  <redacted>")?;
        writeln!(f, "Refresh token:  <redacted>")?;
        writeln!(f, "Target:         {}", self.playlist.target)?;
        writeln!(f, "Seeds:          {}", seeds)?;
        writeln!(
            f,
            "Ban playlist:   {}",
            self.playlist.ban.as_deref().unwrap_or("(none)")
        )?;
        writeln!(f, "Max items:      {}", self.playlist.max_items)?;
        writeln!(f, "Liked videos:   {}", self.playlist.include_liked)?;
        writeln!(f, "Insert at:      {:?}", self.playlist.insert_position)?;
        write!(
            f,
            "Filter:         {}s..={}s, title keyword {:?}",
            self.filter.min_duration_secs, self.filter.max_duration_secs, self.filter.title_keyword
        )
    }
}

/// Split a comma-separated id list, dropping empty entries and repeats
pub fn parse_playlist_ids(raw: &str) -> Vec<String> {
    clean_ids(raw.split(','))
}

fn clean_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for id in ids.into_iter().map(str::trim).filter(|id| !id.is_empty()) {
        if !out.iter().any(|existing| existing == id) {
            out.push(id.to_string());
        }
    }
    out
}

/// Treat unset and blank values the same
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    non_empty(value).with_context(|| format!("Missing required setting: {}", name))
}

/// Find config file by searching current directory and parents
pub fn find_config_file() -> Option<PathBuf> {
    let current = std::env::current_dir().ok()?;
    find_config_file_from(&current)
}

fn find_config_file_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(".mixtape").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Merge overrides over an optional config file
pub fn resolve(overrides: Overrides, file: Option<(PathBuf, ConfigFile)>) -> Result<Settings> {
    let (config_file, file) = match file {
        Some((path, file)) => (Some(path), file),
        None => (None, ConfigFile::default()),
    };
    let section = file.playlist;

    let credentials = OAuthCredentials {
        client_id: required(overrides.client_id, "CLIENT_ID")?,
        client_secret: required(overrides.client_secret, "CLIENT_SECRET")?,
        refresh_token: required(overrides.refresh_token, "REFRESH_TOKEN")?,
    };

    let target = required(
        non_empty(overrides.target_playlist).or(section.target),
        "TARGET_PLAYLIST_ID",
    )?;

    let seeds = match overrides.seed_playlists {
        Some(raw) => parse_playlist_ids(&raw),
        None => clean_ids(section.seeds.iter().map(String::as_str)),
    };

    let ban = non_empty(overrides.ban_playlist).or_else(|| non_empty(section.ban));

    let max_items = overrides
        .max_items
        .or(section.max_items)
        .unwrap_or(DEFAULT_MAX_ITEMS);
    if max_items == 0 {
        anyhow::bail!("MAX_ITEMS must be at least 1");
    }

    let filter = file.filter;
    if filter.min_duration_secs > filter.max_duration_secs {
        anyhow::bail!(
            "filter.min_duration_secs ({}) exceeds filter.max_duration_secs ({})",
            filter.min_duration_secs,
            filter.max_duration_secs
        );
    }

    Ok(Settings {
        credentials,
        playlist: PlaylistSettings {
            target,
            seeds,
            ban,
            max_items,
            include_liked: section.include_liked.unwrap_or(true),
            insert_position: section.insert_position.unwrap_or_default(),
        },
        filter,
        config_file,
    })
}

/// Load configuration from all sources.
///
/// An explicit path must exist; otherwise discovery is best-effort.
pub fn load(overrides: Overrides, explicit_path: Option<&Path>) -> Result<Settings> {
    let path = match explicit_path {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };

    let file = match path {
        Some(path) => {
            let file = load_config_file(&path)?;
            Some((path, file))
        }
        None => None,
    };

    resolve(overrides, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn base_overrides() -> Overrides {
        Overrides {
            client_id: Some("client".to_string()),
            client_secret: Some("s3cr3t-value".to_string()),
            refresh_token: Some("1//refresh-value".to_string()),
            target_playlist: Some("PLtarget".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = resolve(base_overrides(), None).unwrap();

        assert_eq!(settings.playlist.target, "PLtarget");
        assert!(settings.playlist.seeds.is_empty());
        assert_eq!(settings.playlist.ban, None);
        assert_eq!(settings.playlist.max_items, 150);
        assert!(settings.playlist.include_liked);
        assert_eq!(settings.playlist.insert_position, InsertPosition::Append);
        assert_eq!(settings.filter, FilterRules::default());
        assert!(settings.config_file.is_none());
    }

    #[test]
    fn test_missing_required_setting() {
        let overrides = Overrides {
            refresh_token: None,
            ..base_overrides()
        };
        let err = resolve(overrides, None).unwrap_err();
        assert!(err.to_string().contains("REFRESH_TOKEN"));

        let overrides = Overrides {
            target_playlist: Some("   ".to_string()),
            ..base_overrides()
        };
        let err = resolve(overrides, None).unwrap_err();
        assert!(err.to_string().contains("TARGET_PLAYLIST_ID"));
    }

    #[test]
    fn test_parse_playlist_ids() {
        assert_eq!(
            parse_playlist_ids("PL1, PL2,,PL1 ,"),
            vec!["PL1".to_string(), "PL2".to_string()]
        );
        assert!(parse_playlist_ids("").is_empty());
        assert!(parse_playlist_ids(" , ,").is_empty());
    }

    #[test]
    fn test_blank_ban_playlist_is_none() {
        let overrides = Overrides {
            ban_playlist: Some(String::new()),
            ..base_overrides()
        };
        assert_eq!(resolve(overrides, None).unwrap().playlist.ban, None);
    }

    #[test]
    fn test_zero_max_items_rejected() {
        let overrides = Overrides {
            max_items: Some(0),
            ..base_overrides()
        };
        assert!(resolve(overrides, None).is_err());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let mixtape_dir = temp.path().join(".mixtape");
        std::fs::create_dir_all(&mixtape_dir).unwrap();

        let config_path = mixtape_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1"
playlist:
  target: PLfromfile
  seeds:
    - PLseedA
    - PLseedB
  ban: PLban
  max_items: 100
  include_liked: false
  insert_position: top
filter:
  max_duration_secs: 600
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version.as_deref(), Some("1"));
        assert_eq!(config.playlist.target.as_deref(), Some("PLfromfile"));
        assert_eq!(config.playlist.seeds, vec!["PLseedA", "PLseedB"]);
        assert_eq!(config.playlist.max_items, Some(100));
        assert_eq!(config.playlist.insert_position, Some(InsertPosition::Top));
        assert_eq!(config.filter.min_duration_secs, 90);
        assert_eq!(config.filter.max_duration_secs, 600);

        assert_eq!(find_config_file_from(temp.path()), Some(config_path.clone()));
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_config_file_from(&nested), Some(config_path));
    }

    #[test]
    fn test_overrides_beat_file() {
        let file: ConfigFile = serde_yaml::from_str(
            r#"
playlist:
  target: PLfromfile
  seeds: [PLseedA]
  ban: PLban
  max_items: 100
  include_liked: false
"#,
        )
        .unwrap();

        let overrides = Overrides {
            seed_playlists: Some("PLenv1,PLenv2".to_string()),
            max_items: Some(25),
            ..base_overrides()
        };
        let settings = resolve(overrides, Some((PathBuf::from("cfg.yaml"), file))).unwrap();

        assert_eq!(settings.playlist.target, "PLtarget");
        assert_eq!(settings.playlist.seeds, vec!["PLenv1", "PLenv2"]);
        assert_eq!(settings.playlist.ban.as_deref(), Some("PLban"));
        assert_eq!(settings.playlist.max_items, 25);
        assert!(!settings.playlist.include_liked);
        assert_eq!(settings.config_file, Some(PathBuf::from("cfg.yaml")));
    }

    #[test]
    fn test_credentials_not_allowed_in_file() {
        let result: Result<ConfigFile, _> =
            serde_yaml::from_str("playlist:\n  client_secret: oops\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_misspelled_filter_key_rejected() {
        let result: Result<ConfigFile, _> =
            serde_yaml::from_str("filter:\n  max_duraton_secs: 600\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_inverted_duration_window_rejected() {
        let file: ConfigFile =
            serde_yaml::from_str("filter:\n  min_duration_secs: 600\n  max_duration_secs: 60\n")
                .unwrap();
        assert!(resolve(base_overrides(), Some((PathBuf::from("c.yaml"), file))).is_err());
    }

    #[test]
    fn test_display_redacts_secrets() {
        let settings = resolve(base_overrides(), None).unwrap();
        let shown = settings.to_string();
        assert!(shown.contains("PLtarget"));
        assert!(!shown.contains("s3cr3t-value"));
        assert!(!shown.contains("1//refresh-value"));
        assert!(shown.contains("<redacted>"));
    }
}
