//! Command-line interface for mixtape.
//!
//! Meant to be invoked by a scheduler: `mixtape sync` rebuilds the target
//! playlist once and exits.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::adapters::{oauth, youtube, OAuthClient, YouTubeClient};
use crate::config::{self, Overrides, Settings};
use crate::core::{SyncJob, SyncOptions};

/// mixtape - Rebuild a music playlist from liked videos and seed playlists
#[derive(Parser, Debug)]
#[command(name = "mixtape")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rebuild the target playlist once
    Sync {
        #[command(flatten)]
        settings: SettingsArgs,

        /// Show what would change without touching the playlist
        #[arg(long)]
        dry_run: bool,

        /// Shuffle seed for a reproducible selection
        #[arg(long)]
        seed: Option<u64>,

        /// Print the full run report as JSON instead of the summary line
        #[arg(long)]
        json: bool,

        /// API root (for testing against a mock server)
        #[arg(long, env = "YT_API_BASE", default_value = youtube::API_BASE, hide = true)]
        api_base: String,

        /// OAuth token endpoint (for testing against a mock server)
        #[arg(long, env = "YT_TOKEN_ENDPOINT", default_value = oauth::TOKEN_ENDPOINT, hide = true)]
        token_endpoint: String,
    },

    /// Show resolved configuration (secrets redacted)
    Config {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

/// Settings shared by every command
#[derive(Args, Debug)]
pub struct SettingsArgs {
    /// Config file (default: nearest .mixtape/config.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// OAuth client id
    #[arg(long, env = "CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// OAuth refresh token
    #[arg(long, env = "REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// Playlist to rebuild
    #[arg(long = "target", env = "TARGET_PLAYLIST_ID")]
    pub target_playlist: Option<String>,

    /// Seed playlist ids (comma-separated)
    #[arg(long = "seeds", env = "SEED_PLAYLISTS")]
    pub seed_playlists: Option<String>,

    /// Maximum number of videos in the target playlist (default: 150)
    #[arg(long, env = "MAX_ITEMS")]
    pub max_items: Option<usize>,

    /// Playlist whose videos are never selected
    #[arg(long = "ban", env = "BANLIST_PLAYLIST_ID")]
    pub ban_playlist: Option<String>,
}

impl SettingsArgs {
    /// Resolve against the config file into immutable settings
    pub fn load(self) -> Result<Settings> {
        let path = self.config.clone();
        config::load(self.into(), path.as_deref())
    }
}

impl From<SettingsArgs> for Overrides {
    fn from(args: SettingsArgs) -> Self {
        Overrides {
            client_id: args.client_id,
            client_secret: args.client_secret,
            refresh_token: args.refresh_token,
            target_playlist: args.target_playlist,
            seed_playlists: args.seed_playlists,
            max_items: args.max_items,
            ban_playlist: args.ban_playlist,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Sync {
                settings,
                dry_run,
                seed,
                json,
                api_base,
                token_endpoint,
            } => {
                let settings = settings.load()?;
                let options = SyncOptions { dry_run, seed };
                run_sync(&settings, &options, json, &api_base, &token_endpoint).await
            }
            Commands::Config { settings } => {
                let settings = settings.load()?;
                println!("{}", settings);
                Ok(())
            }
        }
    }
}

async fn run_sync(
    settings: &Settings,
    options: &SyncOptions,
    json: bool,
    api_base: &str,
    token_endpoint: &str,
) -> Result<()> {
    let token = OAuthClient::with_endpoint(token_endpoint)
        .refresh(&settings.credentials)
        .await
        .context("Failed to acquire access token")?;
    info!("Authenticated");

    let api = YouTubeClient::with_base_url(token, api_base);
    let report = SyncJob::new(&api, &settings.playlist, &settings.filter)
        .run(options)
        .await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        println!("{}", report.summary_line());
    }

    Ok(())
}
