//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default reporting interval, in seconds.
fn default_report_interval_secs() -> u64 {
    5
}

/// Default bookmark reaction name (📥).
fn default_bookmark_reaction() -> String {
    "inbox_tray".to_string()
}

/// Which user a bookmark reaction is credited to.
///
/// The source material is ambiguous about attribution, so it is explicit
/// configuration rather than a baked-in guess.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SavedAttribution {
    /// Credit the original sender of the reacted-to message.
    #[default]
    MessageOwner,
    /// Credit the user who applied the reaction.
    Reactor,
}

/// Configuration for the tally-bot application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Shared, immutable configuration values.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// The deserialized configuration values backing [`Config`].
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack app token (`SLACK_APP_TOKEN`).
    pub slack_app_token: String,
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Seconds between tally reports (`REPORT_INTERVAL_SECS`).
    #[serde(default = "default_report_interval_secs")]
    pub report_interval_secs: u64,
    /// Reaction name that marks a message as bookmarked (`BOOKMARK_REACTION`).
    #[serde(default = "default_bookmark_reaction")]
    pub bookmark_reaction: String,
    /// Attribution policy for bookmarked messages (`SAVED_ATTRIBUTION`).
    #[serde(default)]
    pub saved_attribution: SavedAttribution,
}

impl Config {
    /// Load configuration from the environment and an optional config file.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("TALLY_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        if result.report_interval_secs < 1 {
            return Err(anyhow::anyhow!("Report interval must be at least 1 second."));
        }

        if result.bookmark_reaction.is_empty() {
            return Err(anyhow::anyhow!("Bookmark reaction must not be empty."));
        }

        Ok(result)
    }
}
