//! Runtime configuration read from the environment.

use crate::models::HanteiConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Defaults applied to newly created tournaments.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TournamentDefaults {
    pub timer_options: Vec<u32>,
    pub default_timer_duration: u32,
    pub hantei_config: HanteiConfig,
}

impl Default for TournamentDefaults {
    fn default() -> Self {
        Self {
            timer_options: vec![60, 120, 180, 240, 300],
            default_timer_duration: 180,
            hantei_config: HanteiConfig {
                round1: "M-M".to_string(),
                round2: "K-M".to_string(),
            },
        }
    }
}

/// Web server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// JSON snapshot of the store, loaded on start and rewritten periodically.
    pub snapshot_path: Option<PathBuf>,
    pub snapshot_interval: Duration,
    pub tournament_defaults: TournamentDefaults,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_snapshot_interval_secs() -> u64 {
    60
}

impl ServerConfig {
    /// Load from `HOST`, `PORT`, `SNAPSHOT_PATH`, `SNAPSHOT_INTERVAL_SECS` and
    /// `DEFAULT_TIMER_DURATION`. Unset or unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("HOST").unwrap_or_else(default_host);
        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(default_port);
        let snapshot_path = lookup("SNAPSHOT_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        let interval_secs = lookup("SNAPSHOT_INTERVAL_SECS")
            .and_then(|s| s.parse().ok())
            .filter(|s| *s > 0)
            .unwrap_or_else(default_snapshot_interval_secs);

        let mut tournament_defaults = TournamentDefaults::default();
        if let Some(duration) = lookup("DEFAULT_TIMER_DURATION").and_then(|d| d.parse().ok()) {
            tournament_defaults.default_timer_duration = duration;
        }

        Self {
            host,
            port,
            snapshot_path,
            snapshot_interval: Duration::from_secs(interval_secs),
            tournament_defaults,
        }
    }
}
