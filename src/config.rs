//! Pinlog configuration.
//!
//! Loaded from `<root>/config.toml`, where the root is `$PINLOG_HOME` or
//! `~/.pinlog`. Every key is optional; a missing file means defaults.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::storage::Storage;

/// Environment variable overriding the pinlog root directory.
pub const HOME_ENV: &str = "PINLOG_HOME";

/// Pinlog configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Where the workout database lives. Defaults to the root directory.
    pub data_dir: Option<PathBuf>,

    /// Zoom level used when panning to a workout.
    pub map_zoom: u8,

    /// Padding in pixels kept around the workouts when showing them all.
    pub fit_padding: u32,

    /// Per-request timeout for location and weather lookups.
    pub lookup_timeout_secs: u64,

    /// geocode.xyz auth token. Anonymous requests are heavily throttled.
    pub geocode_auth: Option<String>,

    /// OpenWeatherMap API key. Weather is skipped without one.
    pub weather_api_key: Option<String>,

    pub geocode_url: Option<String>,

    pub weather_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            map_zoom: 13,
            fit_padding: 100,
            lookup_timeout_secs: 10,
            geocode_auth: None,
            weather_api_key: None,
            geocode_url: None,
            weather_url: None,
        }
    }
}

impl Config {
    /// Load config from `<root>/config.toml`.
    /// A missing file gives the defaults; an unreadable or invalid one is an error.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        Self::parse(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(contents).map_err(|e| e.to_string())?;

        if config.map_zoom > 20 {
            return Err(format!("map-zoom must be at most 20, got {}", config.map_zoom));
        }
        if config.lookup_timeout_secs == 0 {
            return Err("lookup-timeout-secs must be at least 1".to_string());
        }

        Ok(config)
    }

    /// The root directory: `$PINLOG_HOME`, else `~/.pinlog`.
    pub fn root() -> Option<PathBuf> {
        match env::var_os(HOME_ENV) {
            Some(home) if !home.is_empty() => Some(PathBuf::from(home)),
            _ => Storage::default_root(),
        }
    }

    /// The config file path: `<root>/config.toml`.
    pub fn path() -> Option<PathBuf> {
        Self::root().map(|r| r.join("config.toml"))
    }

    /// Where the database lives: `data-dir` if set, else the root.
    pub fn data_root(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(Self::root)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}
