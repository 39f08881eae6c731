//! Application configuration management.
//!
//! This module handles loading the application configuration:
//! an optional fixed position, the calculation method, and how the user is
//! located when no position is configured.
//!
//! Configuration is stored at `~/.config/prayercache/config.json`.
//! `PRAYERCACHE_LATITUDE`, `PRAYERCACHE_LONGITUDE` and `PRAYERCACHE_METHOD`
//! override the file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::client::{DEFAULT_API_BASE_URL, DEFAULT_METHOD};
use crate::location::ip::{DEFAULT_IP_LOOKUP_URL, DEFAULT_LOCATION_TIMEOUT};
use crate::models::Position;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "prayercache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const ENV_LATITUDE: &str = "PRAYERCACHE_LATITUDE";
const ENV_LONGITUDE: &str = "PRAYERCACHE_LONGITUDE";
const ENV_METHOD: &str = "PRAYERCACHE_METHOD";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Aladhan calculation method id
    pub method: u8,
    /// Fall back to IP geolocation when no position is configured
    pub ip_lookup: bool,
    pub location_timeout_secs: u64,
    pub api_base_url: Option<String>,
    pub ip_lookup_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            method: DEFAULT_METHOD,
            ip_lookup: true,
            location_timeout_secs: DEFAULT_LOCATION_TIMEOUT.as_secs(),
            api_base_url: None,
            ip_lookup_url: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from an environment lookup. Unparsable values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(ENV_LATITUDE) {
            match value.trim().parse() {
                Ok(lat) => self.latitude = Some(lat),
                Err(_) => warn!(key = ENV_LATITUDE, %value, "Ignoring invalid latitude"),
            }
        }
        if let Some(value) = lookup(ENV_LONGITUDE) {
            match value.trim().parse() {
                Ok(lon) => self.longitude = Some(lon),
                Err(_) => warn!(key = ENV_LONGITUDE, %value, "Ignoring invalid longitude"),
            }
        }
        if let Some(value) = lookup(ENV_METHOD) {
            match value.trim().parse() {
                Ok(method) => self.method = method,
                Err(_) => warn!(key = ENV_METHOD, %value, "Ignoring invalid method"),
            }
        }
    }

    /// The configured position, if both coordinates are set and in range.
    pub fn position(&self) -> Option<Position> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon))
                if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) =>
            {
                Some(Position::new(lat, lon))
            }
            _ => None,
        }
    }

    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_secs)
    }

    pub fn api_base_url(&self) -> String {
        self.api_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    pub fn ip_lookup_url(&self) -> String {
        self.ip_lookup_url
            .clone()
            .unwrap_or_else(|| DEFAULT_IP_LOOKUP_URL.to_string())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.method, 2);
        assert!(config.ip_lookup);
        assert_eq!(config.location_timeout(), Duration::from_secs(10));
        assert_eq!(config.api_base_url(), "https://api.aladhan.com");
        assert!(config.position().is_none());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"latitude": 51.5, "longitude": -0.12}"#)
            .expect("Failed to parse config test JSON");
        assert_eq!(config.method, 2);
        assert!(config.ip_lookup);
        assert_eq!(config.position(), Some(Position::new(51.5, -0.12)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("PRAYERCACHE_LATITUDE", "21.42"),
            ("PRAYERCACHE_LONGITUDE", " 39.83 "),
            ("PRAYERCACHE_METHOD", "4"),
        ]));
        assert_eq!(config.position(), Some(Position::new(21.42, 39.83)));
        assert_eq!(config.method, 4);
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let mut config = Config {
            method: 3,
            ..Config::default()
        };
        config.apply_env(env(&[
            ("PRAYERCACHE_LATITUDE", "north"),
            ("PRAYERCACHE_METHOD", "-1"),
        ]));
        assert!(config.latitude.is_none());
        assert_eq!(config.method, 3);
    }

    #[test]
    fn test_out_of_range_position_is_ignored() {
        let config = Config {
            latitude: Some(95.0),
            longitude: Some(10.0),
            ..Config::default()
        };
        assert!(config.position().is_none());
    }
}
