//! TOML-based application configuration.
//!
//! Stores the remote table-API endpoint and credentials. Configuration
//! is stored at `~/.config/waddle/config.toml`; a missing file yields
//! the default (guest/offline) configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, Result};

/// Remote table-API endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the table API, without trailing slash.
    pub base_url: String,
    /// API key sent as both `apikey` and bearer token.
    pub api_key: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/waddle/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote persistence endpoint; absent means guest/offline mode.
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

impl Config {
    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file
    /// does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let config = toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let raw = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_remote() {
        let config = Config::default();
        assert!(config.remote.is_none());
    }

    #[test]
    fn toml_round_trip() {
        let config = Config {
            remote: Some(RemoteConfig {
                base_url: "https://api.example.com/rest/v1".to_string(),
                api_key: "key".to_string(),
            }),
        };
        let raw = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&raw).unwrap();
        let remote = parsed.remote.unwrap();
        assert_eq!(remote.base_url, "https://api.example.com/rest/v1");
        assert_eq!(remote.api_key, "key");
    }

    #[test]
    fn missing_fields_parse_as_default() {
        let parsed: Config = toml::from_str("").unwrap();
        assert!(parsed.remote.is_none());
    }
}
