//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the identity provider API key and the last used email.
//!
//! Configuration is stored at `~/.config/sousbook/config.json`; the session
//! record lives in the per-user data directory.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "sousbook";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable consulted before the config file for the API key
const API_KEY_ENV: &str = "SOUSBOOK_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_key: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Resolve the provider API key: the environment variable wins over the
    /// config file.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone())
    }

    /// Like [`api_key`](Config::api_key), but an absent key is an error
    /// suitable for commands that must reach the provider.
    pub fn require_api_key(&self) -> Result<String> {
        self.api_key().ok_or_else(|| {
            anyhow::anyhow!(
                "no API key configured; set {} or add api_key to config.json",
                API_KEY_ENV
            )
        })
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the persisted session record.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trip() {
        let config = Config {
            api_key: Some("k".to_string()),
            last_email: Some("a@x.com".to_string()),
        };
        let json = serde_json::to_string(&config).unwrap();
        let restored: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.api_key.as_deref(), Some("k"));
        assert_eq!(restored.last_email.as_deref(), Some("a@x.com"));
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert!(config.api_key.is_none());
        assert!(config.last_email.is_none());
    }
}
