//! Application configuration.
//!
//! A small optional `config.json` in the platform config directory can
//! carry ignore tokens that apply to every run (say, `target` or
//! `node_modules`). Missing or unreadable config silently falls back to
//! defaults; the file is never written by loctree itself.

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Tokens appended to every run's ignore list.
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl Config {
    /// Load the configuration from the default platform-specific path.
    #[must_use]
    pub fn load() -> Self {
        match Self::load_internal() {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {e}");
                Self::default()
            }
        }
    }

    fn load_internal() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Get the default platform-specific configuration path.
    fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "loctree", "loctree")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_empty() {
        let config = Config::default();
        assert!(config.ignore.is_empty());
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = Config {
            ignore: vec!["target".to_string()],
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.ignore, config.ignore);
    }

    #[test]
    fn test_config_tolerates_missing_fields() {
        let parsed: Config = serde_json::from_str("{}").unwrap();
        assert!(parsed.ignore.is_empty());
    }
}
