//! Configuration management for Tea Selector CLI
//!
//! Stores the catalog server URL in ~/.config/tea-selector/config.toml.
//! The login token lives next to it in session.toml.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tea_selector::ClientConfig;

const CONFIG_DIR: &str = "tea-selector";
const CONFIG_FILE: &str = "config.toml";
const SESSION_FILE: &str = "session.toml";

/// Overrides the configured server URL
pub const SERVER_URL_ENV: &str = "TEA_SELECTOR_SERVER_URL";

/// CLI Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_server_url")]
    pub server_url: String,
}

fn default_server_url() -> String {
    "http://localhost:7344".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join(CONFIG_DIR);
        Ok(config_dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Where the login token is kept
    pub fn session_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(SESSION_FILE))
    }

    /// Load config from the default location, or the default config
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory {:?}", dir))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Apply the environment value, then the command-line flag; last one wins
    pub fn with_overrides(mut self, env: Option<String>, flag: Option<String>) -> Self {
        if let Some(url) = env.into_iter().chain(flag).filter(|u| !u.is_empty()).last() {
            self.server_url = url;
        }
        self
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.server_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            server_url: "http://tea.local:7344".to_string(),
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_empty_file_uses_default_url() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "").unwrap();

        assert_eq!(Config::load_from(&path).unwrap().server_url, default_server_url());
    }

    #[test]
    fn test_flag_beats_env() {
        let config = Config::default().with_overrides(
            Some("http://from-env".to_string()),
            Some("http://from-flag".to_string()),
        );
        assert_eq!(config.server_url, "http://from-flag");

        let config = Config::default().with_overrides(Some("http://from-env".to_string()), None);
        assert_eq!(config.server_url, "http://from-env");

        let config = Config::default().with_overrides(Some(String::new()), None);
        assert_eq!(config.server_url, default_server_url());
    }
}
