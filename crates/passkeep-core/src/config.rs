//! Application configuration management.
//!
//! Configuration lives at `~/.config/passkeep/config.json` and holds the
//! optional API base-address override plus the last-used email for login
//! pre-fill.
//!
//! Base address resolution order: explicit override from this config,
//! then the `PASSKEEP_API_URL` environment variable (a `.env` file is
//! loaded in development), then the production default.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config directory paths
const APP_NAME: &str = "passkeep";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API base address
pub const ENV_API_URL: &str = "PASSKEEP_API_URL";

/// Production API base address
const DEFAULT_API_URL: &str = "https://api.passkeep.app/api";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// User-supplied base-address override, for environments where the
    /// default host is unreachable.
    pub api_url: Option<String>,
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

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// The API base address for this run.
    pub fn base_url(&self) -> String {
        resolve_base_url(self.api_url.as_deref(), std::env::var(ENV_API_URL).ok())
    }
}

fn resolve_base_url(override_url: Option<&str>, env_url: Option<String>) -> String {
    if let Some(url) = override_url {
        return url.to_string();
    }
    if let Some(url) = env_url {
        return url;
    }
    DEFAULT_API_URL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let url = resolve_base_url(
            Some("http://192.168.1.50:8080/api"),
            Some("http://localhost:8080/api".into()),
        );
        assert_eq!(url, "http://192.168.1.50:8080/api");
    }

    #[test]
    fn test_env_beats_default() {
        let url = resolve_base_url(None, Some("http://localhost:8080/api".into()));
        assert_eq!(url, "http://localhost:8080/api");
    }

    #[test]
    fn test_default_when_nothing_set() {
        assert_eq!(resolve_base_url(None, None), DEFAULT_API_URL);
    }
}
