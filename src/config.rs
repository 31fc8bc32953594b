use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the JSON API; resources live at `<base_url>/<name>.json`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// How many of the most recent items are eligible for bounded scans
    /// (search, recent listings, static page generation).
    #[serde(default = "default_static_retention_limit")]
    pub static_retention_limit: u64,

    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080/api".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_static_retention_limit() -> u64 {
    1000
}

fn default_max_concurrent_fetches() -> usize {
    8
}

fn default_user_agent() -> String {
    format!("newsroll/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            static_retention_limit: default_static_retention_limit(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("newsroll")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| AppError::Config(format!("invalid base_url {:?}: {}", self.base_url, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(AppError::Config(format!(
                "base_url must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(AppError::Config("request_timeout_ms must be positive".into()));
        }
        if self.static_retention_limit == 0 {
            return Err(AppError::Config("static_retention_limit must be positive".into()));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(AppError::Config("max_concurrent_fetches must be positive".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
