//! Runtime configuration.
//!
//! Settings are read from an optional YAML file. Every field has a default,
//! so an empty file (or no file at all) yields a working configuration:
//!
//! ```yaml
//! source_url: https://www.brickfanatics.com/tag/free-lego/
//! timeout_secs: 10
//! block_limit: 5
//! catalog_path: events.json
//! subscribers_path: users.json
//! notify_delay_ms: 100
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_SOURCE_URL: &str = "https://www.brickfanatics.com/tag/free-lego/";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listing page scraped on every cycle.
    pub source_url: String,
    /// `User-Agent` header sent with the fetch.
    pub user_agent: String,
    /// Whole-request timeout for the fetch.
    pub timeout_secs: u64,
    /// Number of article blocks examined per document.
    pub block_limit: usize,
    pub catalog_path: PathBuf,
    pub subscribers_path: PathBuf,
    /// Pause between two notification deliveries.
    pub notify_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
            block_limit: 5,
            catalog_path: PathBuf::from("events.json"),
            subscribers_path: PathBuf::from("users.json"),
            notify_delay_ms: 100,
        }
    }
}

impl AppConfig {
    /// Parse a YAML document and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yaml rejects an empty document as a struct; treat it as defaults.
        let config = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str::<Self>(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&yaml)?;
        info!(path = %path.display(), source_url = %config.source_url, "Loaded configuration");
        Ok(config)
    }

    /// Check values that serde cannot.
    ///
    /// # Returns
    ///
    /// `Err(ConfigError::InvalidUrl)` when `source_url` does not parse, and
    /// `Err(ConfigError::Invalid)` when `timeout_secs` or `block_limit` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.source_url)?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        if self.block_limit == 0 {
            return Err(ConfigError::Invalid("block_limit must be positive".into()));
        }
        Ok(())
    }

    /// Request timeout for the source fetch.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Pause between two deliveries of a broadcast.
    pub fn notify_delay(&self) -> Duration {
        Duration::from_millis(self.notify_delay_ms)
    }
}
