//! Optional YAML configuration.
//!
//! Every value has a default matching the sites the jobs were written for, so
//! the config file only needs the keys being overridden:
//!
//! ```yaml
//! news:
//!   start_url: https://www.thestar.com.my/business
//! http:
//!   timeout_secs: 60
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub news: NewsConfig,
    pub population: PopulationConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NewsConfig {
    /// Listing page opened in the browser.
    pub start_url: String,
    /// CSS selector for listing anchors.
    pub listing_selector: String,
    /// Run Chrome without a window.
    pub headless: bool,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            start_url: "http://www.thestar.com.my/business".to_string(),
            listing_selector: "h2 > a[href]".to_string(),
            headless: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PopulationConfig {
    /// UNdata query endpoint.
    pub base_url: String,
    /// Dataset table code in the `f` filter.
    pub table_code: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://data.un.org/Data.aspx".to_string(),
            table_code: 44,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load `path`, or return defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }
}
