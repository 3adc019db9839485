//! Client configuration
//!
//! Config precedence: env vars > config file > defaults. The base URLs are
//! opaque beyond a scheme check; the client never parses them further.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Construction-time settings for `ApiClient`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL request paths are appended to
    pub api_base_url: String,
    /// Value sent in the `Origin` header on every request
    pub origin_url: String,
    /// Hard timeout for the refresh network call, so a stuck refresh cannot
    /// stall queued requests indefinitely
    #[serde(default = "default_refresh_timeout_secs")]
    pub refresh_timeout_secs: u64,
}

fn default_refresh_timeout_secs() -> u64 {
    10
}

/// Errors from building or loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Invalid(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Config {
    /// Build a config from construction-time URLs with the default refresh
    /// timeout.
    pub fn new(
        api_base_url: impl Into<String>,
        origin_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            api_base_url: api_base_url.into(),
            origin_url: origin_url.into(),
            refresh_timeout_secs: default_refresh_timeout_secs(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then overlay environment
    /// variables. `API_BASE_URL` and `ORIGIN_URL` take precedence over the
    /// file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if let Ok(url) = std::env::var("API_BASE_URL") {
            config.api_base_url = url;
        }
        if let Ok(url) = std::env::var("ORIGIN_URL") {
            config.origin_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Refresh call timeout as a `Duration`.
    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, url) in [
            ("api_base_url", &self.api_base_url),
            ("origin_url", &self.origin_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "{name} must start with http:// or https://, got: {url}"
                )));
            }
        }

        if self.refresh_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "refresh_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}
