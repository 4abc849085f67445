//! Configuration management for the instrument locator.
//!
//! Configuration is layered with figment: defaults, then an optional TOML
//! file, then environment variables.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory under the platform config dir.
const APP_DIR_NAME: &str = "instrument-locator";

/// Prefix for environment overrides, e.g. `INSTRUMENT_LOCATOR_IMAGE__TIMEOUT_MS`.
const ENV_PREFIX: &str = "INSTRUMENT_LOCATOR_";

/// Application configuration.
///
/// Loaded from (highest precedence first):
/// 1. Environment variables prefixed with `INSTRUMENT_LOCATOR_`, nested keys split on `__`
/// 2. TOML config file at `<config_dir>/instrument-locator/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External image lookup.
    pub image: ImageConfig,
    /// Session runtime.
    pub session: SessionConfig,
}

/// Image lookup configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Query the image search service for records without a picture.
    pub enabled: bool,
    /// Search endpoint.
    pub endpoint: String,
    /// Access key sent as `Authorization: Client-ID <key>`. Never serialized.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Upper bound on one lookup, in milliseconds.
    pub timeout_ms: u64,
    /// User agent for outgoing requests.
    pub user_agent: String,
}

/// Session runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Load the fixed seed dataset at session start.
    pub seed: bool,
    /// Bound of the command channel.
    pub command_queue_bound: usize,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.unsplash.com/search/photos".to_string(),
            api_key: None,
            timeout_ms: 5_000,
            user_agent: format!("instrument-locator/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: true,
            command_queue_bound: 256,
            event_capacity: 1024,
        }
    }
}

impl Config {
    /// Load configuration, reading `config_path` or the default file.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing, or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.image.timeout_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "image.timeout_ms must be greater than 0".to_string(),
            });
        }

        if self.image.enabled
            && !(self.image.endpoint.starts_with("http://") || self.image.endpoint.starts_with("https://"))
        {
            return Err(Error::ConfigValidation {
                message: format!("image.endpoint must be an http(s) URL: {}", self.image.endpoint),
            });
        }

        if self.session.command_queue_bound == 0 || self.session.event_capacity == 0 {
            return Err(Error::ConfigValidation {
                message: "session.command_queue_bound and session.event_capacity must be greater than 0"
                    .to_string(),
            });
        }

        Ok(())
    }

    /// Get the image lookup timeout as a Duration.
    #[must_use]
    pub fn image_timeout(&self) -> Duration {
        Duration::from_millis(self.image.timeout_ms)
    }
}
