//! # Client Configuration
//!
//! Settings fixed for the lifetime of the process.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`MARIAM_*`)
//! 2. Config file (`config.toml`)
//! 3. Defaults (this file)
//!
//! The backend URL is special: the user can change it at runtime, so the
//! persisted value in [`Settings`](super::settings::Settings) is used unless
//! the config pins one explicitly.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use mariam_core::{DEFAULT_BRANCH, DEFAULT_CASH_REGISTER};

use super::settings::parse_api_url;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Backend base URL. `None` defers to the persisted setting.
    pub api_url: Option<String>,

    /// Per-request timeout for backend calls, in seconds.
    /// Default: 10
    pub request_timeout_secs: u64,

    /// Branch name sent with pending sales.
    pub branch: String,

    /// Cash register name sent with pending sales.
    pub cash_register: String,

    /// Audible confirmation when a line is added.
    pub sound_enabled: bool,

    /// Local store location. `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: None,
            request_timeout_secs: 10,
            branch: DEFAULT_BRANCH.to_string(),
            cash_register: DEFAULT_CASH_REGISTER.to_string(),
            sound_enabled: true,
            database_path: None,
        }
    }
}

impl ClientConfig {
    /// Loads configuration: defaults, then the config file, then the
    /// environment, then validation.
    ///
    /// An explicit `config_path` must exist; the platform default path is
    /// skipped when missing.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(?path, "Loading client config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// `config.toml` in the platform config directory.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "mariam", "pos").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Checks the loaded values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.api_url {
            parse_api_url(url).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "requestTimeoutSecs must be greater than 0".into(),
            ));
        }

        if self.branch.trim().is_empty() {
            return Err(ConfigError::Invalid("branch must not be empty".into()));
        }

        if self.cash_register.trim().is_empty() {
            return Err(ConfigError::Invalid("cashRegister must not be empty".into()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies `MARIAM_*` overrides from `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("MARIAM_API_URL") {
            debug!(api_url = %url, "Overriding API URL from environment");
            self.api_url = Some(url);
        }

        if let Some(branch) = lookup("MARIAM_BRANCH") {
            self.branch = branch;
        }

        if let Some(register) = lookup("MARIAM_CASH_REGISTER") {
            self.cash_register = register;
        }

        if let Some(sound) = lookup("MARIAM_SOUND") {
            match sound.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => self.sound_enabled = true,
                "0" | "false" | "off" | "no" => self.sound_enabled = false,
                other => debug!(value = other, "Ignoring unrecognized MARIAM_SOUND"),
            }
        }

        if let Some(path) = lookup("MARIAM_DB_PATH") {
            self.database_path = Some(PathBuf::from(path));
        }
    }
}
