//! Configuration management for breachcheck.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Main application configuration.
///
/// This is loaded from `~/.config/breachcheck/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote lookup service settings
    pub lookup: LookupConfig,
    /// Outbound request cadence settings
    pub throttle: ThrottleConfig,
}

impl AppConfig {
    /// Load configuration from the default location, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path.
    ///
    /// Unlike [`AppConfig::load`], a missing file is an error here.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `BREACHCHECK_ENDPOINT`: Override the lookup endpoint URL
    /// - `BREACHCHECK_TIMEOUT_SECS`: Override the per-lookup timeout
    /// - `BREACHCHECK_INTERVAL_MS`: Override the minimum delay between lookups
    #[must_use]
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("BREACHCHECK_ENDPOINT") {
            if !val.trim().is_empty() {
                tracing::debug!("Override lookup.endpoint from env: {}", val);
                self.lookup.endpoint = val;
            }
        }

        if let Ok(val) = std::env::var("BREACHCHECK_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.lookup.timeout_secs = secs;
                tracing::debug!("Override lookup.timeout_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("BREACHCHECK_INTERVAL_MS") {
            if let Ok(ms) = val.parse() {
                self.throttle.interval_ms = ms;
                tracing::debug!("Override throttle.interval_ms from env: {}", ms);
            }
        }

        self
    }

    /// Check that the loaded values are usable.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.lookup.endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "lookup.endpoint".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        let endpoint = Url::parse(self.lookup.endpoint.trim()).map_err(|e| {
            ConfigError::InvalidValue {
                field: "lookup.endpoint".to_string(),
                reason: format!("not a valid URL: {e}"),
            }
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") || endpoint.host().is_none() {
            return Err(ConfigError::InvalidValue {
                field: "lookup.endpoint".to_string(),
                reason: "must be an http or https URL with a host".to_string(),
            });
        }

        if self.lookup.query_param.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "lookup.query_param".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.lookup.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "lookup.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/breachcheck/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "breachcheck", "breachcheck")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Remote lookup service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Lookup endpoint URL
    pub endpoint: String,
    /// Query parameter that carries the email address
    pub query_param: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
    /// Honour `HTTP(S)_PROXY` environment variables
    pub use_system_proxy: bool,
}

impl LookupConfig {
    /// Per-request timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://leakcheck.net/api/public".to_string(),
            query_param: "check".to_string(),
            timeout_secs: 10,
            user_agent: format!("breachcheck/{}", env!("CARGO_PKG_VERSION")),
            use_system_proxy: true,
        }
    }
}

/// Outbound request cadence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Minimum delay between consecutive lookups in milliseconds
    pub interval_ms: u64,
}

impl ThrottleConfig {
    /// Minimum delay as a `Duration`.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}
