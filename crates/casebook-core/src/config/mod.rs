//! Configuration management for Casebook.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `casebook.toml` file
//! 3. User config `~/.config/casebook/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Test case store configuration.
    pub store: StoreConfig,

    /// Push/pull configuration.
    pub sync: SyncConfig,

    /// Simulated test runner configuration.
    pub runner: RunnerConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./casebook.toml` (project local)
    /// 2. `~/.config/casebook/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_file(DEFAULT_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(DEFAULT_CONFIG_DIR).join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CASEBOOK_API_URL") {
            self.store.api_url = url;
        }
        if let Ok(author) = std::env::var("CASEBOOK_AUTHOR") {
            self.sync.author = author;
        }
        if let Ok(id) = std::env::var("CASEBOOK_CONFLICT_CASE_ID") {
            self.sync.conflict_case_id = id;
        }
        if let Ok(rate) = std::env::var("CASEBOOK_PASS_RATE") {
            if let Ok(rate) = rate.parse() {
                self.runner.pass_rate = rate;
            }
        }
    }

    /// Checks values that would make the runner or sync misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, rate) in [
            ("runner.pass_rate", self.runner.pass_rate),
            ("runner.suite_pass_rate", self.runner.suite_pass_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be between 0 and 1, got {rate}"
                )));
            }
        }
        if self.runner.min_delay_ms > self.runner.max_delay_ms {
            return Err(ConfigError::Invalid(
                "runner.min_delay_ms is greater than runner.max_delay_ms".to_string(),
            ));
        }
        if self.runner.suite_min_delay_ms > self.runner.suite_max_delay_ms {
            return Err(ConfigError::Invalid(
                "runner.suite_min_delay_ms is greater than runner.suite_max_delay_ms".to_string(),
            ));
        }
        if self.sync.author.trim().is_empty() {
            return Err(ConfigError::Invalid("sync.author must not be empty".to_string()));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Test case store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the REST API.
    pub api_url: String,

    /// Resource path for test cases.
    pub cases_path: String,

    /// Resource path for test suites.
    pub suites_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            cases_path: DEFAULT_CASES_PATH.to_string(),
            suites_path: DEFAULT_SUITES_PATH.to_string(),
        }
    }
}

/// Push/pull configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Author recorded on commits and new cases.
    pub author: String,

    /// Case a pull reports as edited on the remote.
    pub conflict_case_id: String,

    /// Description of the local side of the conflict.
    pub local_description: String,

    /// Description of the remote side of the conflict.
    pub remote_description: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            author: DEFAULT_AUTHOR.to_string(),
            conflict_case_id: DEFAULT_CONFLICT_CASE_ID.to_string(),
            local_description: DEFAULT_LOCAL_DESCRIPTION.to_string(),
            remote_description: DEFAULT_REMOTE_DESCRIPTION.to_string(),
        }
    }
}

/// Simulated runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Chance a single run passes (0..=1).
    pub pass_rate: f64,

    /// Chance each case of a suite run passes (0..=1).
    pub suite_pass_rate: f64,

    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub suite_min_delay_ms: u64,
    pub suite_max_delay_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            pass_rate: DEFAULT_PASS_RATE,
            suite_pass_rate: DEFAULT_SUITE_PASS_RATE,
            min_delay_ms: DEFAULT_MIN_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            suite_min_delay_ms: DEFAULT_SUITE_MIN_DELAY_MS,
            suite_max_delay_ms: DEFAULT_SUITE_MAX_DELAY_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store.api_url, DEFAULT_API_URL);
        assert_eq!(config.sync.author, DEFAULT_AUTHOR);
        assert_eq!(config.sync.conflict_case_id, DEFAULT_CONFLICT_CASE_ID);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_to_toml() {
        let toml_str = Config::default_config_string();
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[sync]"));
        assert!(toml_str.contains("[runner]"));
    }

    #[test]
    fn test_rejects_bad_pass_rate() {
        let mut config = Config::default();
        config.runner.pass_rate = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_inverted_delays() {
        let mut config = Config::default();
        config.runner.min_delay_ms = 10;
        config.runner.max_delay_ms = 5;
        assert!(config.validate().is_err());
    }
}
