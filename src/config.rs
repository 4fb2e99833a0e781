use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};
use tracing::{debug, warn};

use crate::cleaner::CleaningMode;
use crate::providers::types::{MatchType, Money};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub cleaning: CleaningConfig,
    #[serde(default)]
    pub traffic: TrafficConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the ads SDK finds its credentials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    #[serde(default = "default_config_file")]
    pub config_file: PathBuf,
}

fn default_config_file() -> PathBuf {
    PathBuf::from("adsapi.ini")
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            config_file: default_config_file(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CleaningConfig {
    #[serde(default)]
    pub mode: CleaningMode,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrafficConfig {
    #[serde(default)]
    pub match_type: MatchType,
    /// Bid ceiling for the estimated ad group, in micros
    #[serde(default = "default_max_cpc_micros")]
    pub max_cpc_micros: i64,
}

const fn default_max_cpc_micros() -> i64 {
    Money::from_units(100).micro_amount
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            match_type: MatchType::default(),
            max_cpc_micros: default_max_cpc_micros(),
        }
    }
}

/// Retry policy for rate-limited requests
///
/// Without `max_retries` a rate-limited request is retried until the
/// platform accepts it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RetryConfig {
    #[serde(default)]
    pub max_retries: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

const ENV_CONFIG_FILE: &str = "KEYWORD_INSIGHTS_CONFIG_FILE";
const ENV_CLEANING_MODE: &str = "KEYWORD_INSIGHTS_CLEANING_MODE";
const ENV_MATCH_TYPE: &str = "KEYWORD_INSIGHTS_MATCH_TYPE";
const ENV_MAX_CPC_MICROS: &str = "KEYWORD_INSIGHTS_MAX_CPC_MICROS";
const ENV_MAX_RETRIES: &str = "KEYWORD_INSIGHTS_MAX_RETRIES";
const ENV_LOG_LEVEL: &str = "KEYWORD_INSIGHTS_LOG_LEVEL";
const ENV_LOG_FORMAT: &str = "KEYWORD_INSIGHTS_LOG_FORMAT";

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];
const LOG_FORMATS: [&str; 2] = ["text", "json"];

impl Config {
    /// Load configuration from a TOML file at the specified path
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The file cannot be read
    /// - The TOML content cannot be parsed into the Config structure
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load configuration from environment variables on top of the defaults
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an invalid value.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields with the `KEYWORD_INSIGHTS_*` variables that are set
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an invalid value.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = env::var(ENV_CONFIG_FILE) {
            self.session.config_file = PathBuf::from(path);
        }

        if let Ok(mode) = env::var(ENV_CLEANING_MODE) {
            self.cleaning.mode = mode.parse()?;
        }

        if let Ok(match_type) = env::var(ENV_MATCH_TYPE) {
            self.traffic.match_type = match_type.parse()?;
        }

        if let Ok(micros) = env::var(ENV_MAX_CPC_MICROS) {
            self.traffic.max_cpc_micros = micros.parse()?;
        }

        if let Ok(retries) = env::var(ENV_MAX_RETRIES) {
            self.retry.max_retries = if retries.is_empty() || retries == "unlimited" {
                None
            } else {
                Some(retries.parse()?)
            };
        }

        if let Ok(level) = env::var(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }

        if let Ok(format) = env::var(ENV_LOG_FORMAT) {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Load configuration from default locations and environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - An environment variable holds an invalid value
    /// - Configuration validation fails
    pub fn load() -> Result<Self> {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let current_dir = env::current_dir()?;

        let config_paths = [
            PathBuf::from("keyword-insights.toml"),
            current_dir.join("keyword-insights.toml"),
            home_dir.join(".config/keyword-insights/config.toml"),
            PathBuf::from("/etc/keyword-insights/config.toml"),
        ];

        // Find the first valid configuration file
        let mut config = None;
        for path in &config_paths {
            if !path.exists() {
                continue;
            }
            match Self::from_file(path) {
                Ok(file_config) => {
                    debug!(path = %path.display(), "Loaded config file");
                    config = Some(file_config);
                    break;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable config file");
                }
            }
        }

        let mut config = config.unwrap_or_else(|| {
            debug!("No config file found, using defaults");
            Self::default()
        });

        // Environment values take precedence over file values
        config.apply_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Merge another configuration into this one, with the other configuration taking precedence
    pub fn merge(&mut self, other: Self) {
        if other.session.config_file != default_config_file() {
            self.session.config_file = other.session.config_file;
        }

        if other.cleaning.mode != CleaningMode::default() {
            self.cleaning.mode = other.cleaning.mode;
        }

        if other.traffic.match_type != MatchType::default() {
            self.traffic.match_type = other.traffic.match_type;
        }
        if other.traffic.max_cpc_micros != default_max_cpc_micros() {
            self.traffic.max_cpc_micros = other.traffic.max_cpc_micros;
        }

        if other.retry.max_retries.is_some() {
            self.retry.max_retries = other.retry.max_retries;
        }

        if other.logging.level != default_log_level() {
            self.logging.level = other.logging.level;
        }
        if other.logging.format != default_log_format() {
            self.logging.format = other.logging.format;
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The SDK config file path is empty
    /// - The bid ceiling is not positive
    /// - The log level or format is unknown
    pub fn validate(&self) -> Result<()> {
        if self.session.config_file.as_os_str().is_empty() {
            return Err(anyhow!("session.config_file must not be empty"));
        }

        if self.traffic.max_cpc_micros <= 0 {
            return Err(anyhow!("traffic.max_cpc_micros must be greater than 0"));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(anyhow!("unknown log level: {}", self.logging.level));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow!("unknown log format: {}", self.logging.format));
        }

        Ok(())
    }
}
