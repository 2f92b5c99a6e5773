//! Configuration loading and validation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::auth::AuthConfig;
use crate::fetch::CubeConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Upstream API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Cube load endpoint.
    #[serde(default = "default_cube_url")]
    pub cube_url: String,

    /// Token endpoint.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Trophy brackets to query.
    #[serde(default = "default_trophy_ranges")]
    pub trophy_ranges: Vec<String>,

    /// Origin header value.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Referer header value.
    #[serde(default = "default_referer")]
    pub referer: String,
}

fn default_cube_url() -> String {
    "https://cube.brawltime.ninja/cubejs-api/v1/load".to_string()
}

fn default_auth_url() -> String {
    "https://brawltime.ninja/api/auth.getToken".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_trophy_ranges() -> Vec<String> {
    ["6", "8", "10", "11", "12", "13", "14", "15"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_origin() -> String {
    "https://brawltime.ninja".to_string()
}

fn default_referer() -> String {
    "https://brawltime.ninja/".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cube_url: default_cube_url(),
            auth_url: default_auth_url(),
            timeout_seconds: default_timeout(),
            trophy_ranges: default_trophy_ranges(),
            origin: default_origin(),
            referer: default_referer(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Lower bound on the season dimension, YYYY-MM-DD.
    #[serde(default = "default_min_date")]
    pub min_date: String,

    /// Default number of least-picked brawlers to drop.
    #[serde(default = "default_brawlers_to_remove")]
    pub brawlers_to_remove: usize,

    /// Token cache file location.
    #[serde(default = "default_token_cache")]
    pub token_cache: PathBuf,

    #[serde(default)]
    pub api: ApiConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_min_date() -> String {
    "2024-11-25".to_string()
}

fn default_brawlers_to_remove() -> usize {
    45
}

fn default_token_cache() -> PathBuf {
    PathBuf::from("./.token_cache.json")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            min_date: default_min_date(),
            brawlers_to_remove: default_brawlers_to_remove(),
            token_cache: default_token_cache(),
            api: ApiConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the given file when it exists, else fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "API timeout must be greater than 0".to_string(),
            ));
        }

        if self.api.trophy_ranges.is_empty() {
            return Err(ConfigError::ValidationError(
                "At least one trophy range is required".to_string(),
            ));
        }

        if NaiveDate::parse_from_str(&self.min_date, "%Y-%m-%d").is_err() {
            return Err(ConfigError::ValidationError(format!(
                "min_date is not a YYYY-MM-DD date: {}",
                self.min_date
            )));
        }

        for (name, value) in [("cube_url", &self.api.cube_url), ("auth_url", &self.api.auth_url)] {
            if Url::parse(value).is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "{} is not a valid URL: {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    /// Build the cube client configuration.
    pub fn cube_config(&self) -> Result<CubeConfig, ConfigError> {
        Ok(CubeConfig {
            base_url: parse_url("cube_url", &self.api.cube_url)?,
            timeout: Duration::from_secs(self.api.timeout_seconds),
            trophy_ranges: self.api.trophy_ranges.clone(),
            origin: self.api.origin.clone(),
            referer: self.api.referer.clone(),
        })
    }

    /// Build the token manager configuration.
    pub fn auth_config(&self) -> Result<AuthConfig, ConfigError> {
        Ok(AuthConfig {
            auth_url: parse_url("auth_url", &self.api.auth_url)?,
            cache_path: self.token_cache.clone(),
            timeout: Duration::from_secs(self.api.timeout_seconds),
            origin: self.api.origin.clone(),
            referer: self.api.referer.clone(),
        })
    }
}

fn parse_url(name: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value)
        .map_err(|e| ConfigError::ValidationError(format!("{} is not a valid URL: {}", name, e)))
}
