use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use crate::errors::CacheError;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    pub max_connections: Option<u32>,
}

/// Cache behavior settings, fixed at worker startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of records kept in the store (`N_max`)
    #[serde(default = "default_capacity")]
    pub capacity: u64,

    /// Prefix for every derived cache key
    #[serde(default = "default_scope_prefix")]
    pub scope_prefix: String,

    /// How long a record covering the current calendar year stays servable
    #[serde(default = "default_current_period_ttl")]
    pub current_period_ttl: String,

    /// How long a record covering a closed (or unknown) period stays servable
    #[serde(default = "default_closed_period_ttl")]
    pub closed_period_ttl: String,
}

fn default_database_url() -> String {
    "sqlite://./data/stats-cache.db".to_string()
}
fn default_capacity() -> u64 {
    20
}
fn default_scope_prefix() -> String {
    "isd".to_string()
}
fn default_current_period_ttl() -> String {
    "1h".to_string()
}
fn default_closed_period_ttl() -> String {
    "365d".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            scope_prefix: default_scope_prefix(),
            current_period_ttl: default_current_period_ttl(),
            closed_period_ttl: default_closed_period_ttl(),
        }
    }
}

/// Resolved cache settings with parsed durations
///
/// The asymmetric TTL is the defining policy decision here: statistics for
/// the still-accumulating current year are volatile and refresh hourly,
/// while closed past years are effectively immutable and may be cached for
/// a year.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub capacity: u64,
    pub scope_prefix: String,
    pub current_period_ttl: Duration,
    pub closed_period_ttl: Duration,
}

impl CacheConfig {
    /// Parse the humantime TTL strings and validate the capacity bound
    pub fn resolve(&self) -> Result<CachePolicy, CacheError> {
        if self.capacity == 0 {
            return Err(CacheError::configuration("cache capacity must be at least 1"));
        }

        let current_period_ttl = humantime::parse_duration(&self.current_period_ttl)
            .map_err(|e| {
                CacheError::configuration(format!(
                    "invalid current_period_ttl '{}': {e}",
                    self.current_period_ttl
                ))
            })?;
        let closed_period_ttl =
            humantime::parse_duration(&self.closed_period_ttl).map_err(|e| {
                CacheError::configuration(format!(
                    "invalid closed_period_ttl '{}': {e}",
                    self.closed_period_ttl
                ))
            })?;

        Ok(CachePolicy {
            capacity: self.capacity,
            scope_prefix: self.scope_prefix.clone(),
            current_period_ttl,
            closed_period_ttl,
        })
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }
}
