//! Service configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use pvz_core::{AllowedCities, ValidationError};
use pvz_db::DbConfig;

/// Service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// Default deadline for one service call, in milliseconds
    pub request_timeout_ms: u64,

    /// How long a ledger write waits for the database lock, in milliseconds
    pub busy_timeout_ms: u64,

    /// Cities pickup points may be registered in
    pub allowed_cities: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            db_path: PathBuf::from("./pvz.db"),
            db_max_connections: 5,
            request_timeout_ms: 5000,
            busy_timeout_ms: 5000,
            allowed_cities: AllowedCities::default().as_slice().to_vec(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// - `PVZ_DB_PATH` (default `./pvz.db`)
    /// - `PVZ_DB_MAX_CONNECTIONS` (default 5)
    /// - `PVZ_REQUEST_TIMEOUT_MS` (default 5000)
    /// - `PVZ_BUSY_TIMEOUT_MS` (default 5000)
    /// - `PVZ_ALLOWED_CITIES` (comma-separated, exactly three)
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. `load` uses the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServiceConfig::default();

        let config = ServiceConfig {
            db_path: lookup("PVZ_DB_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),

            db_max_connections: parse_or(&lookup, "PVZ_DB_MAX_CONNECTIONS", defaults.db_max_connections)?,

            request_timeout_ms: parse_or(&lookup, "PVZ_REQUEST_TIMEOUT_MS", defaults.request_timeout_ms)?,

            busy_timeout_ms: parse_or(&lookup, "PVZ_BUSY_TIMEOUT_MS", defaults.busy_timeout_ms)?,

            allowed_cities: match lookup("PVZ_ALLOWED_CITIES") {
                Some(raw) => raw.split(',').map(|c| c.trim().to_string()).collect(),
                None => defaults.allowed_cities,
            },
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("PVZ_DB_MAX_CONNECTIONS".to_string()));
        }

        if config.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("PVZ_REQUEST_TIMEOUT_MS".to_string()));
        }

        // Fail at startup rather than on the first create call
        config.cities()?;

        Ok(config)
    }

    /// Store configuration derived from these settings.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.db_path.clone())
            .max_connections(self.db_max_connections)
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms))
    }

    /// The validated city whitelist.
    pub fn cities(&self) -> Result<AllowedCities, ConfigError> {
        AllowedCities::new(self.allowed_cities.iter().map(String::as_str))
            .map_err(ConfigError::AllowedCities)
    }

    /// Default per-call deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Invalid PVZ_ALLOWED_CITIES: {0}")]
    AllowedCities(ValidationError),
}
