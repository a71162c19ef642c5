//! Shop configuration.
//!
//! Loaded from environment variables with fallback to defaults.
//!
//! | Variable                    | Default     |
//! |-----------------------------|-------------|
//! | `KHONG_DB_PATH`             | `khong.db`  |
//! | `KHONG_STORE_NAME`          | `Khong Shop`|
//! | `KHONG_LOW_STOCK_THRESHOLD` | `10`        |
//! | `KHONG_MAX_CONNECTIONS`     | `5`         |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::pool::DbConfig;
use khong_core::DEFAULT_LOW_STOCK_THRESHOLD;

/// Shop-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Shown on the dashboard header
    pub store_name: String,

    /// Stock level at or below which a product is reported as low
    pub low_stock_threshold: i64,

    /// Pool size
    pub max_connections: u32,
}

impl Default for ShopConfig {
    fn default() -> Self {
        ShopConfig {
            database_path: PathBuf::from("khong.db"),
            store_name: "Khong Shop".to_string(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            max_connections: 5,
        }
    }
}

impl ShopConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup (environment, tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ShopConfig::default();

        let config = ShopConfig {
            database_path: lookup("KHONG_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            store_name: lookup("KHONG_STORE_NAME")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.store_name),

            low_stock_threshold: parse_or(&lookup, "KHONG_LOW_STOCK_THRESHOLD", defaults.low_stock_threshold)?,

            max_connections: parse_or(&lookup, "KHONG_MAX_CONNECTIONS", defaults.max_connections)?,
        };

        if config.low_stock_threshold < 0 {
            return Err(ConfigError::InvalidValue("KHONG_LOW_STOCK_THRESHOLD".to_string()));
        }
        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("KHONG_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// Pool settings for this shop's database.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.max_connections)
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
