//! Wall configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of stored images before oldest-first eviction kicks in.
pub const DEFAULT_MAX_RECORDS: usize = 10_000;

pub const DEFAULT_DATABASE: &str = "hashwall.db";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_records must be greater than zero")]
    ZeroCapacity,
}

/// Settings shared by every run mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallConfig {
    pub max_records: usize,
    pub database: PathBuf,
}

impl WallConfig {
    pub fn new(max_records: usize, database: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let config = Self {
            max_records,
            database: database.into(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_records == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            database: PathBuf::from(DEFAULT_DATABASE),
        }
    }
}

/// Load a `.env` file into the process environment if one exists.
pub fn load_env() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_observed_capacity() {
        let config = WallConfig::default();
        assert_eq!(config.max_records, 10_000);
        assert_eq!(config.database, PathBuf::from("hashwall.db"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(WallConfig::new(0, "x.db"), Err(ConfigError::ZeroCapacity));
    }
}
