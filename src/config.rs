//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Environment variable holding the local store path.
pub const DB_PATH_ENV: &str = "FITTRACK_DB_PATH";
/// Environment variable holding the fallback log filter.
pub const LOG_FILTER_ENV: &str = "FITTRACK_LOG";

/// Core configuration for the CLI and embedding callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Path to the local libSQL document store.
    pub db_path: PathBuf,
    /// Log filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/fittrack.db"),
            log_filter: "info".to_string(),
        }
    }
}

impl CoreConfig {
    /// Build a config from the process environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (tests use a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(DB_PATH_ENV) {
            let path = path.trim();
            if path.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: DB_PATH_ENV.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }
            config.db_path = PathBuf::from(path);
        }

        if let Some(filter) = lookup(LOG_FILTER_ENV) {
            if !filter.trim().is_empty() {
                config.log_filter = filter.trim().to_string();
            }
        }

        Ok(config)
    }
}
