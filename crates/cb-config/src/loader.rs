//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "clientbook.toml",
    "./config/config.toml",
    "/etc/clientbook/config.toml",
];

/// Env var naming an explicit config file
const CONFIG_PATH_VAR: &str = "CLIENTBOOK_CONFIG";

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides,
    /// then validate it.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, |key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Ok(path) = env::var(CONFIG_PATH_VAR) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `CLIENTBOOK_*` overrides read through `lookup`.
///
/// Numeric values that fail to parse are ignored; an unknown storage backend
/// is an error.
pub(crate) fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(port) = lookup("CLIENTBOOK_HTTP_PORT").and_then(|v| v.parse().ok()) {
        config.http.port = port;
    }
    if let Some(val) = lookup("CLIENTBOOK_HTTP_HOST") {
        config.http.host = val;
    }
    if let Some(val) = lookup("CLIENTBOOK_CORS_ORIGINS") {
        config.http.cors_origins = val.split(',').map(|s| s.trim().to_string()).collect();
    }

    // MongoDB
    if let Some(val) = lookup("CLIENTBOOK_MONGODB_URI") {
        config.mongodb.uri = val;
    }
    if let Some(val) = lookup("CLIENTBOOK_MONGODB_DATABASE") {
        config.mongodb.database = val;
    }
    if let Some(val) = lookup("CLIENTBOOK_MONGODB_CREATE_INDEXES") {
        config.mongodb.create_indexes = val.parse().unwrap_or(true);
    }

    // Storage
    if let Some(val) = lookup("CLIENTBOOK_STORAGE_BACKEND") {
        config.storage.backend = val.parse()?;
    }

    // Pagination
    if let Some(limit) = lookup("CLIENTBOOK_PAGINATION_DEFAULT_LIMIT").and_then(|v| v.parse().ok()) {
        config.pagination.default_limit = limit;
    }
    if let Some(limit) = lookup("CLIENTBOOK_PAGINATION_MAX_LIMIT").and_then(|v| v.parse().ok()) {
        config.pagination.max_limit = limit;
    }

    Ok(())
}
