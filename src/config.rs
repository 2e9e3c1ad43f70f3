//! Application configuration.
//!
//! Configuration is read from an optional TOML file; a missing file means
//! defaults, an unreadable or malformed file is an error. The database URL
//! and catalog path can additionally be overridden by environment variables
//! (handled at the call site in `main`).

use crate::db::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// What the quantity "minus" action does when the quantity is already 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecrementPolicy {
    /// Decrementing past zero unchecks the product and drops its quantity
    #[default]
    UncheckAtZero,
    /// The quantity clamps at 1 and the product stays checked
    ClampAtOne,
}

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `SQLite` connection URL for the key/value store
    pub database_url: String,
    /// Path to the static catalog JSON source
    pub catalog_path: String,
    /// Behavior of the quantity "minus" action at quantity 1
    pub decrement_policy: DecrementPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            catalog_path: "products.json".to_owned(),
            decrement_policy: DecrementPolicy::default(),
        }
    }
}

/// Loads configuration from `path`.
///
/// A missing file yields the defaults; a file that exists but cannot be read
/// or parsed is a configuration error.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        tracing::debug!("no config file at {:?}, using defaults", path_ref);
        return Ok(AppConfig::default());
    }

    let contents = fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;
    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse TOML from config file {path_ref:?}: {e}"),
    })
}
