//! Process configuration read from the environment (and `.env`).
//!
//! Every value here is required: a missing one stops the process before any
//! request is made.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::{Location, default_locations};

pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("failed to read locations file '{0}'")]
    LocationsRead(PathBuf, #[source] std::io::Error),

    #[error("failed to parse locations file '{0}'")]
    LocationsParse(PathBuf, #[source] serde_json::Error),

    #[error("locations file '{0}' lists no locations")]
    NoLocations(PathBuf),
}

/// Looks up a required, non-empty variable through `lookup`.
fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// Connection parameters for the PostgreSQL store.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl DatabaseConfig {
    /// Reads `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER` and `DB_PASSWORD`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = required(&lookup, "DB_PORT")?;
        Ok(Self {
            host: required(&lookup, "DB_HOST")?,
            port: port.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "DB_PORT",
                value: port.clone(),
            })?,
            name: required(&lookup, "DB_NAME")?,
            user: required(&lookup, "DB_USER")?,
            password: required(&lookup, "DB_PASSWORD")?,
        })
    }
}

/// Reads the air-quality API key.
pub fn google_api_key_from_env() -> Result<String, ConfigError> {
    required(&|k: &str| std::env::var(k).ok(), GOOGLE_API_KEY)
}

/// Loads the location registry from a JSON array file, or the built-in
/// registry when `path` is `None`.
///
/// ```json
/// [{ "city": "Savannah", "country": "USA", "latitude": 32.0809, "longitude": -81.0912 }]
/// ```
pub fn load_locations(path: Option<&Path>) -> Result<Vec<Location>, ConfigError> {
    let Some(path) = path else {
        return Ok(default_locations());
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::LocationsRead(path.to_path_buf(), e))?;
    let locations: Vec<Location> = serde_json::from_str(&content)
        .map_err(|e| ConfigError::LocationsParse(path.to_path_buf(), e))?;

    if locations.is_empty() {
        return Err(ConfigError::NoLocations(path.to_path_buf()));
    }
    Ok(locations)
}
