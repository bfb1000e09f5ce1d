use std::{fs, path::Path};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::error;

/// Errors related to application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for the requested type.
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A value parsed fine but is not acceptable.
    #[error("Invalid config value for `{field}`: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Reads and deserializes a TOML config file.
///
/// Failures are logged before being returned so a bad config shows up in the
/// log even when the caller only prints a summary.
pub fn load_toml_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let shown = path.display().to_string();

    let content = fs::read_to_string(path).map_err(|source| {
        error!(path = %shown, error = %source, "failed to read config file");
        ConfigError::Read {
            path: shown.clone(),
            source,
        }
    })?;

    toml::from_str(&content).map_err(|source| {
        error!(path = %shown, error = %source, "failed to parse config file");
        ConfigError::Parse {
            path: shown,
            source,
        }
    })
}
