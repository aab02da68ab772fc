//! Configuration file loading
//!
//! Loads [`Config`] from a TOML file. The path comes from, in priority
//! order: an explicit argument, the `HADEX_CONFIG` environment variable, or
//! `hadex.toml` in the working directory. A missing file is not an error at
//! the call sites that accept defaults - use [`load_config_or_default`].

use crate::constants::ENV_HADEX_CONFIG;
use crate::Config;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILENAME: &str = "hadex.toml";

/// Errors that can occur during config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Resolve the config file path from an explicit override or the
/// environment.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(ENV_HADEX_CONFIG) {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_CONFIG_FILENAME)
}

/// Strict loader: errors if the file is missing or malformed.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Lenient loader: a missing file yields the defaults, a malformed file is
/// still an error (silently ignoring a broken config hides user mistakes).
pub fn load_config_or_default(path: &Path) -> Result<Config, ConfigError> {
    match load_config(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::NotFound(_)) => {
            debug!(
                "No config file at {}, using built-in defaults",
                path.display()
            );
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}
