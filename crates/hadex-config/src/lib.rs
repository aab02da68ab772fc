//! Configuration for hadex
//!
//! All tunables live in serde structs with per-field defaults, so a config
//! file only needs to mention what it changes:
//!
//! ```toml
//! [ghci]
//! command = "stack"
//! args = ["repl"]
//!
//! [session]
//! configuration_done_timeout_ms = 5000
//! ```
//!
//! Defaults are centralized in [`constants`]; file loading is in [`loader`].

pub mod constants;
pub mod ghci;
pub mod launch;
pub mod loader;
pub mod session;

pub use ghci::GhciConfig;
pub use launch::LaunchConfig;
pub use loader::{load_config, load_config_or_default, resolve_config_path, ConfigError};
pub use session::SessionConfig;

use serde::{Deserialize, Serialize};

/// Top-level configuration, as read from `hadex.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ghci: GhciConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.ghci.command, constants::DEFAULT_GHCI_COMMAND);
        assert_eq!(
            config.session.event_channel_capacity,
            constants::DEFAULT_EVENT_CHANNEL_CAPACITY
        );
    }
}
