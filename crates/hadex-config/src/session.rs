//! Debug session configuration

use crate::constants::{DEFAULT_CONFIGURATION_DONE_TIMEOUT_MS, DEFAULT_EVENT_CHANNEL_CAPACITY};
use serde::{Deserialize, Serialize};

/// Timing and capacity knobs for one debug session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Bounded wait for the configuration-done handshake during launch
    /// (milliseconds); on timeout the launch proceeds anyway
    #[serde(default = "default_configuration_done_timeout_ms")]
    pub configuration_done_timeout_ms: u64,
    /// Capacity of the session event channel
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

fn default_configuration_done_timeout_ms() -> u64 {
    DEFAULT_CONFIGURATION_DONE_TIMEOUT_MS
}

fn default_event_channel_capacity() -> usize {
    DEFAULT_EVENT_CHANNEL_CAPACITY
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            configuration_done_timeout_ms: default_configuration_done_timeout_ms(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}
