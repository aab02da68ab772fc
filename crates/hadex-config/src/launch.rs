//! Launch configuration
//!
//! The editor sends these attributes with the launch request; they are not
//! read from the config file. Missing module/function fall back to the
//! conventional `Main`/`main` pair; an explicitly empty module still aborts
//! the launch before any session work starts.

use crate::constants::{DEFAULT_FUNCTION, DEFAULT_MODULE};
use serde::{Deserialize, Serialize};

/// Resolved launch attributes for one debug session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Module to `:load`
    pub module: String,
    /// Function to run (entry point of the debuggee)
    pub function: String,
    /// Stop at the first step boundary instead of running to the first
    /// breakpoint
    #[serde(default)]
    pub stop_on_entry: bool,
    /// Verbose protocol logging for this session
    #[serde(default)]
    pub trace: bool,
}

impl LaunchConfig {
    /// Fill unspecified module/function with the conventional defaults.
    pub fn resolve(module: Option<String>, function: Option<String>) -> Self {
        LaunchConfig {
            module: module.unwrap_or_else(|| DEFAULT_MODULE.to_string()),
            function: function.unwrap_or_else(|| DEFAULT_FUNCTION.to_string()),
            stop_on_entry: false,
            trace: false,
        }
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self::resolve(None, None)
    }
}
