//! Interpreter process configuration

use crate::constants::{
    DEFAULT_GHCI_ARGS, DEFAULT_GHCI_COMMAND, DEFAULT_PROMPT_SENTINEL, DEFAULT_STARTUP_TIMEOUT_MS,
    DEFAULT_STDERR_SETTLE_MS,
};
use serde::{Deserialize, Serialize};

/// How to start and frame the GHCi subprocess.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GhciConfig {
    /// Interpreter command (`ghci`, `stack repl`, `cabal repl`, ...)
    #[serde(default = "default_command")]
    pub command: String,
    /// Extra arguments appended after the defaults
    #[serde(default)]
    pub args: Vec<String>,
    /// Prompt sentinel installed at session start; response framing depends
    /// on this string never appearing in real program output
    #[serde(default = "default_prompt_sentinel")]
    pub prompt_sentinel: String,
    /// Maximum wait for the first prompt (milliseconds)
    #[serde(default = "default_startup_timeout_ms")]
    pub startup_timeout_ms: u64,
    /// Post-prompt stderr drain window (milliseconds)
    #[serde(default = "default_stderr_settle_ms")]
    pub stderr_settle_ms: u64,
}

fn default_command() -> String {
    DEFAULT_GHCI_COMMAND.to_string()
}

fn default_prompt_sentinel() -> String {
    DEFAULT_PROMPT_SENTINEL.to_string()
}

fn default_startup_timeout_ms() -> u64 {
    DEFAULT_STARTUP_TIMEOUT_MS
}

fn default_stderr_settle_ms() -> u64 {
    DEFAULT_STDERR_SETTLE_MS
}

impl Default for GhciConfig {
    fn default() -> Self {
        GhciConfig {
            command: default_command(),
            args: Vec::new(),
            prompt_sentinel: default_prompt_sentinel(),
            startup_timeout_ms: default_startup_timeout_ms(),
            stderr_settle_ms: default_stderr_settle_ms(),
        }
    }
}

impl GhciConfig {
    /// Full argument list: forced defaults first, then user extras.
    pub fn full_args(&self) -> Vec<String> {
        DEFAULT_GHCI_ARGS
            .iter()
            .map(|a| a.to_string())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GhciConfig::default();
        assert_eq!(config.command, "ghci");
        assert_eq!(config.prompt_sentinel, "###hadex-sync###");
        assert_eq!(config.startup_timeout_ms, 60_000);
    }

    #[test]
    fn test_full_args_keeps_color_off() {
        let config = GhciConfig {
            args: vec!["-XOverloadedStrings".to_string()],
            ..GhciConfig::default()
        };
        let args = config.full_args();
        assert_eq!(args[0], "-fdiagnostics-color=never");
        assert!(args.contains(&"-XOverloadedStrings".to_string()));
    }
}
