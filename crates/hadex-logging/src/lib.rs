//! Centralized logging configuration for hadex
//!
//! Wraps `tracing` and `tracing-subscriber` so every binary initializes
//! logging the same way.
//!
//! # Usage
//!
//! ```rust,ignore
//! use hadex_logging::{init, LogConfig, LogOutput};
//!
//! // CLI with a debug flag
//! init(LogConfig::cli(debug));
//!
//! // Adapter mode: stdout carries protocol frames, logs must go to stderr
//! init(LogConfig::adapter(debug));
//! ```
//!
//! # Re-exports
//!
//! The usual tracing macros are re-exported for standardized imports:
//! `trace!`, `debug!`, `info!`, `warn!`, `error!`.

use std::io::IsTerminal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-export tracing macros for standardized imports
pub use tracing::{debug, error, info, trace, warn, Level};

/// Output destination for logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogOutput {
    /// Write logs to stdout (default)
    #[default]
    Stdout,
    /// Write logs to stderr (required when stdout carries protocol frames)
    Stderr,
}

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Enable debug-level logging (overrides default_level)
    pub debug: bool,
    /// Default log level when RUST_LOG is not set
    pub default_level: String,
    /// Output destination
    pub output: LogOutput,
    /// Show module target in log output
    pub show_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            default_level: "info".to_string(),
            output: LogOutput::Stdout,
            show_target: false,
        }
    }
}

impl LogConfig {
    /// Create a new LogConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable debug-level logging
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Set the default log level (used when RUST_LOG is not set)
    pub fn default_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }

    /// Set the output destination
    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Show or hide module target in log output
    pub fn show_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    /// Convenience: configure for CLI usage
    pub fn cli(debug: bool) -> Self {
        Self::new().debug(debug)
    }

    /// Convenience: configure for adapter usage (logs to stderr, stdout is
    /// reserved for the debug protocol)
    pub fn adapter(debug: bool) -> Self {
        Self::new().debug(debug).output(LogOutput::Stderr)
    }

    fn build_filter(&self) -> EnvFilter {
        if self.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&self.default_level))
        }
    }
}

/// Initialize the logging system with the given configuration.
///
/// Call once at startup. `RUST_LOG` overrides the configured default level
/// (e.g. `RUST_LOG=hadex_ghci=trace`).
///
/// # Panics
///
/// Panics if called more than once (tracing can only be initialized once).
pub fn init(config: LogConfig) {
    let filter = config.build_filter();

    match config.output {
        LogOutput::Stdout => {
            let is_tty = std::io::stdout().is_terminal();
            fmt()
                .with_env_filter(filter)
                .with_target(config.show_target)
                .with_ansi(is_tty)
                .init();
        }
        LogOutput::Stderr => {
            let is_tty = std::io::stderr().is_terminal();
            fmt()
                .with_env_filter(filter)
                .with_target(config.show_target)
                .with_writer(std::io::stderr)
                .with_ansi(is_tty)
                .init();
        }
    }
}

/// Initialize logging for tests.
///
/// Uses `with_test_writer()` to capture logs in test output.
/// Safe to call multiple times (uses `try_init` internally).
pub fn init_test() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let config = LogConfig::new()
            .debug(true)
            .output(LogOutput::Stderr)
            .show_target(true);
        assert!(config.debug);
        assert_eq!(config.output, LogOutput::Stderr);
        assert!(config.show_target);
    }

    #[test]
    fn test_adapter_config_uses_stderr() {
        let config = LogConfig::adapter(false);
        assert_eq!(config.output, LogOutput::Stderr);
    }

    #[test]
    fn test_build_filter_respects_debug_flag() {
        let config = LogConfig::new().default_level("warn").debug(true);
        let filter_str = format!("{:?}", config.build_filter());
        assert!(
            filter_str.contains("debug") || filter_str.contains("DEBUG"),
            "Expected debug level in filter: {}",
            filter_str
        );
    }

    #[test]
    fn test_init_test_does_not_panic() {
        init_test();
        init_test(); // Second call should not panic
    }
}
