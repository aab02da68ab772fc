//! Default constants for hadex configuration
//!
//! Single source of truth for every configurable default. Anything that a
//! config file can override should have its default here.

// ============================================================================
// ENVIRONMENT VARIABLES
// ============================================================================

/// Config file path override
pub const ENV_HADEX_CONFIG: &str = "HADEX_CONFIG";

// ============================================================================
// INTERPRETER
// ============================================================================

/// Command used to start the interpreter session
pub const DEFAULT_GHCI_COMMAND: &str = "ghci";

/// Arguments always passed to the interpreter.
/// Color codes would corrupt the line parsers, so they are forced off.
pub const DEFAULT_GHCI_ARGS: &[&str] = &["-fdiagnostics-color=never"];

/// Prompt sentinel installed via `:set prompt`; a line ending with this
/// marks the end of one command's response
pub const DEFAULT_PROMPT_SENTINEL: &str = "###hadex-sync###";

// ============================================================================
// TIMEOUTS
// ============================================================================

/// Maximum time to wait for the interpreter's first prompt (milliseconds).
/// Covers interpreter startup plus any initial compilation.
pub const DEFAULT_STARTUP_TIMEOUT_MS: u64 = 60_000;

/// How long to keep draining stderr after a command's prompt returned
/// (milliseconds). Compiler messages arrive on stderr and may trail the
/// stdout prompt by a scheduling hiccup.
pub const DEFAULT_STDERR_SETTLE_MS: u64 = 50;

/// Bounded wait for the editor's configuration-done signal during launch
/// (milliseconds). After this, the launch proceeds rather than hanging.
pub const DEFAULT_CONFIGURATION_DONE_TIMEOUT_MS: u64 = 10_000;

// ============================================================================
// CHANNEL CAPACITIES
// ============================================================================

/// Capacity of the session event channel (stopped/terminated events)
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;

// ============================================================================
// LAUNCH DEFAULTS
// ============================================================================

/// Module loaded when the launch request names none
pub const DEFAULT_MODULE: &str = "Main";

/// Function run when the launch request names none
pub const DEFAULT_FUNCTION: &str = "main";
