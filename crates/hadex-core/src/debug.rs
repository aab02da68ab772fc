//! Debugger state records
//!
//! These are the typed results of parsing GHCi's breakpoint confirmations
//! and stop announcements. Coordinates are kept exactly as the interpreter
//! confirmed them (1-based); the protocol layer shifts them at the wire.

use serde::{Deserialize, Serialize};

/// A breakpoint as confirmed (or refused) by the interpreter.
///
/// `verified` is true iff the confirmation text parsed; an unverified
/// breakpoint keeps the requested line so the editor can still render it.
/// The whole table is torn down and replaced on every set - breakpoints are
/// never added incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub id: u64,
    pub verified: bool,
    /// 1-based line as confirmed by the interpreter.
    pub line: u32,
    /// 1-based column as confirmed by the interpreter.
    pub column: u32,
    pub source_name: String,
    pub source_path: String,
}

/// The interpreter's current suspended position.
///
/// Exactly one instance exists per active debug session, overwritten on
/// every stop; there is none while the program runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopLocation {
    /// Possibly qualified function name, e.g. `Main.fib`.
    pub function: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl StopLocation {
    /// Unqualified function name for frame display (`Main.fib` -> `fib`).
    pub fn frame_name(&self) -> &str {
        self.function.rsplit('.').next().unwrap_or(&self.function)
    }
}

/// A binding in scope at a stop, parsed from a `name :: type = value` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub ty: String,
    pub value: String,
}

/// Why the session stopped.
///
/// `Breakpoint` iff the stop position exactly matches a stored breakpoint's
/// line and column; every other suspension is a `Step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Breakpoint,
    Step,
}

impl StopReason {
    /// Protocol string for the stopped event.
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Breakpoint => "breakpoint",
            StopReason::Step => "step",
        }
    }
}
