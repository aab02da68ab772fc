//! GHCi session management and output parsing
//!
//! The interpreter has no structured request surface: commands are lines of
//! text, replies are free-form multi-line text ended by a prompt. This crate
//! owns both directions of that boundary:
//!
//! - [`command`] - the exact command vocabulary sent to the interpreter
//! - [`session`] - the [`GhciSession`] trait and the subprocess
//!   implementation with prompt-sentinel framing
//! - [`parse`] - stateless parsers turning reply text into typed records
//!   (diagnostics, stop events, breakpoint confirmations, evaluate results)

pub mod command;
pub mod parse;
pub mod session;

pub use command::GhciCommand;
pub use session::{GhciProcess, GhciSession};
