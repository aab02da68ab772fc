//! Hadex core - domain types for the GHCi debug adapter
//!
//! This crate holds the value objects shared by every other hadex crate:
//!
//! - [`SourceSpan`] - source ranges, converted once from GHCi's 1-based
//!   coordinates to the 0-based half-open ranges the editor protocol wants
//! - [`Diagnostic`] / [`Severity`] - compiler messages from a reload
//! - [`Breakpoint`], [`StopLocation`], [`Binding`] - debugger state records
//! - [`Error`] / [`Result`] - the shared error type
//!
//! Nothing here talks to a process or a socket; parsing and I/O live in
//! `hadex-ghci` and `hadex-dap`.

pub mod debug;
pub mod diagnostic;
pub mod error;
pub mod span;

pub use debug::{Binding, Breakpoint, StopLocation, StopReason};
pub use diagnostic::{Diagnostic, FileDiagnostic, Severity};
pub use error::{Error, Result};
pub use span::SourceSpan;
