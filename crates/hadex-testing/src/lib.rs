//! Test support for hadex crates
//!
//! - [`fixtures`] - canned interpreter transcripts (reload outputs, stop
//!   announcements, breakpoint confirmations)
//! - [`mocks`] - [`mocks::ScriptedGhci`], a `GhciSession` that replays
//!   scripted replies, and [`mocks::CollectingSink`], a `DiagnosticsSink`
//!   that records what was published

pub mod fixtures;
pub mod mocks;

pub use mocks::{CollectingSink, ScriptedGhci};
