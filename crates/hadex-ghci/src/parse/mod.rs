//! Stateless parsers for interpreter reply text
//!
//! All parsers here are pure functions of their input lines: running one
//! twice yields identical results. "No match" is a normal outcome (an
//! unverified breakpoint, a terminated program, an empty evaluate result),
//! expressed as `Option`/enum variants; only a recognized diagnostic heading
//! with an unclassifiable body is an error.

pub mod breaks;
pub mod messages;
pub mod stop;

pub use breaks::{parse_break_confirmation, BreakConfirmation};
pub use messages::{parse_load_output, LocationForm};
pub use stop::{parse_eval_reply, parse_run_response, RunOutcome, StopEvent};
