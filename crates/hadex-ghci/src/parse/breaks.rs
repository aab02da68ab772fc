//! Breakpoint confirmation parsing
//!
//! A successful `:break` prints one line like
//!
//! ```text
//! Breakpoint 0 activated at Fib.hs:7:1-10
//! Breakpoint 1 activated at Fib.hs:(10,1)-(10,5)
//! ```
//!
//! Only the first line of the reply is consulted. A reply matching neither
//! shape means the breakpoint was not set - a degraded outcome the caller
//! surfaces as an unverified breakpoint, not a failure of the whole batch.

use regex::Regex;
use std::sync::OnceLock;

/// Identifier and position the interpreter assigned to a breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakConfirmation {
    pub id: u64,
    /// 1-based line the interpreter actually chose (it may move a
    /// breakpoint to the nearest breakable location).
    pub line: u32,
    /// 1-based starting column of the breakable expression.
    pub column: u32,
}

static CONFIRM_COLUMN_SPAN: OnceLock<Regex> = OnceLock::new();
static CONFIRM_PAIR_SPAN: OnceLock<Regex> = OnceLock::new();

/// `Breakpoint <id> ... <file>:<line>:<col0>-<col1>`
fn confirm_column_span() -> &'static Regex {
    CONFIRM_COLUMN_SPAN.get_or_init(|| {
        Regex::new(r"Breakpoint\s(?P<id>\d+).+?:(?P<line>\d+):(?P<col>\d+)-\d+")
            .expect("Static regex is valid")
    })
}

/// `Breakpoint <id> ... <file>:(<l0>,<c0>)-(<l1>,<c1>)`
fn confirm_pair_span() -> &'static Regex {
    CONFIRM_PAIR_SPAN.get_or_init(|| {
        Regex::new(r"Breakpoint\s(?P<id>\d+).+?:\((?P<line>\d+),(?P<col>\d+)\)-\(\d+,\d+\)")
            .expect("Static regex is valid")
    })
}

/// Extract (id, line, column) from a `:break` reply, or `None` when the
/// first line matches neither confirmation shape.
pub fn parse_break_confirmation(lines: &[String]) -> Option<BreakConfirmation> {
    let first = lines.first()?;

    let caps = confirm_column_span()
        .captures(first)
        .or_else(|| confirm_pair_span().captures(first))?;

    let id = caps["id"].parse().ok()?;
    let line = caps["line"].parse().ok()?;
    let column = caps["col"].parse().ok()?;

    Some(BreakConfirmation { id, line, column })
}
