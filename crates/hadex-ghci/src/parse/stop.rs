//! Stop announcements and evaluate replies
//!
//! After a run/step/continue command, the interpreter either prints a stop
//! announcement (`Stopped in <name>, <file>:<loc>`) followed by the bindings
//! in scope, or it prints whatever the program printed and returns to the
//! prompt - which means the program ran to completion. "No stop pattern
//! matched" is therefore a terminated program, not a parse failure.

use hadex_core::{Binding, StopLocation};
use regex::Regex;
use std::sync::OnceLock;

/// A parsed stop announcement: where execution suspended and which bindings
/// are in scope there. The binding list fully replaces any previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopEvent {
    pub location: StopLocation,
    pub bindings: Vec<Binding>,
}

/// Outcome of one run/step/continue command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Execution suspended at a breakpoint or step boundary.
    Stopped(StopEvent),
    /// No stop announcement in the response: the program ran to completion.
    Terminated,
}

static STOP_POINT: OnceLock<Regex> = OnceLock::new();
static STOP_PAIR: OnceLock<Regex> = OnceLock::new();
static BINDING_LINE: OnceLock<Regex> = OnceLock::new();
static EVAL_REPLY: OnceLock<Regex> = OnceLock::new();

/// `Stopped in Main.f, Fib.hs:5:3`
fn stop_point() -> &'static Regex {
    STOP_POINT.get_or_init(|| {
        Regex::new(r"Stopped in (?P<function>\S+),\s(?P<file>.*):(?P<line>\d+):(?P<col>\d+)")
            .expect("Static regex is valid")
    })
}

/// `Stopped in Main.f, Fib.hs:(5,3)`
fn stop_pair() -> &'static Regex {
    STOP_PAIR.get_or_init(|| {
        Regex::new(r"Stopped in (?P<function>\S+),\s(?P<file>.*):\((?P<line>\d+),(?P<col>\d+)\)")
            .expect("Static regex is valid")
    })
}

/// `x :: Int = 1`
fn binding_line() -> &'static Regex {
    BINDING_LINE.get_or_init(|| {
        Regex::new(r"^(?P<name>.+?) :: (?P<ty>.+?) = (?P<value>.+)$").expect("Static regex is valid")
    })
}

/// `[2: Fib.hs:5:3] 42` - step-trace mode prefixes values with a bracketed
/// step counter.
fn eval_reply() -> &'static Regex {
    EVAL_REPLY
        .get_or_init(|| Regex::new(r"\[.+\]\s+(?P<value>.+)").expect("Static regex is valid"))
}

/// Parse the full response of a run/step/continue command.
///
/// The two stop patterns are tried against the joined text; if neither
/// matches, the program is considered to have run to completion and no state
/// should be touched by the caller. On a match, every line of the response
/// is scanned for `name :: type = value` bindings.
pub fn parse_run_response(lines: &[String]) -> RunOutcome {
    let text = lines.join("\n");

    let captures = stop_point()
        .captures(&text)
        .or_else(|| stop_pair().captures(&text));

    let Some(caps) = captures else {
        return RunOutcome::Terminated;
    };

    let (Ok(line), Ok(column)) = (caps["line"].parse(), caps["col"].parse()) else {
        // Digit groups that overflow u32 cannot come from a real source
        // position; treat the announcement as absent.
        return RunOutcome::Terminated;
    };

    let location = StopLocation {
        function: caps["function"].to_string(),
        file: caps["file"].to_string(),
        line,
        column,
    };

    let bindings = text
        .lines()
        .filter_map(|line| {
            binding_line().captures(line).map(|caps| Binding {
                name: caps["name"].to_string(),
                ty: caps["ty"].to_string(),
                value: caps["value"].to_string(),
            })
        })
        .collect();

    RunOutcome::Stopped(StopEvent { location, bindings })
}

/// Parse a bare-evaluation reply of the shape `[<step info>] <value>`.
///
/// Empty or unrecognized output yields `None` - a normal degraded outcome,
/// surfaced to the editor as an empty evaluate result.
pub fn parse_eval_reply(lines: &[String]) -> Option<String> {
    let first = lines.first()?;
    if first.is_empty() {
        return None;
    }
    eval_reply()
        .captures(first)
        .map(|caps| caps["value"].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &[&str]) -> Vec<String> {
        input.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_stop_with_bindings() {
        let response = lines(&[
            "Stopped in Main.f, Foo.hs:5:3",
            "x :: Int = 1",
            "y :: [Int] = [1,2]",
        ]);
        let outcome = parse_run_response(&response);
        let RunOutcome::Stopped(stop) = outcome else {
            panic!("Expected a stop");
        };
        assert_eq!(stop.location.function, "Main.f");
        assert_eq!(stop.location.file, "Foo.hs");
        assert_eq!(stop.location.line, 5);
        assert_eq!(stop.location.column, 3);
        assert_eq!(
            stop.bindings,
            vec![
                Binding {
                    name: "x".into(),
                    ty: "Int".into(),
                    value: "1".into()
                },
                Binding {
                    name: "y".into(),
                    ty: "[Int]".into(),
                    value: "[1,2]".into()
                },
            ]
        );
    }

    #[test]
    fn test_stop_pair_location_form() {
        let response = lines(&["Stopped in Fib.go, Fib.hs:(9,5)", "_result :: Int = _"]);
        let RunOutcome::Stopped(stop) = parse_run_response(&response) else {
            panic!("Expected a stop");
        };
        assert_eq!(stop.location.line, 9);
        assert_eq!(stop.location.column, 5);
        assert_eq!(stop.bindings.len(), 1);
        assert_eq!(stop.bindings[0].name, "_result");
    }

    #[test]
    fn test_stop_heading_not_on_first_line() {
        // Program output can precede the announcement.
        let response = lines(&["hello from the program", "Stopped in Main.main, Main.hs:2:8"]);
        assert!(matches!(
            parse_run_response(&response),
            RunOutcome::Stopped(_)
        ));
    }

    #[test]
    fn test_no_stop_is_terminated() {
        let response = lines(&["42", "it :: Int"]);
        assert_eq!(parse_run_response(&response), RunOutcome::Terminated);
    }

    #[test]
    fn test_empty_response_is_terminated() {
        assert_eq!(parse_run_response(&[]), RunOutcome::Terminated);
    }

    #[test]
    fn test_binding_scan_ignores_non_binding_lines() {
        let response = lines(&[
            "Stopped in Main.f, Foo.hs:5:3",
            "some program output",
            "n :: Integer = 10",
        ]);
        let RunOutcome::Stopped(stop) = parse_run_response(&response) else {
            panic!("Expected a stop");
        };
        assert_eq!(stop.bindings.len(), 1);
        assert_eq!(stop.bindings[0].value, "10");
    }

    #[test]
    fn test_binding_value_may_contain_equals() {
        let response = lines(&[
            "Stopped in Main.f, Foo.hs:5:3",
            "f :: Int -> Int = \\x -> x = x",
        ]);
        let RunOutcome::Stopped(stop) = parse_run_response(&response) else {
            panic!("Expected a stop");
        };
        // Lazy name/type groups split on the first ` :: ` and first ` = `.
        assert_eq!(stop.bindings[0].name, "f");
        assert_eq!(stop.bindings[0].ty, "Int -> Int");
        assert_eq!(stop.bindings[0].value, "\\x -> x = x");
    }

    #[test]
    fn test_eval_reply_with_step_counter() {
        let reply = lines(&["[2: Fib.hs:5:3-20] 42"]);
        assert_eq!(parse_eval_reply(&reply), Some("42".to_string()));
    }

    #[test]
    fn test_eval_reply_empty_output() {
        assert_eq!(parse_eval_reply(&lines(&[""])), None);
        assert_eq!(parse_eval_reply(&[]), None);
    }

    #[test]
    fn test_eval_reply_unrecognized_output() {
        assert_eq!(parse_eval_reply(&lines(&["just some text"])), None);
    }
}
