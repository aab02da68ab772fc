//! Reload output to diagnostics
//!
//! GHC's compiler messages are human-oriented text. A message starts with a
//! heading line - `<file>:<location>: <rest>` - where `<location>` takes one
//! of three shapes, and `<rest>` either carries the whole message or marks a
//! body of 4-space-indented continuation lines. The grammar is kept as data:
//! an ordered list of tagged heading patterns with named captures, so a new
//! location shape is one more entry, not a new capture-index convention.
//!
//! Lines that match nothing are skipped silently; interpreter banners and
//! progress chatter are expected between messages. Two special lines get
//! dedicated handling:
//!
//! - the reload summary (`Ok, ... loaded.` / `Failed, ... loaded.`) carries
//!   no diagnostic and is dropped;
//! - `Collecting type info for N module(s) ...` ends the parse outright,
//!   because every line after it is a duplicate of a message already seen
//!   (GHC issue #18068).

use hadex_core::{Diagnostic, Error, FileDiagnostic, Result, Severity, SourceSpan};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Warnings that surface runtime-fatal conditions; reported as errors.
const ESCALATED_WARNING_FLAGS: &[&str] = &[
    "-Wdeferred-type-errors",
    "-Wdeferred-out-of-scope-variables",
    "-Wtyped-holes",
];

/// Indent that marks a continuation line of a multi-line message body.
const BODY_INDENT: &str = "    ";

// ============================================================================
// Heading grammar (data, not positional indices)
// ============================================================================

/// The location shapes a heading can carry, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationForm {
    /// `line:col`
    Point,
    /// `line:col0-col1`
    ColumnSpan,
    /// `(l0,c0)-(l1,c1)`
    BlockSpan,
}

static POINT_HEADING: OnceLock<Regex> = OnceLock::new();
static COLUMN_SPAN_HEADING: OnceLock<Regex> = OnceLock::new();
static BLOCK_SPAN_HEADING: OnceLock<Regex> = OnceLock::new();

fn heading_patterns() -> [(LocationForm, &'static Regex); 3] {
    [
        (
            LocationForm::Point,
            POINT_HEADING.get_or_init(|| {
                Regex::new(r"^(?P<file>.+):(?P<line>\d+):(?P<col>\d+): (?P<rest>.+)$")
                    .expect("Static regex is valid")
            }),
        ),
        (
            LocationForm::ColumnSpan,
            COLUMN_SPAN_HEADING.get_or_init(|| {
                Regex::new(
                    r"^(?P<file>.+):(?P<line>\d+):(?P<col0>\d+)-(?P<col1>\d+): (?P<rest>.+)$",
                )
                .expect("Static regex is valid")
            }),
        ),
        (
            LocationForm::BlockSpan,
            BLOCK_SPAN_HEADING.get_or_init(|| {
                Regex::new(
                    r"^(?P<file>.+):\((?P<line0>\d+),(?P<col0>\d+)\)-\((?P<line1>\d+),(?P<col1>\d+)\): (?P<rest>.+)$",
                )
                .expect("Static regex is valid")
            }),
        ),
    ]
}

// ============================================================================
// Message-body classification
// ============================================================================

static RELOAD_SUMMARY: OnceLock<Regex> = OnceLock::new();
static COLLECTING_MARKER: OnceLock<Regex> = OnceLock::new();
static SINGLE_LINE_ERROR: OnceLock<Regex> = OnceLock::new();
static SINGLE_LINE_WARNING: OnceLock<Regex> = OnceLock::new();
static MULTI_LINE_ERROR: OnceLock<Regex> = OnceLock::new();
static MULTI_LINE_WARNING: OnceLock<Regex> = OnceLock::new();

fn reload_summary() -> &'static Regex {
    RELOAD_SUMMARY.get_or_init(|| {
        Regex::new(r"^(Ok|Failed),(.*) loaded\.$").expect("Static regex is valid")
    })
}

fn collecting_marker() -> &'static Regex {
    COLLECTING_MARKER.get_or_init(|| {
        Regex::new(r"Collecting type info for \d+ module\(s\) \.\.\.")
            .expect("Static regex is valid")
    })
}

fn single_line_error() -> &'static Regex {
    SINGLE_LINE_ERROR.get_or_init(|| {
        Regex::new(r"^error: (?:\[.+\] )?(?P<message>[^\[].*)$").expect("Static regex is valid")
    })
}

fn single_line_warning() -> &'static Regex {
    SINGLE_LINE_WARNING.get_or_init(|| {
        Regex::new(r"^warning: (?:\[GHC-.+\] )?\[(?P<flag>-W.+)\] (?P<message>.*)$")
            .expect("Static regex is valid")
    })
}

fn multi_line_error() -> &'static Regex {
    MULTI_LINE_ERROR
        .get_or_init(|| Regex::new(r"^error:(?: \[.*\])?$").expect("Static regex is valid"))
}

fn multi_line_warning() -> &'static Regex {
    MULTI_LINE_WARNING.get_or_init(|| {
        Regex::new(r"^warning: (?:\[GHC-.+\] )?\[(?P<flag>-W.+)\]$").expect("Static regex is valid")
    })
}

fn escalate(flag: &str) -> Severity {
    if ESCALATED_WARNING_FLAGS.contains(&flag) {
        Severity::Error
    } else {
        Severity::Warning
    }
}

fn span_from_heading(form: LocationForm, caps: &Captures<'_>) -> Result<SourceSpan> {
    let num = |name: &str| -> Result<u32> {
        caps[name]
            .parse::<u32>()
            .map_err(|_| Error::MalformedOutput(format!("location number out of range: {}", &caps[name])))
    };
    Ok(match form {
        LocationForm::Point => SourceSpan::from_point(num("line")?, num("col")?),
        LocationForm::ColumnSpan => {
            SourceSpan::from_column_span(num("line")?, num("col0")?, num("col1")?)
        }
        LocationForm::BlockSpan => {
            SourceSpan::from_block_span(num("line0")?, num("col0")?, num("line1")?, num("col1")?)
        }
    })
}

// ============================================================================
// Parser
// ============================================================================

/// Parse the full output of a module (re)load into located diagnostics.
///
/// Pure function of its input: the result order is the order of appearance,
/// and nothing is deduplicated beyond the "Collecting type info" cutoff.
///
/// # Errors
///
/// Returns [`Error::MalformedOutput`] only for a recognized heading whose
/// `<rest>` matches none of the four message shapes - a parser defect that
/// must never occur for well-formed interpreter output.
pub fn parse_load_output(lines: &[String]) -> Result<Vec<FileDiagnostic>> {
    let mut diagnostics = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let heading = &lines[index];
        index += 1;

        if reload_summary().is_match(heading) {
            continue;
        }

        // Everything after this marker duplicates messages already emitted
        // (GHC issue #18068), so the parse ends here.
        if collecting_marker().is_match(heading) {
            break;
        }

        let Some((form, caps)) = heading_patterns()
            .iter()
            .find_map(|(form, regex)| regex.captures(heading).map(|caps| (*form, caps)))
        else {
            // Not a heading: banner, prompt residue, progress output.
            continue;
        };

        let span = span_from_heading(form, &caps)?;
        let file = caps["file"].to_string();
        let rest = &caps["rest"];

        let diagnostic = if let Some(caps) = single_line_error().captures(rest) {
            Diagnostic {
                span,
                severity: Severity::Error,
                message: caps["message"].to_string(),
            }
        } else if let Some(caps) = single_line_warning().captures(rest) {
            Diagnostic {
                span,
                severity: escalate(&caps["flag"]),
                message: caps["message"].to_string(),
            }
        } else {
            // Multi-line message: the body is every following line with the
            // 4-space indent, stripped and re-joined.
            let mut body = Vec::new();
            while index < lines.len() {
                match lines[index].strip_prefix(BODY_INDENT) {
                    Some(stripped) => {
                        body.push(stripped);
                        index += 1;
                    }
                    None => break,
                }
            }

            let severity = if multi_line_error().is_match(rest) {
                Severity::Error
            } else if let Some(caps) = multi_line_warning().captures(rest) {
                escalate(&caps["flag"])
            } else {
                return Err(Error::MalformedOutput(format!(
                    "unrecognized message shape under heading: {}",
                    heading
                )));
            };

            Diagnostic {
                span,
                severity,
                message: body.join("\n"),
            }
        };

        diagnostics.push(FileDiagnostic { file, diagnostic });
    }

    Ok(diagnostics)
}
