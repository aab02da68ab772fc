//! Diagnostic records produced by a module reload

use crate::span::SourceSpan;
use serde::{Deserialize, Serialize};

/// Severity of a compiler message.
///
/// GHC reports a handful of warnings (`-Wdeferred-type-errors` and friends)
/// that are fatal at run time; those are escalated to [`Severity::Error`] by
/// the reload parser, so downstream consumers never need to know about the
/// escalation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// One compiler message, located and classified.
///
/// The full set for a document is replaced on every reload; diagnostics are
/// never merged incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub span: SourceSpan,
    pub severity: Severity,
    pub message: String,
}

/// A diagnostic paired with the file path exactly as the interpreter
/// printed it (not yet resolved to an absolute path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiagnostic {
    pub file: String,
    pub diagnostic: Diagnostic,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_as_str() {
        assert_eq!(Severity::Error.as_str(), "error");
        assert_eq!(Severity::Warning.as_str(), "warning");
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Error).unwrap(), "\"error\"");
        assert_eq!(
            serde_json::to_string(&Severity::Warning).unwrap(),
            "\"warning\""
        );
    }
}
