//! Source spans - GHCi coordinates to protocol ranges
//!
//! GHCi reports 1-based line/column positions in three textual shapes
//! (`line:col`, `line:col0-col1`, `(l0,c0)-(l1,c1)`); the editor protocol
//! wants 0-based half-open ranges. The conversion, including the clamp for
//! GHC's occasional column 0, happens here and nowhere else.

use serde::{Deserialize, Serialize};

/// A 0-based, half-open source range, ready for protocol output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourceSpan {
    /// Clamp a 1-based GHCi column before the 0-based shift.
    ///
    /// GHC sometimes reports column 0, which would turn into -1 after the
    /// shift; any column ≤ 0 is treated as column 1.
    fn fix_column(column: u32) -> u32 {
        if column == 0 {
            1
        } else {
            column
        }
    }

    /// `line:col` - a single-column point on one line.
    pub fn from_point(line: u32, column: u32) -> Self {
        let column = Self::fix_column(column);
        SourceSpan {
            start_line: line.saturating_sub(1),
            start_column: column - 1,
            end_line: line.saturating_sub(1),
            end_column: column,
        }
    }

    /// `line:col0-col1` - a column range on one line.
    pub fn from_column_span(line: u32, col0: u32, col1: u32) -> Self {
        SourceSpan {
            start_line: line.saturating_sub(1),
            start_column: Self::fix_column(col0) - 1,
            end_line: line.saturating_sub(1),
            end_column: Self::fix_column(col1),
        }
    }

    /// `(l0,c0)-(l1,c1)` - a multi-line block range.
    pub fn from_block_span(line0: u32, col0: u32, line1: u32, col1: u32) -> Self {
        SourceSpan {
            start_line: line0.saturating_sub(1),
            start_column: Self::fix_column(col0) - 1,
            end_line: line1.saturating_sub(1),
            end_column: Self::fix_column(col1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_is_single_column() {
        let span = SourceSpan::from_point(5, 3);
        assert_eq!(span.start_line, 4);
        assert_eq!(span.start_column, 2);
        assert_eq!(span.end_line, 4);
        assert_eq!(span.end_column, 3);
    }

    #[test]
    fn test_point_column_zero_is_clamped() {
        // Column 0 from GHC must not produce a negative protocol column.
        let span = SourceSpan::from_point(10, 0);
        assert_eq!(span.start_column, 0);
        assert_eq!(span.end_column, 1);
    }

    #[test]
    fn test_column_span() {
        let span = SourceSpan::from_column_span(7, 1, 10);
        assert_eq!(span.start_line, 6);
        assert_eq!(span.start_column, 0);
        assert_eq!(span.end_line, 6);
        assert_eq!(span.end_column, 10);
    }

    #[test]
    fn test_block_span() {
        let span = SourceSpan::from_block_span(2, 3, 4, 5);
        assert_eq!(span.start_line, 1);
        assert_eq!(span.start_column, 2);
        assert_eq!(span.end_line, 3);
        assert_eq!(span.end_column, 5);
    }

    #[test]
    fn test_block_span_column_zero_both_ends() {
        let span = SourceSpan::from_block_span(1, 0, 1, 0);
        assert_eq!(span.start_column, 0);
        assert_eq!(span.end_column, 1);
    }

    #[test]
    fn test_serde_roundtrip() {
        let span = SourceSpan::from_column_span(3, 1, 8);
        let json = serde_json::to_string(&span).unwrap();
        let back: SourceSpan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, span);
    }
}
