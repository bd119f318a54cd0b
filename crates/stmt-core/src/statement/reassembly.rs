//! Multi-line transaction reassembly.
//!
//! Some statements print the date on its own line and the description and
//! amount on the following ones:
//!
//! ```text
//! 01/16
//! FOOD LION #1234 $45.67
//! ```
//!
//! A line that begins with a bare date starts a transaction; the following
//! non-empty lines that do not begin with a date are its continuation.

use tracing::trace;

use super::rules::patterns::LEADING_BARE_DATE;
use crate::models::{LinePosition, RawLine};

/// A logical line: one physical line, or several joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub text: String,
    pub position: LinePosition,
    /// Began with a bare date, so it was treated as a transaction start.
    pub starts_with_date: bool,
}

impl LogicalLine {
    pub fn is_merged(&self) -> bool {
        self.position.span > 1
    }
}

/// Does the trimmed line begin with a bare `D{1,2}[/-]D{1,2}` date?
pub fn starts_with_bare_date(line: &str) -> bool {
    LEADING_BARE_DATE.is_match(line.trim())
}

/// Joins transactions split across consecutive lines.
#[derive(Debug, Clone)]
pub struct Reassembler {
    max_continuation_lines: usize,
}

impl Reassembler {
    pub fn new() -> Self {
        Self {
            max_continuation_lines: 4,
        }
    }

    /// Set how many lines may follow a transaction start.
    pub fn with_max_continuation_lines(mut self, n: usize) -> Self {
        self.max_continuation_lines = n;
        self
    }

    pub fn reassemble(&self, lines: &[RawLine]) -> Vec<LogicalLine> {
        let mut out = Vec::with_capacity(lines.len());
        let mut i = 0;

        while i < lines.len() {
            let start = &lines[i];
            let head = start.text.trim();

            if !starts_with_bare_date(head) {
                out.push(LogicalLine {
                    text: start.text.clone(),
                    position: start.position(),
                    starts_with_date: false,
                });
                i += 1;
                continue;
            }

            let mut parts = vec![head];
            let mut j = i + 1;
            while j < lines.len() && j <= i + self.max_continuation_lines {
                let next = lines[j].text.trim();
                if next.is_empty() || starts_with_bare_date(next) {
                    break;
                }
                parts.push(next);
                j += 1;
            }

            let position = LinePosition {
                page: start.page,
                line: start.line,
                span: (j - i) as u32,
            };
            trace!("reassembled {} from {} lines", position, parts.len());

            out.push(LogicalLine {
                text: parts.join(" "),
                position,
                starts_with_date: true,
            });
            i = j;
        }

        out
    }
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(texts: &[&str]) -> Vec<RawLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| RawLine::new(1, i as u32 + 1, *t))
            .collect()
    }

    fn texts(logical: &[LogicalLine]) -> Vec<&str> {
        logical.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_joins_date_line_with_continuation() {
        let out = Reassembler::new().reassemble(&lines(&["01/16", "FOOD LION #1234 $45.67"]));
        assert_eq!(texts(&out), vec!["01/16 FOOD LION #1234 $45.67"]);
        assert!(out[0].is_merged());
        assert!(out[0].starts_with_date);
        assert_eq!(out[0].position, LinePosition { page: 1, line: 1, span: 2 });
    }

    #[test]
    fn test_next_date_starts_new_transaction() {
        let out = Reassembler::new().reassemble(&lines(&[
            "01/16",
            "FOOD LION",
            "01/17",
            "SHELL OIL 30.00",
        ]));
        assert_eq!(texts(&out), vec!["01/16 FOOD LION", "01/17 SHELL OIL 30.00"]);
    }

    #[test]
    fn test_blank_line_ends_continuation() {
        let out = Reassembler::new().reassemble(&lines(&["01/16 RENT", "", "1500.00"]));
        assert_eq!(texts(&out), vec!["01/16 RENT", "", "1500.00"]);
        assert!(!out[2].starts_with_date);
    }

    #[test]
    fn test_continuation_capped() {
        let out = Reassembler::new().reassemble(&lines(&["01/16", "a", "b", "c", "d", "e"]));
        assert_eq!(texts(&out), vec!["01/16 a b c d", "e"]);

        let out = Reassembler::new()
            .with_max_continuation_lines(1)
            .reassemble(&lines(&["01/16", "a", "b"]));
        assert_eq!(texts(&out), vec!["01/16 a", "b"]);
    }

    #[test]
    fn test_untouched_lines_pass_through() {
        let out = Reassembler::new().reassemble(&lines(&["  Page 1 of 3  ", "01/02 X 1.00"]));
        assert_eq!(out[0].text, "  Page 1 of 3  ");
        assert!(!out[0].is_merged());
        assert_eq!(out[1].text, "01/02 X 1.00");
    }
}
