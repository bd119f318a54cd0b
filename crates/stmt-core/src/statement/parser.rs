//! Statement parser: text in, canonical transactions out.

use std::time::Instant;

use tracing::{debug, info};

use super::report::{Diagnostic, ExtractionOutcome};
use super::strategy::Orchestrator;
use crate::clock::{Clock, SystemClock};
use crate::models::{ExtractionConfig, RawLine};

/// Lines of the first page echoed at debug level.
const PREVIEW_LINES: usize = 10;

/// Trait for statement text extractors.
pub trait StatementExtractor {
    /// Extract transactions from numbered lines.
    fn extract_lines(&self, lines: &[RawLine]) -> ExtractionOutcome;

    /// Extract transactions from per-page text, in page order.
    fn extract_pages<S: AsRef<str>>(&self, pages: &[S]) -> ExtractionOutcome {
        self.extract_lines(&RawLine::from_pages(pages))
    }

    /// Extract transactions from plain text; form feeds separate pages.
    fn extract_from_text(&self, text: &str) -> ExtractionOutcome {
        let pages: Vec<&str> = text.split('\x0c').collect();
        self.extract_pages(&pages)
    }
}

/// Rule-based statement parser.
#[derive(Debug, Clone)]
pub struct StatementParser<C: Clock = SystemClock> {
    orchestrator: Orchestrator<C>,
}

impl StatementParser<SystemClock> {
    /// Create a parser with default settings and the system clock.
    pub fn new() -> Self {
        Self::with_config(&ExtractionConfig::default())
    }

    pub fn with_config(config: &ExtractionConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for StatementParser<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> StatementParser<C> {
    /// Create a parser that takes "today" from `clock`.
    pub fn with_clock(config: &ExtractionConfig, clock: C) -> Self {
        Self {
            orchestrator: Orchestrator::with_clock(config, clock),
        }
    }
}

impl<C: Clock> StatementExtractor for StatementParser<C> {
    fn extract_lines(&self, lines: &[RawLine]) -> ExtractionOutcome {
        let start = Instant::now();

        if lines.iter().all(|l| l.text.trim().is_empty()) {
            info!("No text to extract transactions from");
            return ExtractionOutcome {
                diagnostic: Some(Diagnostic::NoText),
                ..ExtractionOutcome::default()
            };
        }

        for line in lines.iter().take_while(|l| l.page == 1).take(PREVIEW_LINES) {
            debug!("{:>6} | {}", line.position().to_string(), line.text);
        }

        let outcome = self.orchestrator.extract_all(lines);

        info!(
            "Extracted {} transactions from {} lines in {}ms (strategy: {}, date fallbacks: {})",
            outcome.transactions.len(),
            lines.len(),
            start.elapsed().as_millis(),
            outcome.strategy().map_or("-", |s| s.as_str()),
            outcome.report.date_fallbacks
        );

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::statement::strategy::Strategy;
    use pretty_assertions::assert_eq;

    fn parser() -> StatementParser<FixedClock> {
        StatementParser::with_clock(&ExtractionConfig::default(), FixedClock::ymd(2025, 6, 30).unwrap())
    }

    #[test]
    fn test_empty_text_is_no_text() {
        let outcome = parser().extract_from_text("  \n\n \x0c ");
        assert!(outcome.is_empty());
        assert_eq!(outcome.diagnostic, Some(Diagnostic::NoText));
        assert!(outcome.report.attempts.is_empty());
    }

    #[test]
    fn test_form_feed_separates_pages() {
        let text = "01/15/2024 SPOTIFY PREMIUM $12.99\x0c01/20/2024 SHELL OIL 31.20";
        let outcome = parser().extract_from_text(text);

        assert_eq!(outcome.transactions.len(), 2);
        assert_eq!(outcome.strategy(), Some(Strategy::SingleLine));
        let pages: Vec<u32> = outcome.report.attempts[0]
            .lines
            .iter()
            .map(|d| d.position.page)
            .collect();
        assert_eq!(pages, vec![1, 2]);
    }

    #[test]
    fn test_no_transactions_diagnostic() {
        let outcome = parser().extract_pages(&["Account Summary\nPage 1 of 2"]);
        assert_eq!(outcome.diagnostic, Some(Diagnostic::NoTransactions));
    }
}
