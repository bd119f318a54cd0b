//! Extraction report: what each strategy saw and why lines were dropped.

use std::collections::BTreeMap;

use serde::Serialize;

use super::strategy::Strategy;
use crate::error::LineRejection;
use crate::models::{CanonicalTransaction, LinePosition};

/// Outcome of one logical line within one strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineOutcome {
    /// Became the `ordinal`-th record of its strategy run (1-based).
    Accepted { ordinal: usize },
    Rejected(LineRejection),
}

impl LineOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, LineOutcome::Accepted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDiagnostic {
    pub position: LinePosition,
    pub outcome: LineOutcome,
}

/// One strategy run over a set of lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyAttempt {
    pub strategy: Strategy,
    /// Page the attempt was limited to, when the cascade runs per page.
    pub page: Option<u32>,
    pub lines: Vec<LineDiagnostic>,
    pub accepted: usize,
}

impl StrategyAttempt {
    pub fn new(strategy: Strategy, page: Option<u32>) -> Self {
        Self {
            strategy,
            page,
            lines: Vec::new(),
            accepted: 0,
        }
    }

    pub fn record(&mut self, position: LinePosition, outcome: LineOutcome) {
        if outcome.is_accepted() {
            self.accepted += 1;
        }
        self.lines.push(LineDiagnostic { position, outcome });
    }

    pub fn rejected(&self) -> usize {
        self.lines.len() - self.accepted
    }
}

/// Document-level reasons for an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagnostic {
    /// The source yielded no text at all.
    NoText,
    /// Text was present but every strategy came up empty.
    NoTransactions,
}

impl Diagnostic {
    /// Guidance shown to a user when a statement yields nothing.
    pub fn message(&self) -> &'static str {
        match self {
            Diagnostic::NoText => {
                "no text could be extracted; scanned statements need OCR before parsing"
            }
            Diagnostic::NoTransactions => {
                "no transactions recognized; lines need a date (MM/DD, MM/DD/YYYY, \
                 DD-MM-YY, YYYY-MM-DD) and an amount (e.g. $12.99, -45.67)"
            }
        }
    }
}

/// Everything observed while extracting one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub attempts: Vec<StrategyAttempt>,
    /// Dates that could not be parsed and were replaced by today.
    pub date_fallbacks: usize,
    /// Dates without a year that borrowed the current one.
    pub inferred_years: usize,
    /// Strategy that produced records, per cascade (one per page in
    /// per-page mode).
    pub resolved_by: Vec<Strategy>,
}

impl ExtractionReport {
    /// Rejections per reason, over every attempt.
    pub fn rejection_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for diag in self.attempts.iter().flat_map(|a| &a.lines) {
            if let LineOutcome::Rejected(reason) = &diag.outcome {
                *counts.entry(reason.kind()).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn total_accepted(&self) -> usize {
        self.attempts.iter().map(|a| a.accepted).sum()
    }

    pub(crate) fn merge(&mut self, other: ExtractionReport) {
        self.attempts.extend(other.attempts);
        self.date_fallbacks += other.date_fallbacks;
        self.inferred_years += other.inferred_years;
        self.resolved_by.extend(other.resolved_by);
    }
}

/// Result of extracting one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionOutcome {
    pub transactions: Vec<CanonicalTransaction>,
    pub report: ExtractionReport,
    /// Set when `transactions` is empty.
    pub diagnostic: Option<Diagnostic>,
}

impl ExtractionOutcome {
    /// The strategy that produced the records, when a single one did.
    pub fn strategy(&self) -> Option<Strategy> {
        match self.report.resolved_by.as_slice() {
            [] => None,
            [first, rest @ ..] if rest.iter().all(|s| s == first) => Some(*first),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pos(line: u32) -> LinePosition {
        LinePosition { page: 1, line, span: 1 }
    }

    #[test]
    fn test_attempt_counts() {
        let mut attempt = StrategyAttempt::new(Strategy::SingleLine, None);
        attempt.record(pos(1), LineOutcome::Accepted { ordinal: 1 });
        attempt.record(pos(2), LineOutcome::Rejected(LineRejection::TooShort));
        attempt.record(pos(3), LineOutcome::Rejected(LineRejection::TooShort));

        assert_eq!(attempt.accepted, 1);
        assert_eq!(attempt.rejected(), 2);
    }

    #[test]
    fn test_rejection_counts() {
        let mut first = StrategyAttempt::new(Strategy::SingleLine, None);
        first.record(pos(1), LineOutcome::Rejected(LineRejection::Noise("balance".into())));
        let mut second = StrategyAttempt::new(Strategy::Fallback, None);
        second.record(pos(1), LineOutcome::Rejected(LineRejection::MissingAmount));
        second.record(pos(2), LineOutcome::Rejected(LineRejection::Noise("page".into())));

        let report = ExtractionReport {
            attempts: vec![first, second],
            ..Default::default()
        };

        let counts = report.rejection_counts();
        assert_eq!(counts.get("noise"), Some(&2));
        assert_eq!(counts.get("missing_amount"), Some(&1));
    }

    #[test]
    fn test_outcome_strategy() {
        let mut outcome = ExtractionOutcome::default();
        assert_eq!(outcome.strategy(), None);

        outcome.report.resolved_by = vec![Strategy::MultiLine, Strategy::MultiLine];
        assert_eq!(outcome.strategy(), Some(Strategy::MultiLine));

        outcome.report.resolved_by.push(Strategy::SingleLine);
        assert_eq!(outcome.strategy(), None);
    }

    #[test]
    fn test_serialize_rejection() {
        let diag = LineDiagnostic {
            position: pos(4),
            outcome: LineOutcome::Rejected(LineRejection::Noise("balance".into())),
        };
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["outcome"]["rejected"]["reason"], "noise");
        assert_eq!(json["outcome"]["rejected"]["detail"], "balance");
    }
}
