//! Strategy cascade over statement lines.
//!
//! Three strategies are tried in order, each only if the one before it
//! produced no records:
//!
//! 1. [`Strategy::SingleLine`]: every line through the classifier, then the
//!    field extractor.
//! 2. [`Strategy::MultiLine`]: lines are first reassembled; date-started
//!    logical lines skip the classifier.
//! 3. [`Strategy::Fallback`]: any line long enough that carries both a date
//!    token and an amount token, whatever its keywords.
//!
//! The output of the last strategy tried is final, even when empty.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::builder::{ResolvedTransaction, TransactionBuilder};
use super::reassembly::Reassembler;
use super::report::{Diagnostic, ExtractionOutcome, ExtractionReport, LineOutcome, StrategyAttempt};
use super::rules::{normalize_date, resolve_type, DateSource, FieldExtractor, LineClassifier, TokenStream};
use crate::clock::{Clock, SystemClock};
use crate::error::LineRejection;
use crate::models::{ExtractionConfig, LinePosition, RawLine, UnsignedAmount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    SingleLine,
    MultiLine,
    Fallback,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::SingleLine => "single_line",
            Strategy::MultiLine => "multi_line",
            Strategy::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cascade state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    SingleLine,
    MultiLine,
    Fallback,
    Done,
}

impl Stage {
    fn strategy(self) -> Option<Strategy> {
        match self {
            Stage::SingleLine => Some(Strategy::SingleLine),
            Stage::MultiLine => Some(Strategy::MultiLine),
            Stage::Fallback => Some(Strategy::Fallback),
            Stage::Done => None,
        }
    }

    /// Next state after a strategy produced `found` records.
    fn advance(self, found: usize) -> Stage {
        if found > 0 {
            return Stage::Done;
        }
        match self {
            Stage::SingleLine => Stage::MultiLine,
            Stage::MultiLine => Stage::Fallback,
            Stage::Fallback | Stage::Done => Stage::Done,
        }
    }
}

/// Whether a line must pass the classifier before extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Classifier,
    /// Reassembled date-started line.
    Open,
    /// Length plus date and amount tokens.
    Tokens,
}

/// Records and bookkeeping from one strategy run.
struct Attempt {
    records: Vec<ResolvedTransaction>,
    report: StrategyAttempt,
    date_fallbacks: usize,
    inferred_years: usize,
}

impl Attempt {
    fn new(strategy: Strategy, page: Option<u32>) -> Self {
        Self {
            records: Vec::new(),
            report: StrategyAttempt::new(strategy, page),
            date_fallbacks: 0,
            inferred_years: 0,
        }
    }

    fn offer(&mut self, result: Result<(ResolvedTransaction, DateSource), (LinePosition, LineRejection)>) {
        match result {
            Ok((tx, source)) => {
                let position = tx.position;
                match source {
                    DateSource::FallbackToToday => self.date_fallbacks += 1,
                    DateSource::YearInferred => self.inferred_years += 1,
                    DateSource::Parsed => {}
                }
                self.records.push(tx);
                let ordinal = self.records.len();
                self.report.record(position, LineOutcome::Accepted { ordinal });
            }
            Err((position, reason)) => self.report.record(position, LineOutcome::Rejected(reason)),
        }
    }
}

/// Runs the strategy cascade.
///
/// Holds no state between calls; one orchestrator may serve any number of
/// documents.
#[derive(Debug, Clone)]
pub struct Orchestrator<C: Clock = SystemClock> {
    classifier: LineClassifier,
    extractor: FieldExtractor,
    reassembler: Reassembler,
    min_line_length: usize,
    unsigned_amounts: UnsignedAmount,
    cascade_per_page: bool,
    clock: C,
}

impl Orchestrator<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(&ExtractionConfig::default(), SystemClock)
    }
}

impl Default for Orchestrator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Orchestrator<C> {
    pub fn with_clock(config: &ExtractionConfig, clock: C) -> Self {
        Self {
            classifier: LineClassifier::new().with_min_line_length(config.min_line_length),
            extractor: FieldExtractor::new().with_min_description_length(config.min_description_length),
            reassembler: Reassembler::new().with_max_continuation_lines(config.max_continuation_lines),
            min_line_length: config.min_line_length,
            unsigned_amounts: config.unsigned_amounts,
            cascade_per_page: config.cascade_per_page,
            clock,
        }
    }

    /// Extract canonical transactions from statement lines.
    ///
    /// Runs the cascade over the whole document, or once per page when
    /// configured to.
    pub fn extract_all(&self, lines: &[RawLine]) -> ExtractionOutcome {
        let (records, report) = if self.cascade_per_page {
            let mut records = Vec::new();
            let mut report = ExtractionReport::default();
            for (page, page_lines) in split_pages(lines) {
                let (found, page_report) = self.run(page_lines, Some(page));
                records.extend(found);
                report.merge(page_report);
            }
            (records, report)
        } else {
            self.run(lines, None)
        };

        let mut builder = TransactionBuilder::with_capacity(records.len());
        builder.extend(records);
        let transactions = builder.finish();

        let diagnostic = transactions.is_empty().then_some(Diagnostic::NoTransactions);
        ExtractionOutcome {
            transactions,
            report,
            diagnostic,
        }
    }

    /// Run the cascade once over `lines`.
    pub fn run(&self, lines: &[RawLine], page: Option<u32>) -> (Vec<ResolvedTransaction>, ExtractionReport) {
        let mut report = ExtractionReport::default();
        let mut stage = Stage::SingleLine;
        let mut records = Vec::new();

        while let Some(strategy) = stage.strategy() {
            let attempt = self.attempt(strategy, lines, page);
            let found = attempt.records.len();
            debug!(
                "Strategy {} found {} transactions ({} lines rejected)",
                strategy,
                found,
                attempt.report.rejected()
            );

            report.attempts.push(attempt.report);
            if found > 0 {
                report.date_fallbacks += attempt.date_fallbacks;
                report.inferred_years += attempt.inferred_years;
                report.resolved_by.push(strategy);
            }
            records = attempt.records;
            stage = stage.advance(found);
        }

        (records, report)
    }

    fn attempt(&self, strategy: Strategy, lines: &[RawLine], page: Option<u32>) -> Attempt {
        let mut attempt = Attempt::new(strategy, page);

        match strategy {
            Strategy::SingleLine => {
                for line in lines {
                    attempt.offer(self.resolve(&line.text, line.position(), Gate::Classifier));
                }
            }
            Strategy::MultiLine => {
                for logical in self.reassembler.reassemble(lines) {
                    let gate = if logical.starts_with_date {
                        Gate::Open
                    } else {
                        Gate::Classifier
                    };
                    attempt.offer(self.resolve(&logical.text, logical.position, gate));
                }
            }
            Strategy::Fallback => {
                for line in lines {
                    attempt.offer(self.resolve(&line.text, line.position(), Gate::Tokens));
                }
            }
        }

        attempt
    }

    /// One line through gate, extractor, type resolver and date normalizer.
    fn resolve(
        &self,
        text: &str,
        position: LinePosition,
        gate: Gate,
    ) -> Result<(ResolvedTransaction, DateSource), (LinePosition, LineRejection)> {
        self.resolve_fields(text, position, gate).map_err(|reason| (position, reason))
    }

    fn resolve_fields(
        &self,
        text: &str,
        position: LinePosition,
        gate: Gate,
    ) -> Result<(ResolvedTransaction, DateSource), LineRejection> {
        match gate {
            Gate::Classifier => self.classifier.classify(text).verdict()?,
            Gate::Tokens => self.token_gate(text)?,
            Gate::Open => {}
        }

        let fields = self.extractor.extract(text)?;
        let amount = fields.amount.signed(self.unsigned_amounts);
        let transaction_type = resolve_type(text, amount);
        let date = normalize_date(&fields.date_token, &self.clock);

        Ok((
            ResolvedTransaction {
                date: date.date,
                amount,
                description: fields.description,
                transaction_type,
                position,
            },
            date.source,
        ))
    }

    fn token_gate(&self, text: &str) -> Result<(), LineRejection> {
        let text = text.trim();
        if text.chars().count() < self.min_line_length {
            return Err(LineRejection::TooShort);
        }
        let tokens = TokenStream::scan(text);
        if tokens.has_date() && tokens.has_amount() {
            Ok(())
        } else {
            Err(LineRejection::NoTransactionSignal)
        }
    }
}

/// Group consecutive lines by page number.
fn split_pages(lines: &[RawLine]) -> Vec<(u32, &[RawLine])> {
    lines
        .chunk_by(|a, b| a.page == b.page)
        .filter_map(|chunk| chunk.first().map(|first| (first.page, chunk)))
        .collect()
}
