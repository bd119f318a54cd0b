//! Line classification: does a raw line plausibly encode a transaction?

use super::patterns::{contains_any, NOISE_KEYWORDS, TRANSACTION_KEYWORDS};
use super::tokens::TokenStream;
use crate::error::LineRejection;

/// Signals computed for one line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineClass {
    pub too_short: bool,
    pub has_date: bool,
    pub has_amount: bool,
    pub has_keyword: bool,
    /// First noise keyword found, if any.
    pub noise: Option<&'static str>,
}

impl LineClass {
    pub fn is_transaction(&self) -> bool {
        self.verdict().is_ok()
    }

    /// Accept iff `(date && amount) || (keyword && amount)` and no noise.
    pub fn verdict(&self) -> Result<(), LineRejection> {
        if self.too_short {
            return Err(LineRejection::TooShort);
        }
        if let Some(noise) = self.noise {
            return Err(LineRejection::Noise(noise.to_string()));
        }
        if self.has_amount && (self.has_date || self.has_keyword) {
            Ok(())
        } else {
            Err(LineRejection::NoTransactionSignal)
        }
    }
}

/// Line classifier.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    min_line_length: usize,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self { min_line_length: 5 }
    }

    /// Set the minimum trimmed line length.
    pub fn with_min_line_length(mut self, len: usize) -> Self {
        self.min_line_length = len;
        self
    }

    pub fn classify(&self, line: &str) -> LineClass {
        let line = line.trim();
        if line.chars().count() < self.min_line_length {
            return LineClass {
                too_short: true,
                ..LineClass::default()
            };
        }

        let lower = line.to_lowercase();
        let tokens = TokenStream::scan(line);

        LineClass {
            too_short: false,
            has_date: tokens.has_date(),
            has_amount: tokens.has_amount(),
            has_keyword: contains_any(&lower, TRANSACTION_KEYWORDS),
            noise: NOISE_KEYWORDS.iter().copied().find(|k| lower.contains(k)),
        }
    }

    pub fn is_transaction_line(&self, line: &str) -> bool {
        self.classify(line).is_transaction()
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify with the default minimum line length.
pub fn is_transaction_line(line: &str) -> bool {
    LineClassifier::new().is_transaction_line(line)
}
