//! Transaction data models: raw input lines, intermediate candidates and
//! the canonical output record.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single physical line of statement text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLine {
    /// Page number (1-indexed).
    pub page: u32,
    /// Line number within the page (1-indexed).
    pub line: u32,
    /// Line text as extracted.
    pub text: String,
}

impl RawLine {
    pub fn new(page: u32, line: u32, text: impl Into<String>) -> Self {
        Self {
            page,
            line,
            text: text.into(),
        }
    }

    /// Split one page of text into numbered lines.
    pub fn from_page(page: u32, text: &str) -> Vec<Self> {
        text.lines()
            .enumerate()
            .map(|(i, l)| Self::new(page, i as u32 + 1, l))
            .collect()
    }

    /// Split a sequence of pages into numbered lines, preserving page order.
    pub fn from_pages<S: AsRef<str>>(pages: &[S]) -> Vec<Self> {
        pages
            .iter()
            .enumerate()
            .flat_map(|(i, p)| Self::from_page(i as u32 + 1, p.as_ref()))
            .collect()
    }

    /// Where this line came from, for diagnostics.
    pub fn position(&self) -> LinePosition {
        LinePosition {
            page: self.page,
            line: self.line,
            span: 1,
        }
    }
}

/// Position of a (possibly reassembled) logical line in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePosition {
    pub page: u32,
    /// First physical line.
    pub line: u32,
    /// Number of physical lines joined into this one.
    pub span: u32,
}

impl fmt::Display for LinePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span > 1 {
            write!(f, "p{}:{}-{}", self.page, self.line, self.line + self.span - 1)
        } else {
            write!(f, "p{}:{}", self.page, self.line)
        }
    }
}

/// Pre-validation result of field extraction.
///
/// Either promoted to a [`CanonicalTransaction`] or discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionCandidate {
    /// Date token as it appeared in the line.
    pub date_token: Option<String>,
    /// Amount token as it appeared in the line.
    pub amount_token: Option<String>,
    /// Line text with the date and amount tokens removed, whitespace collapsed.
    pub residual: String,
}

impl TransactionCandidate {
    /// Both a date and an amount were found.
    pub fn is_complete(&self) -> bool {
        self.date_token.is_some() && self.amount_token.is_some()
    }
}

/// Flow direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money leaving the account.
    Debit,
    /// Money entering the account.
    Credit,
}

impl TransactionType {
    /// Direction implied by a signed amount alone: negative is a debit.
    pub fn from_sign(amount: Decimal) -> Self {
        if amount.is_sign_negative() && !amount.is_zero() {
            Self::Debit
        } else {
            Self::Credit
        }
    }

    /// Apply the canonical sign convention: debits negative, credits positive.
    pub fn apply_sign(self, amount: Decimal) -> Decimal {
        match self {
            Self::Debit => -amount.abs(),
            Self::Credit => amount.abs(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debit" | "dr" => Ok(Self::Debit),
            "credit" | "cr" => Ok(Self::Credit),
            other => Err(format!("unknown transaction type: {}", other)),
        }
    }
}

/// The unit of output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTransaction {
    /// 1-based ordinal within one ingestion run.
    pub id: u32,

    /// Transaction date.
    pub date: NaiveDate,

    /// Signed amount: negative for debits, positive for credits.
    pub amount: Decimal,

    /// Cleaned description.
    pub description: String,

    /// Flow direction.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
}

impl CanonicalTransaction {
    /// The `(description, amount)` pair handed to categorization.
    pub fn categorization_input(&self) -> (&str, Decimal) {
        (&self.description, self.amount)
    }

    pub fn is_debit(&self) -> bool {
        self.transaction_type == TransactionType::Debit
    }
}
