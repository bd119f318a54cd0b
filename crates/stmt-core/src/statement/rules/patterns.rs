//! Anchored regex patterns and keyword tables for statement lines.
//!
//! The primary date/amount recognition is done by the token scanner in
//! [`super::tokens`]; the patterns here cover the anchored secondary
//! extraction for degraded lines and the reassembler's transaction-start
//! test.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A line (trimmed) that begins with a bare `D{1,2}[/-]D{1,2}` date.
    pub static ref LEADING_BARE_DATE: Regex = Regex::new(
        r"^\d{1,2}[/\-]\d{1,2}"
    ).unwrap();

    /// A full date at the very start of a line, glued text allowed after it.
    pub static ref LEADING_DATE_TOKEN: Regex = Regex::new(
        r"^\d{1,2}[/\-]\d{1,2}(?:[/\-]\d{2,4})?"
    ).unwrap();

    /// An amount at the very end of a line, glued text allowed before it.
    /// A balance marker or currency code may follow a fractional amount.
    pub static ref TRAILING_AMOUNT: Regex = Regex::new(
        r"(?i)\$?\d[\d,]*(?:\.\d{2}(?:CR|DR|USD|EUR|GBP|CAD)?)?$"
    ).unwrap();

    /// A partial date with no year.
    pub static ref BARE_DATE: Regex = Regex::new(
        r"^(\d{1,2})([/\-])(\d{1,2})$"
    ).unwrap();
}

/// Markers allowed right after an amount: credit/debit balance markers and
/// currency codes. Matched case-insensitively.
pub const AMOUNT_SUFFIXES: &[&str] = &["CR", "DR", "USD", "EUR", "GBP", "CAD"];

/// Keywords that mark a line as transactional.
pub const TRANSACTION_KEYWORDS: &[&str] = &[
    "debit card",
    "check",
    "zelle",
    "transfer",
    "payment",
    "purchase",
    "withdrawal",
    "deposit",
    "fee",
    "charge",
    "refund",
    "credit",
];

/// Statement boilerplate: headers, balances, page furniture.
pub const NOISE_KEYWORDS: &[&str] = &[
    "balance",
    "statement",
    "page",
    "account",
    "summary",
    "total",
    "beginning",
    "ending",
    "previous",
    "current",
    "available",
    "date",
    "description",
    "amount",
    "deposits",
    "withdrawals",
];

/// Keywords that always mean money out.
pub const DEBIT_KEYWORDS: &[&str] = &["debit card", "purchase", "withdrawal", "fee", "charge"];

/// Keywords that always mean money in.
pub const CREDIT_KEYWORDS: &[&str] = &["deposit", "credit", "refund", "transfer in"];

/// Keywords whose direction depends on the amount sign.
pub const SIGNED_KEYWORDS: &[&str] = &["zelle", "payment", "transfer"];

/// Case-insensitive substring match against a keyword table.
pub fn contains_any(lowercase_line: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| lowercase_line.contains(k))
}
