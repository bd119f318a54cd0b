//! Error types for the stmt-core library.
//!
//! Malformed statement lines are never errors: they are recorded as
//! [`LineRejection`]s in the extraction report. Only structural failures
//! are returned as `Err`.

use serde::Serialize;
use thiserror::Error;

/// Main error type for the stmt library.
#[derive(Error, Debug)]
pub enum StmtError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Tabular (CSV) loading error.
    #[error("tabular error: {0}")]
    Tabular(#[from] TabularError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Structural failures of a tabular load.
#[derive(Error, Debug)]
pub enum TabularError {
    /// One or more of the required logical columns is absent.
    #[error("missing required columns: {missing:?} (available: {available:?})")]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },

    /// The input has no header row at all.
    #[error("no header row")]
    NoHeader,

    /// The delimited reader failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Why a single statement line did not become a transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum LineRejection {
    /// Shorter than the minimum line length.
    #[error("line too short")]
    TooShort,

    /// Contains a statement boilerplate keyword.
    #[error("noise keyword: {0}")]
    Noise(String),

    /// No date+amount or keyword+amount combination.
    #[error("no transaction signal")]
    NoTransactionSignal,

    /// No date token, even with the anchored fallback.
    #[error("missing date")]
    MissingDate,

    /// No amount token, even with the anchored fallback.
    #[error("missing amount")]
    MissingAmount,

    /// The amount token is not a number.
    #[error("malformed amount: {0}")]
    MalformedAmount(String),

    /// Description shorter than the minimum after cleanup.
    #[error("description too short: {0:?}")]
    DescriptionTooShort(String),
}

impl LineRejection {
    /// Stable short name, for counting.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TooShort => "too_short",
            Self::Noise(_) => "noise",
            Self::NoTransactionSignal => "no_transaction_signal",
            Self::MissingDate => "missing_date",
            Self::MissingAmount => "missing_amount",
            Self::MalformedAmount(_) => "malformed_amount",
            Self::DescriptionTooShort(_) => "description_too_short",
        }
    }
}

/// Result type for the stmt library.
pub type Result<T> = std::result::Result<T, StmtError>;
