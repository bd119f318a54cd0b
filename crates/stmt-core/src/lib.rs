//! Core library for bank statement transaction recovery.
//!
//! This crate provides:
//! - Statement text extraction (single-line, multi-line and fallback strategies)
//! - Tabular (CSV) statement loading
//! - PDF page text extraction
//! - The canonical transaction model handed to categorization and storage

pub mod clock;
pub mod error;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod statement;
pub mod tabular;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{LineRejection, PdfError, Result, StmtError, TabularError};
pub use models::{
    CanonicalTransaction, ExtractionConfig, RawLine, StmtConfig, TransactionType, UnsignedAmount,
};
#[cfg(feature = "pdf")]
pub use pdf::{PdfExtractor, PdfProcessor};
pub use statement::{
    Diagnostic, ExtractionOutcome, ExtractionReport, StatementExtractor, StatementParser, Strategy,
};
pub use tabular::{TabularLoader, TabularOutcome};
