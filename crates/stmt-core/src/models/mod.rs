//! Data models.

pub mod config;
pub mod transaction;

pub use config::{ExtractionConfig, PdfConfig, StmtConfig, TabularConfig, UnsignedAmount};
pub use transaction::{
    CanonicalTransaction, LinePosition, RawLine, TransactionCandidate, TransactionType,
};
