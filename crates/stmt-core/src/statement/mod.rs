//! Transaction recovery from statement text.

pub mod builder;
mod parser;
pub mod reassembly;
pub mod report;
pub mod rules;
pub mod strategy;

pub use builder::{build, ResolvedTransaction, TransactionBuilder};
pub use parser::{StatementExtractor, StatementParser};
pub use reassembly::{LogicalLine, Reassembler};
pub use report::{
    Diagnostic, ExtractionOutcome, ExtractionReport, LineDiagnostic, LineOutcome, StrategyAttempt,
};
pub use strategy::{Orchestrator, Strategy};
