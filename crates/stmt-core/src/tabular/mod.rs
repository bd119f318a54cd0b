//! Tabular (CSV) statement input.
//!
//! Rows need `date`, `amount` and `description` columns (any case). A
//! `type` column is used when its value is `debit` or `credit`; otherwise
//! the type follows the amount sign. Ids are always assigned afresh.

mod loader;

pub use loader::{
    normalize_header, RowProblem, RowRejection, TabularLoader, TabularOutcome, REQUIRED_COLUMNS,
    TYPE_COLUMN,
};
