//! Tabular statement loader.

use std::io::Read;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::TabularError;
use crate::models::{CanonicalTransaction, LinePosition, TabularConfig, TransactionType};
use crate::statement::builder::{ResolvedTransaction, TransactionBuilder};
use crate::statement::rules::{clean_description, parse_amount, parse_calendar_date};

/// Columns every tabular statement must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = ["date", "amount", "description"];

/// Optional column holding `debit` / `credit`.
pub const TYPE_COLUMN: &str = "type";

/// Why a row was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "value", rename_all = "snake_case")]
pub enum RowProblem {
    UnparseableDate(String),
    NonNumericAmount(String),
    EmptyDescription,
    DescriptionTooShort(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejection {
    /// 1-based data row number (the header is not counted).
    pub row: usize,
    pub problem: RowProblem,
}

/// Result of a tabular load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TabularOutcome {
    pub transactions: Vec<CanonicalTransaction>,
    pub dropped: Vec<RowRejection>,
    /// Normalized header names as found.
    pub columns: Vec<String>,
    /// Whether `type` was read from the input rather than inferred.
    pub type_column: bool,
}

/// Column indices of the logical fields.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    date: usize,
    amount: usize,
    description: usize,
    kind: Option<usize>,
}

impl ColumnMap {
    fn resolve(columns: &[String]) -> Result<Self, TabularError> {
        let find = |name: &str| columns.iter().position(|c| c == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|&&c| find(c).is_none())
            .map(|c| c.to_string())
            .collect();

        match (find("date"), find("amount"), find("description")) {
            (Some(date), Some(amount), Some(description)) => Ok(Self {
                date,
                amount,
                description,
                kind: find(TYPE_COLUMN),
            }),
            _ => {
                warn!("Missing required columns: {:?} (available: {:?})", missing, columns);
                Err(TabularError::MissingColumns {
                    missing,
                    available: columns.to_vec(),
                })
            }
        }
    }
}

/// Lower-case and trim a header name, dropping a UTF-8 byte order mark.
pub fn normalize_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Loads CSV-like statements into canonical transactions.
#[derive(Debug, Clone, Default)]
pub struct TabularLoader {
    config: TabularConfig,
}

impl TabularLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TabularConfig) -> Self {
        Self { config }
    }

    /// Load already-split rows under the given header.
    pub fn load_rows<H, R, F>(&self, headers: &[H], rows: R) -> Result<TabularOutcome, TabularError>
    where
        H: AsRef<str>,
        R: IntoIterator<Item = Vec<F>>,
        F: AsRef<str>,
    {
        let columns: Vec<String> = headers.iter().map(|h| normalize_header(h.as_ref())).collect();
        if columns.iter().all(|c| c.is_empty()) {
            return Err(TabularError::NoHeader);
        }
        let map = ColumnMap::resolve(&columns)?;

        let mut builder = TransactionBuilder::new();
        let mut dropped = Vec::new();

        for (i, row) in rows.into_iter().enumerate() {
            let row_number = i + 1;
            match resolve_row(&map, &row, row_number, self.config.min_description_length) {
                Ok(tx) => builder.push(tx),
                Err(problem) => {
                    debug!("Dropping row {}: {:?}", row_number, problem);
                    dropped.push(RowRejection {
                        row: row_number,
                        problem,
                    });
                }
            }
        }

        let transactions = builder.finish();
        info!(
            "Loaded {} transactions from tabular input ({} rows dropped)",
            transactions.len(),
            dropped.len()
        );

        Ok(TabularOutcome {
            transactions,
            dropped,
            columns,
            type_column: map.kind.is_some(),
        })
    }

    /// Read delimited text with a header row.
    ///
    /// Cells that are not valid UTF-8 are decoded lossily so one stray byte
    /// does not fail the whole file.
    pub fn load_csv<R: Read>(&self, reader: R) -> Result<TabularOutcome, TabularError> {
        let delimiter = u8::try_from(self.config.delimiter).unwrap_or(b',');
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(self.config.flexible)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = decode_record(reader.byte_headers()?);

        let mut rows = Vec::new();
        for record in reader.byte_records() {
            rows.push(decode_record(&record?));
        }

        self.load_rows(&headers, rows)
    }
}

fn decode_record(record: &csv::ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

fn resolve_row<F: AsRef<str>>(
    map: &ColumnMap,
    row: &[F],
    row_number: usize,
    min_description_length: usize,
) -> Result<ResolvedTransaction, RowProblem> {
    let cell = |i: usize| row.get(i).map(|c| c.as_ref().trim()).unwrap_or("");

    let date_cell = cell(map.date);
    let date = parse_calendar_date(date_cell)
        .ok_or_else(|| RowProblem::UnparseableDate(date_cell.to_string()))?;

    let amount_cell = cell(map.amount);
    let amount = parse_amount(amount_cell)
        .map(|a| a.face_value())
        .ok_or_else(|| RowProblem::NonNumericAmount(amount_cell.to_string()))?;

    let description = clean_description(cell(map.description));
    if description.is_empty() {
        return Err(RowProblem::EmptyDescription);
    }
    if description.chars().count() < min_description_length {
        return Err(RowProblem::DescriptionTooShort(description));
    }

    let transaction_type = map
        .kind
        .and_then(|i| cell(i).parse::<TransactionType>().ok())
        .unwrap_or_else(|| infer_type(amount));

    Ok(ResolvedTransaction {
        date,
        amount,
        description,
        transaction_type,
        position: LinePosition {
            page: 1,
            // Header is line 1.
            line: row_number as u32 + 1,
            span: 1,
        },
    })
}

/// Credit if the amount is positive, otherwise debit.
fn infer_type(amount: Decimal) -> TransactionType {
    if amount > Decimal::ZERO {
        TransactionType::Credit
    } else {
        TransactionType::Debit
    }
}
