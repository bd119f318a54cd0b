//! Rule-based recognizers for statement lines.

pub mod amounts;
pub mod classifier;
pub mod dates;
pub mod direction;
pub mod fields;
pub mod patterns;
pub mod tokens;

pub use amounts::{parse_amount, AmountSign, StatementAmount};
pub use classifier::{is_transaction_line, LineClass, LineClassifier};
pub use dates::{normalize_date, parse_calendar_date, DateFormat, DateSource, NormalizedDate};
pub use direction::{resolve_type, resolve_type_with_evidence, TypeEvidence};
pub use fields::{clean_description, ExtractedFields, FieldExtractor};
pub use tokens::{AmountToken, DateToken, TextRun, Token, TokenStream};
