//! Field extraction: date, amount and description from one logical line.

use std::ops::Range;

use super::amounts::{parse_amount, StatementAmount};
use super::patterns::{LEADING_DATE_TOKEN, TRAILING_AMOUNT};
use super::tokens::TokenStream;
use crate::error::LineRejection;
use crate::models::TransactionCandidate;

/// Fields recovered from a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub date_token: String,
    pub amount_token: String,
    pub amount: StatementAmount,
    pub description: String,
}

/// Collapse internal whitespace to single spaces and trim.
///
/// Idempotent.
pub fn clean_description(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Field extractor for statement lines.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    min_description_length: usize,
}

/// Spans of the chosen date and amount within a line.
struct Located {
    date: Option<Range<usize>>,
    amount: Option<Range<usize>>,
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self {
            min_description_length: 3,
        }
    }

    /// Set the minimum description length.
    pub fn with_min_description_length(mut self, len: usize) -> Self {
        self.min_description_length = len;
        self
    }

    /// Locate the date (first token, else anchored at line start) and the
    /// amount (last token, else anchored at line end).
    fn locate(&self, line: &str) -> Located {
        let tokens = TokenStream::scan(line);

        let trimmed = line.trim();
        let offset = line.len() - line.trim_start().len();

        let date = tokens
            .first_date()
            .map(|d| d.span.clone())
            .or_else(|| {
                LEADING_DATE_TOKEN
                    .find(trimmed)
                    .map(|m| offset + m.start()..offset + m.end())
            });

        let amount = tokens
            .amounts()
            .filter(|a| date.as_ref().is_none_or(|d| !overlaps(d, &a.span)))
            .last()
            .map(|a| a.span.clone())
            .or_else(|| {
                TRAILING_AMOUNT
                    .find(trimmed)
                    .map(|m| offset + m.start()..offset + m.end())
                    .filter(|span| date.as_ref().is_none_or(|d| !overlaps(d, span)))
            });

        Located { date, amount }
    }

    /// Build the intermediate candidate for a line.
    pub fn candidate(&self, line: &str) -> TransactionCandidate {
        let located = self.locate(line);
        TransactionCandidate {
            date_token: located.date.as_ref().map(|r| line[r.clone()].to_string()),
            amount_token: located.amount.as_ref().map(|r| line[r.clone()].to_string()),
            residual: residual(line, &[located.date.clone(), located.amount.clone()]),
        }
    }

    /// Extract fields from a line, or say why not.
    pub fn extract(&self, line: &str) -> Result<ExtractedFields, LineRejection> {
        let located = self.locate(line);

        let date = located.date.clone().ok_or(LineRejection::MissingDate)?;
        let amount_span = located.amount.clone().ok_or(LineRejection::MissingAmount)?;

        let amount_token = &line[amount_span.clone()];
        let amount = parse_amount(amount_token)
            .ok_or_else(|| LineRejection::MalformedAmount(amount_token.to_string()))?;

        let description = residual(line, &[Some(date.clone()), Some(amount_span)]);
        if description.chars().count() < self.min_description_length {
            return Err(LineRejection::DescriptionTooShort(description));
        }

        Ok(ExtractedFields {
            date_token: line[date].to_string(),
            amount_token: amount_token.to_string(),
            amount,
            description,
        })
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// The line with the given spans cut out, whitespace collapsed.
fn residual(line: &str, spans: &[Option<Range<usize>>]) -> String {
    let mut cuts: Vec<&Range<usize>> = spans.iter().flatten().collect();
    cuts.sort_by_key(|r| r.start);

    let mut out = String::with_capacity(line.len());
    let mut pos = 0;
    for cut in cuts {
        if cut.start > pos {
            out.push_str(&line[pos..cut.start]);
        }
        // Keep the pieces on either side apart.
        out.push(' ');
        pos = pos.max(cut.end);
    }
    out.push_str(&line[pos..]);

    clean_description(&out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::rules::amounts::AmountSign;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn extract(line: &str) -> Result<ExtractedFields, LineRejection> {
        FieldExtractor::new().extract(line)
    }

    #[test]
    fn test_extract_single_line() {
        let fields = extract("01/15/2024 SPOTIFY PREMIUM $12.99").unwrap();
        assert_eq!(fields.date_token, "01/15/2024");
        assert_eq!(fields.amount_token, "$12.99");
        assert_eq!(fields.amount.magnitude, Decimal::new(1299, 2));
        assert_eq!(fields.amount.sign, AmountSign::Unsigned);
        assert_eq!(fields.description, "SPOTIFY PREMIUM");
    }

    #[test]
    fn test_last_amount_is_transaction_amount() {
        let fields = extract("01/16 FOOD LION #1234 $45.67").unwrap();
        assert_eq!(fields.amount.magnitude, Decimal::new(4567, 2));
        assert_eq!(fields.description, "FOOD LION #1234");
    }

    #[test]
    fn test_reference_number_before_amount() {
        let fields = extract("04/22 Discover E-Payment 8148 -15.00").unwrap();
        assert_eq!(fields.amount.sign, AmountSign::Negative);
        assert_eq!(fields.description, "Discover E-Payment 8148");
    }

    #[test]
    fn test_anchored_fallbacks_for_glued_tokens() {
        let fields = extract("01/15/2024SPOTIFY PREMIUM MARCOSTX5.82").unwrap();
        assert_eq!(fields.date_token, "01/15/2024");
        assert_eq!(fields.amount_token, "5.82");
        assert_eq!(fields.description, "SPOTIFY PREMIUM MARCOSTX");
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(extract("SPOTIFY PREMIUM $12.99"), Err(LineRejection::MissingDate));
        assert_eq!(extract("01/15 SPOTIFY PREMIUM"), Err(LineRejection::MissingAmount));
        // The anchored amount may not reuse the date's digits.
        assert_eq!(extract("01/15"), Err(LineRejection::MissingAmount));
    }

    #[test]
    fn test_description_too_short() {
        assert_eq!(
            extract("01/15 AB 3.00"),
            Err(LineRejection::DescriptionTooShort("AB".to_string()))
        );
    }

    #[test]
    fn test_malformed_amount_is_rejected() {
        let huge = format!("01/15 GIANT {}", "9".repeat(40));
        assert!(matches!(extract(&huge), Err(LineRejection::MalformedAmount(_))));
    }

    #[test]
    fn test_removes_chosen_spans_only() {
        // "15" appears inside the date and as text; only the tokens go.
        let fields = extract("01/15 ROUTE 15 DINER 9.50").unwrap();
        assert_eq!(fields.description, "ROUTE 15 DINER");
    }

    #[test]
    fn test_description_cleanup_is_idempotent() {
        let fields = extract("  01/15/2024   SPOTIFY\tPREMIUM    $12.99 ").unwrap();
        assert_eq!(fields.description, "SPOTIFY PREMIUM");
        assert_eq!(clean_description(&fields.description), fields.description);

        let rebuilt = format!("{} {} {}", fields.date_token, fields.description, fields.amount_token);
        assert_eq!(extract(&rebuilt).unwrap().description, fields.description);
    }

    #[test]
    fn test_candidate() {
        let candidate = FieldExtractor::new().candidate("SPOTIFY PREMIUM $12.99");
        assert_eq!(candidate.date_token, None);
        assert_eq!(candidate.amount_token.as_deref(), Some("$12.99"));
        assert_eq!(candidate.residual, "SPOTIFY PREMIUM");
        assert!(!candidate.is_complete());
    }
}
