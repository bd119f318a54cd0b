//! Amount parsing for statement lines and tabular cells.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::AMOUNT_SUFFIXES;
use crate::models::UnsignedAmount;

/// Sign as printed in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountSign {
    Unsigned,
    Negative,
    Positive,
}

/// A parsed amount: printed magnitude plus printed sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementAmount {
    pub magnitude: Decimal,
    pub sign: AmountSign,
}

impl StatementAmount {
    /// Flow-signed value: the printed sign, or `unsigned` when none is printed.
    pub fn signed(&self, unsigned: UnsignedAmount) -> Decimal {
        match (self.sign, unsigned) {
            (AmountSign::Negative, _) | (AmountSign::Unsigned, UnsignedAmount::Outflow) => {
                -self.magnitude
            }
            (AmountSign::Positive, _) | (AmountSign::Unsigned, UnsignedAmount::Inflow) => {
                self.magnitude
            }
        }
    }

    /// Value taken at face value: unsigned means positive.
    pub fn face_value(&self) -> Decimal {
        self.signed(UnsignedAmount::Inflow)
    }
}

/// Parse a currency token such as `$1,234.56`, `-45.67`, `+$3`, `(12.00)` or
/// `1,250.00CR`.
///
/// `$` and grouping commas are stripped. Parentheses mean negative. A `CR` or
/// `DR` marker gives the sign when none is printed; a currency code is
/// dropped. Returns `None` for text that is not a number once cleaned.
pub fn parse_amount(s: &str) -> Option<StatementAmount> {
    let s = s.trim();
    let (s, marker) = split_suffix(s);

    let (sign, rest) = if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        (AmountSign::Negative, inner.trim())
    } else {
        match s.as_bytes().first() {
            Some(b'-') => (AmountSign::Negative, &s[1..]),
            Some(b'+') => (AmountSign::Positive, &s[1..]),
            _ => (AmountSign::Unsigned, s),
        }
    };

    let cleaned: String = rest.chars().filter(|c| *c != '$' && *c != ',').collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    let magnitude = Decimal::from_str(&cleaned).ok()?;
    let sign = match (sign, marker) {
        (AmountSign::Unsigned, Some(marked)) => marked,
        (printed, _) => printed,
    };
    Some(StatementAmount { magnitude, sign })
}

/// Strip a trailing [`AMOUNT_SUFFIXES`] entry, returning the sign it implies.
fn split_suffix(s: &str) -> (&str, Option<AmountSign>) {
    for suffix in AMOUNT_SUFFIXES {
        let Some(cut) = s.len().checked_sub(suffix.len()) else {
            continue;
        };
        if !s.is_char_boundary(cut) || !s[cut..].eq_ignore_ascii_case(suffix) {
            continue;
        }
        let number = s[..cut].trim_end();
        if !number.ends_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        let sign = match *suffix {
            "CR" => Some(AmountSign::Positive),
            "DR" => Some(AmountSign::Negative),
            _ => None,
        };
        return (number, sign);
    }
    (s, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(
            parse_amount("$1,234.56"),
            Some(StatementAmount { magnitude: dec("1234.56"), sign: AmountSign::Unsigned })
        );
        assert_eq!(parse_amount("-45.67").unwrap().sign, AmountSign::Negative);
        assert_eq!(parse_amount("+$3").unwrap().magnitude, dec("3"));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("$"), None);
        assert_eq!(parse_amount(","), None);
        assert_eq!(parse_amount("12a"), None);
        assert_eq!(parse_amount("1.2.3"), None);
    }

    #[test]
    fn test_parse_amount_overflow() {
        assert_eq!(parse_amount("99999999999999999999999999999999999"), None);
    }

    #[test]
    fn test_signed_policy() {
        let unsigned = parse_amount("12.99").unwrap();
        assert_eq!(unsigned.signed(UnsignedAmount::Outflow), dec("-12.99"));
        assert_eq!(unsigned.signed(UnsignedAmount::Inflow), dec("12.99"));

        let explicit = parse_amount("+12.99").unwrap();
        assert_eq!(explicit.signed(UnsignedAmount::Outflow), dec("12.99"));
        assert_eq!(parse_amount("-5").unwrap().face_value(), dec("-5"));
    }

    #[test]
    fn test_parenthesized_amount_is_negative() {
        let amount = parse_amount("(1,234.56)").unwrap();
        assert_eq!(amount.sign, AmountSign::Negative);
        assert_eq!(amount.magnitude, dec("1234.56"));
        assert_eq!(parse_amount("($12.00)").unwrap().face_value(), dec("-12.00"));
        assert_eq!(parse_amount("(12.00"), None);
    }

    #[test]
    fn test_balance_markers() {
        let credit = parse_amount("1,250.00CR").unwrap();
        assert_eq!(credit.sign, AmountSign::Positive);
        assert_eq!(credit.magnitude, dec("1250.00"));

        assert_eq!(parse_amount("45.67 DR").unwrap().signed(UnsignedAmount::Inflow), dec("-45.67"));
        assert_eq!(parse_amount("12.99usd").unwrap().sign, AmountSign::Unsigned);
        // A printed sign wins over the marker.
        assert_eq!(parse_amount("+5.00DR").unwrap().sign, AmountSign::Positive);
        assert_eq!(parse_amount("CR"), None);
        assert_eq!(parse_amount("12.00XYZ"), None);
    }
}
