//! Debit/credit resolution from line context.

use rust_decimal::Decimal;

use super::patterns::{contains_any, CREDIT_KEYWORDS, DEBIT_KEYWORDS, SIGNED_KEYWORDS};
use crate::models::TransactionType;

/// Which rule decided the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeEvidence {
    DebitKeyword,
    CreditKeyword,
    /// zelle / payment / transfer: direction taken from the sign.
    SignedKeyword,
    AmountSign,
}

/// Resolve the flow direction of a transaction line.
///
/// Explicit debit keywords win over credit keywords, which win over the
/// amount sign. Statement text does not reliably print a sign, so keywords
/// always take precedence.
pub fn resolve_type(line: &str, amount: Decimal) -> TransactionType {
    resolve_type_with_evidence(line, amount).0
}

/// [`resolve_type`], also reporting which rule matched.
pub fn resolve_type_with_evidence(line: &str, amount: Decimal) -> (TransactionType, TypeEvidence) {
    let lower = line.to_lowercase();

    if contains_any(&lower, DEBIT_KEYWORDS) {
        (TransactionType::Debit, TypeEvidence::DebitKeyword)
    } else if contains_any(&lower, CREDIT_KEYWORDS) {
        (TransactionType::Credit, TypeEvidence::CreditKeyword)
    } else if contains_any(&lower, SIGNED_KEYWORDS) {
        (TransactionType::from_sign(amount), TypeEvidence::SignedKeyword)
    } else {
        (TransactionType::from_sign(amount), TypeEvidence::AmountSign)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_refund_overrides_negative_sign() {
        assert_eq!(resolve_type("AMAZON REFUND", dec("-25.00")), TransactionType::Credit);
    }

    #[test]
    fn test_negative_without_keyword_is_debit() {
        assert_eq!(resolve_type("SPOTIFY PREMIUM", dec("-12.99")), TransactionType::Debit);
        assert_eq!(resolve_type("SPOTIFY PREMIUM", dec("12.99")), TransactionType::Credit);
    }

    #[test]
    fn test_debit_keywords_beat_credit_keywords() {
        // "debit card" and "credit" both present: debit wins.
        assert_eq!(
            resolve_type("DEBIT CARD PURCHASE CREDIT UNION STORE", dec("10.00")),
            TransactionType::Debit
        );
        assert_eq!(resolve_type("Monthly service fee", dec("5.00")), TransactionType::Debit);
    }

    #[test]
    fn test_credit_keywords() {
        assert_eq!(resolve_type("DIRECT DEPOSIT ACME", dec("-900.00")), TransactionType::Credit);
        assert_eq!(resolve_type("Online Transfer In from SAV", dec("-50.00")), TransactionType::Credit);
    }

    #[test]
    fn test_sign_dependent_keywords() {
        assert_eq!(resolve_type("ZELLE TO JOHN", dec("-40.00")), TransactionType::Debit);
        assert_eq!(resolve_type("ZELLE FROM JOHN", dec("40.00")), TransactionType::Credit);
        assert_eq!(resolve_type("Online Transfer to SAV", dec("-50.00")), TransactionType::Debit);
    }

    #[test]
    fn test_evidence() {
        assert_eq!(
            resolve_type_with_evidence("PAYMENT THANK YOU", dec("-1.00")).1,
            TypeEvidence::SignedKeyword
        );
        assert_eq!(
            resolve_type_with_evidence("SPOTIFY", dec("-1.00")).1,
            TypeEvidence::AmountSign
        );
    }
}
