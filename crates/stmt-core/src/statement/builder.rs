//! Canonical transaction builder.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{CanonicalTransaction, LinePosition, TransactionType};

/// A transaction whose fields are settled but which has no id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTransaction {
    pub date: NaiveDate,
    /// Amount with whatever sign the source gave it.
    pub amount: Decimal,
    pub description: String,
    pub transaction_type: TransactionType,
    /// Where it came from; not part of the canonical record.
    pub position: LinePosition,
}

/// Freezes resolved transactions into the canonical output sequence.
///
/// Ids are 1-based and contiguous in discovery order. The stored amount is
/// negative for debits and positive for credits whatever the source sign.
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    out: Vec<CanonicalTransaction>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, tx: ResolvedTransaction) {
        let id = self.out.len() as u32 + 1;
        self.out.push(CanonicalTransaction {
            id,
            date: tx.date,
            amount: tx.transaction_type.apply_sign(tx.amount),
            description: tx.description,
            transaction_type: tx.transaction_type,
        });
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn finish(self) -> Vec<CanonicalTransaction> {
        self.out
    }
}

impl Extend<ResolvedTransaction> for TransactionBuilder {
    fn extend<I: IntoIterator<Item = ResolvedTransaction>>(&mut self, iter: I) {
        for tx in iter {
            self.push(tx);
        }
    }
}

/// Build the canonical sequence from resolved transactions.
pub fn build(records: impl IntoIterator<Item = ResolvedTransaction>) -> Vec<CanonicalTransaction> {
    let mut builder = TransactionBuilder::new();
    builder.extend(records);
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolved(desc: &str, amount: i64, tt: TransactionType) -> ResolvedTransaction {
        ResolvedTransaction {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            amount: Decimal::new(amount, 2),
            description: desc.to_string(),
            transaction_type: tt,
            position: LinePosition { page: 1, line: 1, span: 1 },
        }
    }

    #[test]
    fn test_ids_are_contiguous_in_order() {
        let out = build(vec![
            resolved("first", -100, TransactionType::Debit),
            resolved("second", 200, TransactionType::Credit),
            resolved("third", 300, TransactionType::Debit),
        ]);

        let ids: Vec<u32> = out.iter().map(|t| t.id).collect();
        let descs: Vec<&str> = out.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(descs, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_sign_follows_type() {
        let out = build(vec![
            // Refund printed negative: credit, stored positive.
            resolved("AMAZON REFUND", -2500, TransactionType::Credit),
            resolved("FOOD LION", 4567, TransactionType::Debit),
        ]);

        assert_eq!(out[0].amount, Decimal::new(2500, 2));
        assert_eq!(out[1].amount, Decimal::new(-4567, 2));
    }

    #[test]
    fn test_empty() {
        assert!(build(Vec::new()).is_empty());
        assert!(TransactionBuilder::with_capacity(4).is_empty());
    }
}
