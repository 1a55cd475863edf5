use crate::error::{ProcessingError, Result};
use crate::utils::Quarter;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// A transaction row as read from a quarterly extract, before any derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTransaction {
    pub registration_id: String,
    pub accounting_code: String,
    pub posting_date: String,
    pub balance_value: String,
}

impl RawTransaction {
    pub fn new(
        registration_id: impl Into<String>,
        accounting_code: impl Into<String>,
        posting_date: impl Into<String>,
        balance_value: impl Into<String>,
    ) -> Self {
        Self {
            registration_id: registration_id.into(),
            accounting_code: accounting_code.into(),
            posting_date: posting_date.into(),
            balance_value: balance_value.into(),
        }
    }
}

/// Grouping key shared by partial aggregates and consolidated records.
///
/// Field order defines the output ordering of the consolidated table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpenseKey {
    pub tax_id: String,
    pub legal_name: String,
    pub year: i32,
    pub quarter: Quarter,
}

impl ExpenseKey {
    pub fn new(tax_id: String, legal_name: String, year: i32, quarter: Quarter) -> Self {
        Self {
            tax_id,
            legal_name,
            year,
            quarter,
        }
    }
}

/// Summed expenses of one block, keyed by operator-quarter.
#[derive(Debug, Clone, Default)]
pub struct PartialAggregate {
    pub file_index: usize,
    pub block_index: usize,
    pub totals: BTreeMap<ExpenseKey, Decimal>,
}

impl PartialAggregate {
    pub fn new(file_index: usize, block_index: usize) -> Self {
        Self {
            file_index,
            block_index,
            totals: BTreeMap::new(),
        }
    }

    /// Add `value` to the running total of `key`. On overflow the total is left untouched.
    pub fn add(&mut self, key: ExpenseKey, value: Decimal) -> Result<()> {
        add_to_total(&mut self.totals, key, value)
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn total(&self) -> Option<Decimal> {
        self.totals
            .values()
            .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
    }
}

/// Checked `totals[key] += value`, shared by block and global aggregation.
pub(crate) fn add_to_total(
    totals: &mut BTreeMap<ExpenseKey, Decimal>,
    key: ExpenseKey,
    value: Decimal,
) -> Result<()> {
    let total = totals.entry(key).or_insert(Decimal::ZERO);
    *total = total.checked_add(value).ok_or_else(|| {
        ProcessingError::InvalidFormat(format!("expense total overflows adding {}", value))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_aggregate_sums_equal_keys() {
        let key = ExpenseKey::new(
            "11222333000181".to_string(),
            "OPERADORA A".to_string(),
            2025,
            Quarter::First,
        );

        let mut partial = PartialAggregate::new(0, 0);
        partial.add(key.clone(), Decimal::new(10050, 2)).unwrap();
        partial.add(key.clone(), Decimal::new(5025, 2)).unwrap();

        assert_eq!(partial.len(), 1);
        assert_eq!(partial.totals[&key], Decimal::new(15075, 2));
        assert_eq!(partial.total(), Some(Decimal::new(15075, 2)));
    }

    #[test]
    fn test_overflowing_add_keeps_previous_total() {
        let key = ExpenseKey::new("1".into(), "A".into(), 2025, Quarter::First);
        let mut partial = PartialAggregate::new(0, 0);

        partial.add(key.clone(), Decimal::MAX).unwrap();
        let result = partial.add(key.clone(), Decimal::ONE);

        assert!(matches!(result, Err(ProcessingError::InvalidFormat(_))));
        assert_eq!(partial.totals[&key], Decimal::MAX);
    }

    #[test]
    fn test_key_ordering_is_year_then_quarter_within_operator() {
        let a = ExpenseKey::new("1".into(), "A".into(), 2024, Quarter::Fourth);
        let b = ExpenseKey::new("1".into(), "A".into(), 2025, Quarter::First);
        let c = ExpenseKey::new("1".into(), "A".into(), 2025, Quarter::Second);
        assert!(a < b && b < c);
    }
}
