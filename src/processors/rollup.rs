use crate::error::{ProcessingError, Result};
use crate::models::{EnrichedRecord, RollupRecord};
use crate::utils::constants::STATISTIC_DECIMAL_PLACES;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use std::collections::HashMap;
use tracing::{info, warn};

/// Groups enriched records by (legal name, region) and computes expense statistics.
pub struct RollupCalculator {
    decimal_places: u32,
}

impl RollupCalculator {
    pub fn new() -> Self {
        Self {
            decimal_places: STATISTIC_DECIMAL_PLACES,
        }
    }

    /// Sum, mean and sample standard deviation per group, largest total first.
    ///
    /// Groups appear in first-seen order before sorting and the sort is
    /// stable, so equal totals keep input order. Totals are exact; mean and
    /// standard deviation are rounded to the configured decimal places.
    ///
    /// A group total that overflows is an error. A standard deviation that
    /// overflows is left empty.
    pub fn rollup(&self, enriched: &[EnrichedRecord]) -> Result<Vec<RollupRecord>> {
        let mut order: Vec<(&str, &str)> = Vec::new();
        let mut groups: HashMap<(&str, &str), Vec<Decimal>> = HashMap::new();

        for record in enriched {
            let key = (record.legal_name.as_str(), record.region.as_str());
            groups
                .entry(key)
                .or_insert_with(|| {
                    order.push(key);
                    Vec::new()
                })
                .push(record.total_expense);
        }

        let mut rollup = order
            .into_iter()
            .map(|key| self.summarize(key.0, key.1, &groups[&key]))
            .collect::<Result<Vec<RollupRecord>>>()?;

        rollup.sort_by(|a, b| b.total_expense.cmp(&a.total_expense));

        info!(groups = rollup.len(), "Computed expense rollup");
        Ok(rollup)
    }

    fn summarize(&self, legal_name: &str, region: &str, values: &[Decimal]) -> Result<RollupRecord> {
        let overflow = || {
            ProcessingError::InvalidFormat(format!(
                "expense total of {} ({}) overflows",
                legal_name, region
            ))
        };
        let total = values
            .iter()
            .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
            .ok_or_else(overflow)?;
        let mean = total
            .checked_div(Decimal::from(values.len()))
            .ok_or_else(overflow)?;

        let stddev = sample_stddev(values, mean);
        if stddev.is_none() && values.len() > 1 {
            warn!(legal_name, region, "Standard deviation out of decimal range, left empty");
        }

        Ok(RollupRecord {
            legal_name: legal_name.to_string(),
            region: region.to_string(),
            total_expense: total,
            mean_quarterly_expense: self.round(mean),
            stddev_quarterly_expense: stddev.map(|s| self.round(s)),
            observations: values.len(),
        })
    }

    fn round(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl Default for RollupCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample (n - 1) standard deviation; undefined below two observations
/// or when an intermediate leaves the decimal range.
fn sample_stddev(values: &[Decimal], mean: Decimal) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }

    let squared_deviations = values.iter().try_fold(Decimal::ZERO, |acc, v| {
        let deviation = v.checked_sub(mean)?;
        acc.checked_add(deviation.checked_mul(deviation)?)
    })?;

    squared_deviations
        .checked_div(Decimal::from(values.len() - 1))?
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Quarter;
    use pretty_assertions::assert_eq;

    fn enriched(name: &str, region: &str, quarter: Quarter, value: Decimal) -> EnrichedRecord {
        EnrichedRecord {
            tax_id: "11222333000181".to_string(),
            legal_name: name.to_string(),
            year: 2025,
            quarter,
            total_expense: value,
            registration_id: Some(1),
            category: "Medicina de Grupo".to_string(),
            region: region.to_string(),
        }
    }

    #[test]
    fn test_statistics_per_group() {
        let records = vec![
            enriched("OPERADORA A", "SP", Quarter::First, Decimal::from(100)),
            enriched("OPERADORA A", "SP", Quarter::Second, Decimal::from(200)),
            enriched("OPERADORA B", "MG", Quarter::First, Decimal::new(5025, 2)),
        ];

        let rollup = RollupCalculator::new().rollup(&records).unwrap();

        assert_eq!(rollup.len(), 2);
        assert_eq!(rollup[0].legal_name, "OPERADORA A");
        assert_eq!(rollup[0].total_expense, Decimal::from(300));
        assert_eq!(rollup[0].mean_quarterly_expense, Decimal::from(150));
        assert_eq!(rollup[0].stddev_quarterly_expense, Some(Decimal::new(7071, 2)));
        assert_eq!(rollup[0].observations, 2);

        assert_eq!(rollup[1].total_expense, Decimal::new(5025, 2));
        assert_eq!(rollup[1].mean_quarterly_expense, Decimal::new(5025, 2));
        assert_eq!(rollup[1].stddev_quarterly_expense, None);
    }

    #[test]
    fn test_same_name_different_region_are_separate_groups() {
        let records = vec![
            enriched("OPERADORA A", "SP", Quarter::First, Decimal::from(1)),
            enriched("OPERADORA A", "RJ", Quarter::First, Decimal::from(2)),
        ];
        let rollup = RollupCalculator::new().rollup(&records).unwrap();
        assert_eq!(rollup.len(), 2);
        assert_eq!(rollup[0].region, "RJ");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let records = vec![
            enriched("OPERADORA C", "PR", Quarter::First, Decimal::from(10)),
            enriched("OPERADORA A", "SP", Quarter::First, Decimal::from(10)),
            enriched("OPERADORA B", "MG", Quarter::First, Decimal::from(20)),
        ];
        let names: Vec<String> = RollupCalculator::new()
            .rollup(&records)
            .unwrap()
            .into_iter()
            .map(|r| r.legal_name)
            .collect();
        assert_eq!(names, vec!["OPERADORA B", "OPERADORA C", "OPERADORA A"]);
    }

    #[test]
    fn test_totals_reconcile_with_input() {
        let records = vec![
            enriched("OPERADORA A", "SP", Quarter::First, Decimal::new(10050, 2)),
            enriched("OPERADORA A", "SP", Quarter::Second, Decimal::new(-2001, 2)),
            enriched("OPERADORA B", "MG", Quarter::Third, Decimal::new(333, 3)),
        ];
        let input_total: Decimal = records.iter().map(|r| r.total_expense).sum();
        let rollup_total: Decimal = RollupCalculator::new()
            .rollup(&records)
            .unwrap()
            .iter()
            .map(|r| r.total_expense)
            .sum();
        assert_eq!(input_total, rollup_total);
    }

    #[test]
    fn test_identical_values_have_zero_stddev() {
        let records = vec![
            enriched("OPERADORA A", "SP", Quarter::First, Decimal::from(5)),
            enriched("OPERADORA A", "SP", Quarter::Second, Decimal::from(5)),
        ];
        let rollup = RollupCalculator::new().rollup(&records).unwrap();
        assert_eq!(rollup[0].stddev_quarterly_expense, Some(Decimal::ZERO));
    }

    #[test]
    fn test_stddev_out_of_range_is_empty() {
        let records = vec![
            enriched("OPERADORA A", "SP", Quarter::First, Decimal::from(1_000_000_000_000_000i64)),
            enriched("OPERADORA A", "SP", Quarter::Second, Decimal::from(-1_000_000_000_000_000i64)),
        ];
        let rollup = RollupCalculator::new().rollup(&records).unwrap();

        assert_eq!(rollup[0].total_expense, Decimal::ZERO);
        assert_eq!(rollup[0].mean_quarterly_expense, Decimal::ZERO);
        assert_eq!(rollup[0].stddev_quarterly_expense, None);
    }

    #[test]
    fn test_group_total_overflow_is_an_error() {
        let records = vec![
            enriched("OPERADORA A", "SP", Quarter::First, Decimal::MAX),
            enriched("OPERADORA A", "SP", Quarter::Second, Decimal::MAX),
        ];
        let result = RollupCalculator::new().rollup(&records);
        assert!(matches!(result, Err(ProcessingError::InvalidFormat(_))));
    }
}
