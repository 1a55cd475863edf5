use crate::error::Result;
use crate::models::expense::add_to_total;
use crate::models::{ConsolidatedRecord, ExpenseKey, PartialAggregate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Merges per-block partial aggregates into one row per operator-quarter.
///
/// The same key can show up in several blocks and in several quarterly
/// files, so the partials are always re-grouped here. Output is sorted by key.
#[derive(Debug, Default)]
pub struct GlobalReducer {
    totals: BTreeMap<ExpenseKey, Decimal>,
    partials_merged: usize,
}

impl GlobalReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one partial aggregate in. Fails if an operator-quarter total overflows.
    pub fn merge(&mut self, partial: PartialAggregate) -> Result<()> {
        debug!(
            file_index = partial.file_index,
            block = partial.block_index,
            groups = partial.len(),
            "Merging partial aggregate"
        );

        for (key, value) in partial.totals {
            add_to_total(&mut self.totals, key, value)?;
        }
        self.partials_merged += 1;
        Ok(())
    }

    pub fn partials_merged(&self) -> usize {
        self.partials_merged
    }

    pub fn finish(self) -> Vec<ConsolidatedRecord> {
        info!(
            partials = self.partials_merged,
            records = self.totals.len(),
            "Reduced partial aggregates"
        );

        self.totals
            .into_iter()
            .map(|(key, total)| ConsolidatedRecord::from_key(key, total))
            .collect()
    }

    /// Merge a whole sequence of partial aggregates at once.
    pub fn reduce(
        partials: impl IntoIterator<Item = PartialAggregate>,
    ) -> Result<Vec<ConsolidatedRecord>> {
        let mut reducer = Self::new();
        for partial in partials {
            reducer.merge(partial)?;
        }
        Ok(reducer.finish())
    }
}
