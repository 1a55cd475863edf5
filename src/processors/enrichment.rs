use crate::models::{ConsolidatedRecord, EnrichedRecord, OperatorRegistry};
use crate::utils::constants::NOT_IDENTIFIED;
use tracing::{info, warn};

/// Left-joins consolidated records onto the registry by tax id.
pub struct Enricher<'a> {
    registry: &'a OperatorRegistry,
}

impl<'a> Enricher<'a> {
    pub fn new(registry: &'a OperatorRegistry) -> Self {
        Self { registry }
    }

    /// One enriched record per consolidated record, in the same order.
    ///
    /// A tax id absent from the registry keeps its row with category and
    /// region set to the `NOT IDENTIFIED` sentinel.
    pub fn enrich(&self, consolidated: &[ConsolidatedRecord]) -> Vec<EnrichedRecord> {
        let mut misses = 0usize;

        let enriched: Vec<EnrichedRecord> = consolidated
            .iter()
            .map(|record| match self.registry.find_by_tax_id(&record.tax_id) {
                Some(entry) => EnrichedRecord::from_consolidated(
                    record,
                    Some(entry.registration_id),
                    entry.category.clone(),
                    entry.region.clone(),
                ),
                None => {
                    misses += 1;
                    EnrichedRecord::from_consolidated(
                        record,
                        None,
                        NOT_IDENTIFIED.to_string(),
                        NOT_IDENTIFIED.to_string(),
                    )
                }
            })
            .collect();

        if misses > 0 {
            warn!(misses, "Consolidated records without a registry match by tax id");
        }
        info!(records = enriched.len(), "Enriched consolidated records");

        enriched
    }
}
