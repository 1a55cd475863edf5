use serde::{Deserialize, Serialize};

/// Why a transaction row did not reach aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRejection {
    InvalidDate,
    NotAnExpense,
    UnmappedRegistration,
    InvalidTaxId,
    InvalidValue,
}

/// Row accounting for one pipeline run.
///
/// Every row read ends up in exactly one of the drop counters or in `rows_kept`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationReport {
    pub registry_entries: usize,
    pub registry_duplicates: usize,
    pub files_processed: usize,
    pub blocks_processed: usize,
    pub rows_read: usize,
    pub malformed_rows: usize,
    pub invalid_dates: usize,
    pub filtered_by_code: usize,
    pub unmapped_registrations: usize,
    pub invalid_tax_ids: usize,
    pub invalid_values: usize,
    pub rows_kept: usize,
    pub partial_groups: usize,
    pub consolidated_records: usize,
    pub enriched_records: usize,
    pub rollup_records: usize,
}

impl ConsolidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_rejection(&mut self, rejection: RowRejection) {
        match rejection {
            RowRejection::InvalidDate => self.invalid_dates += 1,
            RowRejection::NotAnExpense => self.filtered_by_code += 1,
            RowRejection::UnmappedRegistration => self.unmapped_registrations += 1,
            RowRejection::InvalidTaxId => self.invalid_tax_ids += 1,
            RowRejection::InvalidValue => self.invalid_values += 1,
        }
    }

    pub fn rows_dropped(&self) -> usize {
        self.malformed_rows
            + self.invalid_dates
            + self.filtered_by_code
            + self.unmapped_registrations
            + self.invalid_tax_ids
            + self.invalid_values
    }

    pub fn is_balanced(&self) -> bool {
        self.rows_read == self.rows_dropped() + self.rows_kept
    }

    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Consolidation Report ===\n");
        summary.push_str(&format!(
            "Registry: {} operators ({} duplicate registrations skipped)\n",
            self.registry_entries, self.registry_duplicates
        ));
        summary.push_str(&format!(
            "Input: {} files, {} blocks, {} rows\n",
            self.files_processed, self.blocks_processed, self.rows_read
        ));
        summary.push_str(&format!(
            "Rows Kept: {} ({:.1}%)\n",
            self.rows_kept,
            percentage(self.rows_kept, self.rows_read)
        ));
        summary.push_str("\nDropped Rows:\n");
        for (label, count) in [
            ("Malformed", self.malformed_rows),
            ("Unparseable date", self.invalid_dates),
            ("Not an expense code", self.filtered_by_code),
            ("Unknown registration", self.unmapped_registrations),
            ("Invalid tax id", self.invalid_tax_ids),
            ("Unparseable value", self.invalid_values),
        ] {
            summary.push_str(&format!(
                "  {:<22} {} ({:.1}%)\n",
                label,
                count,
                percentage(count, self.rows_read)
            ));
        }
        summary.push_str(&format!(
            "\nOutput: {} partial groups -> {} consolidated, {} enriched, {} rollup records\n",
            self.partial_groups,
            self.consolidated_records,
            self.enriched_records,
            self.rollup_records
        ));

        summary
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}
