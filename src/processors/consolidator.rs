use crate::error::Result;
use crate::models::{ExpenseKey, OperatorLookup, PartialAggregate, RawTransaction};
use crate::processors::{ConsolidationReport, RowRejection};
use crate::readers::{TransactionBlock, TransactionReader};
use crate::utils::constants::{EXPENSE_CODE_PREFIX, UNIDENTIFIED_LEGAL_NAME};
use crate::utils::period::derive_period;
use crate::utils::progress::ProgressReporter;
use crate::utils::{is_valid_tax_id, parse_locale_decimal};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{debug, info};

/// Streams quarterly extracts block by block and reduces each block to a partial aggregate.
///
/// Only one block is alive at a time; what survives a block is its
/// `PartialAggregate`, which is already grouped by operator-quarter.
pub struct ChunkedConsolidator<'a> {
    lookup: &'a OperatorLookup,
    reader: TransactionReader,
    expense_code_prefix: String,
}

impl<'a> ChunkedConsolidator<'a> {
    pub fn new(lookup: &'a OperatorLookup) -> Self {
        Self {
            lookup,
            reader: TransactionReader::new(),
            expense_code_prefix: EXPENSE_CODE_PREFIX.to_string(),
        }
    }

    pub fn with_reader(mut self, reader: TransactionReader) -> Self {
        self.reader = reader;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.reader = self.reader.with_block_size(block_size);
        self
    }

    pub fn with_expense_code_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.expense_code_prefix = prefix.into();
        self
    }

    /// Consolidate every file in order, collecting one partial aggregate per block.
    pub fn consolidate(
        &self,
        file_paths: &[PathBuf],
        report: &mut ConsolidationReport,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<PartialAggregate>> {
        let mut partials = Vec::new();
        self.consolidate_with(file_paths, report, progress, |partial| {
            partials.push(partial);
            Ok(())
        })?;
        Ok(partials)
    }

    /// Consolidate every file in order, handing each block's aggregate to `emit` as soon as it is built.
    ///
    /// An error from `emit` stops the run.
    pub fn consolidate_with<F>(
        &self,
        file_paths: &[PathBuf],
        report: &mut ConsolidationReport,
        progress: Option<&ProgressReporter>,
        mut emit: F,
    ) -> Result<()>
    where
        F: FnMut(PartialAggregate) -> Result<()>,
    {
        for (file_index, path) in file_paths.iter().enumerate() {
            info!(file = %path.display(), "Consolidating transaction file");

            for block in self.reader.blocks(path)? {
                let block = block?;

                if let Some(p) = progress {
                    p.set_message(&format!(
                        "{}: block {} ({} rows kept so far)",
                        path.display(),
                        block.index + 1,
                        report.rows_kept
                    ));
                }

                let partial = self.consolidate_block(file_index, &block, report);
                debug!(
                    file_index = partial.file_index,
                    block = partial.block_index,
                    rows = block.rows_read(),
                    groups = partial.len(),
                    "Block consolidated"
                );

                report.blocks_processed += 1;
                report.partial_groups += partial.len();
                emit(partial)?;
            }

            report.files_processed += 1;
        }

        Ok(())
    }

    /// Filter, join, validate and sum one block.
    pub fn consolidate_block(
        &self,
        file_index: usize,
        block: &TransactionBlock,
        report: &mut ConsolidationReport,
    ) -> PartialAggregate {
        let mut partial = PartialAggregate::new(file_index, block.index);

        report.rows_read += block.rows_read();
        report.malformed_rows += block.malformed;

        for row in &block.rows {
            let kept = self
                .derive_row(row)
                .and_then(|(key, value)| {
                    partial
                        .add(key, value)
                        .map_err(|_| RowRejection::InvalidValue)
                });

            match kept {
                Ok(()) => report.rows_kept += 1,
                Err(rejection) => report.record_rejection(rejection),
            }
        }

        partial
    }

    fn derive_row(&self, row: &RawTransaction) -> std::result::Result<(ExpenseKey, Decimal), RowRejection> {
        let (year, quarter) = derive_period(&row.posting_date).ok_or(RowRejection::InvalidDate)?;

        if !row.accounting_code.starts_with(&self.expense_code_prefix) {
            return Err(RowRejection::NotAnExpense);
        }

        let registration_id = row
            .registration_id
            .parse::<u32>()
            .map_err(|_| RowRejection::UnmappedRegistration)?;

        let tax_id = self
            .lookup
            .tax_id(registration_id)
            .ok_or(RowRejection::UnmappedRegistration)?;

        if !is_valid_tax_id(tax_id) {
            return Err(RowRejection::InvalidTaxId);
        }

        let legal_name = self
            .lookup
            .legal_name(registration_id)
            .unwrap_or(UNIDENTIFIED_LEGAL_NAME);

        let value = parse_locale_decimal(&row.balance_value).map_err(|_| RowRejection::InvalidValue)?;

        Ok((
            ExpenseKey::new(tax_id.to_string(), legal_name.to_string(), year, quarter),
            value,
        ))
    }
}
