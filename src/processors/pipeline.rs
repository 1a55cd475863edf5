use crate::config::PipelineSettings;
use crate::error::Result;
use crate::models::{ConsolidatedRecord, EnrichedRecord, OperatorRegistry, RollupRecord};
use crate::processors::{
    ChunkedConsolidator, ConsolidationReport, Enricher, GlobalReducer, RollupCalculator,
};
use crate::readers::{RegistryReader, TransactionReader};
use crate::utils::progress::ProgressReporter;
use crate::writers::ArchiveWriter;
use std::path::Path;
use tracing::info;

/// The three output tables of a run plus its row accounting.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub consolidated: Vec<ConsolidatedRecord>,
    pub enriched: Vec<EnrichedRecord>,
    pub rollup: Vec<RollupRecord>,
    pub report: ConsolidationReport,
}

/// Registry load → chunked consolidation → global reduce → enrichment → rollup.
pub struct ExpensePipeline {
    settings: PipelineSettings,
}

impl ExpensePipeline {
    pub fn new(settings: PipelineSettings) -> Result<Self> {
        settings.validate_for_run()?;
        Ok(Self { settings })
    }

    pub fn load_registry(&self) -> Result<OperatorRegistry> {
        RegistryReader::new()
            .with_delimiter(self.settings.registry_delimiter()?)
            .with_encoding(self.settings.input_encoding()?)
            .read_registry(self.settings.registry_file()?)
    }

    /// Run every stage in memory. Nothing is written.
    pub fn run(&self, progress: Option<&ProgressReporter>) -> Result<PipelineOutput> {
        let mut report = ConsolidationReport::new();

        if let Some(p) = progress {
            p.set_message("Loading operator registry...");
        }
        let registry = self.load_registry()?;
        report.registry_entries = registry.len();
        report.registry_duplicates = registry.duplicates_skipped();

        let lookup = registry.lookup();
        let reader = TransactionReader::new()
            .with_delimiter(self.settings.transaction_delimiter()?)
            .with_encoding(self.settings.input_encoding()?)
            .with_block_size(self.settings.block_size);
        let consolidator = ChunkedConsolidator::new(&lookup)
            .with_reader(reader)
            .with_expense_code_prefix(self.settings.expense_code_prefix.clone());

        let mut reducer = GlobalReducer::new();
        consolidator.consolidate_with(
            &self.settings.transaction_files,
            &mut report,
            progress,
            |partial| reducer.merge(partial),
        )?;

        if let Some(p) = progress {
            p.set_message("Reducing and enriching...");
        }
        let consolidated = reducer.finish();
        let enriched = Enricher::new(&registry).enrich(&consolidated);
        let rollup = RollupCalculator::new().rollup(&enriched)?;

        report.consolidated_records = consolidated.len();
        report.enriched_records = enriched.len();
        report.rollup_records = rollup.len();

        info!(
            rows_read = report.rows_read,
            rows_kept = report.rows_kept,
            consolidated = report.consolidated_records,
            "Pipeline run complete"
        );

        Ok(PipelineOutput {
            consolidated,
            enriched,
            rollup,
            report,
        })
    }

    pub fn write(&self, output: &PipelineOutput, destination: &Path) -> Result<()> {
        ArchiveWriter::new()
            .with_compression(&self.settings.compression)?
            .with_encoding(self.settings.output_encoding()?)
            .write_archive(
                &output.consolidated,
                &output.enriched,
                &output.rollup,
                destination,
            )
    }

    /// Run every stage and write the archive; on failure no archive is produced.
    pub fn run_to_archive(
        &self,
        destination: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<PipelineOutput> {
        let output = self.run(progress)?;

        if let Some(p) = progress {
            p.set_message("Writing archive...");
        }
        self.write(&output, destination)?;

        Ok(output)
    }
}
