use crate::archive::ArchiveInspector;
use crate::cli::args::{Cli, Commands, InputArgs};
use crate::config::PipelineSettings;
use crate::error::Result;
use crate::processors::{ExpensePipeline, PipelineOutput};
use crate::utils::constants::ROLLUP_ENTRY;
use crate::utils::progress::ProgressReporter;
use crate::utils::tax_id::normalize_tax_id;
use crate::utils::{generate_default_archive_filename, is_valid_tax_id, TextEncoding};
use crate::writers::ArchiveWriter;
use std::path::PathBuf;
use tracing::info;

pub async fn run(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;

    match cli.command {
        Commands::Consolidate {
            input,
            output_file,
            output_encoding,
            compression,
            validate_only,
            report,
        } => {
            let mut settings = resolve_settings(&input)?;
            if let Some(path) = output_file {
                settings.output_archive = Some(path);
            }
            if let Some(encoding) = output_encoding {
                settings.output_encoding = encoding;
            }
            if let Some(compression) = compression {
                settings.compression = compression;
            }
            let destination = settings
                .output_archive
                .clone()
                .unwrap_or_else(generate_default_archive_filename);

            let write_to = if validate_only {
                None
            } else {
                Some(destination.clone())
            };
            let output = run_pipeline(settings, write_to, quiet).await?;

            println!("\n{}", output.report.generate_summary());

            if let Some(path) = report {
                std::fs::write(&path, serde_json::to_string_pretty(&output.report)?)?;
                info!(report = %path.display(), "Run report written");
            }

            if validate_only {
                println!("Validation complete - no archive written");
                return Ok(());
            }

            let file_info = ArchiveWriter::new().get_file_info(&destination)?;
            println!("{}", file_info.summary());
            println!("Consolidation complete!");
        }

        Commands::Validate { input } => {
            let settings = resolve_settings(&input)?;
            let output = run_pipeline(settings, None, quiet).await?;

            println!("\n{}", output.report.generate_summary());

            if output.report.rows_dropped() == 0 {
                println!("✅ All rows passed validation checks");
            } else {
                println!(
                    "⚠️  {} of {} rows were dropped",
                    output.report.rows_dropped(),
                    output.report.rows_read
                );
            }
        }

        Commands::CheckTaxId { ids } => {
            for id in ids {
                let status = if is_valid_tax_id(&id) {
                    "valid"
                } else {
                    "invalid"
                };
                println!("{} ({}): {}", id, normalize_tax_id(&id), status);
            }
        }

        Commands::Info {
            file,
            sample,
            encoding,
        } => {
            println!("Inspecting archive: {}", file.display());

            let summary = ArchiveInspector::inspect(&file)?;
            println!("\n{}", summary.display_summary());

            if sample > 0 && summary.entry(ROLLUP_ENTRY).is_some() {
                let encoding = TextEncoding::from_label(&encoding)?;
                let rows = ArchiveInspector::read_rollup_sample(&file, sample, encoding)?;

                println!("Top {} operators by total expense:", rows.len());
                for (i, row) in rows.iter().enumerate() {
                    let stddev = row
                        .stddev_quarterly_expense
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{}. {} ({}): total={}, mean={}, stddev={}",
                        i + 1,
                        row.legal_name,
                        row.region,
                        row.total_expense,
                        row.mean_quarterly_expense,
                        stddev
                    );
                }
            }
        }
    }

    Ok(())
}

/// Settings file and environment first, then CLI flags on top.
fn resolve_settings(input: &InputArgs) -> Result<PipelineSettings> {
    let mut settings = PipelineSettings::load(input.config.as_deref())?;

    if let Some(registry) = &input.registry {
        settings.registry_file = Some(registry.clone());
    }
    if !input.transactions.is_empty() {
        settings.transaction_files = input.transactions.clone();
    }
    if let Some(block_size) = input.block_size {
        settings.block_size = block_size;
    }
    if let Some(encoding) = &input.input_encoding {
        settings.input_encoding = encoding.clone();
    }
    if let Some(prefix) = &input.expense_code_prefix {
        settings.expense_code_prefix = prefix.clone();
    }

    Ok(settings)
}

/// The pipeline is synchronous and single-threaded; keep it off the async workers.
async fn run_pipeline(
    settings: PipelineSettings,
    destination: Option<PathBuf>,
    quiet: bool,
) -> Result<PipelineOutput> {
    let pipeline = ExpensePipeline::new(settings)?;

    tokio::task::spawn_blocking(move || {
        let progress = ProgressReporter::new_spinner("Consolidating expenses...", quiet);

        let output = match &destination {
            Some(path) => pipeline.run_to_archive(path, Some(&progress))?,
            None => pipeline.run(Some(&progress))?,
        };

        progress.finish_with_message(&format!(
            "Consolidated {} rows into {} records",
            output.report.rows_kept, output.report.consolidated_records
        ));
        Ok(output)
    })
    .await?
}
