use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ans-expenses")]
#[command(about = "Consolidates quarterly operator expense filings into a compressed CSV archive")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Only log warnings and hide progress")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Consolidate expense filings and write the output archive
    Consolidate {
        #[command(flatten)]
        input: InputArgs,

        #[arg(
            short,
            long,
            help = "Output archive path [default: output/despesas-{YYMMDD}.zip]"
        )]
        output_file: Option<PathBuf>,

        #[arg(long, help = "Output text encoding (utf-8, latin1)")]
        output_encoding: Option<String>,

        #[arg(long, help = "Archive entry compression (deflate, stored) [default: deflate]")]
        compression: Option<String>,

        #[arg(long, default_value = "false")]
        validate_only: bool,

        #[arg(long, help = "Write the run report as JSON to this path")]
        report: Option<PathBuf>,
    },

    /// Run the consolidation without writing an archive and print the report
    Validate {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Check tax identifiers (CNPJ) against their check digits
    CheckTaxId {
        #[arg(required = true, help = "Tax identifiers, formatted or digits only")]
        ids: Vec<String>,
    },

    /// Display information about an output archive
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10", help = "Rollup rows to show")]
        sample: usize,

        #[arg(long, default_value = "utf-8", help = "Text encoding of the archive entries")]
        encoding: String,
    },
}

/// Input selection shared by `consolidate` and `validate`. Flags override the settings file.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    #[arg(short, long, help = "Settings file (toml, json, yaml)")]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Operator registry file (Relatorio_cadop)")]
    pub registry: Option<PathBuf>,

    #[arg(
        short,
        long = "transactions",
        num_args = 1..,
        help = "Quarterly transaction files, processed in the given order"
    )]
    pub transactions: Vec<PathBuf>,

    #[arg(short, long, help = "Rows per block [default: 100000]")]
    pub block_size: Option<usize>,

    #[arg(long, help = "Input text encoding (utf-8, latin1)")]
    pub input_encoding: Option<String>,

    #[arg(long, help = "Accounting code prefix of expense entries [default: 411]")]
    pub expense_code_prefix: Option<String>,
}
