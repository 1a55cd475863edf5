use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    DEFAULT_BLOCK_SIZE, DEFAULT_COMPRESSION, DEFAULT_ENCODING, DEFAULT_REGISTRY_DELIMITER,
    DEFAULT_TRANSACTION_DELIMITER, EXPENSE_CODE_PREFIX,
};
use crate::utils::TextEncoding;
use crate::writers::archive_writer::parse_compression;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Environment variables with this prefix override settings-file values.
pub const ENV_PREFIX: &str = "ANS_EXPENSES";

/// Settings for one pipeline run.
///
/// Resolved from built-in defaults, an optional settings file and
/// `ANS_EXPENSES_*` environment variables, in that order; CLI flags are
/// applied on top by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineSettings {
    pub registry_file: Option<PathBuf>,

    pub transaction_files: Vec<PathBuf>,

    pub output_archive: Option<PathBuf>,

    #[validate(range(min = 1))]
    pub block_size: usize,

    pub registry_delimiter: char,

    pub transaction_delimiter: char,

    pub input_encoding: String,

    pub output_encoding: String,

    /// Zip entry compression: `deflate` or `stored`.
    pub compression: String,

    #[validate(length(min = 1))]
    pub expense_code_prefix: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            registry_file: None,
            transaction_files: Vec::new(),
            output_archive: None,
            block_size: DEFAULT_BLOCK_SIZE,
            registry_delimiter: DEFAULT_REGISTRY_DELIMITER,
            transaction_delimiter: DEFAULT_TRANSACTION_DELIMITER,
            input_encoding: DEFAULT_ENCODING.to_string(),
            output_encoding: DEFAULT_ENCODING.to_string(),
            compression: DEFAULT_COMPRESSION.to_string(),
            expense_code_prefix: EXPENSE_CODE_PREFIX.to_string(),
        }
    }
}

impl PipelineSettings {
    /// Load settings from an optional file plus the environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: PipelineSettings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// Check field constraints and that the run has inputs to work on.
    pub fn validate_for_run(&self) -> Result<()> {
        self.validate()?;
        self.registry_delimiter()?;
        self.transaction_delimiter()?;

        if self.registry_file.is_none() {
            return Err(ProcessingError::Config(
                "No registry file configured".to_string(),
            ));
        }

        if self.transaction_files.is_empty() {
            return Err(ProcessingError::Config(
                "No transaction files configured".to_string(),
            ));
        }

        self.input_encoding()?;
        self.output_encoding()?;
        parse_compression(&self.compression)?;

        Ok(())
    }

    pub fn input_encoding(&self) -> Result<TextEncoding> {
        TextEncoding::from_label(&self.input_encoding)
    }

    pub fn output_encoding(&self) -> Result<TextEncoding> {
        TextEncoding::from_label(&self.output_encoding)
    }

    pub fn registry_delimiter(&self) -> Result<u8> {
        delimiter_byte(self.registry_delimiter)
    }

    pub fn transaction_delimiter(&self) -> Result<u8> {
        delimiter_byte(self.transaction_delimiter)
    }

    pub fn registry_file(&self) -> Result<&Path> {
        self.registry_file
            .as_deref()
            .ok_or_else(|| ProcessingError::MissingData("registry_file".to_string()))
    }
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if delimiter.is_ascii() && !delimiter.is_ascii_alphanumeric() && delimiter != '"' {
        Ok(delimiter as u8)
    } else {
        Err(ProcessingError::Config(format!(
            "Invalid delimiter: '{}'",
            delimiter
        )))
    }
}
