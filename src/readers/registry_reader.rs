use crate::error::Result;
use crate::models::{OperatorEntry, OperatorRegistry};
use crate::readers::ColumnIndex;
use crate::utils::constants::{
    DEFAULT_REGISTRY_DELIMITER, REGISTRY_CATEGORY_COLUMN, REGISTRY_ID_COLUMN, REGISTRY_NAME_COLUMN,
    REGISTRY_REGION_COLUMN, REGISTRY_TAX_ID_COLUMN,
};
use crate::utils::TextEncoding;
use csv::{ByteRecord, ReaderBuilder};
use std::path::Path;
use tracing::{debug, info, warn};

const REQUIRED_COLUMNS: [&str; 5] = [
    REGISTRY_ID_COLUMN,
    REGISTRY_TAX_ID_COLUMN,
    REGISTRY_NAME_COLUMN,
    REGISTRY_CATEGORY_COLUMN,
    REGISTRY_REGION_COLUMN,
];

pub struct RegistryReader {
    delimiter: u8,
    encoding: TextEncoding,
}

impl RegistryReader {
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_REGISTRY_DELIMITER as u8,
            encoding: TextEncoding::utf8(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Read registry entries in source order, duplicates included.
    pub fn read_entries(&self, path: &Path) -> Result<Vec<OperatorEntry>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_path(path)?;

        let columns = ColumnIndex::locate(
            reader.byte_headers()?,
            &REQUIRED_COLUMNS,
            self.encoding,
            path,
        )?;

        let mut entries = Vec::new();
        let mut skipped = 0usize;
        let mut record = ByteRecord::new();

        while reader.read_byte_record(&mut record)? {
            match self.parse_entry(&columns, &record) {
                Some(entry) => entries.push(entry),
                None => {
                    skipped += 1;
                    debug!(
                        line = record.position().map(|p| p.line()),
                        "Skipping registry row without a numeric registration id"
                    );
                }
            }
        }

        if skipped > 0 {
            warn!(skipped, file = %path.display(), "Registry rows skipped");
        }

        Ok(entries)
    }

    /// Read the registry and index it by registration id (first occurrence wins).
    pub fn read_registry(&self, path: &Path) -> Result<OperatorRegistry> {
        let entries = self.read_entries(path)?;
        let registry = OperatorRegistry::from_entries(entries);

        info!(
            entries = registry.len(),
            duplicates = registry.duplicates_skipped(),
            file = %path.display(),
            "Loaded operator registry"
        );

        Ok(registry)
    }

    fn parse_entry(&self, columns: &ColumnIndex, record: &ByteRecord) -> Option<OperatorEntry> {
        let field = |n: usize| columns.field(record, n, self.encoding);

        let registration_id = field(0)?.parse::<u32>().ok()?;

        Some(OperatorEntry::new(
            registration_id,
            field(1).unwrap_or_default(),
            field(2).unwrap_or_default(),
            field(3).unwrap_or_default(),
            field(4).unwrap_or_default(),
        ))
    }
}

impl Default for RegistryReader {
    fn default() -> Self {
        Self::new()
    }
}
