use crate::error::Result;
use crate::models::RollupRecord;
use crate::utils::constants::{CONSOLIDATED_ENTRY, ENRICHED_ENTRY, OUTPUT_DELIMITER, ROLLUP_ENTRY};
use crate::utils::TextEncoding;
use csv::{ByteRecord, ReaderBuilder};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

const EXPECTED_ENTRIES: [&str; 3] = [CONSOLIDATED_ENTRY, ENRICHED_ENTRY, ROLLUP_ENTRY];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySummary {
    pub name: String,
    pub size: u64,
    pub compressed_size: u64,
    /// Data rows, header excluded.
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub entries: Vec<EntrySummary>,
    pub missing_entries: Vec<String>,
}

impl ArchiveSummary {
    pub fn is_complete(&self) -> bool {
        self.missing_entries.is_empty()
    }

    pub fn entry(&self, name: &str) -> Option<&EntrySummary> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn display_summary(&self) -> String {
        let mut summary = format!("Archive: {}\n", self.path.display());

        for entry in &self.entries {
            summary.push_str(&format!(
                "  {:<42} {:>8} rows  {:>10} bytes ({} compressed)\n",
                entry.name, entry.rows, entry.size, entry.compressed_size
            ));
        }

        if !self.missing_entries.is_empty() {
            summary.push_str(&format!(
                "  Missing entries: {}\n",
                self.missing_entries.join(", ")
            ));
        }

        summary
    }
}

/// Reads back an archive produced by the pipeline.
pub struct ArchiveInspector;

impl ArchiveInspector {
    pub fn inspect(path: &Path) -> Result<ArchiveSummary> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }

            let name = entry.name().to_string();
            let size = entry.size();
            let compressed_size = entry.compressed_size();
            let rows = Self::count_rows(entry)?;

            entries.push(EntrySummary {
                name,
                size,
                compressed_size,
                rows,
            });
        }

        let missing_entries = EXPECTED_ENTRIES
            .iter()
            .filter(|expected| !entries.iter().any(|e| e.name == **expected))
            .map(|name| name.to_string())
            .collect();

        Ok(ArchiveSummary {
            path: path.to_path_buf(),
            entries,
            missing_entries,
        })
    }

    /// Read up to `limit` rows of the rollup table, largest total first.
    pub fn read_rollup_sample(
        path: &Path,
        limit: usize,
        encoding: TextEncoding,
    ) -> Result<Vec<RollupRecord>> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)?;
        let mut bytes = Vec::new();
        archive.by_name(ROLLUP_ENTRY)?.read_to_end(&mut bytes)?;

        let text = encoding.decode(&bytes);
        let mut reader = ReaderBuilder::new()
            .delimiter(OUTPUT_DELIMITER)
            .from_reader(text.as_bytes());

        reader
            .deserialize()
            .take(limit)
            .map(|row| row.map_err(Into::into))
            .collect()
    }

    fn count_rows<R: Read>(entry: R) -> Result<usize> {
        let mut reader = ReaderBuilder::new()
            .delimiter(OUTPUT_DELIMITER)
            .flexible(true)
            .from_reader(entry);
        let mut record = ByteRecord::new();
        let mut rows = 0;

        while reader.read_byte_record(&mut record)? {
            rows += 1;
        }

        Ok(rows)
    }
}
