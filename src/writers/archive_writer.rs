use crate::error::{ProcessingError, Result};
use crate::models::{ConsolidatedRecord, EnrichedRecord, RollupRecord};
use crate::utils::constants::{CONSOLIDATED_ENTRY, ENRICHED_ENTRY, OUTPUT_DELIMITER, ROLLUP_ENTRY};
use crate::utils::TextEncoding;
use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// A record type written as one delimited table, with a fixed header row.
pub trait CsvTable: Serialize {
    const HEADERS: &'static [&'static str];
}

impl CsvTable for ConsolidatedRecord {
    const HEADERS: &'static [&'static str] =
        &["CNPJ", "RazaoSocial", "Ano", "Trimestre", "ValorDespesas"];
}

impl CsvTable for EnrichedRecord {
    const HEADERS: &'static [&'static str] = &[
        "CNPJ",
        "RazaoSocial",
        "Ano",
        "Trimestre",
        "ValorDespesas",
        "REGISTRO_OPERADORA",
        "Modalidade",
        "UF",
    ];
}

impl CsvTable for RollupRecord {
    const HEADERS: &'static [&'static str] = &[
        "RazaoSocial",
        "UF",
        "Total_Despesas",
        "Media_Trimestral",
        "Desvio_Padrao",
    ];
}

pub fn parse_compression(name: &str) -> Result<CompressionMethod> {
    match name.to_lowercase().as_str() {
        "deflate" | "deflated" => Ok(CompressionMethod::Deflated),
        "stored" | "none" => Ok(CompressionMethod::Stored),
        _ => Err(ProcessingError::Config(format!(
            "Unsupported compression: {}",
            name
        ))),
    }
}

/// Writes the three output tables into a single zip archive.
///
/// The archive is assembled in a temporary file next to the destination and
/// renamed into place once finalized, so a failed write leaves no archive behind.
pub struct ArchiveWriter {
    compression: CompressionMethod,
    encoding: TextEncoding,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
            encoding: TextEncoding::utf8(),
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = parse_compression(compression)?;
        Ok(self)
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Write consolidated, enriched and rollup tables to `destination`.
    pub fn write_archive(
        &self,
        consolidated: &[ConsolidatedRecord],
        enriched: &[EnrichedRecord],
        rollup: &[RollupRecord],
        destination: &Path,
    ) -> Result<()> {
        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let temp_file = NamedTempFile::new_in(&parent)?;
        {
            let mut zip = ZipWriter::new(temp_file.as_file());
            self.write_entry(&mut zip, CONSOLIDATED_ENTRY, consolidated)?;
            self.write_entry(&mut zip, ENRICHED_ENTRY, enriched)?;
            self.write_entry(&mut zip, ROLLUP_ENTRY, rollup)?;
            zip.finish()?;
        }
        temp_file.as_file().sync_all()?;
        temp_file.persist(destination)?;

        info!(
            archive = %destination.display(),
            consolidated = consolidated.len(),
            enriched = enriched.len(),
            rollup = rollup.len(),
            "Archive written"
        );

        Ok(())
    }

    fn write_entry<W, T>(&self, zip: &mut ZipWriter<W>, name: &str, records: &[T]) -> Result<()>
    where
        W: Write + std::io::Seek,
        T: CsvTable,
    {
        let payload = self.serialize_table(records)?;
        let (bytes, unmappable) = self.encoding.encode(&payload);
        if unmappable {
            warn!(
                entry = name,
                encoding = self.encoding.name(),
                "Characters not representable in output encoding were replaced"
            );
        }

        let options = FileOptions::default().compression_method(self.compression);
        zip.start_file(name, options)?;
        zip.write_all(&bytes)?;
        Ok(())
    }

    /// Serialize records as `;`-delimited text with every field quoted.
    ///
    /// The header row is written even when there are no records.
    pub fn serialize_table<T: CsvTable>(&self, records: &[T]) -> Result<String> {
        let mut writer = WriterBuilder::new()
            .delimiter(OUTPUT_DELIMITER)
            .quote_style(QuoteStyle::Always)
            .has_headers(false)
            .from_writer(Vec::new());

        writer.write_record(T::HEADERS)?;
        for record in records {
            writer.serialize(record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ProcessingError::Io(e.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|e| ProcessingError::InvalidFormat(format!("Non UTF-8 table payload: {}", e)))
    }

    /// Sizes and entry names of a written archive.
    pub fn get_file_info(&self, path: &Path) -> Result<ArchiveFileInfo> {
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();
        let mut archive = ZipArchive::new(file)?;

        let mut entries = Vec::with_capacity(archive.len());
        let mut uncompressed_size = 0u64;
        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            uncompressed_size += entry.size();
            entries.push(entry.name().to_string());
        }

        Ok(ArchiveFileInfo {
            path: path.to_path_buf(),
            file_size,
            uncompressed_size,
            entries,
        })
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct ArchiveFileInfo {
    pub path: PathBuf,
    pub file_size: u64,
    pub uncompressed_size: u64,
    pub entries: Vec<String>,
}

impl ArchiveFileInfo {
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Archive: {}\n  Size: {:.2} KB ({:.2} KB uncompressed)\n  Entries:\n",
            self.path.display(),
            self.file_size as f64 / 1024.0,
            self.uncompressed_size as f64 / 1024.0
        );
        for entry in &self.entries {
            summary.push_str(&format!("    {}\n", entry));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Quarter;
    use rust_decimal::Decimal;
    use std::io::Read;
    use tempfile::TempDir;

    fn consolidated() -> Vec<ConsolidatedRecord> {
        vec![ConsolidatedRecord::new(
            "11222333000181".to_string(),
            "OPERADORA A".to_string(),
            2025,
            Quarter::First,
            Decimal::new(15075, 2),
        )]
    }

    #[test]
    fn test_serialize_table_quotes_every_field() -> Result<()> {
        let payload = ArchiveWriter::new().serialize_table(&consolidated())?;
        assert_eq!(
            payload,
            "\"CNPJ\";\"RazaoSocial\";\"Ano\";\"Trimestre\";\"ValorDespesas\"\n\
             \"11222333000181\";\"OPERADORA A\";\"2025\";\"1T\";\"150.75\"\n"
        );
        Ok(())
    }

    #[test]
    fn test_empty_table_still_has_header() -> Result<()> {
        let payload = ArchiveWriter::new().serialize_table::<EnrichedRecord>(&[])?;
        assert_eq!(payload.lines().count(), 1);
        assert!(payload.starts_with("\"CNPJ\";"));
        assert!(payload.trim_end().ends_with("\"UF\""));
        Ok(())
    }

    #[test]
    fn test_undefined_stddev_is_empty_field() -> Result<()> {
        let rollup = vec![RollupRecord {
            legal_name: "OPERADORA A".to_string(),
            region: "SP".to_string(),
            total_expense: Decimal::new(15075, 2),
            mean_quarterly_expense: Decimal::new(15075, 2),
            stddev_quarterly_expense: None,
            observations: 1,
        }];
        let payload = ArchiveWriter::new().serialize_table(&rollup)?;
        let lines: Vec<&str> = payload.lines().collect();
        assert_eq!(
            lines[0],
            "\"RazaoSocial\";\"UF\";\"Total_Despesas\";\"Media_Trimestral\";\"Desvio_Padrao\""
        );
        assert_eq!(lines[1], "\"OPERADORA A\";\"SP\";\"150.75\";\"150.75\";\"\"");
        Ok(())
    }

    #[test]
    fn test_write_archive_has_three_entries() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let destination = temp_dir.path().join("nested").join("despesas.zip");

        let writer = ArchiveWriter::new();
        writer.write_archive(&consolidated(), &[], &[], &destination)?;

        let info = writer.get_file_info(&destination)?;
        assert_eq!(
            info.entries,
            vec![CONSOLIDATED_ENTRY, ENRICHED_ENTRY, ROLLUP_ENTRY]
        );

        let mut archive = ZipArchive::new(File::open(&destination)?)?;
        let mut content = String::new();
        archive
            .by_name(CONSOLIDATED_ENTRY)?
            .read_to_string(&mut content)?;
        assert!(content.contains("\"150.75\""));

        // Only the archive remains in the destination directory
        let files: Vec<_> = fs::read_dir(destination.parent().unwrap())?.collect();
        assert_eq!(files.len(), 1);
        Ok(())
    }

    #[test]
    fn test_latin1_output_encoding() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let destination = temp_dir.path().join("despesas.zip");
        let records = vec![ConsolidatedRecord::new(
            "11222333000181".to_string(),
            "SÃO LUCAS".to_string(),
            2025,
            Quarter::First,
            Decimal::ONE,
        )];

        ArchiveWriter::new()
            .with_encoding(TextEncoding::from_label("latin1")?)
            .write_archive(&records, &[], &[], &destination)?;

        let mut archive = ZipArchive::new(File::open(&destination)?)?;
        let mut bytes = Vec::new();
        archive.by_name(CONSOLIDATED_ENTRY)?.read_to_end(&mut bytes)?;
        assert!(bytes.windows(3).any(|w| w == b"S\xc3O"));
        Ok(())
    }

    #[test]
    fn test_unsupported_compression() {
        assert!(ArchiveWriter::new().with_compression("brotli").is_err());
        assert!(ArchiveWriter::new().with_compression("stored").is_ok());
    }
}
