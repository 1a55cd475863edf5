use crate::error::Result;
use crate::models::RawTransaction;
use crate::readers::ColumnIndex;
use crate::utils::constants::{
    DEFAULT_BLOCK_SIZE, DEFAULT_TRANSACTION_DELIMITER, TRANSACTION_CODE_COLUMN,
    TRANSACTION_DATE_COLUMN, TRANSACTION_ID_COLUMN, TRANSACTION_VALUE_COLUMN,
};
use crate::utils::TextEncoding;
use csv::{ByteRecord, Reader, ReaderBuilder};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

const REQUIRED_COLUMNS: [&str; 4] = [
    TRANSACTION_ID_COLUMN,
    TRANSACTION_CODE_COLUMN,
    TRANSACTION_DATE_COLUMN,
    TRANSACTION_VALUE_COLUMN,
];

pub struct TransactionReader {
    delimiter: u8,
    encoding: TextEncoding,
    block_size: usize,
}

impl TransactionReader {
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_TRANSACTION_DELIMITER as u8,
            encoding: TextEncoding::utf8(),
            block_size: DEFAULT_BLOCK_SIZE,
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

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Open a quarterly extract as a lazy sequence of bounded blocks.
    ///
    /// The header is checked up front, so a missing column fails here rather
    /// than on the first block.
    pub fn blocks(&self, path: &Path) -> Result<TransactionBlocks> {
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

        Ok(TransactionBlocks {
            reader,
            columns,
            encoding: self.encoding,
            block_size: self.block_size,
            next_index: 0,
            finished: false,
            path: path.to_path_buf(),
        })
    }
}

impl Default for TransactionReader {
    fn default() -> Self {
        Self::new()
    }
}

/// At most `block_size` rows read from one extract.
#[derive(Debug, Clone, Default)]
pub struct TransactionBlock {
    pub index: usize,
    pub rows: Vec<RawTransaction>,
    /// Rows that lacked one of the required fields.
    pub malformed: usize,
}

impl TransactionBlock {
    pub fn rows_read(&self) -> usize {
        self.rows.len() + self.malformed
    }
}

/// Iterator over the blocks of one extract. Finite; stops after the first read error.
pub struct TransactionBlocks {
    reader: Reader<File>,
    columns: ColumnIndex,
    encoding: TextEncoding,
    block_size: usize,
    next_index: usize,
    finished: bool,
    path: PathBuf,
}

impl TransactionBlocks {
    fn read_block(&mut self) -> Result<Option<TransactionBlock>> {
        let mut block = TransactionBlock {
            index: self.next_index,
            rows: Vec::with_capacity(self.block_size.min(DEFAULT_BLOCK_SIZE)),
            malformed: 0,
        };
        let mut record = ByteRecord::new();

        while block.rows_read() < self.block_size {
            if !self.reader.read_byte_record(&mut record)? {
                self.finished = true;
                break;
            }

            match self.parse_row(&record) {
                Some(row) => block.rows.push(row),
                None => block.malformed += 1,
            }
        }

        if block.rows_read() == 0 {
            return Ok(None);
        }

        if block.malformed > 0 {
            debug!(
                file = %self.path.display(),
                block = block.index,
                malformed = block.malformed,
                "Skipped rows missing required fields"
            );
        }

        self.next_index += 1;
        Ok(Some(block))
    }

    fn parse_row(&self, record: &ByteRecord) -> Option<RawTransaction> {
        let field = |n: usize| self.columns.field(record, n, self.encoding);

        Some(RawTransaction {
            registration_id: field(0)?,
            accounting_code: field(1)?,
            posting_date: field(2)?,
            balance_value: field(3)?,
        })
    }
}

impl Iterator for TransactionBlocks {
    type Item = Result<TransactionBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_block() {
            Ok(Some(block)) => Some(Ok(block)),
            Ok(None) => None,
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_extract(rows: usize) -> Result<NamedTempFile> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(
            temp_file,
            "DATA;REG_ANS;CD_CONTA_CONTABIL;DESCRICAO;VL_SALDO_INICIAL;VL_SALDO_FINAL"
        )?;
        for i in 0..rows {
            writeln!(
                temp_file,
                "2025-01-01;{};41111;EVENTOS CONHECIDOS;0,00;{},50",
                i + 1,
                i
            )?;
        }
        Ok(temp_file)
    }

    #[test]
    fn test_blocks_are_bounded() -> Result<()> {
        let temp_file = write_extract(7)?;
        let reader = TransactionReader::new().with_block_size(3);

        let blocks: Vec<TransactionBlock> = reader
            .blocks(temp_file.path())?
            .collect::<Result<Vec<_>>>()?;

        let sizes: Vec<usize> = blocks.iter().map(|b| b.rows.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(blocks[2].index, 2);
        assert_eq!(blocks[0].rows[1].registration_id, "2");
        assert_eq!(blocks[0].rows[1].balance_value, "1,50");
        assert_eq!(blocks[0].rows[1].accounting_code, "41111");
        Ok(())
    }

    #[test]
    fn test_exact_multiple_has_no_empty_tail() -> Result<()> {
        let temp_file = write_extract(4)?;
        let blocks = TransactionReader::new()
            .with_block_size(2)
            .blocks(temp_file.path())?
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(blocks.len(), 2);
        Ok(())
    }

    #[test]
    fn test_empty_extract_yields_no_blocks() -> Result<()> {
        let temp_file = write_extract(0)?;
        let mut blocks = TransactionReader::new().blocks(temp_file.path())?;
        assert!(blocks.next().is_none());
        Ok(())
    }

    #[test]
    fn test_short_rows_are_counted_as_malformed() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "DATA;REG_ANS;CD_CONTA_CONTABIL;VL_SALDO_FINAL")?;
        writeln!(temp_file, "2025-01-01;1;41111;10,00")?;
        writeln!(temp_file, "2025-01-01;1")?;

        let blocks = TransactionReader::new()
            .blocks(temp_file.path())?
            .collect::<Result<Vec<_>>>()?;

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].rows.len(), 1);
        assert_eq!(blocks[0].malformed, 1);
        assert_eq!(blocks[0].rows_read(), 2);
        Ok(())
    }

    #[test]
    fn test_missing_file_fails_to_open() {
        let result = TransactionReader::new().blocks(Path::new("/nonexistent/1T2025.csv"));
        assert!(result.is_err());
    }
}
