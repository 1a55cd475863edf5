use crate::error::{ProcessingError, Result};
use crate::utils::TextEncoding;
use csv::ByteRecord;
use std::path::Path;

/// Positions of the required columns within a header row, in request order.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    positions: Vec<usize>,
}

impl ColumnIndex {
    /// Locate every required column; the first one absent is a fatal error.
    pub fn locate(
        headers: &ByteRecord,
        required: &[&str],
        encoding: TextEncoding,
        path: &Path,
    ) -> Result<Self> {
        let names: Vec<String> = headers
            .iter()
            .map(|h| encoding.decode_header(h))
            .collect();

        let positions = required
            .iter()
            .map(|column| {
                names
                    .iter()
                    .position(|name| name == column)
                    .ok_or_else(|| ProcessingError::MissingColumn {
                        file: path.to_path_buf(),
                        column: column.to_string(),
                    })
            })
            .collect::<Result<Vec<usize>>>()?;

        Ok(Self { positions })
    }

    /// Decoded, trimmed value of the n-th required column, `None` when the row is short.
    pub fn field(&self, record: &ByteRecord, n: usize, encoding: TextEncoding) -> Option<String> {
        let position = *self.positions.get(n)?;
        record
            .get(position)
            .map(|bytes| encoding.decode(bytes).trim().to_string())
    }
}
