use crate::error::{ProcessingError, Result};
use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;

const BOM: char = '\u{feff}';

/// Text encoding of an input extract or an archive entry.
///
/// `latin1`/`iso-8859-1` labels resolve to windows-1252, which is how the
/// WHATWG encoding standard treats them.
#[derive(Debug, Clone, Copy)]
pub struct TextEncoding(&'static Encoding);

impl TextEncoding {
    pub fn from_label(label: &str) -> Result<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .map(TextEncoding)
            .ok_or_else(|| ProcessingError::UnsupportedEncoding(label.to_string()))
    }

    pub fn utf8() -> Self {
        TextEncoding(UTF_8)
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Decode one field. Malformed sequences become U+FFFD rather than failing the row.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        self.0.decode_without_bom_handling(bytes).0
    }

    /// Decode a header cell, dropping a leading byte-order mark and surrounding whitespace.
    pub fn decode_header(&self, bytes: &[u8]) -> String {
        self.decode(bytes).trim_start_matches(BOM).trim().to_string()
    }

    /// Encode UTF-8 text for output. Returns the bytes and whether any character was unmappable.
    pub fn encode<'a>(&self, text: &'a str) -> (Cow<'a, [u8]>, bool) {
        let (bytes, _, had_unmappable) = self.0.encode(text);
        (bytes, had_unmappable)
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::utf8()
    }
}
