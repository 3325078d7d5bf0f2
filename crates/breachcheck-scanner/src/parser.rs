use crate::error::{IngestionError, Result};
use breachcheck_core::CandidateEmail;
use serde::{Deserialize, Serialize};
use std::path::Path;

const UTF8_BOM: &str = "\u{feff}";

/// One data row of the input. There is no header row: every row counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    /// 1-based line the row started on
    pub line: u64,
    pub fields: Vec<String>,
}

impl InputRecord {
    /// Trimmed first field, `None` when it is blank.
    #[must_use]
    pub fn candidate(&self) -> Option<CandidateEmail> {
        self.fields
            .first()
            .and_then(|field| CandidateEmail::from_field(field))
    }
}

/// Decodes raw delimited text into ordered rows.
#[derive(Debug, Clone)]
pub struct RecordParser {
    delimiter: u8,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl RecordParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read a CSV file from disk, rejecting anything not named `*.csv`.
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let path = path.as_ref();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if !is_csv {
            return Err(IngestionError::UnsupportedFile {
                path: path.display().to_string(),
            });
        }

        Ok(std::fs::read(path)?)
    }

    /// Parse raw bytes into rows, preserving order.
    ///
    /// Rows may have differing widths; rows with no fields are skipped.
    pub fn parse(&self, input: &[u8]) -> Result<Vec<InputRecord>> {
        let text = std::str::from_utf8(input)?;
        let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(text.as_bytes());

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            if record.is_empty() {
                continue;
            }

            records.push(InputRecord {
                line: record.position().map_or(0, csv::Position::line),
                fields: record.iter().map(str::to_string).collect(),
            });
        }

        if records.is_empty() {
            return Err(IngestionError::Empty);
        }

        tracing::debug!("Parsed {} rows from input", records.len());
        Ok(records)
    }
}
