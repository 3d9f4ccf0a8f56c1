//! Delimited-text ingestion into a `RawTable`.
//!
//! The `csv` reader enforces the record layout and reports malformed rows by
//! line. Each column then becomes a polars column: `Float64` when it has at
//! least one present cell and every present cell parses as a finite number,
//! `String` otherwise.

use crate::domain::RawTable;
use polars::prelude::Column;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};

/// How to read a delimited file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// Field delimiter. Must be a single ASCII character.
    pub delimiter: char,
    /// Decimal separator for numeric cells, `.` or `,`.
    pub decimal: char,
    /// Cell contents (after trimming) treated as missing, besides the empty string.
    pub null_tokens: Vec<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: ';',
            decimal: '.',
            null_tokens: vec!["NA".into(), "NaN".into(), "null".into()],
        }
    }
}

/// Data ingestor for delimited text files
pub struct DataIngestor {
    options: IngestOptions,
}

impl DataIngestor {
    pub fn new(options: IngestOptions) -> Self {
        Self { options }
    }

    /// Ingest a file from disk.
    pub fn ingest_path(&self, path: &Path) -> Result<RawTable, IngestError> {
        let file = std::fs::File::open(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = self.ingest_reader(file)?;
        tracing::debug!(
            path = %path.display(),
            rows = table.height(),
            columns = table.width(),
            "ingested table"
        );
        Ok(table)
    }

    /// Ingest from any reader. The first record is the header.
    pub fn ingest_reader<R: Read>(&self, reader: R) -> Result<RawTable, IngestError> {
        let delimiter = self.delimiter_byte()?;
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(IngestError::from_csv)?
            .iter()
            .map(|h| h.to_string())
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(IngestError::Format {
                line: Some(1),
                reason: "missing header row".into(),
            });
        }
        if let Some(blank) = headers.iter().position(|h| h.is_empty()) {
            return Err(IngestError::Format {
                line: Some(1),
                reason: format!("header field {} is empty", blank + 1),
            });
        }
        for (i, h) in headers.iter().enumerate() {
            if headers[..i].contains(h) {
                return Err(IngestError::Format {
                    line: Some(1),
                    reason: format!("duplicate header '{h}'"),
                });
            }
        }

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        let mut lines: Vec<Option<u64>> = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(IngestError::from_csv)?;
            lines.push(record.position().map(|p| p.line()));
            for (j, field) in record.iter().enumerate() {
                cells[j].push(self.cell(field));
            }
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, values)| self.infer_column(name, values, &lines))
            .collect::<Result<Vec<_>, _>>()?;

        RawTable::new(columns).map_err(|e| IngestError::Format {
            line: None,
            reason: e.to_string(),
        })
    }

    fn delimiter_byte(&self) -> Result<u8, IngestError> {
        let d = self.options.delimiter;
        if d.is_ascii() {
            Ok(d as u8)
        } else {
            Err(IngestError::Format {
                line: None,
                reason: format!("delimiter '{d}' is not an ASCII character"),
            })
        }
    }

    fn cell(&self, field: &str) -> Option<String> {
        if field.is_empty() || self.options.null_tokens.iter().any(|t| t == field) {
            None
        } else {
            Some(field.to_string())
        }
    }

    fn parse_number(&self, cell: &str) -> Option<f64> {
        if self.options.decimal == ',' {
            cell.replace(',', ".").parse().ok()
        } else {
            cell.parse().ok()
        }
    }

    fn infer_column(
        &self,
        name: String,
        values: Vec<Option<String>>,
        lines: &[Option<u64>],
    ) -> Result<Column, IngestError> {
        if values.iter().all(Option::is_none) {
            return Ok(Column::new(name.into(), values));
        }

        let parsed: Option<Vec<Option<f64>>> = values
            .iter()
            .map(|v| match v {
                None => Some(None),
                Some(s) => self
                    .parse_number(s)
                    .map(|v| if v.is_nan() { None } else { Some(v) }),
            })
            .collect();

        let Some(numbers) = parsed else {
            return Ok(Column::new(name.into(), values));
        };

        if let Some(row) = numbers.iter().position(|v| v.is_some_and(f64::is_infinite)) {
            return Err(IngestError::Format {
                line: lines.get(row).copied().flatten(),
                reason: format!(
                    "non-finite number '{}' in column {name}",
                    values[row].as_deref().unwrap_or_default()
                ),
            });
        }

        Ok(Column::new(name.into(), numbers))
    }
}

impl Default for DataIngestor {
    fn default() -> Self {
        Self::new(IngestOptions::default())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table{}: {reason}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Format { line: Option<u64>, reason: String },
}

impl IngestError {
    fn from_csv(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line());
        let reason = match err.kind() {
            csv::ErrorKind::UnequalLengths {
                expected_len, len, ..
            } => format!("expected {expected_len} fields, found {len}"),
            _ => err.to_string(),
        };
        IngestError::Format { line, reason }
    }
}
