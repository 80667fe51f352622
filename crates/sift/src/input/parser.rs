//! CSV/TSV parser with delimiter detection.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use super::ingest::IngestConfig;
use super::source::{DataTable, SourceMetadata, UndecodableRow};
use crate::error::{Result, SiftError};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Reads delimited files into a [`DataTable`].
pub struct Parser {
    delimiter: Option<u8>,
    quote: u8,
    max_rows: Option<usize>,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self::with_config(&IngestConfig::default())
    }

    /// Create a parser from ingestion settings.
    pub fn with_config(config: &IngestConfig) -> Self {
        Self {
            delimiter: config.delimiter_byte(),
            quote: config.quote_byte(),
            max_rows: config.max_rows,
        }
    }

    /// Parse a file and return the data table and metadata.
    ///
    /// The file is only read. An unreadable or missing file is an
    /// [`SiftError::Io`].
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| SiftError::io(path, e))?;
        let size_bytes = file.metadata().map_err(|e| SiftError::io(path, e))?.len();

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| SiftError::io(path, e))?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents, self.quote)?,
        };

        let table = self.parse_bytes(&contents, delimiter)?;

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            SourceMetadata::format_for(delimiter).to_string(),
            table.row_count() + table.undecodable.len(),
            table.column_count(),
        );

        Ok((table, metadata))
    }

    /// Parse bytes directly.
    ///
    /// Rows keep their raw width; short or long rows are left for typed
    /// ingestion to reject.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        if delimiter == self.quote || delimiter == b'\n' || delimiter == b'\r' {
            return Err(SiftError::InvalidDelimiter(format!(
                "'{}' cannot be used as a delimiter",
                (delimiter as char).escape_default()
            )));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(SiftError::EmptyData("No columns found".to_string()));
        }

        let mut rows = Vec::new();
        let mut lines = Vec::new();
        let mut undecodable = Vec::new();

        for (row_idx, result) in reader.byte_records().enumerate() {
            if let Some(max) = self.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            // A fully blank line carries no record.
            if record.len() == 1 && record[0].trim_ascii().is_empty() {
                continue;
            }
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(row_idx as u64 + 2);

            match decode_fields(&record) {
                Ok(fields) => {
                    rows.push(fields);
                    lines.push(line);
                }
                Err(field) => {
                    let text = record
                        .iter()
                        .map(String::from_utf8_lossy)
                        .collect::<Vec<_>>()
                        .join(&(delimiter as char).to_string());
                    undecodable.push(UndecodableRow { line, field, text });
                }
            }
        }

        if rows.is_empty() && undecodable.is_empty() {
            return Err(SiftError::EmptyData("No data rows found".to_string()));
        }

        Ok(DataTable::with_lines(headers, rows, lines, delimiter).with_undecodable(undecodable))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode every field, or return the index of the first invalid one.
fn decode_fields(record: &csv::ByteRecord) -> std::result::Result<Vec<String>, usize> {
    record
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            std::str::from_utf8(field)
                .map(str::to_string)
                .map_err(|_| idx)
        })
        .collect()
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8], quote: u8) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .split(b'\n')
        .filter_map(|l| l.ok())
        .map(|l| String::from_utf8_lossy(&l).into_owned())
        .take(10)
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(SiftError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim, quote))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; tab breaks ties.
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8, quote: u8) -> usize {
    let delim_char = delimiter as char;
    let quote_char = quote as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            c if c == quote_char => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
