//! Raw source table and its metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about the source data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the source was read.
    pub read_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been read.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            read_at: Utc::now(),
        }
    }

    /// Format name for a delimiter byte.
    pub fn format_for(delimiter: u8) -> &'static str {
        match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
    }
}

/// A source row whose bytes are not valid UTF-8.
#[derive(Debug, Clone, PartialEq)]
pub struct UndecodableRow {
    /// 1-based source line on which the row starts.
    pub line: u64,
    /// Index of the first field that failed to decode.
    pub field: usize,
    /// Row text with invalid sequences replaced.
    pub text: String,
}

/// Untyped rows as read from the source file.
#[derive(Debug, Clone)]
pub struct DataTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
    /// 1-based source line on which each row starts.
    pub lines: Vec<u64>,
    /// The delimiter used.
    pub delimiter: u8,
    /// Rows skipped because they could not be decoded.
    pub undecodable: Vec<UndecodableRow>,
}

impl DataTable {
    /// Create a new data table.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>, delimiter: u8) -> Self {
        let lines = (0..rows.len() as u64).map(|i| i + 2).collect();
        Self {
            headers,
            rows,
            lines,
            delimiter,
            undecodable: Vec::new(),
        }
    }

    /// Create a data table with explicit source line numbers.
    pub fn with_lines(
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        lines: Vec<u64>,
        delimiter: u8,
    ) -> Self {
        Self {
            headers,
            rows,
            lines,
            delimiter,
            undecodable: Vec::new(),
        }
    }

    /// Source line of a row, falling back to header-relative numbering.
    pub fn line(&self, row: usize) -> u64 {
        self.lines.get(row).copied().unwrap_or(row as u64 + 2)
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Attach rows that could not be decoded.
    pub fn with_undecodable(mut self, undecodable: Vec<UndecodableRow>) -> Self {
        self.undecodable = undecodable;
        self
    }

    /// Get the number of decoded rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }
}
