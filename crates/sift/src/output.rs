//! Writing cleaned records to disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiftError};
use crate::record::{COLUMNS, LayoffRecord};

/// Output format for cleaned data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tsv,
    Csv,
    Json,
}

impl OutputFormat {
    /// File extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Tsv => "tsv",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" => Ok(OutputFormat::Tsv),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use tsv, csv, or json.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Write records to a file, creating parent directories as needed.
pub fn write_records(
    path: impl AsRef<Path>,
    records: &[LayoffRecord],
    format: OutputFormat,
) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| SiftError::io(parent, e))?;
        }
    }

    let file = File::create(path).map_err(|e| SiftError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write_records_to(&mut writer, records, format)?;
    writer.flush().map_err(|e| SiftError::io(path, e))?;

    tracing::info!(path = %path.display(), rows = records.len(), %format, "wrote records");
    Ok(())
}

/// Write records to any writer.
pub fn write_records_to<W: Write>(
    writer: W,
    records: &[LayoffRecord],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(writer, records)?;
            Ok(())
        }
        OutputFormat::Csv => write_delimited(writer, records, b','),
        OutputFormat::Tsv => write_delimited(writer, records, b'\t'),
    }
}

fn write_delimited<W: Write>(writer: W, records: &[LayoffRecord], delimiter: u8) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    csv_writer.write_record(COLUMNS)?;
    for record in records {
        csv_writer.write_record(record.to_cells())?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
