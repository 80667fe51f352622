//! Typed ingestion of raw rows into [`LayoffRecord`]s.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::parser::Parser;
use super::source::{DataTable, SourceMetadata};
use crate::error::{Result, SiftError};
use crate::record::{COLUMNS, LayoffRecord, canonical_column};

/// Ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<char>,
    /// Quote character.
    pub quote: char,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Cell texts read as absent values, compared case-insensitively.
    pub null_tokens: Vec<String>,
    /// Accepted `event_date` formats, tried in order.
    pub date_formats: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: '"',
            max_rows: None,
            null_tokens: vec!["NULL".to_string()],
            date_formats: vec!["%m/%d/%Y".to_string(), "%Y-%m-%d".to_string()],
        }
    }
}

impl IngestConfig {
    /// Check that delimiter and quote are single ASCII bytes.
    pub fn validate(&self) -> Result<()> {
        if let Some(d) = self.delimiter {
            if !d.is_ascii() {
                return Err(SiftError::InvalidDelimiter(format!(
                    "'{}' is not an ASCII character",
                    d
                )));
            }
        }
        if !self.quote.is_ascii() {
            return Err(SiftError::Config(format!(
                "Quote character '{}' is not ASCII",
                self.quote
            )));
        }
        if self.date_formats.is_empty() {
            return Err(SiftError::Config(
                "At least one date format is required".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn delimiter_byte(&self) -> Option<u8> {
        self.delimiter.filter(char::is_ascii).map(|c| c as u8)
    }

    pub(crate) fn quote_byte(&self) -> u8 {
        if self.quote.is_ascii() {
            self.quote as u8
        } else {
            b'"'
        }
    }

    fn is_null_token(&self, value: &str) -> bool {
        let trimmed = value.trim();
        self.null_tokens
            .iter()
            .any(|token| token.eq_ignore_ascii_case(trimmed))
    }
}

/// A source row that could not be typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRejection {
    /// 1-based source line.
    pub line: u64,
    /// Column that failed, if the failure is column-specific.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Offending cell text.
    pub value: String,
    /// Why the row was rejected.
    pub reason: String,
}

/// Outcome counts of ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    /// Data rows seen in the source.
    pub rows_read: usize,
    /// Rows that became records.
    pub rows_accepted: usize,
    /// Rows rejected as malformed.
    pub rejections: Vec<RecordRejection>,
}

/// The disposable typed copy of the source dataset.
#[derive(Debug, Clone)]
pub struct WorkingCopy {
    /// Source file metadata, when read from a file.
    pub source: Option<SourceMetadata>,
    /// Typed records, in source order.
    pub records: Vec<LayoffRecord>,
    /// Ingestion counts and diagnostics.
    pub report: IngestReport,
}

impl WorkingCopy {
    /// Wrap records that are already typed.
    pub fn from_records(records: Vec<LayoffRecord>) -> Self {
        let report = IngestReport {
            rows_read: records.len(),
            rows_accepted: records.len(),
            rejections: Vec::new(),
        };
        Self {
            source: None,
            records,
            report,
        }
    }
}

/// Copies source rows into a [`WorkingCopy`].
pub struct Ingestion {
    config: IngestConfig,
}

impl Ingestion {
    /// Create an ingestion step with default settings.
    pub fn new() -> Self {
        Self::with_config(IngestConfig::default())
    }

    /// Create an ingestion step with custom settings.
    pub fn with_config(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Read a source file into a working copy.
    ///
    /// Fails without producing records when the file is missing, unreadable,
    /// empty, or lacks a required column.
    pub fn ingest_file(&self, path: impl AsRef<Path>) -> Result<WorkingCopy> {
        self.config.validate()?;
        let path = path.as_ref();

        let parser = Parser::with_config(&self.config);
        let (table, source) = parser.parse_file(path)?;
        let (records, report) = self.ingest_table(&table)?;

        tracing::info!(
            file = %source.file,
            format = %source.format,
            rows = report.rows_read,
            accepted = report.rows_accepted,
            rejected = report.rejections.len(),
            "ingested source"
        );

        Ok(WorkingCopy {
            source: Some(source),
            records,
            report,
        })
    }

    /// Type every row of a parsed table.
    pub fn ingest_table(&self, table: &DataTable) -> Result<(Vec<LayoffRecord>, IngestReport)> {
        let layout = ColumnLayout::from_headers(&table.headers)?;

        let mut records = Vec::with_capacity(table.row_count());
        let mut report = IngestReport {
            rows_read: table.row_count() + table.undecodable.len(),
            ..IngestReport::default()
        };

        for row in &table.undecodable {
            tracing::debug!(line = row.line, "rejected undecodable row");
            report.rejections.push(RecordRejection {
                line: row.line,
                column: table.headers.get(row.field).map(|h| h.trim().to_string()),
                value: row.text.clone(),
                reason: "invalid UTF-8".to_string(),
            });
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let line = table.line(row_idx);
            match self.type_row(row, &layout, table.column_count(), line) {
                Ok(record) => records.push(record),
                Err(rejection) => {
                    tracing::debug!(
                        line = rejection.line,
                        column = rejection.column.as_deref().unwrap_or("-"),
                        reason = %rejection.reason,
                        "rejected row"
                    );
                    report.rejections.push(rejection);
                }
            }
        }

        report.rejections.sort_by_key(|r| r.line);
        if !report.rejections.is_empty() {
            tracing::warn!(count = report.rejections.len(), "malformed rows rejected");
        }

        report.rows_accepted = records.len();
        Ok((records, report))
    }

    fn type_row(
        &self,
        row: &[String],
        layout: &ColumnLayout,
        width: usize,
        line: u64,
    ) -> std::result::Result<LayoffRecord, RecordRejection> {
        if row.len() != width {
            return Err(RecordRejection {
                line,
                column: None,
                value: row.join(","),
                reason: format!("expected {} fields, found {}", width, row.len()),
            });
        }

        let cell = |name: &str| row[layout.index(name)].as_str();
        let reject = |name: &str, reason: String| RecordRejection {
            line,
            column: Some(name.to_string()),
            value: cell(name).to_string(),
            reason,
        };

        let industry = {
            let raw = cell("industry");
            if self.config.is_null_token(raw) {
                None
            } else {
                Some(raw.to_string())
            }
        };

        let total_laid_off = self
            .parse_count(cell("total_laid_off"))
            .map_err(|e| reject("total_laid_off", e))?;
        let percentage_laid_off = self
            .parse_fraction(cell("percentage_laid_off"))
            .map_err(|e| reject("percentage_laid_off", e))?;
        let event_date = self
            .parse_date(cell("event_date"))
            .map_err(|e| reject("event_date", e))?;
        let funds_raised_millions = self
            .parse_amount(cell("funds_raised_millions"))
            .map_err(|e| reject("funds_raised_millions", e))?;

        Ok(LayoffRecord {
            company: cell("company").to_string(),
            location: cell("location").to_string(),
            industry,
            total_laid_off,
            percentage_laid_off,
            event_date,
            stage: cell("stage").to_string(),
            country: cell("country").to_string(),
            funds_raised_millions,
        })
    }

    /// Returns the trimmed cell, or `None` when it denotes an absent value.
    fn present<'a>(&self, raw: &'a str) -> Option<&'a str> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || self.config.is_null_token(trimmed) {
            None
        } else {
            Some(trimmed)
        }
    }

    fn parse_count(&self, raw: &str) -> std::result::Result<Option<u64>, String> {
        let Some(value) = self.present(raw) else {
            return Ok(None);
        };
        if let Ok(n) = value.parse::<u64>() {
            return Ok(Some(n));
        }
        match value.parse::<f64>() {
            Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
                Ok(Some(f as u64))
            }
            Ok(_) => Err(format!("'{}' is not a non-negative whole number", value)),
            Err(_) => Err(format!("'{}' is not numeric", value)),
        }
    }

    fn parse_fraction(&self, raw: &str) -> std::result::Result<Option<f64>, String> {
        let Some(value) = self.parse_amount(raw)? else {
            return Ok(None);
        };
        if !(0.0..=1.0).contains(&value) {
            return Err(format!("{} is outside [0, 1]", value));
        }
        Ok(Some(value))
    }

    fn parse_amount(&self, raw: &str) -> std::result::Result<Option<f64>, String> {
        let Some(value) = self.present(raw) else {
            return Ok(None);
        };
        let parsed: f64 = value
            .parse()
            .map_err(|_| format!("'{}' is not numeric", value))?;
        if !parsed.is_finite() {
            return Err(format!("'{}' is not a finite number", value));
        }
        // Fold -0.0 so record keys compare numerically.
        Ok(Some(if parsed == 0.0 { 0.0 } else { parsed }))
    }

    fn parse_date(&self, raw: &str) -> std::result::Result<Option<NaiveDate>, String> {
        let Some(value) = self.present(raw) else {
            return Ok(None);
        };
        self.config
            .date_formats
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
            .map(Some)
            .ok_or_else(|| {
                format!(
                    "'{}' matches none of the date formats {:?}",
                    value, self.config.date_formats
                )
            })
    }
}

impl Default for Ingestion {
    fn default() -> Self {
        Self::new()
    }
}

/// Position of each canonical column within the source header.
struct ColumnLayout {
    positions: [usize; 9],
}

impl ColumnLayout {
    fn from_headers(headers: &[String]) -> Result<Self> {
        let mut positions: [Option<usize>; 9] = [None; 9];

        for (idx, header) in headers.iter().enumerate() {
            let Some(name) = canonical_column(header) else {
                tracing::debug!(column = %header, "ignoring unknown column");
                continue;
            };
            let slot = column_slot(name);
            if positions[slot].is_some() {
                return Err(SiftError::Schema(format!(
                    "Column '{}' appears more than once",
                    name
                )));
            }
            positions[slot] = Some(idx);
        }

        let missing: Vec<&str> = COLUMNS
            .iter()
            .zip(positions.iter())
            .filter(|(_, pos)| pos.is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(SiftError::Schema(format!(
                "Missing required column(s): {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            positions: positions.map(|p| p.unwrap_or_default()),
        })
    }

    fn index(&self, name: &str) -> usize {
        self.positions[column_slot(name)]
    }
}

fn column_slot(name: &str) -> usize {
    COLUMNS
        .iter()
        .position(|c| *c == name)
        .unwrap_or_else(|| unreachable!("'{}' is not a canonical column", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "company,location,industry,total_laid_off,percentage_laid_off,date,stage,country,funds_raised_millions";

    fn table(body: &str) -> DataTable {
        Parser::new()
            .parse_bytes(format!("{}\n{}", HEADER, body).as_bytes(), b',')
            .unwrap()
    }

    #[test]
    fn test_ingest_typed_row() {
        let t = table("Casper,SF Bay Area,Retail,100,0.10,1/1/2022,Series A,United States.,50");
        let (records, report) = Ingestion::new().ingest_table(&t).unwrap();

        assert_eq!(report.rows_read, 1);
        assert_eq!(report.rows_accepted, 1);
        let r = &records[0];
        assert_eq!(r.company, "Casper");
        assert_eq!(r.industry.as_deref(), Some("Retail"));
        assert_eq!(r.total_laid_off, Some(100));
        assert_eq!(r.percentage_laid_off, Some(0.10));
        assert_eq!(r.event_date, NaiveDate::from_ymd_opt(2022, 1, 1));
        assert_eq!(r.country, "United States.");
        assert_eq!(r.funds_raised_millions, Some(50.0));
    }

    #[test]
    fn test_ingest_keeps_text_verbatim() {
        let t = table(" Casper ,SF Bay Area,,NULL,NULL,NULL,Series A,United States.,");
        let (records, _) = Ingestion::new().ingest_table(&t).unwrap();
        let r = &records[0];

        assert_eq!(r.company, " Casper ");
        assert_eq!(r.industry.as_deref(), Some(""));
        assert_eq!(r.total_laid_off, None);
        assert_eq!(r.percentage_laid_off, None);
        assert_eq!(r.event_date, None);
        assert_eq!(r.funds_raised_millions, None);
    }

    #[test]
    fn test_null_token_industry_is_absent() {
        let t = table("Casper,SF,null,1,,2022-01-01,Seed,US,");
        let (records, _) = Ingestion::new().ingest_table(&t).unwrap();
        assert_eq!(records[0].industry, None);
        assert_eq!(records[0].event_date, NaiveDate::from_ymd_opt(2022, 1, 1));
    }

    #[test]
    fn test_whole_float_count_accepted() {
        let t = table("A,B,C,100.0,,,S,US,");
        let (records, _) = Ingestion::new().ingest_table(&t).unwrap();
        assert_eq!(records[0].total_laid_off, Some(100));
    }

    #[test]
    fn test_malformed_rows_rejected_and_batch_continues() {
        let t = table(
            "A,B,C,ten,,,S,US,\n\
             B,B,C,,1.5,,S,US,\n\
             C,B,C,,,31/31/2022,S,US,\n\
             D,B,C\n\
             E,B,C,5,0.5,,S,US,10",
        );
        let (records, report) = Ingestion::new().ingest_table(&t).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].company, "E");
        assert_eq!(report.rows_read, 5);
        assert_eq!(report.rows_accepted, 1);
        assert_eq!(report.rejections.len(), 4);

        assert_eq!(report.rejections[0].line, 2);
        assert_eq!(report.rejections[0].column.as_deref(), Some("total_laid_off"));
        assert_eq!(report.rejections[0].value, "ten");
        assert_eq!(report.rejections[1].column.as_deref(), Some("percentage_laid_off"));
        assert_eq!(report.rejections[2].column.as_deref(), Some("event_date"));
        assert_eq!(report.rejections[3].column, None);
    }

    #[test]
    fn test_negative_and_nan_rejected() {
        let t = table("A,B,C,-3,,,S,US,\nB,B,C,,,,S,US,NaN");
        let (records, report) = Ingestion::new().ingest_table(&t).unwrap();
        assert!(records.is_empty());
        assert_eq!(report.rejections.len(), 2);
    }

    #[test]
    fn test_columns_matched_by_name() {
        let data = "Country,Company,Location,Industry,Stage,Total_Laid_Off,Percentage_Laid_Off,Event_Date,Funds_Raised_Millions\n\
                    US,Acme,NYC,Retail,Seed,3,,2023-03-06,\n";
        let t = Parser::new().parse_bytes(data.as_bytes(), b',').unwrap();
        let (records, _) = Ingestion::new().ingest_table(&t).unwrap();
        assert_eq!(records[0].company, "Acme");
        assert_eq!(records[0].country, "US");
        assert_eq!(records[0].total_laid_off, Some(3));
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let data = "company,location\nAcme,NYC\n";
        let t = Parser::new().parse_bytes(data.as_bytes(), b',').unwrap();
        let err = Ingestion::new().ingest_table(&t).unwrap_err();
        match err {
            SiftError::Schema(msg) => assert!(msg.contains("industry")),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_column_is_schema_error() {
        let data = format!("{},company\nA,B,C,,,,S,US,,A\n", HEADER);
        let t = Parser::new().parse_bytes(data.as_bytes(), b',').unwrap();
        assert!(matches!(
            Ingestion::new().ingest_table(&t),
            Err(SiftError::Schema(_))
        ));
    }

    #[test]
    fn test_config_validation() {
        let config = IngestConfig {
            delimiter: Some('§'),
            ..IngestConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SiftError::InvalidDelimiter(_))
        ));

        let config = IngestConfig {
            date_formats: Vec::new(),
            ..IngestConfig::default()
        };
        assert!(matches!(config.validate(), Err(SiftError::Config(_))));
    }

    #[test]
    fn test_undecodable_row_rejected_in_line_order() {
        let mut data = format!("{}\n", HEADER).into_bytes();
        data.extend_from_slice(b"A,B,C,ten,,,S,US,\n");
        data.extend_from_slice(b"D\xfcsseldorf Co,B,C,5,,,S,DE,\n");
        data.extend_from_slice(b"E,B,C,5,0.5,,S,US,10\n");
        let t = Parser::new().parse_bytes(&data, b',').unwrap();

        let (records, report) = Ingestion::new().ingest_table(&t).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.rows_accepted, 1);
        let lines: Vec<u64> = report.rejections.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 3]);
        assert_eq!(report.rejections[1].column.as_deref(), Some("company"));
        assert_eq!(report.rejections[1].reason, "invalid UTF-8");
    }
}
