//! The layoff event record and its canonical column layout.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Canonical column names, in output order.
pub const COLUMNS: [&str; 9] = [
    "company",
    "location",
    "industry",
    "total_laid_off",
    "percentage_laid_off",
    "event_date",
    "stage",
    "country",
    "funds_raised_millions",
];

/// Header names accepted in place of a canonical column name.
pub const COLUMN_ALIASES: &[(&str, &str)] = &[("date", "event_date")];

/// Date format used when writing records.
pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// One layoff event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoffRecord {
    pub company: String,
    pub location: String,
    /// Free-text category. `Some("")` is a blank sentinel that only exists
    /// between ingestion and null resolution.
    pub industry: Option<String>,
    pub total_laid_off: Option<u64>,
    /// Fraction of the workforce, within `[0, 1]`.
    pub percentage_laid_off: Option<f64>,
    pub event_date: Option<NaiveDate>,
    pub stage: String,
    pub country: String,
    pub funds_raised_millions: Option<f64>,
}

/// Hashable identity of a record across all nine fields.
///
/// Floats compare by bit pattern after folding `-0.0` into `0.0` and every
/// NaN into one canonical NaN.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    company: String,
    location: String,
    industry: Option<String>,
    total_laid_off: Option<u64>,
    percentage_laid_off: Option<u64>,
    event_date: Option<NaiveDate>,
    stage: String,
    country: String,
    funds_raised_millions: Option<u64>,
}

impl LayoffRecord {
    /// Build the full-tuple identity used for duplicate detection.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            company: self.company.clone(),
            location: self.location.clone(),
            industry: self.industry.clone(),
            total_laid_off: self.total_laid_off,
            percentage_laid_off: self.percentage_laid_off.map(float_key),
            event_date: self.event_date,
            stage: self.stage.clone(),
            country: self.country.clone(),
            funds_raised_millions: self.funds_raised_millions.map(float_key),
        }
    }

    /// True when neither headcount nor percentage is known.
    pub fn has_no_measurement(&self) -> bool {
        self.total_laid_off.is_none() && self.percentage_laid_off.is_none()
    }

    /// True when `industry` holds the blank sentinel.
    pub fn has_blank_industry(&self) -> bool {
        self.industry
            .as_deref()
            .is_some_and(|industry| industry.trim().is_empty())
    }

    /// Render the record as output cells in [`COLUMNS`] order.
    ///
    /// Absent values become empty cells.
    pub fn to_cells(&self) -> [String; 9] {
        [
            self.company.clone(),
            self.location.clone(),
            self.industry.clone().unwrap_or_default(),
            self.total_laid_off.map(|v| v.to_string()).unwrap_or_default(),
            self.percentage_laid_off
                .map(|v| v.to_string())
                .unwrap_or_default(),
            self.event_date
                .map(|d| d.format(OUTPUT_DATE_FORMAT).to_string())
                .unwrap_or_default(),
            self.stage.clone(),
            self.country.clone(),
            self.funds_raised_millions
                .map(|v| v.to_string())
                .unwrap_or_default(),
        ]
    }
}

fn float_key(value: f64) -> u64 {
    if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        (value + 0.0).to_bits()
    }
}

/// Resolve a header cell to its canonical column name, if it names one.
pub fn canonical_column(header: &str) -> Option<&'static str> {
    let normalized = header.trim().to_lowercase();
    if let Some(name) = COLUMNS.iter().copied().find(|c| *c == normalized) {
        return Some(name);
    }
    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, name)| *name)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Build a record with the fields most tests care about.
    pub fn record(
        company: &str,
        industry: Option<&str>,
        total: Option<u64>,
        percentage: Option<f64>,
        country: &str,
    ) -> LayoffRecord {
        LayoffRecord {
            company: company.to_string(),
            location: "SF Bay Area".to_string(),
            industry: industry.map(|s| s.to_string()),
            total_laid_off: total,
            percentage_laid_off: percentage,
            event_date: NaiveDate::from_ymd_opt(2022, 1, 1),
            stage: "Series A".to_string(),
            country: country.to_string(),
            funds_raised_millions: Some(50.0),
        }
    }
}
