//! Free-text normalization for `company`, `industry` and `country`.

use regex::Regex;

use crate::error::Result;
use crate::record::LayoffRecord;
use crate::rules::CleaningRules;

use super::report::{RowAudit, StageReport};
use super::{Stage, StageOutput};

/// Rewrites equivalent spellings so they compare equal.
///
/// All three passes are idempotent given rules that pass
/// [`CleaningRules::validate`].
#[derive(Debug, Clone)]
pub struct Standardizer {
    trim_company: bool,
    labels: Vec<(Regex, String)>,
    country_prefix: Option<Regex>,
    country_trailing: Vec<char>,
}

impl Standardizer {
    /// Compile the rules into matchers.
    pub fn new(rules: &CleaningRules) -> Result<Self> {
        rules.validate()?;

        let labels = rules
            .industry_labels
            .iter()
            .map(|rule| Ok((rule.matcher()?, rule.label.clone())))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            trim_company: rules.trim_company,
            labels,
            country_prefix: rules.country_suffix.matcher()?,
            country_trailing: rules.country_suffix.trailing.chars().collect(),
        })
    }

    /// Canonical label for an industry value, if a rule matches it.
    pub fn canonical_industry(&self, industry: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(matcher, _)| matcher.is_match(industry))
            .map(|(_, label)| label.as_str())
    }

    /// Country with trailing characters removed, if the country is in scope.
    pub fn trimmed_country<'a>(&self, country: &'a str) -> Option<&'a str> {
        let prefix = self.country_prefix.as_ref()?;
        if !prefix.is_match(country) {
            return None;
        }
        let trimmed = country.trim_end_matches(self.country_trailing.as_slice());
        (trimmed.len() != country.len()).then_some(trimmed)
    }
}

impl Stage for Standardizer {
    fn name(&self) -> &'static str {
        "standardize"
    }

    fn apply(&self, records: &[LayoffRecord]) -> Result<StageOutput> {
        let mut report = StageReport::new(self.name(), records.len());
        let mut out = Vec::with_capacity(records.len());

        for (row, record) in records.iter().enumerate() {
            let mut record = record.clone();

            if self.trim_company {
                let trimmed = record.company.trim();
                if trimmed.len() != record.company.len() {
                    let trimmed = trimmed.to_string();
                    report.add_change(RowAudit::change(
                        row,
                        "company",
                        record.company.as_str(),
                        trimmed.as_str(),
                        "trim_company",
                        "Removed surrounding whitespace".to_string(),
                    ));
                    record.company = trimmed;
                }
            }

            if let Some(industry) = record.industry.as_deref() {
                if let Some(label) = self.canonical_industry(industry) {
                    if label != industry {
                        report.add_change(RowAudit::change(
                            row,
                            "industry",
                            industry,
                            label,
                            "relabel_industry",
                            format!("Collapsed '{}' to canonical label '{}'", industry, label),
                        ));
                        record.industry = Some(label.to_string());
                    }
                }
            }

            if let Some(trimmed) = self.trimmed_country(&record.country) {
                let trimmed = trimmed.to_string();
                report.add_change(RowAudit::change(
                    row,
                    "country",
                    record.country.as_str(),
                    trimmed.as_str(),
                    "trim_country",
                    format!("Stripped trailing {:?}", self.country_trailing),
                ));
                record.country = trimmed;
            }

            out.push(record);
        }

        tracing::debug!(changed = report.values_changed, "standardized records");
        Ok(StageOutput {
            records: out,
            report,
        })
    }

    fn verify(&self, records: &[LayoffRecord]) -> std::result::Result<(), String> {
        for (row, record) in records.iter().enumerate() {
            if let Some(industry) = record.industry.as_deref() {
                if let Some(label) = self.canonical_industry(industry) {
                    if label != industry {
                        return Err(format!(
                            "row {}: industry '{}' not collapsed to '{}'",
                            row, industry, label
                        ));
                    }
                }
            }
            if self.trimmed_country(&record.country).is_some() {
                return Err(format!(
                    "row {}: country '{}' keeps a trailing suffix",
                    row, record.country
                ));
            }
        }
        Ok(())
    }
}
