//! Externally supplied cleaning rules.
//!
//! Rules are plain data so they can live in a JSON file next to the dataset
//! and be reviewed without reading code. [`CleaningRules::default`] carries
//! the rules the layoffs dataset needs out of the box.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SiftError};

/// Rewrites every value starting with `prefix` to `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRule {
    pub prefix: String,
    pub label: String,
    /// Match the prefix regardless of case.
    #[serde(default)]
    pub ignore_case: bool,
}

impl LabelRule {
    pub fn new(prefix: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            label: label.into(),
            ignore_case: false,
        }
    }

    /// Compile the prefix into an anchored matcher.
    pub fn matcher(&self) -> Result<Regex> {
        prefix_regex(&self.prefix, self.ignore_case)
    }
}

/// Strips trailing characters from values starting with one of `prefixes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixRule {
    pub prefixes: Vec<String>,
    /// Characters removed from the end, repeatedly.
    pub trailing: String,
    #[serde(default)]
    pub ignore_case: bool,
}

impl SuffixRule {
    /// Compile all prefixes into one anchored matcher.
    pub fn matcher(&self) -> Result<Option<Regex>> {
        if self.prefixes.is_empty() {
            return Ok(None);
        }
        let alternatives: Vec<String> = self.prefixes.iter().map(|p| regex::escape(p)).collect();
        let flags = if self.ignore_case { "(?i)" } else { "" };
        Ok(Some(Regex::new(&format!(
            "^{}(?:{})",
            flags,
            alternatives.join("|")
        ))?))
    }
}

/// How to pick a back-fill value when siblings disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackfillPolicy {
    /// Lexicographically smallest candidate.
    #[default]
    Smallest,
    /// Candidate carried by the most sibling records; ties go to the smallest.
    MostFrequent,
}

/// Rule set driving standardization and null resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningRules {
    /// Trim surrounding whitespace from `company`.
    pub trim_company: bool,
    /// Ordered `industry` prefix rules; the first match wins.
    pub industry_labels: Vec<LabelRule>,
    /// `country` suffix trimming.
    pub country_suffix: SuffixRule,
    /// Tie-break for ambiguous `industry` back-fill.
    pub backfill_policy: BackfillPolicy,
    /// Run a final duplicate pass after pruning.
    pub settle_duplicates: bool,
}

impl Default for CleaningRules {
    fn default() -> Self {
        Self {
            trim_company: true,
            industry_labels: vec![LabelRule::new("Crypto", "Crypto")],
            country_suffix: SuffixRule {
                prefixes: vec!["United States".to_string()],
                trailing: ".".to_string(),
                ignore_case: false,
            },
            backfill_policy: BackfillPolicy::Smallest,
            settle_duplicates: true,
        }
    }
}

impl CleaningRules {
    /// Rules that change nothing.
    pub fn empty() -> Self {
        Self {
            trim_company: false,
            industry_labels: Vec::new(),
            country_suffix: SuffixRule {
                prefixes: Vec::new(),
                trailing: String::new(),
                ignore_case: false,
            },
            backfill_policy: BackfillPolicy::Smallest,
            settle_duplicates: false,
        }
    }

    /// Check that the rules compile and that applying them is idempotent.
    ///
    /// A canonical label must map to itself: if some rule would rewrite a
    /// label to a different label, a second pass would change the output.
    pub fn validate(&self) -> Result<()> {
        let mut matchers = Vec::with_capacity(self.industry_labels.len());
        for rule in &self.industry_labels {
            if rule.prefix.is_empty() {
                return Err(SiftError::Config(format!(
                    "Industry rule for label '{}' has an empty prefix",
                    rule.label
                )));
            }
            if rule.label.trim().is_empty() {
                return Err(SiftError::Config(format!(
                    "Industry rule for prefix '{}' has an empty label",
                    rule.prefix
                )));
            }
            matchers.push(rule.matcher()?);
        }

        for rule in &self.industry_labels {
            let rewritten = self
                .industry_labels
                .iter()
                .zip(&matchers)
                .find(|(_, m)| m.is_match(&rule.label))
                .map(|(r, _)| r.label.as_str());
            if let Some(other) = rewritten {
                if other != rule.label {
                    return Err(SiftError::Config(format!(
                        "Label '{}' would be rewritten to '{}' on a second pass",
                        rule.label, other
                    )));
                }
            }
        }

        self.country_suffix.matcher()?;
        if !self.country_suffix.prefixes.is_empty() && self.country_suffix.trailing.is_empty() {
            return Err(SiftError::Config(
                "Country suffix rule has prefixes but no trailing characters".to_string(),
            ));
        }
        for prefix in &self.country_suffix.prefixes {
            if prefix.is_empty() {
                return Err(SiftError::Config(
                    "Country suffix rule has an empty prefix".to_string(),
                ));
            }
            if prefix.ends_with(|c: char| self.country_suffix.trailing.contains(c)) {
                return Err(SiftError::Config(format!(
                    "Country prefix '{}' ends with a trimmed character",
                    prefix
                )));
            }
        }

        Ok(())
    }

    /// Load rules from a JSON file and validate them.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| SiftError::io(path, e))?;
        let rules: CleaningRules = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            SiftError::Config(format!(
                "Failed to parse rules '{}': {}",
                path.display(),
                e
            ))
        })?;

        rules.validate()?;
        Ok(rules)
    }

    /// Save rules as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| SiftError::io(parent, e))?;
            }
        }

        let file = File::create(path).map_err(|e| SiftError::io(path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

fn prefix_regex(prefix: &str, ignore_case: bool) -> Result<Regex> {
    let flags = if ignore_case { "(?i)" } else { "" };
    Ok(Regex::new(&format!("^{}{}", flags, regex::escape(prefix)))?)
}
