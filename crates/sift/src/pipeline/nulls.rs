//! Blank-sentinel conversion and sibling back-fill for `industry`.

use std::collections::{BTreeMap, HashMap};

use crate::error::Result;
use crate::record::LayoffRecord;
use crate::rules::BackfillPolicy;

use super::report::{RowAudit, StageReport};
use super::{Stage, StageOutput};

/// Known industries of one company with the number of records carrying each.
type IndustryCounts = BTreeMap<String, usize>;

/// Back-fill candidates found among a record's siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidates<'a> {
    /// No sibling has a known industry.
    None,
    /// All siblings agree.
    Single(&'a str),
    /// Siblings disagree; a tie-break is needed.
    Multiple(&'a IndustryCounts),
}

impl<'a> Candidates<'a> {
    fn from_counts(counts: Option<&'a IndustryCounts>) -> Self {
        match counts {
            None => Candidates::None,
            Some(counts) if counts.is_empty() => Candidates::None,
            Some(counts) if counts.len() == 1 => counts
                .keys()
                .next()
                .map_or(Candidates::None, |only| Candidates::Single(only.as_str())),
            Some(counts) => Candidates::Multiple(counts),
        }
    }

    /// Pick the value to fill, if any.
    pub fn resolve(self, policy: BackfillPolicy) -> Option<&'a str> {
        match self {
            Candidates::None => None,
            Candidates::Single(value) => Some(value),
            // BTreeMap keys iterate in ascending order.
            Candidates::Multiple(counts) => match policy {
                BackfillPolicy::Smallest => counts.keys().next().map(String::as_str),
                BackfillPolicy::MostFrequent => counts
                    .iter()
                    .fold(None::<(&'a str, usize)>, |best, (value, &count)| match best {
                        Some((_, best_count)) if best_count >= count => best,
                        _ => Some((value.as_str(), count)),
                    })
                    .map(|(value, _)| value),
            },
        }
    }
}

/// Converts blank `industry` to absent, then fills absent `industry` from
/// other records of the same company.
#[derive(Debug, Clone)]
pub struct NullResolver {
    policy: BackfillPolicy,
}

impl NullResolver {
    pub fn new(policy: BackfillPolicy) -> Self {
        Self { policy }
    }

    /// Known industries per company, read before any fill happens.
    fn known_industries(records: &[LayoffRecord]) -> HashMap<&str, IndustryCounts> {
        let mut known: HashMap<&str, IndustryCounts> = HashMap::new();
        for record in records {
            if let Some(industry) = record.industry.as_deref() {
                *known
                    .entry(record.company.as_str())
                    .or_default()
                    .entry(industry.to_string())
                    .or_insert(0) += 1;
            }
        }
        known
    }
}

impl Default for NullResolver {
    fn default() -> Self {
        Self::new(BackfillPolicy::default())
    }
}

impl Stage for NullResolver {
    fn name(&self) -> &'static str {
        "resolve_nulls"
    }

    fn apply(&self, records: &[LayoffRecord]) -> Result<StageOutput> {
        let mut report = StageReport::new(self.name(), records.len());

        // Sentinel conversion runs over the whole set before any lookup.
        let mut converted = Vec::with_capacity(records.len());
        for (row, record) in records.iter().enumerate() {
            let mut record = record.clone();
            if record.has_blank_industry() {
                report.add_change(RowAudit::change(
                    row,
                    "industry",
                    record.industry.take().unwrap_or_default(),
                    "",
                    "blank_to_absent",
                    "Blank industry marked as absent".to_string(),
                ));
            }
            converted.push(record);
        }

        let fills: Vec<(usize, String)> = {
            let known = Self::known_industries(&converted);
            let mut fills = Vec::new();

            for (row, record) in converted.iter().enumerate() {
                if record.industry.is_some() {
                    continue;
                }
                let candidates = Candidates::from_counts(known.get(record.company.as_str()));
                match candidates.resolve(self.policy) {
                    Some(value) => {
                        if let Candidates::Multiple(counts) = candidates {
                            tracing::debug!(
                                company = %record.company,
                                candidates = ?counts.keys().collect::<Vec<_>>(),
                                chosen = value,
                                "ambiguous industry back-fill"
                            );
                            report.bump("ambiguous_backfill");
                        }
                        fills.push((row, value.to_string()));
                    }
                    None => report.bump("unresolved"),
                }
            }
            fills
        };

        for (row, value) in fills {
            let company = converted[row].company.clone();
            report.add_change(RowAudit::change(
                row,
                "industry",
                "",
                value.as_str(),
                "backfill_industry",
                format!("Copied from another '{}' record", company),
            ));
            converted[row].industry = Some(value);
        }

        Ok(StageOutput {
            records: converted,
            report,
        })
    }

    fn verify(&self, records: &[LayoffRecord]) -> std::result::Result<(), String> {
        match records.iter().position(LayoffRecord::has_blank_industry) {
            Some(row) => Err(format!("row {} still has a blank industry", row)),
            None => Ok(()),
        }
    }
}
