//! Audit records produced by pipeline stages.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Column marker used when a whole record is removed.
pub const WHOLE_RECORD: &str = "*";

/// Audit information for a single value change or removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowAudit {
    /// Row index (0-based) within the stage's input.
    pub row: usize,

    /// Column that was changed, or [`WHOLE_RECORD`].
    pub column: String,

    /// Original value before the stage ran.
    pub original_value: String,

    /// New value after the stage ran. Empty for removals and absent values.
    pub new_value: String,

    /// Kind of change applied.
    pub action: String,

    /// Reason for the change.
    pub reason: String,
}

impl RowAudit {
    pub(crate) fn change(
        row: usize,
        column: &str,
        original_value: impl Into<String>,
        new_value: impl Into<String>,
        action: &str,
        reason: String,
    ) -> Self {
        Self {
            row,
            column: column.to_string(),
            original_value: original_value.into(),
            new_value: new_value.into(),
            action: action.to_string(),
            reason,
        }
    }

    pub(crate) fn removal(row: usize, company: &str, action: &str, reason: String) -> Self {
        Self {
            row,
            column: WHOLE_RECORD.to_string(),
            original_value: company.to_string(),
            new_value: String::new(),
            action: action.to_string(),
            reason,
        }
    }

    /// True when this audit records a dropped record.
    pub fn is_removal(&self) -> bool {
        self.column == WHOLE_RECORD
    }
}

/// What a single stage did to the working copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    /// Stage name.
    pub stage: String,

    /// Records the stage received.
    pub rows_in: usize,

    /// Records the stage returned.
    pub rows_out: usize,

    /// Number of individual values rewritten.
    pub values_changed: usize,

    /// Named counters specific to the stage.
    #[serde(default)]
    pub counters: IndexMap<String, usize>,

    /// Per-row audit information.
    #[serde(default)]
    pub row_audits: Vec<RowAudit>,
}

impl StageReport {
    /// Create an empty report for a stage.
    pub fn new(stage: &str, rows_in: usize) -> Self {
        Self {
            stage: stage.to_string(),
            rows_in,
            rows_out: rows_in,
            values_changed: 0,
            counters: IndexMap::new(),
            row_audits: Vec::new(),
        }
    }

    /// Records dropped by the stage.
    pub fn rows_removed(&self) -> usize {
        self.rows_in.saturating_sub(self.rows_out)
    }

    /// Record a value change.
    pub fn add_change(&mut self, audit: RowAudit) {
        self.values_changed += 1;
        self.bump(&audit.action);
        self.row_audits.push(audit);
    }

    /// Record a dropped record.
    pub fn add_removal(&mut self, audit: RowAudit) {
        self.bump(&audit.action);
        self.row_audits.push(audit);
    }

    /// Increment a named counter.
    pub fn bump(&mut self, counter: &str) {
        *self.counters.entry(counter.to_string()).or_insert(0) += 1;
    }

    /// Read a named counter, zero when never bumped.
    pub fn counter(&self, name: &str) -> usize {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Human-readable one-line summary.
    pub fn description(&self) -> String {
        let mut parts = vec![format!("{} -> {} rows", self.rows_in, self.rows_out)];
        if self.values_changed > 0 {
            parts.push(format!("{} value(s) changed", self.values_changed));
        }
        for (name, count) in &self.counters {
            parts.push(format!("{}: {}", name, count));
        }
        format!("{}: {}", self.stage, parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = StageReport::new("standardize", 3);
        report.add_change(RowAudit::change(
            0,
            "company",
            " Acme ",
            "Acme",
            "trim_company",
            "trimmed".to_string(),
        ));
        report.add_change(RowAudit::change(
            2,
            "company",
            "Foo ",
            "Foo",
            "trim_company",
            "trimmed".to_string(),
        ));

        assert_eq!(report.values_changed, 2);
        assert_eq!(report.counter("trim_company"), 2);
        assert_eq!(report.counter("relabel_industry"), 0);
        assert_eq!(report.rows_removed(), 0);
        assert!(report.description().contains("2 value(s) changed"));
    }

    #[test]
    fn test_removal_audit() {
        let mut report = StageReport::new("prune", 2);
        report.add_removal(RowAudit::removal(1, "Acme", "prune", "no measurement".to_string()));
        report.rows_out = 1;

        assert_eq!(report.values_changed, 0);
        assert_eq!(report.rows_removed(), 1);
        assert!(report.row_audits[0].is_removal());
    }
}
