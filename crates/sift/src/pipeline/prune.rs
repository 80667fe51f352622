//! Removal of records without any layoff measurement.

use crate::error::Result;
use crate::record::LayoffRecord;

use super::report::{RowAudit, StageReport};
use super::{Stage, StageOutput};

/// Drops records where both `total_laid_off` and `percentage_laid_off` are
/// absent. Neither can be derived from the other without the company's size.
#[derive(Debug, Clone, Default)]
pub struct Pruner;

impl Pruner {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Pruner {
    fn name(&self) -> &'static str {
        "prune"
    }

    fn apply(&self, records: &[LayoffRecord]) -> Result<StageOutput> {
        let mut report = StageReport::new(self.name(), records.len());
        let mut kept = Vec::with_capacity(records.len());

        for (row, record) in records.iter().enumerate() {
            if record.has_no_measurement() {
                report.add_removal(RowAudit::removal(
                    row,
                    &record.company,
                    "remove_unmeasured",
                    "No total_laid_off and no percentage_laid_off".to_string(),
                ));
            } else {
                kept.push(record.clone());
            }
        }

        report.rows_out = kept.len();
        Ok(StageOutput {
            records: kept,
            report,
        })
    }

    fn verify(&self, records: &[LayoffRecord]) -> std::result::Result<(), String> {
        match records.iter().position(LayoffRecord::has_no_measurement) {
            Some(row) => Err(format!("row {} has no measurement", row)),
            None => Ok(()),
        }
    }
}
