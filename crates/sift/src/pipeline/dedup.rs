//! Full-tuple duplicate removal.

use std::collections::HashMap;

use crate::error::Result;
use crate::record::{LayoffRecord, RecordKey};

use super::report::{RowAudit, StageReport};
use super::{Stage, StageOutput};

/// Keeps the first record of every group of records identical across all
/// nine fields.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    name: &'static str,
}

impl Deduplicator {
    /// Create the primary duplicate pass.
    pub fn new() -> Self {
        Self { name: "deduplicate" }
    }

    /// Create the final pass that runs after standardization and pruning.
    pub fn settle() -> Self {
        Self { name: "settle" }
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-record position within its duplicate group, starting at 1.
///
/// Ordinals follow input order, so the record kept for each group is the
/// one that appears first.
fn group_ordinals(records: &[LayoffRecord]) -> (Vec<usize>, Vec<usize>) {
    let mut groups: HashMap<RecordKey, (usize, usize)> = HashMap::with_capacity(records.len());
    let mut ordinals = Vec::with_capacity(records.len());
    let mut firsts = Vec::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        let entry = groups.entry(record.key()).or_insert((idx, 0));
        entry.1 += 1;
        ordinals.push(entry.1);
        firsts.push(entry.0);
    }

    (ordinals, firsts)
}

impl Stage for Deduplicator {
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, records: &[LayoffRecord]) -> Result<StageOutput> {
        let mut report = StageReport::new(self.name, records.len());
        let (ordinals, firsts) = group_ordinals(records);

        let mut kept = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if ordinals[idx] == 1 {
                kept.push(record.clone());
            } else {
                report.add_removal(RowAudit::removal(
                    idx,
                    &record.company,
                    "remove_duplicate",
                    format!(
                        "copy #{} of row {} (identical in all fields)",
                        ordinals[idx], firsts[idx]
                    ),
                ));
            }
        }

        report.rows_out = kept.len();
        Ok(StageOutput {
            records: kept,
            report,
        })
    }

    fn verify(&self, records: &[LayoffRecord]) -> std::result::Result<(), String> {
        let (ordinals, firsts) = group_ordinals(records);
        match ordinals.iter().position(|&o| o > 1) {
            Some(idx) => Err(format!(
                "row {} duplicates row {}",
                idx, firsts[idx]
            )),
            None => Ok(()),
        }
    }
}
