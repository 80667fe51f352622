//! Cleaning stages and the runner that chains them.
//!
//! Every stage is a pure transform: it borrows the previous stage's records
//! and returns a new sequence together with a [`StageReport`]. A stage that
//! fails leaves its input untouched, so a failed run never hands out a
//! half-cleaned dataset.

mod dedup;
mod engine;
mod nulls;
mod prune;
mod report;
mod standardize;

pub use dedup::Deduplicator;
pub use engine::{CleanResult, CleanSummary, Pipeline, PipelineConfig, PipelineOutcome};
pub use nulls::{Candidates, NullResolver};
pub use prune::Pruner;
pub use report::{RowAudit, StageReport, WHOLE_RECORD};
pub use standardize::Standardizer;

use crate::error::Result;
use crate::record::LayoffRecord;

/// Output of one stage.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub records: Vec<LayoffRecord>,
    pub report: StageReport,
}

/// A single step of the cleaning pipeline.
pub trait Stage {
    /// Stable stage name used in reports and logs.
    fn name(&self) -> &'static str;

    /// Transform the records into a new sequence.
    fn apply(&self, records: &[LayoffRecord]) -> Result<StageOutput>;

    /// Check the stage's guarantee on its own output.
    ///
    /// Returns a description of the first violation found.
    fn verify(&self, _records: &[LayoffRecord]) -> std::result::Result<(), String> {
        Ok(())
    }
}
