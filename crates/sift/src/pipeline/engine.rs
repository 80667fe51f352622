//! Pipeline runner chaining ingestion and the cleaning stages.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SiftError};
use crate::input::{IngestConfig, IngestReport, Ingestion, SourceMetadata, WorkingCopy};
use crate::record::LayoffRecord;
use crate::rules::CleaningRules;

use super::dedup::Deduplicator;
use super::nulls::NullResolver;
use super::prune::Pruner;
use super::report::StageReport;
use super::standardize::Standardizer;
use super::{Stage, StageOutput};

/// Configuration for a cleaning run.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// How the source file is read and typed.
    pub ingest: IngestConfig,
    /// Rules for standardization and null resolution.
    pub rules: CleaningRules,
}

/// Records and reports from running the stages.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Cleaned records.
    pub records: Vec<LayoffRecord>,
    /// One report per stage, in execution order.
    pub stages: Vec<StageReport>,
}

/// Result of cleaning a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanResult {
    /// Metadata about the source file, when cleaning a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMetadata>,
    /// Ingestion counts and rejected rows.
    pub ingest: IngestReport,
    /// Per-stage reports.
    pub stages: Vec<StageReport>,
    /// Summary counts.
    pub summary: CleanSummary,
    /// The cleaned records.
    #[serde(skip)]
    pub records: Vec<LayoffRecord>,
}

/// Summary of a cleaning run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanSummary {
    /// Data rows in the source.
    pub rows_read: usize,
    /// Rows rejected as malformed during ingestion.
    pub rows_rejected: usize,
    /// Records in the cleaned output.
    pub rows_written: usize,
    /// Records removed by each stage.
    pub removed_by_stage: IndexMap<String, usize>,
    /// Values rewritten across all stages.
    pub values_changed: usize,
}

impl CleanResult {
    /// Save the run report (without records) as pretty-printed JSON.
    pub fn save_report(&self, path: impl AsRef<Path>) -> Result<()> {
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

    /// Report of a stage by name.
    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == name)
    }
}

/// The cleaning pipeline.
///
/// Stages run strictly in order, each over the complete output of the
/// previous one: back-fill must see a deduplicated set, and pruning must see
/// resolved industries.
pub struct Pipeline {
    config: PipelineConfig,
    deduplicator: Deduplicator,
    standardizer: Standardizer,
    resolver: NullResolver,
    pruner: Pruner,
}

impl Pipeline {
    /// Create a pipeline with the default rules.
    pub fn new() -> Result<Self> {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a pipeline with custom configuration.
    ///
    /// Fails when the rules are invalid.
    pub fn with_config(config: PipelineConfig) -> Result<Self> {
        config.ingest.validate()?;
        let standardizer = Standardizer::new(&config.rules)?;
        let resolver = NullResolver::new(config.rules.backfill_policy);

        Ok(Self {
            config,
            deduplicator: Deduplicator::new(),
            standardizer,
            resolver,
            pruner: Pruner::new(),
        })
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read and clean a file.
    ///
    /// An unavailable source aborts before any stage runs. The source file
    /// is never written.
    pub fn clean_file(&self, path: impl AsRef<Path>) -> Result<CleanResult> {
        let ingestion = Ingestion::with_config(self.config.ingest.clone());
        let copy = ingestion.ingest_file(path)?;
        self.clean(copy)
    }

    /// Clean a working copy.
    pub fn clean(&self, copy: WorkingCopy) -> Result<CleanResult> {
        let outcome = self.run(&copy.records)?;

        let mut summary = CleanSummary {
            rows_read: copy.report.rows_read,
            rows_rejected: copy.report.rejections.len(),
            rows_written: outcome.records.len(),
            ..CleanSummary::default()
        };
        for stage in &outcome.stages {
            summary
                .removed_by_stage
                .insert(stage.stage.clone(), stage.rows_removed());
            summary.values_changed += stage.values_changed;
        }

        tracing::info!(
            read = summary.rows_read,
            rejected = summary.rows_rejected,
            written = summary.rows_written,
            changed = summary.values_changed,
            "cleaning finished"
        );

        Ok(CleanResult {
            source: copy.source,
            ingest: copy.report,
            stages: outcome.stages,
            summary,
            records: outcome.records,
        })
    }

    /// Run all stages over the records.
    pub fn run(&self, records: &[LayoffRecord]) -> Result<PipelineOutcome> {
        let settle = Deduplicator::settle();
        let mut stages: Vec<&dyn Stage> = vec![
            &self.deduplicator,
            &self.standardizer,
            &self.resolver,
            &self.pruner,
        ];
        if self.config.rules.settle_duplicates {
            stages.push(&settle);
        }

        let mut current = records.to_vec();
        let mut reports = Vec::with_capacity(stages.len());

        for stage in stages {
            let StageOutput { records, report } = Self::run_stage(stage, &current)?;
            current = records;
            reports.push(report);
        }

        Ok(PipelineOutcome {
            records: current,
            stages: reports,
        })
    }

    /// Run one stage and check its guarantee before accepting its output.
    fn run_stage(stage: &dyn Stage, records: &[LayoffRecord]) -> Result<StageOutput> {
        tracing::debug!(stage = stage.name(), rows = records.len(), "stage started");

        let output = stage.apply(records)?;
        stage
            .verify(&output.records)
            .map_err(|message| SiftError::Stage {
                stage: stage.name().to_string(),
                message,
            })?;

        tracing::info!(
            stage = stage.name(),
            rows_in = output.report.rows_in,
            rows_out = output.report.rows_out,
            changed = output.report.values_changed,
            "stage finished"
        );
        Ok(output)
    }
}
