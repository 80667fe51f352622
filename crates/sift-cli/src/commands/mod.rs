//! CLI command implementations.

pub mod check;
pub mod clean;
pub mod diff;
pub mod rules;

use std::path::{Path, PathBuf};

use sift::{CleaningRules, IngestConfig, Pipeline, PipelineConfig};

/// Fail early with a readable message when the data file is missing.
pub(crate) fn require_file(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("Data file not found: {}", file.display()).into());
    }
    Ok(())
}

/// Build a pipeline from an optional rules file and delimiter override.
pub(crate) fn build_pipeline(
    rules: Option<&PathBuf>,
    delimiter: Option<char>,
) -> Result<Pipeline, Box<dyn std::error::Error>> {
    let rules = match rules {
        Some(path) => CleaningRules::load(path)?,
        None => CleaningRules::default(),
    };
    let ingest = IngestConfig {
        delimiter,
        ..IngestConfig::default()
    };

    Ok(Pipeline::with_config(PipelineConfig { ingest, rules })?)
}
