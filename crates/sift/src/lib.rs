//! Sift: a deduplication and cleaning pipeline for layoff event datasets.
//!
//! A source table is copied into a typed working copy, then passed through a
//! fixed sequence of stages:
//!
//! - **Deduplicate**: keep the first of every group of fully identical records
//! - **Standardize**: trim company names, collapse industry labels, strip
//!   trailing punctuation from countries
//! - **Resolve nulls**: blank industries become absent, then absent industries
//!   are filled from other records of the same company
//! - **Prune**: drop records with neither a headcount nor a percentage
//!
//! The source file is never modified and every change is audited.
//!
//! # Example
//!
//! ```no_run
//! use sift::{OutputFormat, Pipeline, write_records};
//!
//! let pipeline = Pipeline::new().unwrap();
//! let result = pipeline.clean_file("layoffs.csv").unwrap();
//!
//! println!("Rows written: {}", result.summary.rows_written);
//! write_records("layoffs_clean.tsv", &result.records, OutputFormat::Tsv).unwrap();
//! ```

pub mod error;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod rules;

pub use error::{Result, SiftError};
pub use input::{IngestConfig, IngestReport, Ingestion, RecordRejection, SourceMetadata, WorkingCopy};
pub use output::{OutputFormat, write_records, write_records_to};
pub use pipeline::{
    CleanResult, CleanSummary, Pipeline, PipelineConfig, PipelineOutcome, RowAudit, Stage,
    StageReport,
};
pub use record::{COLUMNS, LayoffRecord};
pub use rules::{BackfillPolicy, CleaningRules, LabelRule, SuffixRule};
