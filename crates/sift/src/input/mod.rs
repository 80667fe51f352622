//! Ingestion: reading the source file into a typed working copy.

mod ingest;
mod parser;
mod source;

pub use ingest::{IngestConfig, IngestReport, Ingestion, RecordRejection, WorkingCopy};
pub use parser::Parser;
pub use source::{DataTable, SourceMetadata, UndecodableRow};
