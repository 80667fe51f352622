//! Check command - read a data file without cleaning it.

use std::path::PathBuf;

use colored::Colorize;
use sift::{COLUMNS, IngestConfig, Ingestion};

use super::require_file;

pub fn run(
    file: PathBuf,
    json_output: bool,
    delimiter: Option<char>,
) -> Result<(), Box<dyn std::error::Error>> {
    require_file(&file)?;

    let config = IngestConfig {
        delimiter,
        ..IngestConfig::default()
    };
    let copy = Ingestion::with_config(config).ingest_file(&file)?;
    let report = &copy.report;

    if json_output {
        let status = serde_json::json!({
            "source": copy.source,
            "columns": COLUMNS,
            "rows_read": report.rows_read,
            "rows_accepted": report.rows_accepted,
            "rejections": report.rejections,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Checked".cyan().bold(),
        file.display().to_string().white()
    );
    if let Some(source) = &copy.source {
        println!("  Format:   {}", source.format);
        println!("  SHA-256:  {}", source.hash.dimmed());
    }
    println!("  Columns:  {}", COLUMNS.join(", "));
    println!();
    println!("  Rows read:     {}", report.rows_read.to_string().white().bold());
    println!("  Rows accepted: {}", report.rows_accepted.to_string().green());

    if report.rejections.is_empty() {
        println!();
        println!("{}", "All rows are well-formed.".green().bold());
        return Ok(());
    }

    println!(
        "  Rows rejected: {}",
        report.rejections.len().to_string().red()
    );
    println!();
    println!("{}", "Rejected rows:".yellow().bold());
    for rejection in &report.rejections {
        let column = rejection.column.as_deref().unwrap_or("-");
        println!(
            "  line {} [{}] {:?}: {}",
            rejection.line,
            column.cyan(),
            rejection.value,
            rejection.reason
        );
    }

    Ok(())
}
