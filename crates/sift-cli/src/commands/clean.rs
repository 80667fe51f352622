//! Clean command - run the pipeline and write the cleaned table.

use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;
use sift::{OutputFormat, write_records};

use super::{build_pipeline, require_file};

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    format: OutputFormat,
    rules: Option<PathBuf>,
    report: Option<PathBuf>,
    delimiter: Option<char>,
) -> Result<(), Box<dyn std::error::Error>> {
    require_file(&file)?;

    let output_path = output.unwrap_or_else(|| {
        let stem = file.file_stem().unwrap_or_default().to_string_lossy();
        file.with_file_name(format!("{}_clean.{}", stem, format.extension()))
    });
    if is_same_file(&output_path, &file) {
        return Err("Refusing to overwrite the source file; choose another --output".into());
    }

    let pipeline = build_pipeline(rules.as_ref(), delimiter)?;

    println!("{} {}", "Cleaning".cyan().bold(), file.display());
    let result = pipeline.clean_file(&file)?;

    write_records(&output_path, &result.records, format)?;

    println!();
    println!(
        "  Rows read:     {}",
        result.summary.rows_read.to_string().white().bold()
    );
    if result.summary.rows_rejected > 0 {
        println!(
            "  Rows rejected: {}",
            result.summary.rows_rejected.to_string().red()
        );
    }
    for stage in &result.stages {
        let removed = stage.rows_removed();
        let changed = stage.values_changed;
        if removed == 0 && changed == 0 {
            println!("  {:<14} {}", stage.stage, "no changes".dimmed());
            continue;
        }
        let mut parts = Vec::new();
        if removed > 0 {
            parts.push(format!("{} removed", removed.to_string().yellow()));
        }
        if changed > 0 {
            parts.push(format!("{} changed", changed.to_string().blue()));
        }
        println!("  {:<14} {}", stage.stage, parts.join(", "));
    }
    println!(
        "  Rows written:  {}",
        result.summary.rows_written.to_string().green().bold()
    );

    for rejection in result.ingest.rejections.iter().take(5) {
        println!(
            "  {} line {}: {}",
            "Rejected".red(),
            rejection.line,
            rejection.reason
        );
    }
    if result.ingest.rejections.len() > 5 {
        println!(
            "  ... and {} more (see {})",
            result.ingest.rejections.len() - 5,
            "sift check".cyan()
        );
    }

    if let Some(report_path) = report {
        result.save_report(&report_path)?;
        println!(
            "Report saved to: {}",
            report_path.display().to_string().cyan()
        );
    }

    println!();
    println!(
        "{} Cleaned data saved to: {}",
        "Done.".green().bold(),
        output_path.display().to_string().cyan()
    );

    Ok(())
}

/// True when `output` names the same file as `source`, however it is spelled.
fn is_same_file(output: &Path, source: &Path) -> bool {
    if output == source {
        return true;
    }
    match (fs::canonicalize(output), fs::canonicalize(source)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
