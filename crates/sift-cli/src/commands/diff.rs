//! Diff command - preview what each stage would change.

use std::path::PathBuf;

use colored::Colorize;

use super::{build_pipeline, require_file};

pub fn run(
    file: PathBuf,
    rules: Option<PathBuf>,
    limit: usize,
    stage_filter: Option<String>,
    delimiter: Option<char>,
) -> Result<(), Box<dyn std::error::Error>> {
    require_file(&file)?;

    let pipeline = build_pipeline(rules.as_ref(), delimiter)?;
    let result = pipeline.clean_file(&file)?;

    if let Some(name) = &stage_filter {
        if result.stage(name).is_none() {
            let known: Vec<_> = result.stages.iter().map(|s| s.stage.as_str()).collect();
            return Err(format!("Unknown stage: {}. Use one of: {}", name, known.join(", ")).into());
        }
    }

    println!(
        "{} {} ({} rows)",
        "Previewing".cyan().bold(),
        file.display(),
        result.summary.rows_read.to_string().white().bold()
    );

    for stage in &result.stages {
        if stage_filter.as_deref().is_some_and(|name| name != stage.stage) {
            continue;
        }

        println!();
        println!("{}", stage.description().yellow().bold());

        if stage.row_audits.is_empty() {
            println!("  {}", "no changes".dimmed());
            continue;
        }

        for audit in stage.row_audits.iter().take(limit) {
            if audit.is_removal() {
                println!(
                    "  {} row {} {} - {}",
                    "REMOVE".red(),
                    audit.row,
                    audit.original_value.white().bold(),
                    audit.reason.dimmed()
                );
            } else {
                println!(
                    "  {} row {} [{}] {:?} -> {:?}",
                    "CHANGE".blue(),
                    audit.row,
                    audit.column.cyan(),
                    audit.original_value,
                    audit.new_value
                );
            }
        }
        if stage.row_audits.len() > limit {
            println!(
                "  ... {} more (raise --limit to see them)",
                stage.row_audits.len() - limit
            );
        }
    }

    println!();
    println!(
        "{} rows would be written. Run {} to apply.",
        result.summary.rows_written.to_string().green().bold(),
        format!("sift clean {}", file.display()).cyan().bold()
    );

    Ok(())
}
