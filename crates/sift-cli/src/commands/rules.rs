//! Rules command - print or write the default cleaning rules.

use std::path::PathBuf;

use colored::Colorize;
use sift::CleaningRules;

pub fn run(output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let rules = CleaningRules::default();

    match output {
        Some(path) => {
            rules.save(&path)?;
            println!(
                "Default rules written to: {}",
                path.display().to_string().cyan()
            );
            println!(
                "Edit the file and pass it with {}.",
                "sift clean --rules <FILE>".cyan().bold()
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&rules)?),
    }

    Ok(())
}
