//! Sift CLI - layoff data cleaning pipeline.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose, cli.quiet) {
        eprintln!("Warning: {}", e);
    }

    let result = match cli.command {
        Commands::Clean {
            file,
            output,
            format,
            rules,
            report,
            delimiter,
        } => commands::clean::run(file, output, format, rules, report, delimiter),

        Commands::Diff {
            file,
            rules,
            limit,
            stage,
            delimiter,
        } => commands::diff::run(file, rules, limit, stage, delimiter),

        Commands::Rules { output } => commands::rules::run(output),

        Commands::Check {
            file,
            json,
            delimiter,
        } => commands::check::run(file, json, delimiter),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
