//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use sift::OutputFormat;
use std::path::PathBuf;

/// Sift: deduplicate and clean layoff event datasets
#[derive(Parser)]
#[command(name = "sift")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the cleaning pipeline and write the cleaned table
    Clean {
        /// Path to the layoff data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path (default: <file>_clean.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "tsv")]
        format: OutputFormat,

        /// Cleaning rules file (JSON)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Write the run report (JSON) to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Field delimiter (auto-detected when omitted)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Preview what each stage would change without writing anything
    Diff {
        /// Path to the layoff data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Cleaning rules file (JSON)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Maximum audits shown per stage
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,

        /// Only show this stage (deduplicate, standardize, resolve_nulls, prune, settle)
        #[arg(short, long)]
        stage: Option<String>,

        /// Field delimiter (auto-detected when omitted)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Print or write the default cleaning rules
    Rules {
        /// Write the rules to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Read a data file and report schema, row counts and rejected rows
    Check {
        /// Path to the layoff data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Field delimiter (auto-detected when omitted)
        #[arg(short, long)]
        delimiter: Option<char>,
    },
}
