//! CLI argument parsing for treeseek

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for analysis reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables and histogram (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "treeseek")]
#[command(version)]
#[command(about = "Timed tree-search experiment and result analysis", long_about = None)]
pub struct Cli {
    /// Enable debug logging to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Experiment configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one search session and append the result to the log
    Run {
        /// Participant name recorded with the result
        #[arg(short, long, value_name = "NAME")]
        participant: String,

        /// Dataset to search (default: random pick from the configured datasets)
        #[arg(short, long, value_name = "FILE")]
        dataset: Option<PathBuf>,

        /// Results log to append to
        #[arg(short, long, value_name = "FILE")]
        results: Option<PathBuf>,

        /// Live timer interval in milliseconds
        #[arg(long = "tick-ms", value_name = "MS")]
        tick_ms: Option<u64>,

        /// Seed for reproducible dataset and target selection
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
    },

    /// Summarize all recorded sessions
    Analyze {
        /// Results log to read
        #[arg(short, long, value_name = "FILE")]
        results: Option<PathBuf>,

        /// Number of histogram bins
        #[arg(short, long, value_name = "N")]
        bins: Option<usize>,

        /// Output format
        #[arg(long = "format", value_enum, default_value = "text")]
        format: OutputFormat,
    },
}
