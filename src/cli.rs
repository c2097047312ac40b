//! CLI argument parsing for perfguard

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for detection results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per result (default)
    Text,
    /// JSON array of results for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "perfguard")]
#[command(version)]
#[command(about = "Performance degradation detection between profiles", long_about = None)]
pub struct Cli {
    /// Enable debug tracing output to stderr
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare a baseline profile with a target profile
    CheckProfiles {
        /// Baseline profile (JSON)
        baseline: PathBuf,

        /// Target profile (JSON)
        target: PathBuf,

        /// Detection method: "all" or a method identifier (e.g. aat, fast)
        #[arg(short = 'm', long = "method", value_name = "METHOD", default_value = "all")]
        method: String,

        /// Label of the minor version the results belong to
        #[arg(long = "minor", value_name = "LABEL", default_value = "HEAD")]
        minor: String,

        /// TOML configuration with a [degradation] table (thresholds)
        #[arg(short = 'c', long = "config", value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long = "format", value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List the supported detection methods
    Methods,
}
