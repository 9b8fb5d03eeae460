//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bubble data API extractor
#[derive(Parser, Debug)]
#[command(name = "bubble-extractor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON, takes precedence over --config
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the configuration
    Validate,

    /// Fetch a single page of every configured endpoint
    Check,

    /// Extract records from the configured endpoints
    Read {
        /// Endpoints to extract (comma-separated, empty = all)
        #[arg(long)]
        endpoints: Option<String>,

        /// Write records to <DIR>/<endpoint>.jsonl instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop at the first failing endpoint
        #[arg(long)]
        fail_fast: bool,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

impl OutputFormat {
    /// Name as shown in the sync summary
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
        }
    }
}
