//! Command-line interface for snapdiff

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "snapdiff")]
#[command(about = "Turns archived configuration snapshots into structural change records")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override workspace location
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize snapdiff workspace
    Init {
        /// Overwrite an existing config.json
        #[arg(long)]
        force: bool,
    },

    /// Unpack a directory of snapshot archives and record the changes between them
    Run {
        /// Directory containing one archive per snapshot
        input: PathBuf,

        /// Output file for change records (defaults to .snapdiff/diffs.jsonl)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pipeline config file (defaults to .snapdiff/config.json when present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Structural diff program
        #[arg(long)]
        tool: Option<String>,

        /// Argument passed to the diff program before the two file paths (repeatable)
        #[arg(long = "tool-arg", allow_hyphen_values = true)]
        tool_args: Vec<String>,

        /// Pairing mode: "linear" or "cyclic"
        #[arg(long)]
        pairing: Option<String>,

        /// Number of concurrent diff invocations (must be > 0)
        #[arg(long, value_parser = validate_positive)]
        jobs: Option<usize>,

        /// Timeout in seconds for a single diff invocation (must be > 0)
        #[arg(long, value_parser = validate_positive_secs)]
        timeout: Option<u64>,

        /// File extension to diff, e.g. ".yaml" (repeatable)
        #[arg(long = "ext")]
        extensions: Vec<String>,

        /// Match extensions case-insensitively
        #[arg(long)]
        case_insensitive: bool,

        /// Invoke the diff tool even for byte-identical files
        #[arg(long)]
        no_skip_identical: bool,

        /// Disable progress bars
        #[arg(long)]
        no_progress: bool,

        /// Summary format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// Show the archives found in a directory and the comparison plan
    Pairs {
        /// Directory containing one archive per snapshot
        input: PathBuf,

        /// Pairing mode: "linear" or "cyclic"
        #[arg(long)]
        pairing: Option<String>,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// Parse saved diff tool output into change records
    Parse {
        /// File holding the raw diff output
        diff_file: PathBuf,

        /// Tracked path the diff belongs to
        #[arg(long)]
        file: String,

        /// Snapshot identifier the changes belong to
        #[arg(long)]
        snapshot: String,

        /// Separator used to join detail lines
        #[arg(long)]
        separator: Option<String>,
    },

    /// List previous runs
    Runs {
        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },
}

/// Parse output format string
#[derive(Debug, Clone)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}

/// Validate that a count is greater than 0
fn validate_positive(s: &str) -> Result<usize, String> {
    let value: usize = s.parse()
        .map_err(|_| format!("Invalid value: '{}'. Must be a positive integer.", s))?;

    if value == 0 {
        return Err("Value must be greater than 0".to_string());
    }

    Ok(value)
}

/// Validate that a timeout is greater than 0 seconds
fn validate_positive_secs(s: &str) -> Result<u64, String> {
    let secs: u64 = s.parse()
        .map_err(|_| format!("Invalid timeout: '{}'. Must be a positive number of seconds.", s))?;

    if secs == 0 {
        return Err("Timeout must be greater than 0".to_string());
    }

    Ok(secs)
}
