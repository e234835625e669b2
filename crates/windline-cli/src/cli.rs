//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Windline: normalization pipeline for wind sensor exports
#[derive(Parser)]
#[command(name = "windline")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (TOML)
    #[arg(short, long, global = true, env = "WINDLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write a per-run log file into this folder
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize one export file and write canonical CSV
    Normalize {
        /// Path to the export (XLSX/CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path (default: <file>.normalized.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Add source and message columns
        #[arg(long)]
        messages: bool,

        /// Provenance tag for messages
        #[arg(long)]
        source: Option<String>,

        /// Timezone for naive timestamps (IANA name)
        #[arg(long)]
        timezone: Option<String>,

        /// Print each message to stdout (needs messages enabled)
        #[arg(long)]
        print_messages: bool,
    },

    /// Process the daily ZIP export for a date
    Daily {
        /// Date folder to process, dd-mm-YYYY (default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Name unmatched files after their stem instead of skipping them
        #[arg(long)]
        allow_fallback: bool,

        /// Only write to the local output folder
        #[arg(long)]
        local_only: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify written CSV files and summarize them
    Verify {
        /// Files to check
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Field delimiter of the files
        #[arg(short, long, default_value = ";")]
        delimiter: char,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show catalog entries and coverage against a folder
    Catalog {
        /// Catalog file (default: from settings)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Folder of data files to check coverage against
        #[arg(long)]
        against: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
