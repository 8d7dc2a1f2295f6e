//! Command-line interface definitions.
//!
//! ```bash
//! # Find duplicate photos across two trees
//! doppelganger scan /data/a /data/b -e jpg -e png
//!
//! # Machine-readable output
//! doppelganger scan ~/Downloads --output json
//!
//! # Scan, then delete confirmed copies in the same run
//! doppelganger scan /data/a /data/b --remove /data/b/y.jpg --yes
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Find duplicate files by content across one or more directory trees.
///
/// Files are first grouped by size; only files sharing a size with another
/// file are read and fingerprinted with SHA-256.
#[derive(Debug, Parser)]
#[command(name = "doppelganger")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress everything except errors and the report itself
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan directories for duplicate files
    Scan(ScanArgs),
    /// Inspect or initialize the configuration file
    Config(ConfigArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directories to scan (repeats are ignored)
    #[arg(value_name = "ROOT", required = true, num_args = 1..)]
    pub roots: Vec<PathBuf>,

    /// Only consider files with these extensions (case-insensitive, dot optional)
    ///
    /// Repeat the flag or separate with commas: `-e jpg -e png` or `-e jpg,png`.
    #[arg(short = 'e', long = "ext", value_name = "EXT", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Number of hashing threads (default: one per core)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub io_threads: Option<u16>,

    /// Ignore zero-length files
    #[arg(long)]
    pub skip_empty: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Delete these paths after the scan (requires --yes)
    ///
    /// Only members of a duplicate group found by this scan are removed.
    #[arg(long, value_name = "PATH", num_args = 1..)]
    pub remove: Vec<PathBuf>,

    /// Confirm deletion of the paths given with --remove
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Move removed files to the trash instead of deleting them
    #[arg(long)]
    pub trash: bool,

    /// Emit errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Read defaults from this config file instead of the platform default
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Arguments for the config subcommand.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Action to perform
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum ConfigAction {
    /// Print the config file location
    Path,
    /// Print the effective configuration as JSON
    Show,
    /// Write a default config file if none exists
    Init,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    /// JSON document for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
