//! Command-line interface definitions for loctree.
//!
//! This module defines all CLI arguments, subcommands, and options using the
//! clap derive API: global options (verbosity, color, error format) and the
//! `count` subcommand.
//!
//! # Example
//!
//! ```bash
//! # Count the current directory
//! loctree count
//!
//! # Count another repository, skipping vendored code
//! loctree count --repo ../service --ignore vendor,target
//!
//! # Include blank lines, exclude comment-like lines
//! loctree count --blanks --comments false
//!
//! # JSON totals for scripting
//! loctree count --output json
//! ```

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Concurrent line counter with a colored tree view.
///
/// loctree counts lines of text across a directory tree with a bounded
/// fan-out parallel walker, rendering the tree and a progress loader while
/// files complete.
#[derive(Debug, Parser)]
#[command(name = "loctree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report fatal errors as machine-readable JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for loctree.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Count lines across a directory tree
    Count(CountArgs),
}

/// Arguments for the count subcommand.
#[derive(Debug, Args)]
pub struct CountArgs {
    /// Repository (directory) whose lines to count
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub repo: PathBuf,

    /// Comma-separated tokens; any path containing one is excluded
    #[arg(long, value_name = "TOKENS", default_value = "", hide_default_value = true)]
    pub ignore: String,

    /// Include blank lines in the count
    #[arg(
        long,
        value_name = "BOOL",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true"
    )]
    pub blanks: bool,

    /// Include comment-like lines in the count
    #[arg(
        long,
        value_name = "BOOL",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true"
    )]
    pub comments: bool,

    /// Recurse into subdirectories
    #[arg(
        long,
        value_name = "BOOL",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true"
    )]
    pub recursive: bool,

    /// Output format for the final totals
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Output format for the final totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON for scripting
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

/// Split a comma-separated ignore string into tokens.
///
/// Tokens are trimmed; empty tokens are dropped, so an empty string means
/// nothing is ignored.
#[must_use]
pub fn parse_ignore_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
