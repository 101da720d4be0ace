//! CLI argument definitions for the deduplication engine.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "dedup",
    version,
    about = "Record deduplication engine - score, group, and merge duplicate records",
    long_about = "Find duplicate records with weighted per-field matching,\n\
                  group them transitively, and merge each group into a master\n\
                  record while preserving every conflicting value for audit."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deduplicate records exported to a CSV file.
    Run(RunArgs),

    /// List the built-in field matchers and the kinds they handle.
    Matchers,
}

#[derive(Parser)]
pub struct RunArgs {
    /// CSV export with `id` and `created_at` columns plus one column per field.
    #[arg(value_name = "RECORDS_CSV")]
    pub records_csv: PathBuf,

    /// Match configuration JSON (field weights, strategies, threshold).
    #[arg(long = "config", value_name = "PATH")]
    pub config: PathBuf,

    /// Plan merges and report statistics without applying anything.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Override the configured match threshold (0.0 to 1.0).
    #[arg(long = "threshold", value_name = "SCORE")]
    pub threshold: Option<f64>,

    /// Override the configured repository page size.
    #[arg(long = "page-size", value_name = "N")]
    pub page_size: Option<usize>,

    /// Override the configured master selection strategy.
    #[arg(long = "strategy", value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Write each merge plan as a JSON file into this directory.
    #[arg(long = "plans-out", value_name = "DIR")]
    pub plans_out: Option<PathBuf>,
}

/// CLI master selection choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    Oldest,
    Newest,
    MostComplete,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
