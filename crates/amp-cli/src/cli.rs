//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "amp-transform",
    version,
    about = "Transform enriched analytics events into Amplitude HTTP API payloads",
    long_about = "Transform enriched analytics events into Amplitude HTTP API payloads.\n\n\
                  Reads one engine-protocol object ({\"Data\": {...}}) per line and\n\
                  writes one result per line."
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

    /// Allow event values to appear in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check a transformation configuration and list its issues.
    Validate(ValidateArgs),

    /// Transform newline-delimited engine-protocol events.
    Run(RunArgs),
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Configuration file (.json or .toml).
    #[arg(long = "config", value_name = "FILE")]
    pub config: PathBuf,

    /// Stop at the first failing check.
    #[arg(long = "fail-fast")]
    pub fail_fast: bool,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Configuration file (.json or .toml); required for the amplitude recipe.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Input file with one event per line (default: stdin).
    #[arg(long = "input", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Transformation to apply.
    #[arg(long = "recipe", value_enum, default_value = "amplitude")]
    pub recipe: RecipeArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RecipeArg {
    /// Amplitude HTTP API upload bodies.
    Amplitude,
    /// Keep web events and set `uid`.
    WebUid,
    /// Drop events without a batmobile and set `name`.
    Batmobile,
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
