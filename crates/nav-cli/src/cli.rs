//! Command-line arguments for `navctl`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "navctl",
    version,
    about = "Replay navigation scenarios and inspect container state",
    long_about = "Replay a scripted navigation scenario (TOML) through a navigation \
                  controller.\n\n\
                  Scenarios declare destinations, containers, and events such as opens, \
                  closes with results, visibility changes, snapshots, and restores."
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

    /// Log output format (pretty for humans, json for machine parsing).
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
    /// Replay a scenario and print the final container state.
    Run(RunArgs),

    /// Validate and replay a scenario without printing state.
    Check(CheckArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Scenario file to replay.
    #[arg(value_name = "SCENARIO")]
    pub scenario: PathBuf,

    /// Navigation config (TOML) replacing the scenario's [config] table.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Treat opens no container accepts as errors.
    #[arg(long = "strict")]
    pub strict: bool,

    /// Print the final state as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,

    /// Write the final navigation snapshot to this file.
    #[arg(long = "save", value_name = "PATH")]
    pub save: Option<PathBuf>,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Scenario file to check.
    #[arg(value_name = "SCENARIO")]
    pub scenario: PathBuf,

    /// Navigation config (TOML) replacing the scenario's [config] table.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
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
