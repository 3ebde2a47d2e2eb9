//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "governor")]
#[command(author, version, about = "Risk-and-execution governor for a single-instrument trading loop")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the governed trading loop (paper mode)
    Run(RunArgs),
    /// Print the persisted risk state
    Status,
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Stop after this many polling cycles (replay runs)
    #[arg(long)]
    pub max_cycles: Option<u64>,

    /// Poll as fast as the feed allows instead of waiting out the interval
    #[arg(long)]
    pub fast_replay: bool,
}
