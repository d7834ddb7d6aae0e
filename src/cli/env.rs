use clap::Parser;
use std::path::PathBuf;

use super::commands::Commands;
use super::output::OutputFormat;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "pagepilot", author, version, long_version = LONG_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Also write logs to daily files under this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Report output format
    #[arg(short, long, default_value = "human")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}
