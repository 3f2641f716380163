use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "subwatch", version, about = "Scan, download and watch a subtitle batch job")]
pub struct Cli {
    /// Config file (RON). Missing file means built-in defaults.
    #[arg(long, default_value = "subwatch.ron")]
    pub config: PathBuf,

    /// Backend base URL, overrides the config file.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Poll interval in milliseconds, overrides the config file.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_ms: Option<u64>,

    /// Where log records go, overrides the config file.
    #[arg(long, value_enum)]
    pub log: Option<LogTarget>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Scan the backend and list the discovered videos.
    Scan,
    /// Scan, start the download job and watch it until it finishes.
    Run,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}
