// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `pipejoin`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pipejoin",
    version,
    about = "Run a transfer command between optional input and output filters, connected by OS pipes.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a pipeline definition (TOML).
    ///
    /// Falls back to `PIPEJOIN_CONFIG` when neither this nor a transfer
    /// command is given.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Command feeding the transfer stage's stdin, e.g. "gojq -n '{}'".
    #[arg(long, value_name = "CMD")]
    pub input_filter: Option<String>,

    /// Command reading the transfer stage's stdout, e.g. "gojq -r .name".
    #[arg(long, value_name = "CMD")]
    pub output_filter: Option<String>,

    /// Kill the remaining stages as soon as one stage fails.
    #[arg(long)]
    pub fail_fast: bool,

    /// Read the pipeline's stdin from this file.
    #[arg(long, value_name = "PATH")]
    pub stdin: Option<PathBuf>,

    /// Write the pipeline's stdout to this file (created or truncated).
    #[arg(long, value_name = "PATH")]
    pub stdout: Option<PathBuf>,

    /// Write every stage's stderr to this file (created or truncated).
    #[arg(long, value_name = "PATH")]
    pub stderr: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PIPEJOIN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the stages, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Transfer command and its arguments, after `--`.
    #[arg(last = true, value_name = "TRANSFER")]
    pub transfer: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
