// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `cycleflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cycleflow",
    version,
    about = "Validate and inspect cyclic workflow definitions.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the workflow definition (TOML).
    ///
    /// Default: `Workflow.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Workflow.toml")]
    pub workflow: String,

    /// Cycle point to resolve graph children at.
    ///
    /// Defaults to the workflow's initial point.
    #[arg(long, value_name = "POINT")]
    pub point: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CYCLEFLOW_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
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
