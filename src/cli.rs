// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! NOTE: this expects `clap` to be built with the `derive` feature, e.g.:
//! `clap = { version = "4.5.53", features = ["derive"] }` in `Cargo.toml`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `traindag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "traindag",
    version,
    about = "Train and serve a graph-described image classification pipeline.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the engine config file (TOML).
    ///
    /// If omitted, `Traindag.toml` in the current working directory is used
    /// when present, otherwise built-in defaults apply.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the artifact directory from config.
    #[arg(long, value_name = "DIR")]
    pub artifact_dir: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TRAINDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

/// One invocation handles exactly one job.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run a training job; reads the payload JSON from stdin.
    Train {
        /// Read the payload from a file instead of stdin.
        #[arg(long, value_name = "PATH")]
        payload: Option<PathBuf>,

        /// Parse + sequence the pipeline, print the plan, but don't train.
        #[arg(long)]
        dry_run: bool,
    },

    /// Classify one image with previously trained artifacts; reads the
    /// request JSON from stdin.
    Predict {
        /// Read the request from a file instead of stdin.
        #[arg(long, value_name = "PATH")]
        payload: Option<PathBuf>,
    },
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
