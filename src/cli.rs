// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! `wind` with no subcommand behaves like `wind init`. `wind help` is
//! provided by clap; `wind version` mirrors `-v`/`--version`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `wind`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "wind",
    version,
    disable_version_flag = true,
    about = "Watch a Go web application, rebuild it and restart it on every change.",
    long_about = None
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WIND_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// How often to scan for changes, in milliseconds (default 500).
    #[arg(long, value_name = "MS", global = true)]
    pub poll_interval_ms: Option<u64>,

    /// How long to wait after the first change before rebuilding, in
    /// milliseconds (default 300).
    #[arg(long, value_name = "MS", global = true)]
    pub debounce_ms: Option<u64>,

    /// Detect the project layout and print the effective configuration,
    /// but don't build or run anything.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Print the version and exit.
    #[arg(short = 'v', long = "version")]
    pub print_version: bool,
}

impl CliArgs {
    /// `wind version`, `wind -v` or `wind --version`.
    pub fn wants_version(&self) -> bool {
        self.print_version || self.command == Some(Command::Version)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Start watching the current directory (the default).
    Init,
    /// Print the version and exit.
    Version,
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
