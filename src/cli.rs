// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::DEFAULT_CONFIG_FILE;

/// Command-line arguments for `taskwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskwatch",
    version,
    about = "Run named build tasks in dependency order, and re-run them when files change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Commands run in, and watch patterns are relative to, its directory.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run a task after all of its dependencies.
    Run {
        /// Task to run; defaults to `[config].default_task`.
        #[arg(value_name = "TASK")]
        task: Option<String>,
    },

    /// Watch the project and re-run tasks when matching files change.
    Watch {
        /// Skip the initial run of every watched task.
        #[arg(long)]
        no_initial: bool,
    },

    /// Print tasks, dependencies, commands and watch rules.
    List,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
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
