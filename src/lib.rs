// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod registry;
pub mod types;
pub mod watch;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::cli::{CliArgs, Command};
use crate::config::loader::{config_root_dir, load_and_validate};
use crate::config::model::ConfigFile;
use crate::engine::{TaskRunner, WatchSession};
use crate::errors::{Result, TaskwatchError};

pub use crate::exec::{action_fn, TaskAction, TaskContext};
pub use crate::registry::{TaskRegistry, TaskSpec};
pub use crate::watch::WatchRule;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and validation
/// - the task registry and runner
/// - for `watch`: the file watcher, the watch runtime and Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;
    let root_dir = config_root_dir(&config_path);

    match args.command {
        Command::List => {
            let mut out = std::io::stdout().lock();
            print_list(&cfg, &mut out)?;
            Ok(())
        }
        Command::Run { task } => {
            let task = task
                .or_else(|| cfg.default_task().map(str::to_string))
                .ok_or_else(|| {
                    TaskwatchError::ConfigError(
                        "no task given and no [config].default_task configured".to_string(),
                    )
                })?;

            let runner = TaskRunner::new(cfg.build_registry(&root_dir)?);
            let report = runner.run(&task).await?;
            info!(task = %task, executed = ?report.executed, "done");
            Ok(())
        }
        Command::Watch { no_initial } => {
            let runner = Arc::new(TaskRunner::new(cfg.build_registry(&root_dir)?));

            let mut settings = cfg.watch_settings();
            settings.initial_run = !no_initial;

            let mut session = WatchSession::new(runner, root_dir).with_settings(settings);
            for rule in cfg.watch_rules() {
                session.watch(rule)?;
            }
            session.run().await
        }
    }
}

/// Print tasks, dependencies, commands and watch rules.
pub fn print_list(cfg: &ConfigFile, out: &mut impl Write) -> std::io::Result<()> {
    let section = cfg.config_section();
    writeln!(out, "taskwatch")?;
    if let Some(default) = &section.default_task {
        writeln!(out, "  config.default_task = {default}")?;
    }
    writeln!(
        out,
        "  config.triggered_while_running = {:?}",
        section.triggered_while_running
    )?;
    writeln!(out, "  config.queue_length = {}", section.queue_length)?;
    writeln!(out, "  config.debounce_ms = {}", section.debounce_ms)?;
    writeln!(out)?;

    writeln!(out, "tasks ({}):", cfg.tasks().len())?;
    for (name, task) in cfg.tasks() {
        writeln!(out, "  - {name}")?;
        for cmd in task.commands() {
            writeln!(out, "      cmd: {cmd}")?;
        }
        if !task.after.is_empty() {
            writeln!(out, "      after: {:?}", task.after)?;
        }
    }

    if !cfg.watch_configs().is_empty() {
        writeln!(out)?;
        writeln!(out, "watch ({}):", cfg.watch_configs().len())?;
        for rule in cfg.watch_configs() {
            writeln!(out, "  - {:?} -> {:?}", rule.patterns, rule.tasks)?;
            if !rule.exclude.is_empty() {
                writeln!(out, "      exclude: {:?}", rule.exclude)?;
            }
        }
    }

    Ok(())
}
