// src/config/build.rs

//! Turning a validated `ConfigFile` into runtime objects: the task registry,
//! the watch rules and the watch-mode settings.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::model::{ConfigFile, WatchConfig};
use crate::engine::session::WatchSettings;
use crate::errors::Result;
use crate::exec::{NoopAction, ShellCommandAction, TaskAction};
use crate::registry::TaskRegistry;
use crate::watch::WatchRule;

impl ConfigFile {
    /// Build a registry with one task per `[task.<name>]` section.
    ///
    /// Commands run through the shell with `base_dir` as working directory.
    /// Tasks without commands become no-op aggregates of their `after` list.
    pub fn build_registry(&self, base_dir: &Path) -> Result<TaskRegistry> {
        let mut registry = TaskRegistry::new();

        for (name, task) in self.tasks() {
            let commands = task.commands();
            let action: Arc<dyn TaskAction> = if commands.is_empty() {
                Arc::new(NoopAction)
            } else {
                Arc::new(ShellCommandAction::new(commands).in_dir(base_dir))
            };

            debug!(task = %name, after = ?task.after, action = %action.describe(), "declaring task");
            // Section order is alphabetical, so dependencies may come later.
            registry.declare(name.as_str(), task.after.iter().cloned(), action)?;
        }

        Ok(registry)
    }

    /// One `WatchRule` per `[[watch]]` entry, in file order.
    pub fn watch_rules(&self) -> Vec<WatchRule> {
        self.watch_configs().iter().map(watch_rule_from_config).collect()
    }

    /// Watch-mode settings from `[config]`. `initial_run` defaults to `true`.
    pub fn watch_settings(&self) -> WatchSettings {
        let section = self.config_section();
        WatchSettings {
            behaviour: section.triggered_while_running,
            queue_length: section.queue_length,
            debounce: Duration::from_millis(section.debounce_ms),
            initial_run: true,
        }
    }

    /// Task run by `taskwatch run` without a name.
    pub fn default_task(&self) -> Option<&str> {
        self.config_section().default_task.as_deref()
    }
}

fn watch_rule_from_config(cfg: &WatchConfig) -> WatchRule {
    WatchRule {
        patterns: cfg.patterns.clone(),
        exclude: cfg.exclude.clone(),
        tasks: cfg.tasks.clone(),
    }
}
