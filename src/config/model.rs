// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::TriggerWhileRunningBehaviour;

/// Configuration exactly as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// default_task = "make"
///
/// [task.elm-init]
/// cmd = "elm package install --yes"
///
/// [task.make]
/// cmd = "elm make src/Main.elm --output dist/main.js"
/// after = ["elm-init"]
///
/// [[watch]]
/// patterns = ["src/**"]
/// tasks = ["make"]
/// ```
///
/// All sections are optional at the TOML level; validation requires at least
/// one task.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Global behaviour config from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,

    /// Watch rules from `[[watch]]`, in file order.
    #[serde(default)]
    pub watch: Vec<WatchConfig>,
}

/// A validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    config: ConfigSection,
    task: BTreeMap<String, TaskConfig>,
    watch: Vec<WatchConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        task: BTreeMap<String, TaskConfig>,
        watch: Vec<WatchConfig>,
    ) -> Self {
        Self {
            config,
            task,
            watch,
        }
    }

    pub fn config_section(&self) -> &ConfigSection {
        &self.config
    }

    pub fn tasks(&self) -> &BTreeMap<String, TaskConfig> {
        &self.task
    }

    pub fn watch_configs(&self) -> &[WatchConfig] {
        &self.watch
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Task run by `taskwatch run` when no task name is given.
    #[serde(default)]
    pub default_task: Option<String>,

    /// `"queue"` or `"cancel"`: what happens when a watched change
    /// re-triggers a task that is still running.
    #[serde(default)]
    pub triggered_while_running: TriggerWhileRunningBehaviour,

    /// Maximum follow-up runs remembered per task in queue mode.
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,

    /// Window (milliseconds) over which filesystem events are batched.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_queue_length() -> usize {
    1
}

fn default_debounce_ms() -> u64 {
    100
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            default_task: None,
            triggered_while_running: TriggerWhileRunningBehaviour::default(),
            queue_length: default_queue_length(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskConfig {
    /// A single shell command.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Several shell commands run in sequence, stopping at the first failure.
    /// Mutually exclusive with `cmd`.
    #[serde(default)]
    pub cmds: Option<Vec<String>>,

    /// Tasks that must succeed before this one runs.
    #[serde(default)]
    pub after: Vec<String>,
}

impl TaskConfig {
    /// Commands to execute; empty for aggregate tasks.
    pub fn commands(&self) -> Vec<String> {
        match (&self.cmd, &self.cmds) {
            (Some(cmd), _) => vec![cmd.clone()],
            (None, Some(cmds)) => cmds.clone(),
            (None, None) => Vec::new(),
        }
    }
}

/// `[[watch]]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchConfig {
    /// Globs relative to the config file's directory.
    pub patterns: Vec<String>,

    /// Globs that cancel a match.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Tasks run when a matching file changes.
    pub tasks: Vec<String>,
}
