// src/engine/session.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::core::WatchCore;
use crate::engine::runner::TaskRunner;
use crate::engine::runtime::WatchRuntime;
use crate::engine::{RuntimeEvent, RuntimeOptions, TaskName, TriggerReason};
use crate::errors::{Result, TaskwatchError};
use crate::types::TriggerWhileRunningBehaviour;
use crate::watch::{spawn_watcher, CompiledWatchRule, WatchRule};

/// Tunables for watch mode, usually taken from the `[config]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSettings {
    pub behaviour: TriggerWhileRunningBehaviour,
    /// Maximum follow-up runs remembered per task (queue mode).
    pub queue_length: usize,
    /// Window over which filesystem events are batched.
    pub debounce: Duration,
    /// Run every rule's tasks once before waiting for changes.
    pub initial_run: bool,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            behaviour: TriggerWhileRunningBehaviour::Queue,
            queue_length: 1,
            debounce: Duration::from_millis(100),
            initial_run: true,
        }
    }
}

/// A set of watch rules bound to a runner and a project root.
#[derive(Debug)]
pub struct WatchSession {
    runner: Arc<TaskRunner>,
    root: PathBuf,
    rules: Vec<CompiledWatchRule>,
    settings: WatchSettings,
}

impl WatchSession {
    pub fn new(runner: Arc<TaskRunner>, root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            root: root.into(),
            rules: Vec::new(),
            settings: WatchSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: WatchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Register a rule. Every task it names must exist in the runner's
    /// registry; the patterns must be valid globs.
    pub fn watch(&mut self, rule: WatchRule) -> Result<()> {
        if let Some(missing) = rule
            .tasks
            .iter()
            .find(|t| !self.runner.registry().contains(t))
        {
            return Err(TaskwatchError::TaskNotFound(missing.clone()));
        }

        let compiled = rule.compile()?;
        info!(patterns = ?rule.patterns, tasks = ?rule.tasks, "watch rule registered");
        self.rules.push(compiled);
        Ok(())
    }

    pub fn rules(&self) -> &[CompiledWatchRule] {
        &self.rules
    }

    /// Tasks of all rules, each once, in rule order.
    pub fn initial_tasks(&self) -> Vec<TaskName> {
        let mut tasks: Vec<TaskName> = Vec::new();
        for rule in &self.rules {
            for task in rule.tasks() {
                if !tasks.contains(task) {
                    tasks.push(task.clone());
                }
            }
        }
        tasks
    }

    /// Watch until Ctrl-C.
    ///
    /// Task failures are logged and never end the session.
    pub async fn run(self) -> Result<()> {
        if self.rules.is_empty() {
            return Err(TaskwatchError::ConfigError(
                "nothing to watch: no [[watch]] rules configured".to_string(),
            ));
        }

        let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

        let _watcher_handle = spawn_watcher(
            self.root.clone(),
            self.rules.clone(),
            rt_tx.clone(),
            self.settings.debounce,
        )?;

        // Ctrl-C → graceful shutdown.
        {
            let tx = rt_tx.clone();
            tokio::spawn(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    eprintln!("failed to listen for Ctrl+C: {e}");
                    return;
                }
                if tx.send(RuntimeEvent::ShutdownRequested).await.is_err() {
                    debug!("runtime already stopped before Ctrl+C shutdown");
                }
            });
        }

        if self.settings.initial_run {
            let tasks = self.initial_tasks();
            info!(?tasks, "initial run of watched tasks");
            rt_tx
                .send(RuntimeEvent::TasksTriggered {
                    tasks,
                    reason: TriggerReason::Initial,
                })
                .await
                .map_err(anyhow::Error::from)?;
        }

        let core = WatchCore::new(
            self.settings.behaviour,
            self.settings.queue_length,
            RuntimeOptions::default(),
        );

        WatchRuntime::new(core, self.runner, rt_tx, rt_rx).run().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::NoopAction;
    use crate::registry::TaskRegistry;

    fn session() -> WatchSession {
        let mut reg = TaskRegistry::new();
        reg.register("elm-init", Vec::<String>::new(), Arc::new(NoopAction)).unwrap();
        reg.register("make", ["elm-init"], Arc::new(NoopAction)).unwrap();
        reg.register("test", ["elm-init"], Arc::new(NoopAction)).unwrap();
        WatchSession::new(Arc::new(TaskRunner::new(reg)), ".")
    }

    #[test]
    fn rules_must_name_registered_tasks() {
        let mut s = session();
        let err = s.watch(WatchRule::new("docs/**", ["docs"])).unwrap_err();
        assert!(matches!(err, TaskwatchError::TaskNotFound(ref t) if t == "docs"));
        assert!(s.rules().is_empty());
    }

    #[test]
    fn initial_tasks_follow_rule_order() {
        let mut s = session();
        s.watch(WatchRule::new("src/**", ["make"])).unwrap();
        s.watch(WatchRule::new("tests/**", ["test", "make"])).unwrap();
        assert_eq!(s.initial_tasks(), ["make", "test"]);
    }

    #[tokio::test]
    async fn run_without_rules_is_an_error() {
        assert!(matches!(
            session().run().await,
            Err(TaskwatchError::ConfigError(_))
        ));
    }
}
