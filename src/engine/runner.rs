// src/engine/runner.rs

//! Executes a task and its prerequisites.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, error, info, warn};

use crate::dag::{resolve_plan, RunReport, RunState};
use crate::engine::TaskName;
use crate::errors::{Result, TaskwatchError};
use crate::exec::TaskContext;
use crate::registry::TaskRegistry;

/// Runs tasks from a [`TaskRegistry`].
///
/// Each call to [`run`](Self::run) is one invocation: the plan is resolved
/// up front, then actions execute one at a time in plan order. Every task
/// name has its own async lock, so concurrent invocations sharing a
/// prerequisite never execute that prerequisite at the same time.
#[derive(Debug)]
pub struct TaskRunner {
    registry: TaskRegistry,
    locks: Mutex<HashMap<TaskName, Arc<tokio::sync::Mutex<()>>>>,
    run_counter: AtomicU64,
}

impl TaskRunner {
    pub fn new(registry: TaskRegistry) -> Self {
        Self {
            registry,
            locks: Mutex::new(HashMap::new()),
            run_counter: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Run `name` after all of its transitive prerequisites.
    ///
    /// Fails with `TaskNotFound`, `UnknownDependency` or `CyclicDependency`
    /// before any action executes, and with the first `TaskExecution` error if
    /// a task in the plan failed.
    pub async fn run(&self, name: &str) -> Result<RunReport> {
        self.run_report(name).await?.into_result()
    }

    /// Like [`run`](Self::run), but a task failure is returned inside the
    /// report instead of as an error. Only plan-resolution problems are `Err`.
    pub async fn run_report(&self, name: &str) -> Result<RunReport> {
        let order = resolve_plan(&self.registry, name)?;
        let run_id = self.run_counter.fetch_add(1, Ordering::SeqCst) + 1;

        info!(task = %name, run_id, plan = ?order, "starting run");

        let mut state = RunState::new(&self.registry, name, order, run_id);
        let mut first_failure: Option<TaskwatchError> = None;

        while let Some(task) = state.next_ready() {
            match self.execute_one(&task, run_id).await {
                Ok(()) => state.mark_success(&task),
                Err(err) => {
                    error!(task = %task, run_id, error = %err, "task failed");
                    let skipped = state.mark_failed(&task);
                    if !skipped.is_empty() {
                        warn!(task = %task, run_id, ?skipped, "skipping dependents of failed task");
                    }
                    first_failure.get_or_insert(err);
                }
            }
        }

        let report = state.into_report(first_failure);
        info!(
            task = %name,
            run_id,
            success = report.is_success(),
            executed = report.executed.len(),
            "run finished"
        );
        Ok(report)
    }

    /// Execute a single task's action while holding that task's lock.
    async fn execute_one(&self, task: &str, run_id: u64) -> Result<()> {
        let spec = self
            .registry
            .get(task)
            .ok_or_else(|| TaskwatchError::TaskNotFound(task.to_string()))?;

        let lock = self.lock_for(task);
        let _guard = match lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!(task = %task, run_id, "task already executing elsewhere; waiting");
                lock.lock().await
            }
        };

        debug!(task = %task, run_id, action = %spec.action().describe(), "executing task");
        let ctx = TaskContext {
            task: task.to_string(),
            run_id,
        };

        spec.action()
            .execute(ctx)
            .await
            .map_err(|err| into_execution_error(task, err))
    }

    fn lock_for(&self, task: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(locks.entry(task.to_string()).or_default())
    }
}

/// Any error from an action counts as a task execution failure.
fn into_execution_error(task: &str, err: TaskwatchError) -> TaskwatchError {
    match err {
        e @ TaskwatchError::TaskExecution { .. } => e,
        other => TaskwatchError::TaskExecution {
            task: task.to_string(),
            exit_code: -1,
            output: other.to_string(),
        },
    }
}
