// src/dag/run_state.rs

//! Per-invocation state of a resolved plan.

use std::collections::HashMap;

use tracing::debug;

use crate::dag::graph::DagGraph;
use crate::engine::TaskName;
use crate::errors::{Result, TaskwatchError};
use crate::registry::TaskRegistry;

/// State of one task within a single `run` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    /// Waiting for its turn in the plan.
    Pending,
    /// Action currently executing.
    Running,
    DoneSuccess,
    DoneFailed,
    /// Not executed because a prerequisite failed.
    Skipped,
}

impl TaskRunState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskRunState::DoneSuccess | TaskRunState::DoneFailed | TaskRunState::Skipped
        )
    }
}

/// Mutable state machine for one plan.
///
/// Tasks are handed out strictly in plan order. A failed task marks every
/// task in the plan that transitively depends on it as `Skipped`; tasks that
/// don't depend on the failure keep running.
#[derive(Debug)]
pub struct RunState {
    run_id: u64,
    target: TaskName,
    order: Vec<TaskName>,
    graph: DagGraph,
    states: HashMap<TaskName, TaskRunState>,
    executed: Vec<TaskName>,
}

impl RunState {
    pub fn new(registry: &TaskRegistry, target: &str, order: Vec<TaskName>, run_id: u64) -> Self {
        let graph = DagGraph::from_subset(registry, &order);
        let states = order
            .iter()
            .map(|n| (n.clone(), TaskRunState::Pending))
            .collect();

        Self {
            run_id,
            target: target.to_string(),
            order,
            graph,
            states,
            executed: Vec::new(),
        }
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn state_of(&self, task: &str) -> Option<TaskRunState> {
        self.states.get(task).copied()
    }

    /// Next pending task whose prerequisites all succeeded, marked `Running`.
    ///
    /// Returns `None` once nothing else can run.
    pub fn next_ready(&mut self) -> Option<TaskName> {
        let next = self.order.iter().find(|name| {
            self.states.get(*name) == Some(&TaskRunState::Pending)
                && self
                    .graph
                    .dependencies_of(name)
                    .iter()
                    .all(|d| self.states.get(d) == Some(&TaskRunState::DoneSuccess))
        })?;

        let next = next.clone();
        self.states.insert(next.clone(), TaskRunState::Running);
        self.executed.push(next.clone());
        Some(next)
    }

    pub fn mark_success(&mut self, task: &str) {
        if let Some(state) = self.states.get_mut(task) {
            *state = TaskRunState::DoneSuccess;
            debug!(task = %task, run_id = self.run_id, "task completed successfully");
        }
    }

    /// Mark `task` failed and skip everything downstream of it.
    ///
    /// Returns the tasks newly marked as skipped.
    pub fn mark_failed(&mut self, task: &str) -> Vec<TaskName> {
        if let Some(state) = self.states.get_mut(task) {
            *state = TaskRunState::DoneFailed;
        }

        let mut stack: Vec<TaskName> = self.graph.dependents_of(task).to_vec();
        let mut skipped = Vec::new();

        while let Some(name) = stack.pop() {
            if let Some(state) = self.states.get_mut(&name) {
                if *state == TaskRunState::Pending {
                    *state = TaskRunState::Skipped;
                    debug!(
                        task = %name,
                        failed = %task,
                        run_id = self.run_id,
                        "skipping task due to upstream failure"
                    );
                    skipped.push(name.clone());
                    stack.extend(self.graph.dependents_of(&name).iter().cloned());
                }
            }
        }

        skipped
    }

    pub fn is_finished(&self) -> bool {
        self.states.values().all(|s| s.is_terminal())
    }

    /// Summarise the finished run. `failure` is the first error observed.
    pub fn into_report(self, failure: Option<TaskwatchError>) -> RunReport {
        let pick = |wanted: TaskRunState| -> Vec<TaskName> {
            self.order
                .iter()
                .filter(|n| self.states.get(*n) == Some(&wanted))
                .cloned()
                .collect()
        };

        RunReport {
            run_id: self.run_id,
            succeeded: pick(TaskRunState::DoneSuccess),
            failed: pick(TaskRunState::DoneFailed),
            skipped: pick(TaskRunState::Skipped),
            target: self.target,
            executed: self.executed,
            failure,
        }
    }
}

/// Outcome of one `run` invocation.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: u64,
    pub target: TaskName,
    /// Tasks whose actions were started, in execution order.
    pub executed: Vec<TaskName>,
    pub succeeded: Vec<TaskName>,
    pub failed: Vec<TaskName>,
    pub skipped: Vec<TaskName>,
    /// First failure of the run, if any.
    pub failure: Option<TaskwatchError>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Convert into a `Result`, surfacing the first failure as the error.
    pub fn into_result(mut self) -> Result<RunReport> {
        match self.failure.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}
