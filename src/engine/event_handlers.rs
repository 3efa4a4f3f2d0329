// src/engine/event_handlers.rs

//! Event handling logic for the watch core.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeOptions, TaskName, TaskOutcome, TriggerReason};
use crate::types::TriggerWhileRunningBehaviour;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start `TaskRunner::run(task)`; report back with this `run_id`.
    StartRun { task: TaskName, run_id: u64 },
    /// Abort the in-flight run with this `run_id`.
    CancelRun { task: TaskName, run_id: u64 },
    /// Request that the runtime exits.
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub fn continue_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Which runs are in flight, keyed by task name.
///
/// At most one run per task name exists at any time; this is what keeps
/// watch-triggered runs of the same task from overlapping.
#[derive(Debug, Default)]
pub struct InFlight {
    runs: HashMap<TaskName, u64>,
    run_counter: u64,
}

impl InFlight {
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn run_id_of(&self, task: &str) -> Option<u64> {
        self.runs.get(task).copied()
    }

    /// Allocate a run id for `task` and record it as in flight.
    fn start(&mut self, task: &str) -> CoreCommand {
        self.run_counter += 1;
        self.runs.insert(task.to_string(), self.run_counter);
        CoreCommand::StartRun {
            task: task.to_string(),
            run_id: self.run_counter,
        }
    }

    /// Remove `task` if `run_id` is its current run. Stale ids are rejected.
    fn finish(&mut self, task: &str, run_id: u64) -> bool {
        if self.runs.get(task) == Some(&run_id) {
            self.runs.remove(task);
            true
        } else {
            false
        }
    }
}

/// Handle a batch of triggered tasks.
///
/// - Idle tasks start immediately.
/// - Running tasks follow the configured behaviour: `Queue` records a
///   follow-up run, `Cancel` aborts the current run and starts a new one.
pub fn handle_tasks_triggered(
    in_flight: &mut InFlight,
    queue: &mut TriggerQueue,
    behaviour: TriggerWhileRunningBehaviour,
    tasks: Vec<TaskName>,
    reason: TriggerReason,
) -> CoreStep {
    let mut commands = Vec::new();

    for task in tasks {
        match in_flight.run_id_of(&task) {
            None => {
                debug!(task = %task, ?reason, "starting run");
                commands.push(in_flight.start(&task));
            }
            Some(current) => match behaviour {
                TriggerWhileRunningBehaviour::Queue => {
                    queue.record_trigger(&task);
                }
                TriggerWhileRunningBehaviour::Cancel => {
                    info!(task = %task, run_id = current, "re-triggered while running; restarting");
                    queue.clear(&task);
                    commands.push(CoreCommand::CancelRun {
                        task: task.clone(),
                        run_id: current,
                    });
                    commands.push(in_flight.start(&task));
                }
            },
        }
    }

    CoreStep::continue_with(commands)
}

/// Handle the end of a run.
///
/// Completions from runs that were cancelled and replaced are ignored. If a
/// follow-up run was queued while this one executed, it starts now.
pub fn handle_run_finished(
    in_flight: &mut InFlight,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    task: TaskName,
    run_id: u64,
    outcome: TaskOutcome,
) -> CoreStep {
    if !in_flight.finish(&task, run_id) {
        debug!(task = %task, run_id, "ignoring completion of a replaced run");
        return CoreStep::continue_with(Vec::new());
    }

    match outcome {
        TaskOutcome::Success => info!(task = %task, run_id, "run succeeded"),
        TaskOutcome::Failed => warn!(task = %task, run_id, "run failed; still watching"),
    }

    let mut commands = Vec::new();
    if queue.take(&task) {
        debug!(task = %task, "starting queued follow-up run");
        commands.push(in_flight.start(&task));
    }

    if options.exit_when_idle && in_flight.is_empty() && queue.is_empty() {
        commands.push(CoreCommand::RequestExit);
        return CoreStep {
            commands,
            keep_running: false,
        };
    }

    CoreStep::continue_with(commands)
}
