// src/engine/mod.rs

//! Orchestration engine for taskwatch.
//!
//! - [`runner`] owns the task registry and executes a task's plan
//!   (`TaskRunner::run`), serializing executions per task name.
//! - [`queue`] remembers re-triggers that arrive while a task is running.
//! - [`core`] is the pure watch-mode state machine: events in, commands out.
//! - [`event_handlers`] holds the per-event logic used by the core.
//! - [`runtime`] is the async shell that feeds the core from channels and
//!   spawns/aborts runs.
//! - [`session`] collects watch rules and wires watcher, runtime and Ctrl-C
//!   together.

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Outcome of one watch-triggered run, as reported back to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}

/// Why a task was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Initial run when watch mode starts.
    Initial,
    /// Triggered due to a filesystem event.
    FileWatch,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once no run is in flight and nothing is
    /// queued.
    pub exit_when_idle: bool,
}

/// Events flowing into the watch runtime from the watcher and finished runs.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// These tasks should be run, in order.
    TasksTriggered {
        tasks: Vec<TaskName>,
        reason: TriggerReason,
    },
    /// A run started by the runtime finished.
    RunFinished {
        task: TaskName,
        run_id: u64,
        outcome: TaskOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runner;
pub mod runtime;
pub mod session;

pub use self::core::WatchCore;
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::TriggerQueue;
pub use runner::TaskRunner;
pub use runtime::WatchRuntime;
pub use session::WatchSession;
pub use crate::types::TriggerWhileRunningBehaviour;
