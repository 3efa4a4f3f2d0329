// src/engine/runtime.rs

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::engine::core::WatchCore;
use crate::engine::runner::TaskRunner;
use crate::engine::{CoreCommand, RuntimeEvent, TaskName, TaskOutcome};
use crate::errors::Result;

/// Async shell around [`WatchCore`].
///
/// Reads events one at a time, feeds them to the core and carries out the
/// returned commands: spawning `TaskRunner::run` for a task, aborting a
/// replaced run, or exiting. Finished runs report back through the same
/// event channel.
pub struct WatchRuntime {
    core: WatchCore,
    runner: Arc<TaskRunner>,
    event_tx: mpsc::Sender<RuntimeEvent>,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    /// Spawned runs keyed by run id.
    active: HashMap<u64, JoinHandle<()>>,
}

impl fmt::Debug for WatchRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchRuntime")
            .field("core", &self.core)
            .field("active", &self.active.len())
            .finish_non_exhaustive()
    }
}

impl WatchRuntime {
    /// `event_tx` must feed `event_rx`; spawned runs use it to report back.
    pub fn new(
        core: WatchCore,
        runner: Arc<TaskRunner>,
        event_tx: mpsc::Sender<RuntimeEvent>,
        event_rx: mpsc::Receiver<RuntimeEvent>,
    ) -> Self {
        Self {
            core,
            runner,
            event_tx,
            event_rx,
            active: HashMap::new(),
        }
    }

    /// Main event loop. Returns when the core asks to stop.
    pub async fn run(mut self) -> Result<()> {
        info!("watch runtime started");

        while let Some(event) = self.event_rx.recv().await {
            debug!(?event, "runtime received event");

            if let RuntimeEvent::RunFinished { run_id, .. } = &event {
                self.active.remove(run_id);
            }

            let step = self.core.step(event);
            for command in step.commands {
                self.execute_command(command);
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        self.abort_all();
        info!("watch runtime exiting");
        Ok(())
    }

    fn execute_command(&mut self, command: CoreCommand) {
        match command {
            CoreCommand::StartRun { task, run_id } => self.spawn_run(task, run_id),
            CoreCommand::CancelRun { task, run_id } => {
                if let Some(handle) = self.active.remove(&run_id) {
                    info!(task = %task, run_id, "aborting in-flight run");
                    handle.abort();
                }
            }
            CoreCommand::RequestExit => {
                debug!("core issued RequestExit command");
            }
        }
    }

    fn spawn_run(&mut self, task: TaskName, run_id: u64) {
        let runner = Arc::clone(&self.runner);
        let tx = self.event_tx.clone();

        let handle = tokio::spawn(async move {
            // Inner task so a panicking action still reports `RunFinished`.
            let mut inner = AbortOnDrop(tokio::spawn({
                let task = task.clone();
                async move { runner.run(&task).await }
            }));

            let outcome = match (&mut inner.0).await {
                Ok(Ok(_)) => TaskOutcome::Success,
                Ok(Err(err)) => {
                    error!(task = %task, run_id, "{err}");
                    TaskOutcome::Failed
                }
                Err(join_err) => {
                    error!(task = %task, run_id, "run aborted: {join_err}");
                    TaskOutcome::Failed
                }
            };

            if tx
                .send(RuntimeEvent::RunFinished {
                    task,
                    run_id,
                    outcome,
                })
                .await
                .is_err()
            {
                debug!(run_id, "runtime gone before run finished");
            }
        });

        self.active.insert(run_id, handle);
    }

    fn abort_all(&mut self) {
        for (run_id, handle) in self.active.drain() {
            if !handle.is_finished() {
                debug!(run_id, "aborting run on shutdown");
                handle.abort();
            }
        }
    }
}

/// Aborts the wrapped task when dropped, so cancelling the outer run also
/// stops the actions it started.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}
