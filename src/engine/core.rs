// src/engine/core.rs

//! Pure watch-mode state machine.
//!
//! The core consumes [`RuntimeEvent`]s and returns [`CoreCommand`]s; it owns
//! no channels, spawns nothing and performs no IO, so the trigger semantics
//! can be tested synchronously.

use crate::engine::event_handlers::{
    handle_run_finished, handle_tasks_triggered, CoreCommand, CoreStep, InFlight,
};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::types::TriggerWhileRunningBehaviour;

#[derive(Debug)]
pub struct WatchCore {
    behaviour: TriggerWhileRunningBehaviour,
    in_flight: InFlight,
    queue: TriggerQueue,
    options: RuntimeOptions,
}

impl WatchCore {
    pub fn new(
        behaviour: TriggerWhileRunningBehaviour,
        queue_length: usize,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            behaviour,
            in_flight: InFlight::default(),
            queue: TriggerQueue::new(queue_length),
            options,
        }
    }

    /// No run in flight.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn run_id_of(&self, task: &str) -> Option<u64> {
        self.in_flight.run_id_of(task)
    }

    /// Handle a single runtime event, returning the commands for the shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TasksTriggered { tasks, reason } => handle_tasks_triggered(
                &mut self.in_flight,
                &mut self.queue,
                self.behaviour,
                tasks,
                reason,
            ),
            RuntimeEvent::RunFinished {
                task,
                run_id,
                outcome,
            } => handle_run_finished(
                &mut self.in_flight,
                &mut self.queue,
                &self.options,
                task,
                run_id,
                outcome,
            ),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: vec![CoreCommand::RequestExit],
                keep_running: false,
            },
        }
    }
}
