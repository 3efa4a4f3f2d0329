// src/engine/queue.rs

use std::collections::HashMap;

use tracing::debug;

use crate::engine::TaskName;

/// Follow-up runs requested while a task was already running.
///
/// Semantics:
/// - Every task has its own counter of pending follow-up runs.
/// - `max_pending` caps that counter; triggers beyond the cap coalesce into
///   the runs already queued. With the default of 1, any number of changes
///   during a run results in exactly one more run afterwards.
/// - When a run finishes, the runtime calls [`take`](Self::take) to find out
///   whether the task should start again.
#[derive(Debug)]
pub struct TriggerQueue {
    max_pending: usize,
    pending: HashMap<TaskName, usize>,
}

impl TriggerQueue {
    /// `max_pending` is clamped to at least 1, as a zero-length queue would
    /// silently drop every change made during a run.
    pub fn new(max_pending: usize) -> Self {
        Self {
            max_pending: max_pending.max(1),
            pending: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Record a trigger for a task that is currently running.
    ///
    /// Returns `true` if a new follow-up run was queued, `false` if the
    /// trigger coalesced into one that was already pending.
    pub fn record_trigger(&mut self, task: &str) -> bool {
        let count = self.pending.entry(task.to_string()).or_insert(0);
        if *count < self.max_pending {
            *count += 1;
            debug!(task = %task, pending = *count, "queued follow-up run");
            true
        } else {
            debug!(
                task = %task,
                pending = *count,
                "follow-up run already queued; coalescing trigger"
            );
            false
        }
    }

    /// Consume one pending follow-up run for `task`, if any.
    pub fn take(&mut self, task: &str) -> bool {
        match self.pending.get_mut(task) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.pending.remove(task);
                true
            }
            None => false,
        }
    }

    /// Forget any follow-up run queued for `task`.
    pub fn clear(&mut self, task: &str) {
        self.pending.remove(task);
    }
}
