//! Actions that record what they did instead of spawning processes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;

use taskwatch::errors::TaskwatchError;
use taskwatch::exec::{action_fn, TaskAction};

/// One observation made by a recording action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Started(String),
    Finished(String),
}

/// Shared log of action executions.
#[derive(Clone, Default)]
pub struct Recorder {
    log: Arc<Mutex<Vec<Record>>>,
    gates: Arc<Mutex<HashMap<String, Arc<Notify>>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Action that records and succeeds immediately.
    pub fn action(&self, name: &str) -> Arc<dyn TaskAction> {
        self.slow(name, Duration::ZERO)
    }

    /// Action that records and fails with a `TaskExecution` error.
    pub fn failing(&self, name: &str) -> Arc<dyn TaskAction> {
        let log = Arc::clone(&self.log);
        let name = name.to_string();
        action_fn(move |_ctx| {
            let log = Arc::clone(&log);
            let name = name.clone();
            async move {
                push(&log, Record::Started(name.clone()));
                push(&log, Record::Finished(name.clone()));
                Err(TaskwatchError::TaskExecution {
                    task: name,
                    exit_code: 1,
                    output: "boom".to_string(),
                })
            }
        })
    }

    /// Action that records its start, sleeps, then records its end.
    pub fn slow(&self, name: &str, delay: Duration) -> Arc<dyn TaskAction> {
        let log = Arc::clone(&self.log);
        let name = name.to_string();
        action_fn(move |_ctx| {
            let log = Arc::clone(&log);
            let name = name.clone();
            async move {
                push(&log, Record::Started(name.clone()));
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                push(&log, Record::Finished(name));
                Ok(())
            }
        })
    }

    /// Action that records its start and then waits for [`release`](Self::release).
    pub fn gated(&self, name: &str) -> Arc<dyn TaskAction> {
        let log = Arc::clone(&self.log);
        let gate = self.gate(name);
        let name = name.to_string();
        action_fn(move |_ctx| {
            let log = Arc::clone(&log);
            let gate = Arc::clone(&gate);
            let name = name.clone();
            async move {
                push(&log, Record::Started(name.clone()));
                gate.notified().await;
                push(&log, Record::Finished(name));
                Ok(())
            }
        })
    }

    /// Let one waiting (or the next) execution of a gated action finish.
    pub fn release(&self, name: &str) {
        self.gate(name).notify_one();
    }

    pub fn records(&self) -> Vec<Record> {
        self.log.lock().unwrap().clone()
    }

    /// Task names in the order their actions started.
    pub fn started(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                Record::Started(name) => Some(name),
                Record::Finished(_) => None,
            })
            .collect()
    }

    /// Task names in the order their actions finished.
    pub fn finished(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                Record::Finished(name) => Some(name),
                Record::Started(_) => None,
            })
            .collect()
    }

    /// Whether two executions of `name` ever overlapped.
    pub fn overlapped(&self, name: &str) -> bool {
        let mut running = 0usize;
        for record in self.records() {
            match record {
                Record::Started(n) if n == name => {
                    running += 1;
                    if running > 1 {
                        return true;
                    }
                }
                Record::Finished(n) if n == name => running = running.saturating_sub(1),
                _ => {}
            }
        }
        false
    }

    fn gate(&self, name: &str) -> Arc<Notify> {
        let mut gates = self.gates.lock().unwrap();
        Arc::clone(gates.entry(name.to_string()).or_default())
    }
}

fn push(log: &Mutex<Vec<Record>>, record: Record) {
    log.lock().unwrap().push(record);
}
