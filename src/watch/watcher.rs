// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::RuntimeEvent;
use crate::errors::Result;
use crate::watch::event_handler::{collect_batch, dispatch_changes, is_relevant};
use crate::watch::patterns::CompiledWatchRule;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive; dropping the handle stops
/// file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch `root` recursively and send `RuntimeEvent::TasksTriggered` for the
/// tasks of every rule matching a changed path.
///
/// Changes are debounced over `debounce`; one batch produces at most one
/// trigger event, and batches are dispatched strictly one after another.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    rules: Vec<CompiledWatchRule>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    debounce: Duration,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or(root);
    let rules = Arc::new(rules);

    // Channel from the blocking notify callback into the async world.
    let (path_tx, mut path_rx) = mpsc::unbounded_channel::<Vec<PathBuf>>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if is_relevant(&event.kind) && !event.paths.is_empty() {
                    if let Err(err) = path_tx.send(event.paths) {
                        eprintln!("taskwatch: dropping change batch, watcher loop stopped: {err}");
                    }
                }
            }
            Err(err) => {
                // No tracing context on notify's thread.
                eprintln!("taskwatch: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!("file watcher started on {:?}", root);

    tokio::spawn(async move {
        while let Some(first) = path_rx.recv().await {
            let batch = collect_batch(first, &mut path_rx, debounce).await;
            debug!(paths = batch.len(), "processing change batch");

            if !dispatch_changes(&root, &batch, &rules, &runtime_tx).await {
                break;
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
