// src/watch/event_handler.rs

//! Turning raw filesystem paths into task triggers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::EventKind;
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::{tasks_for_paths, CompiledWatchRule};

/// Whether a notify event can change file contents.
///
/// Access events (opening or reading a file) are dropped so that tools
/// reading sources during a run don't retrigger themselves.
pub fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Any | EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Gather every path that arrives within `window` of `first`.
///
/// Editors typically emit several events per save (write, chmod, rename);
/// batching them produces one trigger per save instead of several.
pub async fn collect_batch(
    first: Vec<PathBuf>,
    rx: &mut mpsc::UnboundedReceiver<Vec<PathBuf>>,
    window: Duration,
) -> Vec<PathBuf> {
    let mut batch = first;
    let deadline = Instant::now() + window;

    while let Ok(Some(paths)) = timeout_at(deadline, rx.recv()).await {
        batch.extend(paths);
    }

    batch.sort();
    batch.dedup();
    batch
}

/// Match a batch of changed paths against the rules and send one trigger
/// event for the union of their tasks.
///
/// Returns `false` if the runtime has gone away and watching should stop.
pub async fn dispatch_changes(
    root: &Path,
    paths: &[PathBuf],
    rules: &[CompiledWatchRule],
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> bool {
    let rel_paths: Vec<String> = paths
        .iter()
        .filter_map(|path| {
            let rel = relative_str(root, path);
            if rel.is_none() {
                warn!("could not relativize path {:?} against root {:?}", path, root);
            }
            rel
        })
        .filter(|rel| !rel.is_empty())
        .collect();

    let tasks = tasks_for_paths(rules, rel_paths.as_slice());
    if tasks.is_empty() {
        debug!(?rel_paths, "change matched no watch rule");
        return true;
    }

    debug!(?rel_paths, ?tasks, "watch match -> triggering tasks");
    if let Err(err) = runtime_tx
        .send(RuntimeEvent::TasksTriggered {
            tasks,
            reason: TriggerReason::FileWatch,
        })
        .await
    {
        warn!("failed to send RuntimeEvent::TasksTriggered: {err}");
        return false;
    }

    true
}
