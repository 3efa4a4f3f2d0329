// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling `[[watch]]` rules into glob matchers.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Debouncing raw events into change batches and turning each batch into a
//!   single task trigger.
//!
//! It does **not** know about task dependencies or running state; the engine
//! decides what a trigger means for a task that is already running.

pub mod event_handler;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use patterns::{tasks_for_paths, CompiledWatchRule, WatchRule};
pub use watcher::{spawn_watcher, WatcherHandle};
