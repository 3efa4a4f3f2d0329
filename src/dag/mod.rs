// src/dag/mod.rs

//! Task dependency graph and per-run scheduling.
//!
//! - [`graph`] holds an adjacency view (deps + dependents) over registered tasks.
//! - [`plan`] resolves the depth-first topological order for one target.
//! - [`run_state`] tracks which tasks of a plan succeeded, failed or were
//!   skipped, and decides what runs next.

pub mod graph;
pub mod plan;
pub mod run_state;

pub use graph::DagGraph;
pub use plan::resolve_plan;
pub use run_state::{RunReport, RunState, TaskRunState};
