// src/exec/mod.rs

//! Task actions.
//!
//! - [`action`] defines the [`TaskAction`] trait the runner executes, plus the
//!   closure and no-op implementations.
//! - [`command`] runs shell commands via `tokio::process::Command`, capturing
//!   their output so failures can be reported as
//!   [`TaskwatchError::TaskExecution`](crate::errors::TaskwatchError).

pub mod action;
pub mod command;

pub use action::{action_fn, ActionFuture, FnAction, NoopAction, TaskAction, TaskContext};
pub use command::{run_shell_command, CommandOutput, ShellCommandAction};
