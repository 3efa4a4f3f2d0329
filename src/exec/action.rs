// src/exec/action.rs

//! The unit of work attached to a task.
//!
//! The runner only ever talks to a [`TaskAction`]; it never knows whether the
//! action spawns a subprocess, calls into a library, or does nothing at all.
//! This is the seam tests use to record execution order without touching the
//! OS.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::engine::TaskName;
use crate::errors::Result;

/// Boxed future returned by [`TaskAction::execute`].
pub type ActionFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

/// Information handed to an action when it is executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskContext {
    /// Name of the task being executed.
    pub task: TaskName,
    /// Identifier of the `run` invocation this execution belongs to.
    pub run_id: u64,
}

/// Trait abstracting how a task's work is performed.
///
/// An action signals completion by resolving its future. `Ok(())` marks the
/// task done; an error fails it. Actions that wrap external tools should fail
/// with [`TaskwatchError::TaskExecution`](crate::errors::TaskwatchError) so the
/// captured output reaches the user.
pub trait TaskAction: Send + Sync {
    fn execute(&self, ctx: TaskContext) -> ActionFuture;

    /// Short human-readable description (used by `taskwatch list`).
    fn describe(&self) -> String {
        String::from("<action>")
    }
}

impl fmt::Debug for dyn TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TaskAction").field(&self.describe()).finish()
    }
}

/// Action for aggregate tasks that only exist to group prerequisites.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAction;

impl TaskAction for NoopAction {
    fn execute(&self, _ctx: TaskContext) -> ActionFuture {
        Box::pin(async { Ok(()) })
    }

    fn describe(&self) -> String {
        String::from("(no command)")
    }
}

/// Adapter turning an async closure into a [`TaskAction`].
pub struct FnAction<F> {
    f: F,
}

impl<F, Fut> FnAction<F>
where
    F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, Fut> TaskAction for FnAction<F>
where
    F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn execute(&self, ctx: TaskContext) -> ActionFuture {
        Box::pin((self.f)(ctx))
    }

    fn describe(&self) -> String {
        String::from("<fn>")
    }
}

/// Convenience: wrap an async closure into a shareable action handle.
pub fn action_fn<F, Fut>(f: F) -> Arc<dyn TaskAction>
where
    F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(FnAction::new(f))
}
