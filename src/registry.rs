// src/registry.rs

//! Named task registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::engine::TaskName;
use crate::errors::{Result, TaskwatchError};
use crate::exec::TaskAction;

/// A registered task: its prerequisites and the action to perform.
#[derive(Clone)]
pub struct TaskSpec {
    name: TaskName,
    deps: Vec<TaskName>,
    action: Arc<dyn TaskAction>,
}

impl TaskSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct prerequisites, in declaration order.
    pub fn deps(&self) -> &[TaskName] {
        &self.deps
    }

    pub fn action(&self) -> &Arc<dyn TaskAction> {
        &self.action
    }
}

impl fmt::Debug for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSpec")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .field("action", &self.action.describe())
            .finish()
    }
}

/// Registry of uniquely-named tasks, kept in registration order.
#[derive(Debug, Default, Clone)]
pub struct TaskRegistry {
    tasks: Vec<TaskSpec>,
    index: HashMap<TaskName, usize>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task whose dependencies are all already registered.
    ///
    /// Fails with [`TaskwatchError::DuplicateTask`] if `name` is taken and
    /// with [`TaskwatchError::UnknownDependency`] if a dependency has not been
    /// registered yet. Because dependencies must pre-exist, tasks added only
    /// through `register` can never form a cycle.
    pub fn register<N, D>(&mut self, name: N, deps: D, action: Arc<dyn TaskAction>) -> Result<()>
    where
        N: Into<TaskName>,
        D: IntoIterator,
        D::Item: Into<TaskName>,
    {
        let name = name.into();
        let deps = dedup_deps(deps);

        self.ensure_unique(&name)?;
        if let Some(missing) = deps.iter().find(|d| !self.index.contains_key(*d)) {
            return Err(TaskwatchError::UnknownDependency {
                task: name,
                dependency: missing.clone(),
            });
        }

        self.insert(name, deps, action);
        Ok(())
    }

    /// Register a task without checking that its dependencies exist yet.
    ///
    /// Used when loading configuration files, where tasks may reference ones
    /// declared further down. Dangling references and cycles are reported
    /// when a plan is resolved.
    pub fn declare<N, D>(&mut self, name: N, deps: D, action: Arc<dyn TaskAction>) -> Result<()>
    where
        N: Into<TaskName>,
        D: IntoIterator,
        D::Item: Into<TaskName>,
    {
        let name = name.into();
        let deps = dedup_deps(deps);

        self.ensure_unique(&name)?;
        self.insert(name, deps, action);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TaskSpec> {
        self.index.get(name).map(|&i| &self.tasks[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Direct dependencies of `name` (empty for unknown tasks).
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.get(name).map(|t| t.deps()).unwrap_or(&[])
    }

    /// Iterate tasks in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TaskSpec> {
        self.tasks.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|t| t.name())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn ensure_unique(&self, name: &str) -> Result<()> {
        if self.index.contains_key(name) {
            return Err(TaskwatchError::DuplicateTask(name.to_string()));
        }
        Ok(())
    }

    fn insert(&mut self, name: TaskName, deps: Vec<TaskName>, action: Arc<dyn TaskAction>) {
        debug!(task = %name, ?deps, "registered task");
        self.index.insert(name.clone(), self.tasks.len());
        self.tasks.push(TaskSpec { name, deps, action });
    }
}

/// Drop repeated dependency names, keeping the first occurrence.
fn dedup_deps<D>(deps: D) -> Vec<TaskName>
where
    D: IntoIterator,
    D::Item: Into<TaskName>,
{
    let mut out: Vec<TaskName> = Vec::new();
    for dep in deps {
        let dep = dep.into();
        if !out.contains(&dep) {
            out.push(dep);
        }
    }
    out
}
