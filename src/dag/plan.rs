// src/dag/plan.rs

//! Depth-first resolution of a task's prerequisite chain.

use std::collections::HashMap;

use tracing::debug;

use crate::engine::TaskName;
use crate::errors::{Result, TaskwatchError};
use crate::registry::TaskRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the current DFS path.
    Visiting,
    /// Fully resolved and already placed in the plan.
    Done,
}

/// Resolve the execution order for `target`.
///
/// Dependencies are visited depth-first in declaration order and emitted in
/// post-order, so every task appears after all of its prerequisites and each
/// task appears exactly once, no matter how many paths reach it. The whole
/// chain is checked before anything runs:
///
/// - unknown `target` -> [`TaskwatchError::TaskNotFound`]
/// - dangling dependency -> [`TaskwatchError::UnknownDependency`]
/// - back edge -> [`TaskwatchError::CyclicDependency`]
pub fn resolve_plan(registry: &TaskRegistry, target: &str) -> Result<Vec<TaskName>> {
    if !registry.contains(target) {
        return Err(TaskwatchError::TaskNotFound(target.to_string()));
    }

    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut order: Vec<TaskName> = Vec::new();
    visit(registry, target, &mut marks, &mut order)?;

    debug!(target = %target, plan = ?order, "resolved task plan");
    Ok(order)
}

fn visit<'a>(
    registry: &'a TaskRegistry,
    name: &'a str,
    marks: &mut HashMap<&'a str, Mark>,
    order: &mut Vec<TaskName>,
) -> Result<()> {
    match marks.get(name) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => {
            return Err(TaskwatchError::CyclicDependency {
                task: name.to_string(),
            });
        }
        None => {}
    }

    marks.insert(name, Mark::Visiting);

    for dep in registry.dependencies_of(name) {
        if !registry.contains(dep) {
            return Err(TaskwatchError::UnknownDependency {
                task: name.to_string(),
                dependency: dep.clone(),
            });
        }
        visit(registry, dep, marks, order)?;
    }

    marks.insert(name, Mark::Done);
    order.push(name.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::exec::{NoopAction, TaskAction};

    fn noop() -> Arc<dyn TaskAction> {
        Arc::new(NoopAction)
    }

    #[test]
    fn diamond_runs_shared_dependency_once() {
        let mut reg = TaskRegistry::new();
        reg.register("init", Vec::<String>::new(), noop()).unwrap();
        reg.register("make", ["init"], noop()).unwrap();
        reg.register("test", ["init"], noop()).unwrap();
        reg.register("all", ["make", "test"], noop()).unwrap();

        let plan = resolve_plan(&reg, "all").unwrap();
        assert_eq!(plan, ["init", "make", "test", "all"]);
    }

    #[test]
    fn plan_only_contains_reachable_tasks() {
        let mut reg = TaskRegistry::new();
        reg.register("init", Vec::<String>::new(), noop()).unwrap();
        reg.register("make", ["init"], noop()).unwrap();
        reg.register("lint", Vec::<String>::new(), noop()).unwrap();

        assert_eq!(resolve_plan(&reg, "make").unwrap(), ["init", "make"]);
        assert_eq!(resolve_plan(&reg, "lint").unwrap(), ["lint"]);
    }

    #[test]
    fn two_task_cycle_is_reported() {
        let mut reg = TaskRegistry::new();
        reg.declare("A", ["B"], noop()).unwrap();
        reg.declare("B", ["A"], noop()).unwrap();

        let err = resolve_plan(&reg, "A").unwrap_err();
        assert!(matches!(err, TaskwatchError::CyclicDependency { ref task } if task == "A"));
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut reg = TaskRegistry::new();
        reg.declare("loop", ["loop"], noop()).unwrap();
        assert!(matches!(
            resolve_plan(&reg, "loop"),
            Err(TaskwatchError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn dangling_dependency_and_unknown_target() {
        let mut reg = TaskRegistry::new();
        reg.declare("make", ["elm-init"], noop()).unwrap();

        match resolve_plan(&reg, "make").unwrap_err() {
            TaskwatchError::UnknownDependency { task, dependency } => {
                assert_eq!(task, "make");
                assert_eq!(dependency, "elm-init");
            }
            other => panic!("expected UnknownDependency, got {other:?}"),
        }

        assert!(matches!(
            resolve_plan(&reg, "deploy"),
            Err(TaskwatchError::TaskNotFound(ref n)) if n == "deploy"
        ));
    }
}
