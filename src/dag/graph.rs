// src/dag/graph.rs

use std::collections::HashMap;

use crate::engine::TaskName;
use crate::registry::TaskRegistry;

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default)]
struct DagNode {
    /// Direct dependencies: tasks that must succeed before this one runs.
    deps: Vec<TaskName>,
    /// Direct dependents: tasks that list this one as a dependency.
    dependents: Vec<TaskName>,
}

/// Adjacency view of (part of) the task registry, keyed by task name.
///
/// Edges pointing at tasks outside the view are dropped, so a graph built for
/// a plan only knows about the tasks in that plan.
#[derive(Debug, Clone, Default)]
pub struct DagGraph {
    nodes: HashMap<TaskName, DagNode>,
}

impl DagGraph {
    /// Graph restricted to `names` (e.g. a resolved plan).
    pub fn from_subset(registry: &TaskRegistry, names: &[TaskName]) -> Self {
        let mut nodes: HashMap<TaskName, DagNode> = names
            .iter()
            .map(|n| (n.clone(), DagNode::default()))
            .collect();

        for name in names {
            let deps: Vec<TaskName> = registry
                .dependencies_of(name)
                .iter()
                .filter(|d| nodes.contains_key(*d))
                .cloned()
                .collect();

            for dep in &deps {
                if let Some(dep_node) = nodes.get_mut(dep) {
                    dep_node.dependents.push(name.clone());
                }
            }
            if let Some(node) = nodes.get_mut(name) {
                node.deps = deps;
            }
        }

        Self { nodes }
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }
}
