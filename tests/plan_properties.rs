use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use proptest::prelude::*;
use taskwatch::dag::{resolve_plan, RunState, TaskRunState};
use taskwatch::exec::NoopAction;
use taskwatch::registry::TaskRegistry;

// Acyclic by construction: task N may only depend on tasks 0..N-1.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, deps)| {
                    let mut seen = HashSet::new();
                    deps.into_iter()
                        .filter(|_| i > 0)
                        .map(|d| d % i.max(1))
                        .filter(|d| seen.insert(*d))
                        .collect()
                })
                .collect()
        })
    })
}

fn name(i: usize) -> String {
    format!("task_{i}")
}

fn build_registry(deps: &[Vec<usize>]) -> TaskRegistry {
    let mut reg = TaskRegistry::new();
    for (i, ds) in deps.iter().enumerate() {
        reg.register(name(i), ds.iter().map(|d| name(*d)), Arc::new(NoopAction))
            .unwrap();
    }
    reg
}

fn closure(deps: &[Vec<usize>], target: usize) -> HashSet<String> {
    let mut seen = HashSet::new();
    let mut stack = vec![target];
    while let Some(i) = stack.pop() {
        if seen.insert(name(i)) {
            stack.extend(deps[i].iter().copied());
        }
    }
    seen
}

proptest! {
    #[test]
    fn plan_contains_each_prerequisite_once_after_its_dependencies(
        deps in dag_strategy(12),
        pick in any::<usize>(),
    ) {
        let target = pick % deps.len();
        let reg = build_registry(&deps);
        let plan = resolve_plan(&reg, &name(target)).unwrap();

        let position: HashMap<&str, usize> =
            plan.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();

        prop_assert_eq!(position.len(), plan.len(), "duplicate task in plan");
        prop_assert_eq!(plan.last().cloned(), Some(name(target)));
        prop_assert_eq!(
            plan.iter().cloned().collect::<HashSet<_>>(),
            closure(&deps, target)
        );

        for task in &plan {
            for dep in reg.dependencies_of(task) {
                prop_assert!(position[dep.as_str()] < position[task.as_str()]);
            }
        }
    }

    #[test]
    fn failure_skips_exactly_the_downstream_tasks(
        deps in dag_strategy(12),
        pick in any::<usize>(),
        fail_pick in any::<usize>(),
    ) {
        let target = pick % deps.len();
        let reg = build_registry(&deps);
        let plan = resolve_plan(&reg, &name(target)).unwrap();
        let failing = plan[fail_pick % plan.len()].clone();

        let mut state = RunState::new(&reg, &name(target), plan.clone(), 1);
        while let Some(task) = state.next_ready() {
            if task == failing {
                state.mark_failed(&task);
            } else {
                state.mark_success(&task);
            }
        }
        prop_assert!(state.is_finished());

        for task in &plan {
            let idx: usize = task.trim_start_matches("task_").parse().unwrap();
            let downstream = *task != failing && closure(&deps, idx).contains(&failing);
            let expected = if *task == failing {
                TaskRunState::DoneFailed
            } else if downstream {
                TaskRunState::Skipped
            } else {
                TaskRunState::DoneSuccess
            };
            prop_assert_eq!(state.state_of(task), Some(expected));
        }
    }
}
