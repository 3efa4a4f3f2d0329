// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TaskwatchError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TaskwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.task, raw.watch))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_global_config(cfg)?;
    validate_task_commands(cfg)?;
    validate_task_dependencies(cfg)?;
    validate_dag(cfg)?;
    validate_watch_rules(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(TaskwatchError::ConfigError(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.queue_length == 0 {
        return Err(TaskwatchError::ConfigError(
            "[config].queue_length must be >= 1 (got 0)".to_string(),
        ));
    }

    if let Some(default) = &cfg.config.default_task {
        if !cfg.task.contains_key(default) {
            return Err(TaskwatchError::ConfigError(format!(
                "[config].default_task refers to unknown task '{}'",
                default
            )));
        }
    }

    Ok(())
}

fn validate_task_commands(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        if task.cmd.is_some() && task.cmds.is_some() {
            return Err(TaskwatchError::ConfigError(format!(
                "task '{}' sets both `cmd` and `cmds`",
                name
            )));
        }
        if task.commands().iter().any(|c| c.trim().is_empty()) {
            return Err(TaskwatchError::ConfigError(format!(
                "task '{}' has an empty command",
                name
            )));
        }
    }
    Ok(())
}

fn validate_task_dependencies(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            if dep == name {
                return Err(TaskwatchError::CyclicDependency { task: name.clone() });
            }
            if !cfg.task.contains_key(dep) {
                return Err(TaskwatchError::UnknownDependency {
                    task: name.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: dep -> task. For
    //   [task.make]
    //   after = ["elm-init"]
    // we add edge elm-init -> make.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    // A topological sort will fail if there is a cycle.
    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(TaskwatchError::CyclicDependency {
            task: cycle.node_id().to_string(),
        }),
    }
}

fn validate_watch_rules(cfg: &RawConfigFile) -> Result<()> {
    for (idx, rule) in cfg.watch.iter().enumerate() {
        if rule.patterns.is_empty() {
            return Err(TaskwatchError::ConfigError(format!(
                "[[watch]] rule #{} has no patterns",
                idx + 1
            )));
        }
        if rule.tasks.is_empty() {
            return Err(TaskwatchError::ConfigError(format!(
                "[[watch]] rule #{} names no tasks",
                idx + 1
            )));
        }
        if let Some(unknown) = rule.tasks.iter().find(|t| !cfg.task.contains_key(*t)) {
            return Err(TaskwatchError::ConfigError(format!(
                "[[watch]] rule #{} refers to unknown task '{}'",
                idx + 1,
                unknown
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<ConfigFile> {
        let raw: RawConfigFile = toml::from_str(src)?;
        ConfigFile::try_from(raw)
    }

    #[test]
    fn empty_config_is_rejected() {
        assert!(matches!(parse(""), Err(TaskwatchError::ConfigError(_))));
    }

    #[test]
    fn three_task_cycle_is_reported() {
        let err = parse(
            r#"
[task.a]
after = ["c"]
[task.b]
after = ["a"]
[task.c]
after = ["b"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, TaskwatchError::CyclicDependency { .. }));
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let err = parse(
            r#"
[task.a]
cmd = "true"
after = ["a"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, TaskwatchError::CyclicDependency { ref task } if task == "a"));
    }

    #[test]
    fn cmd_and_cmds_are_exclusive() {
        let err = parse(
            r#"
[task.a]
cmd = "true"
cmds = ["true"]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("both `cmd` and `cmds`"));
    }

    #[test]
    fn watch_rules_must_reference_tasks() {
        let err = parse(
            r#"
[task.make]
cmd = "true"

[[watch]]
patterns = ["src/**"]
tasks = ["test"]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown task 'test'"));
    }

    #[test]
    fn default_task_must_exist_and_queue_length_positive() {
        let err = parse(
            r#"
[config]
default_task = "watch"
[task.make]
cmd = "true"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("default_task"));

        let err = parse(
            r#"
[config]
queue_length = 0
[task.make]
cmd = "true"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("queue_length"));
    }
}
