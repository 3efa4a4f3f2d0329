// src/watch/patterns.rs

use std::fmt;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::engine::TaskName;
use crate::errors::{Result, TaskwatchError};

/// A mapping from file patterns to the tasks re-run when matching files change.
///
/// ```toml
/// [[watch]]
/// patterns = ["src/**"]
/// exclude = ["src/**/*.tmp"]
/// tasks = ["make"]
/// ```
///
/// Patterns are globs relative to the project root, using forward slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRule {
    pub patterns: Vec<String>,
    pub exclude: Vec<String>,
    pub tasks: Vec<TaskName>,
}

impl WatchRule {
    /// Single-pattern rule.
    pub fn new<P, T, I>(pattern: P, tasks: I) -> Self
    where
        P: Into<String>,
        T: Into<TaskName>,
        I: IntoIterator<Item = T>,
    {
        Self {
            patterns: vec![pattern.into()],
            exclude: Vec::new(),
            tasks: tasks.into_iter().map(Into::into).collect(),
        }
    }

    pub fn excluding(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn compile(&self) -> Result<CompiledWatchRule> {
        if self.patterns.is_empty() {
            return Err(TaskwatchError::ConfigError(format!(
                "watch rule for {:?} has no patterns",
                self.tasks
            )));
        }
        if self.tasks.is_empty() {
            return Err(TaskwatchError::ConfigError(format!(
                "watch rule {:?} names no tasks",
                self.patterns
            )));
        }

        let watch_set = build_globset(&self.patterns)?;
        let exclude_set = if self.exclude.is_empty() {
            None
        } else {
            Some(build_globset(&self.exclude)?)
        };

        Ok(CompiledWatchRule {
            rule: self.clone(),
            watch_set,
            exclude_set,
        })
    }
}

/// A [`WatchRule`] with its globs compiled.
#[derive(Clone)]
pub struct CompiledWatchRule {
    rule: WatchRule,
    watch_set: GlobSet,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for CompiledWatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledWatchRule")
            .field("patterns", &self.rule.patterns)
            .field("tasks", &self.rule.tasks)
            .finish_non_exhaustive()
    }
}

impl CompiledWatchRule {
    pub fn tasks(&self) -> &[TaskName] {
        &self.rule.tasks
    }

    /// Whether a root-relative path (e.g. `"src/Main.elm"`) belongs to this rule.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.watch_set.is_match(rel_path) {
            return false;
        }
        match &self.exclude_set {
            Some(exclude) => !exclude.is_match(rel_path),
            None => true,
        }
    }
}

/// Tasks to run for a batch of changed paths.
///
/// Rules are consulted in order and each task appears once, in the order its
/// first matching rule lists it.
pub fn tasks_for_paths<S: AsRef<str>>(rules: &[CompiledWatchRule], rel_paths: &[S]) -> Vec<TaskName> {
    let mut tasks: Vec<TaskName> = Vec::new();

    for rule in rules {
        if rel_paths.iter().any(|p| rule.matches(p.as_ref())) {
            for task in rule.tasks() {
                if !tasks.contains(task) {
                    tasks.push(task.clone());
                }
            }
        }
    }

    tasks
}

/// Build a GlobSet from simple string patterns.
///
/// A trailing `/**` also matches the directory itself, so `src/**` fires
/// when `src` is removed or recreated.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
        if let Some(dir) = pat.strip_suffix("/**") {
            if !dir.is_empty() {
                builder.add(Glob::new(dir)?);
            }
        }
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_matches_relative_paths_and_honours_excludes() {
        let rule = WatchRule::new("tests/**", ["test"])
            .excluding("tests/**/*.tmp")
            .compile()
            .unwrap();

        assert!(rule.matches("tests/Main.elm"));
        assert!(rule.matches("tests/sub/Spec.elm"));
        assert!(rule.matches("tests"));
        assert!(!rule.matches("tests/scratch.tmp"));
        assert!(!rule.matches("src/Main.elm"));
    }

    #[test]
    fn tasks_are_collected_once_in_rule_order() {
        let rules = vec![
            WatchRule::new("src/**", ["make"]).compile().unwrap(),
            WatchRule::new("tests/**", ["test"]).compile().unwrap(),
            WatchRule::new("**/*.elm", ["make", "test"]).compile().unwrap(),
        ];

        let tasks = tasks_for_paths(&rules, &["tests/Main.elm", "src/App.elm"]);
        assert_eq!(tasks, ["make", "test"]);

        let tasks = tasks_for_paths(&rules, &["tests/Other.elm"]);
        assert_eq!(tasks, ["test", "make"]);

        assert!(tasks_for_paths(&rules, &["README.md"]).is_empty());
    }

    #[test]
    fn invalid_rules_are_rejected() {
        assert!(matches!(
            WatchRule::new("src/[", ["make"]).compile(),
            Err(TaskwatchError::GlobError(_))
        ));
        assert!(matches!(
            WatchRule::new("src/**", Vec::<String>::new()).compile(),
            Err(TaskwatchError::ConfigError(_))
        ));
    }
}
