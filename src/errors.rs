// src/errors.rs

//! Crate-wide error type and `Result` alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskwatchError {
    #[error("Task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("Task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("Cycle detected in task graph involving task '{task}'")]
    CyclicDependency { task: String },

    #[error("Task '{task}' failed (exit code {exit_code}){}", format_output(.output))]
    TaskExecution {
        task: String,
        exit_code: i32,
        /// Captured stderr (falling back to stdout when stderr was empty).
        output: String,
    },

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid glob pattern: {0}")]
    GlobError(#[from] globset::Error),

    #[error("File watch error: {0}")]
    WatchError(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskwatchError {
    /// Name of the task this error is about, if any.
    pub fn task_name(&self) -> Option<&str> {
        match self {
            TaskwatchError::DuplicateTask(task) | TaskwatchError::TaskNotFound(task) => Some(task.as_str()),
            TaskwatchError::UnknownDependency { task, .. }
            | TaskwatchError::CyclicDependency { task }
            | TaskwatchError::TaskExecution { task, .. } => Some(task.as_str()),
            _ => None,
        }
    }
}

fn format_output(output: &str) -> String {
    let trimmed = output.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{trimmed}")
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskwatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_error_includes_captured_output() {
        let err = TaskwatchError::TaskExecution {
            task: "make".to_string(),
            exit_code: 2,
            output: "compile error\n".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'make'"));
        assert!(msg.contains("exit code 2"));
        assert!(msg.ends_with("compile error"));
    }

    #[test]
    fn execution_error_without_output_has_no_trailer() {
        let err = TaskwatchError::TaskExecution {
            task: "make".to_string(),
            exit_code: 1,
            output: "   \n".to_string(),
        };
        assert_eq!(err.to_string(), "Task 'make' failed (exit code 1)");
    }

    #[test]
    fn task_name_is_reported_for_graph_errors() {
        let err = TaskwatchError::CyclicDependency {
            task: "A".to_string(),
        };
        assert_eq!(err.task_name(), Some("A"));
        assert_eq!(TaskwatchError::ConfigError("x".into()).task_name(), None);
    }
}
