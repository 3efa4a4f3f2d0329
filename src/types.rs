// src/types.rs

use serde::Deserialize;

/// What to do when a watched change re-triggers a task that is still running.
///
/// - `Queue`: let the in-flight run finish, then run the task again. Repeated
///   triggers coalesce into a bounded number of follow-up runs (default).
/// - `Cancel`: abort the in-flight run (killing its child processes) and start
///   a fresh one right away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerWhileRunningBehaviour {
    #[default]
    Queue,
    Cancel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_lowercase_names() {
        #[derive(Deserialize)]
        struct Section {
            mode: TriggerWhileRunningBehaviour,
        }
        let s: Section = toml::from_str(r#"mode = "cancel""#).unwrap();
        assert_eq!(s.mode, TriggerWhileRunningBehaviour::Cancel);
        assert!(toml::from_str::<Section>(r#"mode = "Cancel""#).is_err());
        assert_eq!(
            TriggerWhileRunningBehaviour::default(),
            TriggerWhileRunningBehaviour::Queue
        );
    }
}
