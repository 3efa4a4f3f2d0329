mod common;
use crate::common::recording::Recorder;
use crate::common::{elm_registry, init_tracing, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use taskwatch::engine::TaskRunner;
use taskwatch::errors::TaskwatchError;
use taskwatch::registry::TaskRegistry;

#[test]
fn registering_a_name_twice_fails() {
    let recorder = Recorder::new();
    let mut reg = elm_registry(&recorder);

    let err = reg
        .register("make", Vec::<String>::new(), recorder.action("make"))
        .unwrap_err();

    assert!(matches!(err, TaskwatchError::DuplicateTask(ref t) if t == "make"));
    assert_eq!(reg.len(), 4);
}

#[test]
fn registering_with_unregistered_dependency_fails() {
    let recorder = Recorder::new();
    let mut reg = TaskRegistry::new();

    let err = reg
        .register("make", ["elm-init"], recorder.action("make"))
        .unwrap_err();

    assert!(matches!(
        err,
        TaskwatchError::UnknownDependency { ref task, ref dependency }
            if task == "make" && dependency == "elm-init"
    ));
    assert!(reg.is_empty());
}

#[tokio::test]
async fn shared_dependency_runs_exactly_once_and_first() {
    init_tracing();
    let recorder = Recorder::new();
    let runner = TaskRunner::new(elm_registry(&recorder));

    let report = with_timeout(runner.run("all")).await.unwrap();

    let started = recorder.started();
    assert_eq!(started.iter().filter(|t| *t == "elm-init").count(), 1);
    assert_eq!(started.len(), 4);
    assert_eq!(started[0], "elm-init");
    assert_eq!(started[3], "all");
    assert_eq!(report.executed, started);
    assert!(report.skipped.is_empty());
}

#[tokio::test]
async fn cycle_is_reported_before_any_action_runs() {
    init_tracing();
    let recorder = Recorder::new();
    let mut reg = TaskRegistry::new();
    reg.declare("a", ["b"], recorder.action("a")).unwrap();
    reg.declare("b", ["a"], recorder.action("b")).unwrap();
    reg.declare("c", ["a"], recorder.action("c")).unwrap();
    let runner = TaskRunner::new(reg);

    let err = runner.run("c").await.unwrap_err();

    assert!(matches!(err, TaskwatchError::CyclicDependency { .. }));
    assert!(recorder.records().is_empty());
}

#[tokio::test]
async fn dangling_declared_dependency_is_reported_before_any_action_runs() {
    let recorder = Recorder::new();
    let mut reg = TaskRegistry::new();
    reg.declare("elm-init", Vec::<String>::new(), recorder.action("elm-init"))
        .unwrap();
    reg.declare("make", ["elm-init", "elm-format"], recorder.action("make"))
        .unwrap();
    let runner = TaskRunner::new(reg);

    let err = runner.run("make").await.unwrap_err();

    assert!(matches!(
        err,
        TaskwatchError::UnknownDependency { ref dependency, .. } if dependency == "elm-format"
    ));
    assert!(recorder.records().is_empty());
}

#[tokio::test]
async fn failing_dependency_halts_dependents_but_not_unrelated_tasks() {
    init_tracing();
    let recorder = Recorder::new();
    let mut reg = TaskRegistry::new();
    reg.register("elm-init", Vec::<String>::new(), recorder.action("elm-init"))
        .unwrap();
    reg.register("make", ["elm-init"], recorder.failing("make"))
        .unwrap();
    reg.register("bundle", ["make"], recorder.action("bundle"))
        .unwrap();
    reg.register("test", ["elm-init"], recorder.action("test"))
        .unwrap();
    reg.register("all", ["bundle", "test"], recorder.action("all"))
        .unwrap();
    let runner = TaskRunner::new(reg);

    let report = with_timeout(runner.run_report("all")).await.unwrap();

    assert_eq!(recorder.started(), ["elm-init", "make", "test"]);
    assert_eq!(report.failed, ["make"]);
    assert_eq!(report.skipped, ["bundle", "all"]);
    assert!(report.succeeded.contains(&"test".to_string()));

    let err = report.into_result().unwrap_err();
    assert!(matches!(err, TaskwatchError::TaskExecution { ref task, .. } if task == "make"));
}

#[tokio::test]
async fn unrelated_run_is_unaffected_by_earlier_failure() {
    let recorder = Recorder::new();
    let mut reg = TaskRegistry::new();
    reg.register("make", Vec::<String>::new(), recorder.failing("make"))
        .unwrap();
    reg.register("docs", Vec::<String>::new(), recorder.action("docs"))
        .unwrap();
    let runner = TaskRunner::new(reg);

    assert!(runner.run("make").await.is_err());
    assert!(runner.run("docs").await.is_ok());
    assert_eq!(recorder.finished(), ["make", "docs"]);
}

#[tokio::test]
async fn concurrent_runs_never_overlap_the_same_task() {
    init_tracing();
    let recorder = Recorder::new();
    let mut reg = TaskRegistry::new();
    reg.register(
        "elm-init",
        Vec::<String>::new(),
        recorder.slow("elm-init", Duration::from_millis(30)),
    )
    .unwrap();
    reg.register(
        "make",
        ["elm-init"],
        recorder.slow("make", Duration::from_millis(30)),
    )
    .unwrap();
    reg.register(
        "test",
        ["elm-init"],
        recorder.slow("test", Duration::from_millis(10)),
    )
    .unwrap();
    let runner = Arc::new(TaskRunner::new(reg));

    let a = tokio::spawn({
        let runner = Arc::clone(&runner);
        async move { runner.run("make").await }
    });
    let b = tokio::spawn({
        let runner = Arc::clone(&runner);
        async move { runner.run("make").await }
    });
    let c = tokio::spawn({
        let runner = Arc::clone(&runner);
        async move { runner.run("test").await }
    });

    for handle in [a, b, c] {
        with_timeout(handle).await.unwrap().unwrap();
    }

    assert!(!recorder.overlapped("elm-init"));
    assert!(!recorder.overlapped("make"));
    assert_eq!(
        recorder.finished().iter().filter(|t| *t == "elm-init").count(),
        3
    );
}

#[tokio::test]
async fn unknown_target_is_task_not_found() {
    let runner = TaskRunner::new(TaskRegistry::new());
    let err = runner.run("make").await.unwrap_err();
    assert!(matches!(err, TaskwatchError::TaskNotFound(ref t) if t == "make"));
}
