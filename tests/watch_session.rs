mod common;
use crate::common::{init_tracing, with_timeout, write_config};

use std::fs;
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use tempfile::tempdir;

use taskwatch::cli::CliArgs;

async fn wait_for_lines(path: &Path, count: usize) {
    with_timeout(async {
        loop {
            let lines = fs::read_to_string(path)
                .map(|s| s.lines().count())
                .unwrap_or(0);
            if lines >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
}

#[cfg(unix)]
#[tokio::test]
async fn watch_runs_tasks_initially_and_again_on_change() {
    init_tracing();
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    let path = write_config(
        dir.path(),
        r#"
[config]
debounce_ms = 50

[task.elm-init]
cmd = "touch elm-stuff"

[task.make]
cmd = "echo make >> make.log"
after = ["elm-init"]

[[watch]]
patterns = ["src/**"]
tasks = ["make"]
"#,
    );

    let args = CliArgs::try_parse_from(["taskwatch", "--config", path.to_str().unwrap(), "watch"])
        .unwrap();
    let session = tokio::spawn(taskwatch::run(args));

    let log = dir.path().join("make.log");
    wait_for_lines(&log, 1).await;
    assert!(dir.path().join("elm-stuff").exists());

    // Let the initial run settle and the watcher register.
    tokio::time::sleep(Duration::from_millis(200)).await;
    fs::write(dir.path().join("src/Main.elm"), "module Main exposing (main)").unwrap();
    wait_for_lines(&log, 2).await;

    assert!(!session.is_finished());
    session.abort();
}

#[cfg(unix)]
#[tokio::test]
async fn no_initial_skips_the_startup_run() {
    init_tracing();
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    let path = write_config(
        dir.path(),
        r#"
[task.make]
cmd = "echo make >> make.log"

[[watch]]
patterns = ["src/**"]
tasks = ["make"]
"#,
    );

    let args = CliArgs::try_parse_from([
        "taskwatch",
        "--config",
        path.to_str().unwrap(),
        "watch",
        "--no-initial",
    ])
    .unwrap();
    let session = tokio::spawn(taskwatch::run(args));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!dir.path().join("make.log").exists());
    assert!(!session.is_finished());
    session.abort();
}
