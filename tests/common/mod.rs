#![allow(dead_code)]

pub use taskwatch_test_utils::builders;
pub use taskwatch_test_utils::recording;
pub use taskwatch_test_utils::{init_tracing, with_timeout};

use std::path::{Path, PathBuf};

use taskwatch::registry::TaskRegistry;
use taskwatch_test_utils::recording::Recorder;

/// The Elm project layout used throughout the tests:
///
/// ```text
/// elm-init <- make
/// elm-init <- test
/// make, test <- all
/// ```
pub fn elm_registry(recorder: &Recorder) -> TaskRegistry {
    let mut reg = TaskRegistry::new();
    reg.register("elm-init", Vec::<String>::new(), recorder.action("elm-init"))
        .unwrap();
    reg.register("make", ["elm-init"], recorder.action("make"))
        .unwrap();
    reg.register("test", ["elm-init"], recorder.action("test"))
        .unwrap();
    reg.register("all", ["make", "test"], recorder.action("all"))
        .unwrap();
    reg
}

/// Write `contents` to `Taskwatch.toml` inside `dir`.
pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("Taskwatch.toml");
    std::fs::write(&path, contents).unwrap();
    path
}
