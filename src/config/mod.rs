// src/config/mod.rs

//! Configuration loading and validation for taskwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate dependencies, cycles and watch rules (`validate.rs`).
//! - Build the task registry and watch settings (`build.rs`).

pub mod build;
pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    config_root_dir, load_and_validate, load_from_path, DEFAULT_CONFIG_FILE,
};
pub use model::{ConfigFile, ConfigSection, RawConfigFile, TaskConfig, WatchConfig};
