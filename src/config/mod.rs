// src/config/mod.rs

//! Watcher configuration.
//!
//! Responsibilities:
//! - Define the immutable `WatchConfig` snapshot and its defaults (`model.rs`).
//! - Pick a build command from the project layout (`layout.rs`).
//! - Validate basic invariants before the watcher starts (`validate.rs`).

pub mod layout;
pub mod model;
pub mod validate;

pub use layout::{detect_project_layout, ProjectLayout};
pub use model::{
    WatchConfig, DEFAULT_ARTIFACT, DEFAULT_DEBOUNCE_DELAY, DEFAULT_EXCLUDE_DIRS,
    DEFAULT_INCLUDE_EXTS, DEFAULT_OUTPUT_DIR, DEFAULT_POLL_INTERVAL, DEFAULT_RUN_CMD,
    DEFAULT_STOP_TIMEOUT,
};
