// src/engine/mod.rs

//! Build/run orchestration for wind.
//!
//! This module ties together:
//! - the debounce state machine that turns poll results into rebuild
//!   triggers (`debounce`)
//! - the serialized build-and-restart cycle (`build_loop`)
//! - the seam between the coordinator and the cycle (`backend`)
//! - the coordinator itself, which multiplexes poll ticks, the debounce
//!   deadline and cancellation (`watcher`)

/// Result of one build-and-run cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Build succeeded and a new generation is running.
    Started { pid: u32, generation: u64 },
    /// Build command exited non-zero; nothing is running.
    BuildFailed,
    /// Build succeeded but the application could not be launched.
    LaunchFailed,
    /// Another cycle was already in flight; this trigger was dropped.
    Skipped,
    /// Shutdown has been requested; nothing was (re)started.
    ShuttingDown,
}

impl CycleOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, CycleOutcome::Started { .. })
    }
}

/// Lifecycle of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Initializing,
    Running,
    ShuttingDown,
    Stopped,
}

pub mod backend;
pub mod build_loop;
pub mod debounce;
pub mod watcher;

pub use backend::CycleBackend;
pub use build_loop::{BuildRunLoop, BuildState};
pub use debounce::DebounceScheduler;
pub use watcher::{remove_artifact, shutdown_watcher, Watcher};
