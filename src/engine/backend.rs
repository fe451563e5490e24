// src/engine/backend.rs

//! Pluggable build-cycle backend.
//!
//! The [`Watcher`](crate::engine::Watcher) talks to a `CycleBackend` instead
//! of a concrete [`BuildRunLoop`]. Production code uses `BuildRunLoop`;
//! tests can substitute a backend that records when cycles were triggered
//! without spawning any processes.

use std::future::Future;
use std::pin::Pin;

use crate::engine::build_loop::BuildRunLoop;
use crate::engine::CycleOutcome;

pub trait CycleBackend: Send + Sync {
    /// Run one build-and-run cycle.
    fn build_and_run(&self) -> Pin<Box<dyn Future<Output = CycleOutcome> + Send + '_>>;

    /// Stop whatever is running and refuse further cycles.
    fn shutdown(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

impl CycleBackend for BuildRunLoop {
    fn build_and_run(&self) -> Pin<Box<dyn Future<Output = CycleOutcome> + Send + '_>> {
        Box::pin(BuildRunLoop::build_and_run(self))
    }

    fn shutdown(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(BuildRunLoop::shutdown(self))
    }
}
