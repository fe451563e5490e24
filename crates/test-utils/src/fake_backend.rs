use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use wind::engine::{CycleBackend, CycleOutcome};

/// A fake cycle backend that:
/// - records when each cycle was triggered
/// - returns a fixed outcome without spawning anything, optionally after a
///   simulated build delay
/// - counts shutdown calls
pub struct FakeBackend {
    outcome: CycleOutcome,
    build_delay: Duration,
    calls: Mutex<Vec<Instant>>,
    shutdowns: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::with_outcome(CycleOutcome::Started { pid: 1, generation: 1 })
    }

    pub fn with_outcome(outcome: CycleOutcome) -> Self {
        Self {
            outcome,
            build_delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            shutdowns: AtomicUsize::new(0),
        }
    }

    /// Make every cycle take `delay` before it returns.
    pub fn with_build_delay(mut self, delay: Duration) -> Self {
        self.build_delay = delay;
        self
    }

    pub fn cycles(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Instants at which `build_and_run` was called, in order.
    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleBackend for FakeBackend {
    fn build_and_run(&self) -> Pin<Box<dyn Future<Output = CycleOutcome> + Send + '_>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(Instant::now());
            if !self.build_delay.is_zero() {
                tokio::time::sleep(self.build_delay).await;
            }
            self.outcome
        })
    }

    fn shutdown(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        })
    }
}
