// src/engine/debounce.rs

//! Pure debounce state machine.
//!
//! The watcher feeds it the result of every poll and asks it when the
//! rebuild deadline is. It owns no timers itself, so it can be tested with
//! plain `Instant`s.
//!
//! The window is measured from the *first* change of a burst: further
//! changes while a rebuild is pending do not push the deadline back.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct DebounceScheduler {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DebounceScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending rebuild should run, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Record the result of one poll.
    ///
    /// Returns true if this call armed the timer.
    pub fn observe(&mut self, changed: bool, now: Instant) -> bool {
        if changed && self.deadline.is_none() {
            self.deadline = Some(now + self.delay);
            return true;
        }
        false
    }

    /// The deadline elapsed. Returns whether a rebuild should run, and
    /// clears the pending state.
    pub fn fire(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}
