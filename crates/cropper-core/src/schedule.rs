//! Debouncing of live preview renders.
//!
//! Time is passed in by the caller as a monotonic offset, so the same logic
//! runs against `Instant` natively and `performance.now()` in the browser.

use std::time::Duration;

/// Coalesces bursts of updates into a single deferred action.
///
/// Every [`schedule`](Debouncer::schedule) pushes the deadline out to
/// `now + delay`; [`fire`](Debouncer::fire) reports the action as due once,
/// after input has been quiet for the full delay.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record an update at `now`, restarting the quiet period.
    pub fn schedule(&mut self, now: Duration) {
        self.deadline = Some(now.saturating_add(self.delay));
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending action becomes due, if any.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Consume the pending action if it is due at `now`.
    pub fn fire(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
