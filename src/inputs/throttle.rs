use std::time::{Duration, Instant};

/// Coalesces bursts of scroll events into one trailing call.
///
/// Every `trigger` pushes the deadline out to `now + wait`; `poll` reports
/// true exactly once after the deadline passes with no newer trigger.
#[derive(Debug, Clone)]
pub struct Throttle {
    wait: Duration,
    deadline: Option<Instant>,
}

impl Throttle {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            deadline: None,
        }
    }

    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.wait);
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending call will fire, for hosts that sleep until then.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
