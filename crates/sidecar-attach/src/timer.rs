//! Trailing-edge debounce timers driven by explicit instants.
//!
//! The engine never sleeps or spawns. The host asks for the next deadline,
//! parks its run loop until then, and hands the current instant back.

use std::time::{Duration, Instant};

/// A single-shot, reschedulable timer. Scheduling while armed replaces the
/// previous deadline, so a burst of triggers fires once, `delay` after the
/// last of them.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arm (or re-arm) the timer relative to `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.schedule_after(now, self.delay);
    }

    /// Arm (or re-arm) with a one-off `delay` instead of the configured one.
    pub fn schedule_after(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm and return `true` if the deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if d <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
