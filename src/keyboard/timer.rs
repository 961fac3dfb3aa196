// SPDX-License-Identifier: GPL-3.0-only

//! Single-slot cancellable timer.
//!
//! The keyboard has no timer thread. A timer is just a deadline stored in
//! state; the host calls [`TimerSlot::fire_if_due`] from its periodic tick.
//! Starting the timer replaces whatever deadline was pending, so two
//! overlapping timers cannot exist.

use std::time::{Duration, Instant};

/// A timer slot holding at most one pending deadline.
#[derive(Debug, Clone, Default)]
pub struct TimerSlot {
    deadline: Option<Instant>,
}

impl TimerSlot {
    /// Creates an idle timer slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the timer, cancelling any pending deadline.
    pub fn start(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    /// Cancels the pending deadline. Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Pending deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Clears and reports the deadline if it has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(150);

    #[test]
    fn test_fires_once_after_deadline() {
        let start = Instant::now();
        let mut timer = TimerSlot::new();
        timer.start(start, DELAY);

        assert!(!timer.fire_if_due(start + Duration::from_millis(149)));
        assert!(timer.fire_if_due(start + DELAY));
        assert!(!timer.fire_if_due(start + Duration::from_millis(500)));
        assert_eq!(timer.deadline(), None);
    }

    #[test]
    fn test_restart_replaces_pending_deadline() {
        let start = Instant::now();
        let mut timer = TimerSlot::new();
        timer.start(start, DELAY);
        timer.start(start + Duration::from_millis(100), DELAY);

        assert_eq!(timer.deadline(), Some(start + Duration::from_millis(250)));
        // The first deadline would have passed here; the restarted one has not.
        assert!(!timer.fire_if_due(start + Duration::from_millis(200)));
        assert!(timer.fire_if_due(start + Duration::from_millis(250)));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut timer = TimerSlot::new();
        timer.start(start, DELAY);

        assert!(timer.cancel());
        assert!(!timer.cancel());
        assert!(!timer.fire_if_due(start + DELAY));
    }
}
