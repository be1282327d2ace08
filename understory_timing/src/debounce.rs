// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resettable debounce window.
//!
//! ## Usage
//!
//! 1) Call [`Debounce::schedule`] for every triggering event (for example a
//!    blur). Each call pushes the deadline back to `now + delay`.
//! 2) Call [`Debounce::poll`] from the host loop. It returns `true` exactly
//!    once, the first time it is polled at or after the deadline.
//! 3) Call [`Debounce::cancel`] when the deferred work became irrelevant (for
//!    example because it was performed eagerly).

use crate::queue::{TimerId, TimerQueue};

/// A single debounce window over caller-supplied timestamps.
#[derive(Clone, Debug)]
pub struct Debounce {
    delay: u64,
    timers: TimerQueue<()>,
    armed: Option<TimerId>,
}

impl Debounce {
    /// Creates a disarmed window that fires `delay` after the last trigger.
    #[must_use]
    pub const fn new(delay: u64) -> Self {
        Self {
            delay,
            timers: TimerQueue::new(),
            armed: None,
        }
    }

    /// Returns the configured delay.
    #[must_use]
    pub fn delay(&self) -> u64 {
        self.delay
    }

    /// Arms the window, or resets it if already armed.
    ///
    /// Returns the new deadline.
    pub fn schedule(&mut self, now: u64) -> u64 {
        if let Some(id) = self.armed.take() {
            self.timers.cancel(id);
        }
        let deadline = now.saturating_add(self.delay);
        self.armed = Some(self.timers.schedule((), deadline));
        deadline
    }

    /// Disarms the window.
    ///
    /// Returns `true` if it was armed.
    pub fn cancel(&mut self) -> bool {
        match self.armed.take() {
            Some(id) => self.timers.cancel(id),
            None => false,
        }
    }

    /// Returns `true` while the window is armed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.armed.is_some()
    }

    /// Returns the current deadline, if armed.
    #[must_use]
    pub fn deadline(&self) -> Option<u64> {
        self.armed.and_then(|id| self.timers.deadline_of(id))
    }

    /// Returns `true` once when `now` has reached the deadline, disarming the window.
    pub fn poll(&mut self, now: u64) -> bool {
        if self.armed.is_none() || self.timers.pop_expired(now).is_empty() {
            return false;
        }
        self.armed = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_window_is_disarmed() {
        let mut d = Debounce::new(200);
        assert!(!d.is_pending());
        assert_eq!(d.deadline(), None);
        assert!(!d.poll(u64::MAX));
    }

    #[test]
    fn fires_once_after_delay() {
        let mut d = Debounce::new(200);
        assert_eq!(d.schedule(0), 200);
        assert!(d.is_pending());

        assert!(!d.poll(199));
        assert!(d.poll(200));
        assert!(!d.is_pending());
        assert!(!d.poll(400));
    }

    #[test]
    fn rescheduling_resets_the_window() {
        let mut d = Debounce::new(200);
        d.schedule(0);
        d.schedule(150);
        assert_eq!(d.deadline(), Some(350));

        // The first deadline passes without firing.
        assert!(!d.poll(200));
        assert!(d.poll(350));
    }

    #[test]
    fn cancel_disarms() {
        let mut d = Debounce::new(200);
        d.schedule(0);
        assert!(d.cancel());
        assert!(!d.cancel());
        assert!(!d.poll(1_000));
    }

    #[test]
    fn deadline_saturates() {
        let mut d = Debounce::new(10);
        assert_eq!(d.schedule(u64::MAX - 1), u64::MAX);
        assert!(d.poll(u64::MAX));
    }

    #[test]
    fn can_rearm_after_firing() {
        let mut d = Debounce::new(5);
        d.schedule(0);
        assert!(d.poll(5));
        d.schedule(10);
        assert!(!d.poll(14));
        assert!(d.poll(15));
    }
}
