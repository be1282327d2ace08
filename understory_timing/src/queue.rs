// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyed timer queue.

use alloc::vec::Vec;
use core::fmt;

use smallvec::SmallVec;

/// Keys returned by [`TimerQueue::pop_expired`], in deadline order.
///
/// Most ticks expire zero or one timer, so this stays inline for small batches.
pub type Expired<K> = SmallVec<[K; 4]>;

/// Handle to a scheduled timer, used for explicit cancellation.
///
/// Handles are never reused within a single [`TimerQueue`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    /// Returns the raw sequence number of this handle.
    #[must_use]
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TimerId").field(&self.0).finish()
    }
}

#[derive(Clone, Debug)]
struct Entry<K> {
    id: TimerId,
    deadline: u64,
    key: K,
}

/// A queue of keyed deadlines driven by caller-supplied timestamps.
///
/// The queue never reads a clock. Hosts call [`TimerQueue::pop_expired`] with
/// the current time, typically from their frame or event loop, and act on the
/// returned keys. Timers that share a deadline expire in scheduling order.
///
/// Entries are kept sorted by `(deadline, id)`, so scheduling is linear in
/// the number of pending timers and draining is linear in the number expired.
/// UI runtimes rarely hold more than a handful of timers at once.
#[derive(Clone, Debug)]
pub struct TimerQueue<K> {
    entries: Vec<Entry<K>>,
    next_id: u64,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TimerQueue<K> {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Returns the number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Schedules `key` to expire at `deadline`.
    pub fn schedule(&mut self, key: K, deadline: u64) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let at = self
            .entries
            .partition_point(|e| (e.deadline, e.id) <= (deadline, id));
        self.entries.insert(at, Entry { id, deadline, key });
        id
    }

    /// Cancels a pending timer.
    ///
    /// Returns `true` if the timer was pending, `false` if it had already
    /// expired or been cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if `id` is still pending.
    #[must_use]
    pub fn contains(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Returns the deadline of `id` if it is still pending.
    #[must_use]
    pub fn deadline_of(&self, id: TimerId) -> Option<u64> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.deadline)
    }

    /// Returns the earliest pending deadline, if any.
    ///
    /// Hosts can use this to decide how long to sleep or when to request the
    /// next frame.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.first().map(|e| e.deadline)
    }

    /// Removes and returns every timer whose deadline is at or before `now`.
    pub fn pop_expired(&mut self, now: u64) -> Expired<K> {
        let split = self.entries.partition_point(|e| e.deadline <= now);
        self.entries.drain(..split).map(|e| e.key).collect()
    }

    /// Cancels every pending timer.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
