// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_timing --heading-base-level=0

//! Understory Timing: host-agnostic timer primitives for UI runtimes.
//!
//! UI toolkits frequently need to defer work: run validation once the user has
//! stopped tabbing between fields, show a tooltip after a hover delay, retry an
//! operation later. This crate provides the _bookkeeping_ for such deferrals
//! without owning a clock, a thread or an event loop. Every operation takes the
//! current time as a plain `u64` (milliseconds by convention) supplied by the
//! host, which keeps the primitives deterministic and trivially testable.
//!
//! - [`TimerQueue`]: many keyed deadlines with explicit cancellation through
//!   [`TimerId`] handles, drained in deadline order.
//! - [`Debounce`]: a single resettable window; re-arming before it elapses
//!   pushes the deadline back, and it fires exactly once when polled after the
//!   deadline.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_timing::Debounce;
//!
//! let mut debounce = Debounce::new(200);
//!
//! // Two blur events in quick succession: the second one resets the window.
//! debounce.schedule(1_000);
//! debounce.schedule(1_150);
//! assert_eq!(debounce.deadline(), Some(1_350));
//!
//! // Not yet.
//! assert!(!debounce.poll(1_300));
//! // Fires once...
//! assert!(debounce.poll(1_350));
//! // ...and only once.
//! assert!(!debounce.poll(2_000));
//! ```
//!
//! ## Timer queue
//!
//! ```rust
//! use understory_timing::TimerQueue;
//!
//! let mut timers = TimerQueue::new();
//! let tooltip = timers.schedule("tooltip", 500);
//! timers.schedule("autosave", 2_000);
//!
//! // The pointer left before the tooltip delay elapsed.
//! assert!(timers.cancel(tooltip));
//!
//! assert_eq!(timers.next_deadline(), Some(2_000));
//! let fired: Vec<_> = timers.pop_expired(2_000).into_iter().collect();
//! assert_eq!(fired, vec!["autosave"]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod debounce;
mod queue;

pub use debounce::Debounce;
pub use queue::{Expired, TimerId, TimerQueue};
