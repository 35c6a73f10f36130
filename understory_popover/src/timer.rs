// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-driven timers.
//!
//! Nothing in this crate reads a clock. Every time-sensitive entry point
//! takes `now`, the time elapsed since an arbitrary host epoch, and each
//! pending delay lives in a named [`Timer`] field of the state machine that
//! owns it. Arming a timer replaces any earlier deadline; canceling is
//! always safe.
//!
//! [`FrameThrottle`] covers the other suspension point: work deferred until
//! the layout engine has settled, two animation frames later.

use core::time::Duration;

/// A single-shot, re-armable deadline.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Timer {
    due: Option<Duration>,
}

impl Timer {
    /// An idle timer.
    pub const fn new() -> Self {
        Self { due: None }
    }

    /// Arm to fire `delay` after `now`, replacing any pending deadline.
    pub fn arm(&mut self, now: Duration, delay: Duration) {
        self.due = Some(now.saturating_add(delay));
    }

    /// Disarm. Returns true if a deadline was pending.
    pub fn cancel(&mut self) -> bool {
        self.due.take().is_some()
    }

    /// True if a deadline is pending.
    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    /// The pending deadline, if any.
    pub fn due(&self) -> Option<Duration> {
        self.due
    }

    /// Fire if the deadline has passed. Firing disarms the timer.
    pub fn fire(&mut self, now: Duration) -> bool {
        match self.due {
            Some(due) if due <= now => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

/// Earliest of two optional deadlines.
pub fn earliest(a: Option<Duration>, b: Option<Duration>) -> Option<Duration> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
enum FrameState {
    #[default]
    Idle,
    AwaitingFirst,
    AwaitingSecond,
}

/// Coalesces work onto the frame after the next one.
///
/// Any number of [`request`](Self::request) calls before the work runs
/// collapse into a single run. The work is due on the second
/// [`on_frame`](Self::on_frame) call after the first request.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct FrameThrottle {
    state: FrameState,
}

impl FrameThrottle {
    /// An idle throttle.
    pub const fn new() -> Self {
        Self {
            state: FrameState::Idle,
        }
    }

    /// Ask for the work to run. No-op if a run is already scheduled.
    pub fn request(&mut self) {
        if self.state == FrameState::Idle {
            self.state = FrameState::AwaitingFirst;
        }
    }

    /// True if a run is scheduled.
    pub fn is_pending(&self) -> bool {
        self.state != FrameState::Idle
    }

    /// Drop any scheduled run.
    pub fn cancel(&mut self) {
        self.state = FrameState::Idle;
    }

    /// Advance one animation frame. Returns true when the work should run now.
    pub fn on_frame(&mut self) -> bool {
        match self.state {
            FrameState::Idle => false,
            FrameState::AwaitingFirst => {
                self.state = FrameState::AwaitingSecond;
                false
            }
            FrameState::AwaitingSecond => {
                self.state = FrameState::Idle;
                true
            }
        }
    }
}
