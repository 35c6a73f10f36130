// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Popover instances: identity, lifecycle, and the closed notification.
//!
//! ## Lifecycle
//!
//! Every successful [`open`](crate::controller::PopoverController::open)
//! creates exactly one instance. Its state only moves forward:
//!
//! ```text
//! Open ──close()──▶ Closing ──teardown done──▶ Closed
//! ```
//!
//! Teardown runs once. The [`CloseReason`] is recorded when the instance
//! reaches [`Closed`](LifecycleState::Closed), and only then do
//! [`WhenClosed`] futures resolve, so an awaiting caller never observes a
//! half-torn-down overlay.
//!
//! A [`PopoverRef`] is a cheap shared handle: clone it into a trigger, a
//! close button, or an async task. It cannot close the popover on its own;
//! closing goes through the controller that owns the overlay.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

/// Identifier of one popover instance, unique within its controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PopoverId(u64);

impl PopoverId {
    /// Raw value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PopoverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Prefix of generated panel element ids.
pub const PANEL_ID_PREFIX: &str = "understory-popover-";

/// Allocates instance ids and panel element ids.
///
/// Each controller owns one, so two controllers never share a counter.
#[derive(Clone, Debug, Default)]
pub struct PanelIdGenerator {
    next: u64,
}

impl PanelIdGenerator {
    /// A generator starting at zero.
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Allocate the next instance id and its panel id, e.g. `understory-popover-3`.
    pub fn next_id(&mut self) -> (PopoverId, String) {
        let n = self.next;
        self.next += 1;
        (PopoverId(n), format!("{PANEL_ID_PREFIX}{n}"))
    }
}

/// Lifecycle state of an instance.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LifecycleState {
    /// Overlay attached and wired.
    Open,
    /// Teardown in progress.
    Closing,
    /// Torn down; the closed notification has fired.
    Closed,
}

/// Why an instance closed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CloseReason {
    /// The backdrop was clicked.
    Backdrop,
    /// A pointer press landed outside the panel and trigger.
    OutsidePointer,
    /// Escape was pressed.
    Escape,
    /// The auto-close timeout elapsed.
    Timeout,
    /// The host navigated.
    Navigation,
    /// The panel's close button was activated.
    CloseButton,
    /// The trigger toggled it closed.
    Trigger,
    /// The pointer left the trigger and panel.
    HoverLeave,
    /// Closed by host code.
    Programmatic,
    /// The owning controller or trigger was disposed.
    Disposed,
}

/// Notification queued when an instance finishes closing.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Closed {
    /// The instance.
    pub id: PopoverId,
    /// Why it closed.
    pub reason: CloseReason,
}

#[derive(Debug)]
struct Lifecycle {
    state: LifecycleState,
    reason: Option<CloseReason>,
    wakers: Vec<Waker>,
}

/// Shared handle to one popover instance.
#[derive(Clone)]
pub struct PopoverRef {
    id: PopoverId,
    panel_id: Rc<str>,
    lifecycle: Rc<RefCell<Lifecycle>>,
}

impl fmt::Debug for PopoverRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopoverRef")
            .field("id", &self.id)
            .field("panel_id", &self.panel_id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl PopoverRef {
    pub(crate) fn new(id: PopoverId, panel_id: &str) -> Self {
        Self {
            id,
            panel_id: panel_id.into(),
            lifecycle: Rc::new(RefCell::new(Lifecycle {
                state: LifecycleState::Open,
                reason: None,
                wakers: Vec::new(),
            })),
        }
    }

    /// Instance id.
    pub fn id(&self) -> PopoverId {
        self.id
    }

    /// Element id of the panel, the target of `aria-controls`.
    pub fn panel_id(&self) -> &str {
        &self.panel_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.borrow().state
    }

    /// True while the overlay is attached.
    pub fn is_open(&self) -> bool {
        self.state() == LifecycleState::Open
    }

    /// True once teardown has completed.
    pub fn is_closed(&self) -> bool {
        self.state() == LifecycleState::Closed
    }

    /// Why the instance closed, once it has.
    pub fn close_reason(&self) -> Option<CloseReason> {
        self.lifecycle.borrow().reason
    }

    /// A future resolving with the [`CloseReason`] once the instance is closed.
    ///
    /// Resolves immediately if it already is.
    pub fn closed(&self) -> WhenClosed {
        WhenClosed {
            lifecycle: self.lifecycle.clone(),
        }
    }

    /// Move from `Open` to `Closing`. False if teardown already started.
    pub(crate) fn begin_close(&self) -> bool {
        let mut lifecycle = self.lifecycle.borrow_mut();
        if lifecycle.state != LifecycleState::Open {
            return false;
        }
        lifecycle.state = LifecycleState::Closing;
        true
    }

    /// Record the reason, mark `Closed`, and wake waiters.
    pub(crate) fn finish_close(&self, reason: CloseReason) {
        let wakers = {
            let mut lifecycle = self.lifecycle.borrow_mut();
            lifecycle.state = LifecycleState::Closed;
            lifecycle.reason = Some(reason);
            core::mem::take(&mut lifecycle.wakers)
        };
        for waker in wakers {
            waker.wake();
        }
    }
}

/// Future returned by [`PopoverRef::closed`].
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct WhenClosed {
    lifecycle: Rc<RefCell<Lifecycle>>,
}

impl Future for WhenClosed {
    type Output = CloseReason;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<CloseReason> {
        let mut lifecycle = self.lifecycle.borrow_mut();
        match (lifecycle.state, lifecycle.reason) {
            (LifecycleState::Closed, Some(reason)) => Poll::Ready(reason),
            _ => {
                if !lifecycle.wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    lifecycle.wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}
