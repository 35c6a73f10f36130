// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dismissal sources and the policy deciding which are wired.

use core::time::Duration;

use crate::config::{AutoClose, PopoverConfig, TriggerMode};
use crate::instance::CloseReason;

/// An independent way an open popover can be dismissed without the trigger.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DismissSource {
    /// Click on the backdrop.
    Backdrop,
    /// Pointer press outside the panel and trigger.
    OutsidePointer,
    /// Escape key anywhere in the document.
    Escape,
    /// Auto-close deadline.
    Timeout,
    /// Host navigation.
    Navigation,
}

impl DismissSource {
    /// The close reason recorded when this source fires.
    pub const fn reason(self) -> CloseReason {
        match self {
            Self::Backdrop => CloseReason::Backdrop,
            Self::OutsidePointer => CloseReason::OutsidePointer,
            Self::Escape => CloseReason::Escape,
            Self::Timeout => CloseReason::Timeout,
            Self::Navigation => CloseReason::Navigation,
        }
    }
}

/// Which dismissal sources an instance gets.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DismissalPlan {
    /// Close on backdrop click.
    pub backdrop: bool,
    /// Close on a pointer press outside.
    pub outside_pointer: bool,
    /// Close on Escape.
    pub escape: bool,
    /// Close after this long.
    pub timeout: Option<Duration>,
    /// Close on navigation.
    pub navigation: bool,
}

impl DismissalPlan {
    /// Derive the plan from a resolved config.
    ///
    /// Hover popovers ignore outside presses: the pointer that opened them
    /// is by definition outside the panel.
    pub fn for_config(config: &PopoverConfig) -> Self {
        Self {
            backdrop: config.has_backdrop() && config.auto_close != AutoClose::Hover,
            outside_pointer: config.auto_close == AutoClose::Outside
                && config.trigger != TriggerMode::Hover,
            escape: true,
            timeout: config.effective_timeout(),
            navigation: config.close_on_navigation,
        }
    }
}
