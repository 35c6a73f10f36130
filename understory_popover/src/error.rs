// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Only [`OpenError`] ever reaches a caller: it reports misuse of
//! [`PopoverController::open`](crate::controller::PopoverController::open).
//! Measurement and clipboard failures are reported by the host, then logged
//! and absorbed so a cosmetic or convenience failure never breaks the
//! interaction.

/// Contract violations detected by [`PopoverController::open`](crate::controller::PopoverController::open).
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum OpenError {
    /// The target element is not attached to the host, so it cannot be measured.
    #[error("popover target is not attached to the host")]
    TargetDetached,
}

/// A host could not measure an element.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum MeasureError {
    /// The element is no longer attached.
    #[error("element is detached")]
    Detached,
    /// The host's layout is not ready yet (for example, no layout pass ran).
    #[error("layout is not available")]
    LayoutUnavailable,
}

/// A clipboard write failed.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ClipboardError {
    /// The host offers no clipboard API on this path.
    #[error("clipboard is unavailable")]
    Unavailable,
    /// Permission was denied, or the context is not secure.
    #[error("clipboard permission denied")]
    Denied,
    /// The write was attempted and failed.
    #[error("clipboard write failed")]
    Failed,
}
