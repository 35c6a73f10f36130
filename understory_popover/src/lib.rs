// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Popover: a headless, `no_std` popover controller.
//!
//! ## Overview
//!
//! This crate manages floating panels anchored to a trigger element:
//! tooltips, info popovers, small dialogs. It owns the interaction logic
//! and leaves every pixel to the embedding UI layer.
//!
//! - [`PopoverController`](crate::controller::PopoverController): opens an
//!   overlay per call, wires dismissal sources (backdrop, outside press,
//!   Escape, timeout, navigation), keeps the arrow aimed after the layout
//!   engine flips the panel, and tears everything down exactly once.
//! - [`PopoverRef`](crate::instance::PopoverRef): a shared handle to one
//!   instance with an awaitable [`closed`](crate::instance::PopoverRef::closed)
//!   notification.
//! - [`PopoverTrigger`](crate::trigger::PopoverTrigger): click, hover and
//!   manual interaction models, including open/close delays and ARIA linkage.
//! - [`PanelPresenter`](crate::presenter::PanelPresenter): the panel view,
//!   initial focus or focus trap, and copy-to-clipboard with a fallback path.
//!
//! Geometry comes from [`understory_placement`].
//!
//! ## The host
//!
//! All side effects go through the [`Host`](crate::host::Host) trait:
//! measuring elements, setting attributes and classes, attaching overlays,
//! registering listeners, and clipboard access. The host feeds events back
//! in, tagged with the [`ListenerId`](crate::host::ListenerId) it handed
//! out, and drives time:
//!
//! 1) Deliver each event to the trigger and the controller with
//!    `handle_event`.
//! 2) Call `advance(now)` on both at or after their `next_deadline()`.
//! 3) Call `animation_frame` while `wants_animation_frame()` is true.
//!
//! Nothing in this crate reads a clock; `now` is any monotonic
//! [`Duration`](core::time::Duration) since a host-chosen epoch.
//!
//! ## Configuration
//!
//! A controller holds default [`PopoverConfig`](crate::config::PopoverConfig)
//! values; each call passes partial [`PopoverOptions`](crate::config::PopoverOptions)
//! that override only what they set.
//!
//! ```rust
//! use core::time::Duration;
//! use understory_popover::config::{AutoClose, PopoverConfig, PopoverOptions, TriggerMode};
//! use understory_popover::dismiss::DismissalPlan;
//!
//! let defaults = PopoverConfig {
//!     hover_close_delay: Duration::from_millis(300),
//!     ..PopoverConfig::default()
//! };
//! let config = PopoverOptions::new()
//!     .trigger(TriggerMode::Hover)
//!     .auto_close(AutoClose::Timeout)
//!     .timeout(Duration::from_secs(2))
//!     .merge_over(&defaults);
//!
//! let plan = DismissalPlan::for_config(&config);
//! // Hover popovers have no backdrop and ignore outside presses.
//! assert!(!plan.backdrop);
//! assert!(!plan.outside_pointer);
//! assert_eq!(plan.timeout, Some(Duration::from_secs(2)));
//! assert_eq!(config.hover_close_delay, Duration::from_millis(300));
//! ```
//!
//! ## Logging
//!
//! Decisions are reported through the [`log`] facade: `debug` for opens,
//! closes and dismissals, `trace` for timers and refresh frames, `warn` for
//! absorbed failures (measurement, clipboard, stale tickets).
//!
//! ## Features
//!
//! - `std` (default): forwarded to `kurbo`.
//! - `libm`: `no_std` float math for `kurbo`.
//! - `serde`: deserialize [`PopoverOptions`](crate::config::PopoverOptions) from settings files.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod config;
pub mod content;
pub mod controller;
pub mod dismiss;
pub mod error;
pub mod host;
pub mod hover;
pub mod instance;
pub mod presenter;
pub mod timer;
pub mod trigger;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{AutoClose, PopoverConfig, PopoverData, PopoverOptions, PopoverRole, TriggerMode};
pub use content::PopoverContent;
pub use controller::PopoverController;
pub use error::{ClipboardError, MeasureError, OpenError};
pub use host::{Host, HostEvent, ListenerId};
pub use instance::{CloseReason, Closed, PopoverId, PopoverRef};
pub use presenter::{CopyStatus, PanelPresenter, PanelView};
pub use trigger::PopoverTrigger;
pub use understory_placement::{Alignment, Placement, Side};
