// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Placement: a Kurbo-native placement engine for floating panels.
//!
//! Popovers, tooltips, and menus all need to answer the same geometric
//! questions: where does the panel go relative to the element that opened
//! it, what happens when that spot is off screen, and where does the arrow
//! point once the layout engine has had its say.
//!
//! - [`Placement`]: twelve placements, a [`Side`] times an [`Alignment`].
//! - [`AnchorStrategy`] and [`candidate_strategies`]: ordered attachment
//!   strategies (primary first, then fallbacks) for a layout engine to try.
//! - [`FlexiblePositioner`]: a reference layout step that picks the first
//!   strategy fitting the viewport and pushes the panel on screen otherwise.
//! - [`detect_placement`]: recover the placement actually rendered from the
//!   target and panel rectangles.
//! - [`arrow_position`]: arrow offset along the panel edge, clamped away
//!   from the corners.
//!
//! ## Not a layout engine
//!
//! Nothing here reads from or writes to a scene. Callers measure rectangles
//! with whatever layout system they use and feed them in; all functions are
//! pure and cheap enough to rerun every frame.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use understory_placement::{
//!     ArrowPosition, FlexiblePositioner, Placement, arrow_position, candidate_strategies,
//!     detect_placement,
//! };
//!
//! let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
//! // A trigger near the bottom edge of the viewport.
//! let target = Rect::new(100.0, 560.0, 150.0, 580.0);
//!
//! let strategies = candidate_strategies(Placement::BOTTOM, 8.0, true);
//! let positioned = FlexiblePositioner::default()
//!     .position(&strategies, target, Size::new(100.0, 40.0), viewport)
//!     .unwrap();
//!
//! // There was no room below, so the panel flipped above the trigger.
//! let actual = detect_placement(target, positioned.rect, Placement::BOTTOM);
//! assert_eq!(actual, Placement::TOP);
//! assert_eq!(
//!     arrow_position(actual, target, positioned.rect),
//!     ArrowPosition::Left(50.0)
//! );
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod arrow;
pub mod detect;
pub mod positioner;
pub mod strategy;
pub mod types;

pub use arrow::{ArrowPosition, HORIZONTAL_ARROW_MARGIN, VERTICAL_ARROW_MARGIN, arrow_position};
pub use detect::{ALIGN_TOLERANCE, detect_placement, detect_placement_with_tolerance};
pub use positioner::{DEFAULT_VIEWPORT_MARGIN, FlexiblePositioner, Positioned};
pub use strategy::{
    AnchorPoint, AnchorStrategy, HorizontalAnchor, VerticalAnchor, candidate_strategies,
};
pub use types::{Alignment, ParsePlacementError, Placement, Side};
