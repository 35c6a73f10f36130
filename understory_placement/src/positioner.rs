// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A reference flexible positioner.
//!
//! Hosts with their own overlay layout engine only need the strategy list
//! from [`candidate_strategies`](crate::candidate_strategies). Hosts without
//! one can use [`FlexiblePositioner`], which tries each strategy in order,
//! keeps the first that fits inside the viewport minus a margin, and
//! otherwise pushes the first strategy's rectangle back on screen.
//!
//! Because the positioner may choose a different strategy than the first,
//! the resulting placement can differ from the requested one. Use
//! [`detect_placement`](crate::detect_placement) on the rendered rects to
//! recover what actually happened.

use kurbo::{Rect, Size};

use crate::strategy::AnchorStrategy;

/// Default gap kept between a positioned panel and the viewport edges.
pub const DEFAULT_VIEWPORT_MARGIN: f64 = 8.0;

/// Outcome of [`FlexiblePositioner::position`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Positioned {
    /// Final panel rectangle in viewport coordinates.
    pub rect: Rect,
    /// Index into the strategy list of the strategy that was used.
    pub strategy: usize,
    /// True if no strategy fit and the rectangle was pushed into view.
    pub pushed: bool,
}

/// Flexible, pushing, viewport-margined positioner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FlexiblePositioner {
    /// Gap kept between the panel and the viewport edges.
    pub viewport_margin: f64,
    /// Push an overflowing panel back into the viewport when nothing fits.
    pub push: bool,
}

impl Default for FlexiblePositioner {
    fn default() -> Self {
        Self {
            viewport_margin: DEFAULT_VIEWPORT_MARGIN,
            push: true,
        }
    }
}

impl FlexiblePositioner {
    /// Pick a strategy for a panel of `panel_size` next to `target`.
    ///
    /// Returns `None` only when `strategies` is empty.
    pub fn position(
        &self,
        strategies: &[AnchorStrategy],
        target: Rect,
        panel_size: Size,
        viewport: Rect,
    ) -> Option<Positioned> {
        let bounds = viewport.inset(-self.viewport_margin);
        for (i, strategy) in strategies.iter().enumerate() {
            let rect = strategy.resolve(target, panel_size);
            if fits(rect, bounds) {
                return Some(Positioned {
                    rect,
                    strategy: i,
                    pushed: false,
                });
            }
        }

        let first = strategies.first()?;
        let rect = first.resolve(target, panel_size);
        if !self.push {
            return Some(Positioned {
                rect,
                strategy: 0,
                pushed: false,
            });
        }
        Some(Positioned {
            rect: push_into(rect, bounds),
            strategy: 0,
            pushed: true,
        })
    }
}

fn fits(rect: Rect, bounds: Rect) -> bool {
    rect.x0 >= bounds.x0 && rect.y0 >= bounds.y0 && rect.x1 <= bounds.x1 && rect.y1 <= bounds.y1
}

// Oversized panels keep their leading edge on screen.
fn push_into(rect: Rect, bounds: Rect) -> Rect {
    let dx = if rect.x1 > bounds.x1 {
        bounds.x1 - rect.x1
    } else {
        0.0
    };
    let dy = if rect.y1 > bounds.y1 {
        bounds.y1 - rect.y1
    } else {
        0.0
    };
    let shifted = rect + kurbo::Vec2::new(dx, dy);
    let dx = if shifted.x0 < bounds.x0 {
        bounds.x0 - shifted.x0
    } else {
        0.0
    };
    let dy = if shifted.y0 < bounds.y0 {
        bounds.y0 - shifted.y0
    } else {
        0.0
    };
    shifted + kurbo::Vec2::new(dx, dy)
}
