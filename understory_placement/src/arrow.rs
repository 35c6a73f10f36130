// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arrow coordinates: where a panel's pointer arrow sits so it aims at the target.

use kurbo::Rect;

use crate::types::{Alignment, Placement};

/// Minimum distance between the arrow and the panel's top/bottom edges for
/// left/right placements.
pub const VERTICAL_ARROW_MARGIN: f64 = 15.0;

/// Minimum distance between the arrow and the panel's left/right edges for
/// top/bottom placements.
pub const HORIZONTAL_ARROW_MARGIN: f64 = 20.0;

/// Arrow position relative to the panel, named after the CSS property it maps to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ArrowPosition {
    /// Distance from the panel's top edge (left/right placements).
    Top(f64),
    /// Distance from the panel's left edge (top/bottom, centered or `-start`).
    Left(f64),
    /// Distance from the panel's right edge (top/bottom `-end`).
    Right(f64),
}

impl ArrowPosition {
    /// CSS property name and pixel value, e.g. `("left", 42.0)`.
    pub fn css(self) -> (&'static str, f64) {
        match self {
            Self::Top(v) => ("top", v),
            Self::Left(v) => ("left", v),
            Self::Right(v) => ("right", v),
        }
    }
}

/// Arrow position for a panel rendered at `panel` with `placement` (the
/// detected one) pointing at `target`.
///
/// The arrow follows the target's center on the panel's free axis and is
/// clamped away from the panel corners. A panel too small to honor the
/// margin on both ends gets its arrow at the midpoint.
pub fn arrow_position(placement: Placement, target: Rect, panel: Rect) -> ArrowPosition {
    let center = target.center();
    if placement.is_vertical() {
        let y = clamp_or_mid(center.y - panel.y0, VERTICAL_ARROW_MARGIN, panel.height());
        return ArrowPosition::Top(y);
    }
    let from_left = center.x - panel.x0;
    let width = panel.width();
    match placement.align {
        Alignment::End => ArrowPosition::Right(clamp_or_mid(
            width - from_left,
            HORIZONTAL_ARROW_MARGIN,
            width,
        )),
        Alignment::Center | Alignment::Start => {
            ArrowPosition::Left(clamp_or_mid(from_left, HORIZONTAL_ARROW_MARGIN, width))
        }
    }
}

fn clamp_or_mid(value: f64, margin: f64, extent: f64) -> f64 {
    let hi = extent - margin;
    // `clamp` panics on NaN bounds.
    if hi.is_nan() || hi < margin {
        extent / 2.0
    } else {
        value.clamp(margin, hi)
    }
}
