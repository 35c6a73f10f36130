// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Post-layout placement detection.
//!
//! ## Overview
//!
//! A layout engine is free to flip or push a panel to keep it on screen, so
//! the placement that was requested is not necessarily the one that was
//! rendered. [`detect_placement`] compares the rendered target and panel
//! rectangles and reports the placement actually in effect. Arrow position
//! and placement-specific styling should follow this value.
//!
//! ## Rules
//!
//! - Panel entirely above the target → `top` family; entirely below →
//!   `bottom`; entirely left → `left`; entirely right → `right`. Sides are
//!   checked in that order.
//! - Within a family, the start edges aligning (within the tolerance) and
//!   the end edges not aligning → `-start`; the reverse → `-end`.
//! - Neither pair aligning → centered. Both pairs aligning (equal extents)
//!   keeps the requested alignment when the requested side was honored,
//!   and is centered otherwise.
//! - Overlapping rectangles are ambiguous; the requested placement is
//!   returned unchanged.

use kurbo::Rect;

use crate::types::{Alignment, Placement, Side};

/// Edge-alignment fuzz, in pixels, used by [`detect_placement`].
///
/// Rendered rectangles are rarely pixel exact after subpixel layout and
/// borders, so edges within this distance count as aligned.
pub const ALIGN_TOLERANCE: f64 = 5.0;

/// Infer the placement actually rendered, using [`ALIGN_TOLERANCE`].
pub fn detect_placement(target: Rect, panel: Rect, requested: Placement) -> Placement {
    detect_placement_with_tolerance(target, panel, requested, ALIGN_TOLERANCE)
}

/// Infer the placement actually rendered, with an explicit alignment tolerance.
pub fn detect_placement_with_tolerance(
    target: Rect,
    panel: Rect,
    requested: Placement,
    tolerance: f64,
) -> Placement {
    let side = if panel.y1 <= target.y0 {
        Side::Top
    } else if panel.y0 >= target.y1 {
        Side::Bottom
    } else if panel.x1 <= target.x0 {
        Side::Left
    } else if panel.x0 >= target.x1 {
        Side::Right
    } else {
        return requested;
    };

    let (start_aligned, end_aligned) = if side.is_vertical() {
        (
            within(panel.y0, target.y0, tolerance),
            within(panel.y1, target.y1, tolerance),
        )
    } else {
        (
            within(panel.x0, target.x0, tolerance),
            within(panel.x1, target.x1, tolerance),
        )
    };

    let align = match (start_aligned, end_aligned) {
        (true, false) => Alignment::Start,
        (false, true) => Alignment::End,
        (true, true) if side == requested.side => requested.align,
        _ => Alignment::Center,
    };
    Placement::new(side, align)
}

fn within(a: f64, b: f64, tolerance: f64) -> bool {
    let d = a - b;
    d <= tolerance && d >= -tolerance
}
