// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Anchor strategies: how a placement maps onto target and panel anchor points.
//!
//! ## Overview
//!
//! An [`AnchorStrategy`] pairs a point on the target with a point on the
//! panel, plus a pixel offset along the normal axis. A positioner places the
//! panel so that the two points coincide after the offset is applied.
//!
//! [`candidate_strategies`] produces the ordered list a positioner tries
//! until one fits the viewport: the requested placement first, then its
//! mirror, then the two orthogonal sides.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size, Vec2};

use crate::types::{Alignment, Placement, Side};

/// Horizontal anchor within a box.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HorizontalAnchor {
    /// Left edge.
    Start,
    /// Horizontal center.
    Center,
    /// Right edge.
    End,
}

/// Vertical anchor within a box.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum VerticalAnchor {
    /// Top edge.
    Top,
    /// Vertical center.
    Center,
    /// Bottom edge.
    Bottom,
}

/// A point on a box expressed as a pair of edge anchors.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AnchorPoint {
    /// Horizontal anchor.
    pub x: HorizontalAnchor,
    /// Vertical anchor.
    pub y: VerticalAnchor,
}

impl AnchorPoint {
    /// Create an anchor point.
    pub const fn new(x: HorizontalAnchor, y: VerticalAnchor) -> Self {
        Self { x, y }
    }

    /// Offset of this anchor from the top-left corner of a box of `size`.
    pub fn offset_in(self, size: Size) -> Vec2 {
        let x = match self.x {
            HorizontalAnchor::Start => 0.0,
            HorizontalAnchor::Center => size.width / 2.0,
            HorizontalAnchor::End => size.width,
        };
        let y = match self.y {
            VerticalAnchor::Top => 0.0,
            VerticalAnchor::Center => size.height / 2.0,
            VerticalAnchor::Bottom => size.height,
        };
        Vec2::new(x, y)
    }

    /// Resolve this anchor against a concrete rectangle.
    pub fn on(self, rect: Rect) -> Point {
        rect.origin() + self.offset_in(rect.size())
    }
}

/// One way of attaching a panel to a target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnchorStrategy {
    /// The placement this strategy realizes.
    pub placement: Placement,
    /// Anchor point on the target.
    pub origin: AnchorPoint,
    /// Anchor point on the panel that is moved onto `origin`.
    pub panel: AnchorPoint,
    /// Gap between target and panel, applied along the normal axis only.
    pub offset: Vec2,
}

impl AnchorStrategy {
    /// Build the strategy realizing `placement` with a gap of `offset` pixels.
    pub fn for_placement(placement: Placement, offset: f64) -> Self {
        use HorizontalAnchor as H;
        use VerticalAnchor as V;

        let along_x = match placement.align {
            Alignment::Center => (H::Center, H::Center),
            Alignment::Start => (H::Start, H::Start),
            Alignment::End => (H::End, H::End),
        };
        let along_y = match placement.align {
            Alignment::Center => (V::Center, V::Center),
            Alignment::Start => (V::Top, V::Top),
            Alignment::End => (V::Bottom, V::Bottom),
        };

        let (origin, panel, offset) = match placement.side {
            Side::Top => (
                AnchorPoint::new(along_x.0, V::Top),
                AnchorPoint::new(along_x.1, V::Bottom),
                Vec2::new(0.0, -offset),
            ),
            Side::Bottom => (
                AnchorPoint::new(along_x.0, V::Bottom),
                AnchorPoint::new(along_x.1, V::Top),
                Vec2::new(0.0, offset),
            ),
            Side::Left => (
                AnchorPoint::new(H::Start, along_y.0),
                AnchorPoint::new(H::End, along_y.1),
                Vec2::new(-offset, 0.0),
            ),
            Side::Right => (
                AnchorPoint::new(H::End, along_y.0),
                AnchorPoint::new(H::Start, along_y.1),
                Vec2::new(offset, 0.0),
            ),
        };

        Self {
            placement,
            origin,
            panel,
            offset,
        }
    }

    /// Panel rectangle produced by applying this strategy to `target`.
    pub fn resolve(&self, target: Rect, panel_size: Size) -> Rect {
        let anchor = self.origin.on(target) + self.offset;
        let top_left = anchor - self.panel.offset_in(panel_size);
        Rect::from_origin_size(top_left, panel_size)
    }
}

/// Ordered strategies for a positioner to try until one fits.
///
/// The requested placement always comes first. With `smart` enabled it is
/// followed by the mirrored placement and the two centered placements on
/// the orthogonal axis. Duplicates are skipped.
pub fn candidate_strategies(placement: Placement, offset: f64, smart: bool) -> Vec<AnchorStrategy> {
    let mut order: Vec<Placement> = Vec::with_capacity(4);
    order.push(placement);
    if smart {
        let orthogonal = if placement.is_vertical() {
            [Placement::BOTTOM, Placement::TOP]
        } else {
            [Placement::RIGHT, Placement::LEFT]
        };
        for p in [placement.opposite()].into_iter().chain(orthogonal) {
            if !order.contains(&p) {
                order.push(p);
            }
        }
    }
    order
        .into_iter()
        .map(|p| AnchorStrategy::for_placement(p, offset))
        .collect()
}
