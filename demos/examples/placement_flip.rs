// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Where a panel lands as its trigger approaches each viewport edge.
//!
//! For every requested placement, the trigger is placed in the middle of
//! the viewport and hard against the edge the panel would overflow. The
//! reference positioner picks a strategy, the detector recovers the
//! rendered placement, and the arrow is aimed back at the trigger.
//!
//! Run:
//! - `cargo run -p understory_demos --example placement_flip`

use kurbo::{Rect, Size};
use understory_placement::{
    FlexiblePositioner, Placement, Side, arrow_position, candidate_strategies, detect_placement,
};

fn main() {
    let viewport = Rect::new(0.0, 0.0, 640.0, 480.0);
    let panel = Size::new(160.0, 64.0);
    let trigger = Size::new(60.0, 24.0);
    let positioner = FlexiblePositioner::default();

    println!("{:<13} {:<8} {:<13} {:<8} arrow", "requested", "where", "rendered", "pushed");
    for requested in Placement::ALL {
        let centered = viewport.center() - trigger.to_vec2() / 2.0;
        let edge = match requested.side {
            Side::Top => (centered.x, 4.0),
            Side::Bottom => (centered.x, viewport.y1 - trigger.height - 4.0),
            Side::Left => (4.0, centered.y),
            Side::Right => (viewport.x1 - trigger.width - 4.0, centered.y),
        };
        for (label, origin) in [("middle", (centered.x, centered.y)), ("edge", edge)] {
            let target = Rect::from_origin_size(origin, trigger);
            let strategies = candidate_strategies(requested, 8.0, true);
            let Some(positioned) = positioner.position(&strategies, target, panel, viewport) else {
                continue;
            };
            let rendered = detect_placement(target, positioned.rect, requested);
            let arrow = arrow_position(rendered, target, positioned.rect);
            let (property, px) = arrow.css();
            println!(
                "{:<13} {:<8} {:<13} {:<8} {property}: {px}px",
                requested.as_str(),
                label,
                rendered.as_str(),
                positioned.pushed
            );
        }
    }
}
