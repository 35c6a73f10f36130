// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Click-triggered popover near the bottom of the page.
//!
//! The trigger sits so close to the bottom edge that the panel flips above
//! it; the refresh two frames later detects the flip and re-aims the arrow.
//! The panel's text is then copied (through the fallback path) and the
//! popover is dismissed with Escape.
//!
//! Run:
//! - `RUST_LOG=info cargo run -p understory_demos --example popover_click`

use core::time::Duration;

use kurbo::Rect;
use understory_demos::DemoHost;
use understory_popover::host::{EventTarget, HostEvent, Key};
use understory_popover::{PopoverController, PopoverOptions, PopoverTrigger};

fn deliver(
    host: &mut DemoHost,
    controller: &mut PopoverController<DemoHost>,
    trigger: &mut PopoverTrigger<DemoHost>,
    target: EventTarget<u32>,
    event: HostEvent<u32>,
    now: Duration,
) {
    for listener in host.listeners_for(target, event.kind) {
        if !trigger.handle_event(host, controller, listener, &event, now) {
            controller.handle_event(host, listener, &event);
        }
    }
    trigger.sync(host);
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut host = DemoHost::new(800.0, 600.0);
    let button = host.add("api-key-button", Rect::new(40.0, 560.0, 120.0, 584.0));
    let mut controller = PopoverController::new();
    let mut trigger = PopoverTrigger::new(
        &controller,
        button,
        "sk-live-4f9a0c".into(),
        PopoverOptions::new()
            .show_header(true)
            .header("API key".to_owned()),
    );
    trigger.attach(&mut host);

    let mut now = Duration::ZERO;
    deliver(
        &mut host,
        &mut controller,
        &mut trigger,
        EventTarget::Element(button),
        HostEvent::click(button),
        now,
    );
    while controller.wants_animation_frame() {
        controller.animation_frame(&mut host);
    }
    let popover = trigger.popover().cloned().expect("click opened the popover");
    println!(
        "requested {}, rendered {:?}",
        controller.config(&popover).map(|c| c.placement).unwrap_or_default(),
        controller.placement(&popover)
    );

    now += Duration::from_millis(500);
    let status = controller.copy(&mut host, &popover, now);
    println!("copy: {status:?}, clipboard now holds {:?}", host.clipboard);

    now += Duration::from_millis(100);
    deliver(
        &mut host,
        &mut controller,
        &mut trigger,
        EventTarget::Document,
        HostEvent::key_down(Key::Escape),
        now,
    );
    for closed in controller.take_closed() {
        println!("popover {} closed: {:?}", closed.id, closed.reason);
    }
    println!(
        "aria-expanded = {:?}, {} listeners left",
        host.attribute(button, "aria-expanded"),
        host.listener_count()
    );

    trigger.dispose(&mut host, &mut controller);
    println!("after dispose: {} listeners left", host.listener_count());
}
