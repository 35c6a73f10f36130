// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover tooltip with open and close delays.
//!
//! The pointer enters the trigger, wanders into the panel, briefly leaves
//! and comes back inside the close delay, then leaves for good. The host
//! loop only wakes at the deadlines the trigger and controller report.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example popover_hover`

use core::time::Duration;

use kurbo::Rect;
use understory_demos::DemoHost;
use understory_popover::host::{EventKind, EventTarget, HostEvent};
use understory_popover::timer::earliest;
use understory_popover::{
    PopoverContent, PopoverController, PopoverOptions, PopoverRole, PopoverTrigger, TriggerMode,
};

struct Page {
    host: DemoHost,
    controller: PopoverController<DemoHost>,
    trigger: PopoverTrigger<DemoHost>,
}

impl Page {
    fn pointer(&mut self, element: u32, kind: EventKind, now: Duration) {
        println!("{:>5}ms  {kind:?}", now.as_millis());
        let event = HostEvent::new(kind).on(element);
        for listener in self.host.listeners_for(EventTarget::Element(element), kind) {
            self.trigger
                .handle_event(&mut self.host, &mut self.controller, listener, &event, now);
        }
    }

    /// Run every deadline up to `until`.
    fn run_until(&mut self, until: Duration) {
        while let Some(due) = earliest(
            self.trigger.next_deadline(),
            self.controller.next_deadline(),
        )
        .filter(|due| *due <= until)
        {
            println!("{:>5}ms  timer", due.as_millis());
            self.controller.advance(&mut self.host, due);
            self.trigger
                .advance(&mut self.host, &mut self.controller, due);
        }
        println!("{:>5}ms  open: {}", until.as_millis(), self.trigger.is_open());
    }

    fn pane(&self) -> Option<u32> {
        let popover = self.trigger.popover()?;
        self.controller.panel(popover).map(|p| p.pane())
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let mut host = DemoHost::new(1024.0, 768.0);
    let icon = host.add("help-icon", Rect::new(500.0, 300.0, 516.0, 316.0));
    let controller = PopoverController::new();
    let mut trigger = PopoverTrigger::new(
        &controller,
        icon,
        PopoverContent::Template("usage-help"),
        PopoverOptions::new()
            .trigger(TriggerMode::Hover)
            .role(PopoverRole::Tooltip)
            .open_delay(Duration::from_millis(150))
            .show_close(false),
    );
    trigger.attach(&mut host);
    let mut page = Page {
        host,
        controller,
        trigger,
    };

    let ms = Duration::from_millis;
    page.pointer(icon, EventKind::PointerEnter, ms(0));
    page.run_until(ms(200));

    let Some(pane) = page.pane() else {
        println!("tooltip never opened");
        return;
    };
    page.pointer(icon, EventKind::PointerLeave, ms(250));
    page.pointer(pane, EventKind::PointerEnter, ms(260));
    page.run_until(ms(600));

    page.pointer(pane, EventKind::PointerLeave, ms(700));
    page.pointer(pane, EventKind::PointerEnter, ms(800));
    page.run_until(ms(1200));

    page.pointer(pane, EventKind::PointerLeave, ms(1300));
    page.run_until(ms(2000));
    page.trigger.sync(&mut page.host);
    println!(
        "aria-describedby = {:?}, {} listeners left",
        page.host.attribute(icon, "aria-describedby"),
        page.host.listener_count()
    );
}
