// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay lifecycle manager.
//!
//! ## Overview
//!
//! [`PopoverController`] owns every open popover. `open` merges options,
//! attaches an overlay through the [`Host`], renders the panel, and wires
//! each dismissal source as its own listener. `close` (from any source)
//! runs the teardown exactly once:
//!
//! 1. mark the instance `Closing`;
//! 2. remove every listener registered for it;
//! 3. cancel its timeout and refresh schedule;
//! 4. release the presenter (focus trap, live region);
//! 5. detach the overlay;
//! 6. mark it `Closed`, wake [`WhenClosed`](crate::instance::WhenClosed)
//!    futures, and queue a [`Closed`] notification.
//!
//! ## Driving
//!
//! The controller never reads a clock or schedules callbacks. The host:
//!
//! - forwards events with [`handle_event`](PopoverController::handle_event),
//!   tagged with the [`ListenerId`] it returned from `add_listener`;
//! - calls [`advance`](PopoverController::advance) at or after
//!   [`next_deadline`](PopoverController::next_deadline);
//! - calls [`animation_frame`](PopoverController::animation_frame) once per
//!   frame while [`wants_animation_frame`](PopoverController::wants_animation_frame)
//!   is true.
//!
//! ## Refresh
//!
//! The host's layout engine may flip the panel to a fallback strategy. Two
//! frames after open (and after any scroll or resize), the controller
//! re-measures target and panel, detects the placement actually rendered,
//! swaps the placement class, and re-aims the arrow. A failed measurement
//! is logged and the previous arrow is kept.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::time::Duration;

use understory_placement::{
    ArrowPosition, DEFAULT_VIEWPORT_MARGIN, Placement, arrow_position, candidate_strategies,
    detect_placement,
};

use crate::config::{PopoverConfig, PopoverOptions};
use crate::content::PopoverContent;
use crate::dismiss::{DismissSource, DismissalPlan};
use crate::error::{ClipboardError, OpenError};
use crate::host::{
    ClipboardTicket, EventKind, EventTarget, Host, HostEvent, Key, ListenerId, OverlayHandle,
    OverlaySpec, Subscription,
};
use crate::instance::{CloseReason, Closed, PanelIdGenerator, PopoverId, PopoverRef};
use crate::presenter::{CopyStatus, PanelPresenter};
use crate::timer::{FrameThrottle, Timer, earliest};

/// Class on every overlay pane.
pub const PANEL_CLASS: &str = "understory-popover";

/// Prefix of the class naming the rendered placement, e.g. `understory-popover-top-start`.
pub const PLACEMENT_CLASS_PREFIX: &str = "understory-popover-";

/// Style properties carrying the arrow offset, one per [`ArrowPosition`] variant.
pub const ARROW_STYLE_PROPERTIES: [&str; 3] = [
    "--understory-popover-arrow-top",
    "--understory-popover-arrow-left",
    "--understory-popover-arrow-right",
];

fn arrow_style_property(arrow: ArrowPosition) -> &'static str {
    match arrow {
        ArrowPosition::Top(_) => ARROW_STYLE_PROPERTIES[0],
        ArrowPosition::Left(_) => ARROW_STYLE_PROPERTIES[1],
        ArrowPosition::Right(_) => ARROW_STYLE_PROPERTIES[2],
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Wire {
    Dismiss(DismissSource),
    Reposition,
}

struct Instance<H: Host> {
    handle: PopoverRef,
    target: H::Element,
    overlay: OverlayHandle<H::Element>,
    config: PopoverConfig,
    presenter: PanelPresenter<H>,
    listeners: Vec<ListenerId>,
    timeout: Timer,
    refresh: FrameThrottle,
    placement: Placement,
    arrow: Option<ArrowPosition>,
}

impl<H: Host> Instance<H> {
    fn set_placement(&mut self, host: &mut H, placement: Placement) {
        let pane = self.overlay.pane;
        if placement == self.placement {
            return;
        }
        host.remove_class(pane, &placement_class(self.placement));
        host.add_class(pane, &placement_class(placement));
        self.placement = placement;
    }

    fn refresh(&mut self, host: &mut H) {
        let measured = host
            .bounding_rect(self.target)
            .and_then(|target| Ok((target, host.bounding_rect(self.overlay.pane)?)));
        let (target, panel) = match measured {
            Ok(rects) => rects,
            Err(err) => {
                log::warn!("popover {}: refresh skipped, {err}", self.handle.id());
                return;
            }
        };
        let placement = detect_placement(target, panel, self.config.placement);
        log::trace!(
            "popover {}: rendered {placement} (requested {})",
            self.handle.id(),
            self.config.placement
        );
        self.set_placement(host, placement);

        if self.config.show_arrow {
            let arrow = arrow_position(placement, target, panel);
            let pane = self.overlay.pane;
            let property = arrow_style_property(arrow);
            if let Some(previous) = self.arrow {
                let old = arrow_style_property(previous);
                if old != property {
                    host.set_style(pane, old, None);
                }
            }
            let (_, px) = arrow.css();
            host.set_style(pane, property, Some(&format!("{px}px")));
            self.arrow = Some(arrow);
        }
    }
}

fn placement_class(placement: Placement) -> String {
    format!("{PLACEMENT_CLASS_PREFIX}{placement}")
}

fn overlay_spec(config: &PopoverConfig) -> OverlaySpec {
    let mut panel_classes = vec![
        String::from(PANEL_CLASS),
        format!("{PANEL_CLASS}--{}", config.role.as_str()),
    ];
    panel_classes.extend(config.panel_classes.iter().cloned());
    OverlaySpec {
        strategies: candidate_strategies(
            config.placement,
            config.offset,
            config.smart_positioning,
        ),
        viewport_margin: DEFAULT_VIEWPORT_MARGIN,
        flexible: true,
        push: true,
        has_backdrop: config.has_backdrop(),
        panel_classes,
        width: config.width,
        max_width: config.max_width,
        max_height: config.max_height,
    }
}

/// Owns and drives every open popover for one host.
pub struct PopoverController<H: Host> {
    defaults: PopoverConfig,
    ids: PanelIdGenerator,
    instances: BTreeMap<PopoverId, Instance<H>>,
    routes: BTreeMap<ListenerId, (PopoverId, Wire)>,
    closed: Vec<Closed>,
}

impl<H: Host> fmt::Debug for PopoverController<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopoverController")
            .field("defaults", &self.defaults)
            .field("open", &self.instances.keys().collect::<Vec<_>>())
            .field("listeners", &self.routes.len())
            .field("queued_closed", &self.closed.len())
            .finish_non_exhaustive()
    }
}

impl<H: Host> Default for PopoverController<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> PopoverController<H> {
    /// A controller with [`PopoverConfig::default`] defaults.
    pub fn new() -> Self {
        Self::with_defaults(PopoverConfig::default())
    }

    /// A controller with custom defaults.
    pub fn with_defaults(defaults: PopoverConfig) -> Self {
        Self {
            defaults,
            ids: PanelIdGenerator::new(),
            instances: BTreeMap::new(),
            routes: BTreeMap::new(),
            closed: Vec::new(),
        }
    }

    /// Defaults that per-call options are merged over.
    pub fn defaults(&self) -> &PopoverConfig {
        &self.defaults
    }

    /// Replace the defaults. Open popovers keep their frozen config.
    pub fn set_defaults(&mut self, defaults: PopoverConfig) {
        self.defaults = defaults;
    }

    /// Resolve `options` against the defaults.
    pub fn resolve(&self, options: &PopoverOptions) -> PopoverConfig {
        options.merge_over(&self.defaults)
    }

    /// Open a popover anchored to `target`.
    ///
    /// Fails only if the host cannot measure `target`.
    pub fn open(
        &mut self,
        host: &mut H,
        target: H::Element,
        content: PopoverContent<H::Template, H::Component>,
        options: &PopoverOptions,
        now: Duration,
    ) -> Result<PopoverRef, OpenError> {
        if !host.is_attached(target) {
            log::debug!("refusing to open popover on detached target {target:?}");
            return Err(OpenError::TargetDetached);
        }
        let config = self.resolve(options);
        let (id, panel_id) = self.ids.next_id();
        let overlay = host.attach_overlay(target, &overlay_spec(&config));
        let pane = overlay.pane;

        let handle = PopoverRef::new(id, &panel_id);
        let mut presenter = PanelPresenter::new(panel_id, pane, content, &config);
        host.set_attribute(pane, "id", presenter.panel_id());
        host.set_attribute(pane, "role", config.role.as_str());
        host.add_class(pane, &placement_class(config.placement));
        host.render_panel(pane, &presenter.view());
        presenter.ready(host);

        let plan = DismissalPlan::for_config(&config);
        let mut instance = Instance {
            handle: handle.clone(),
            target,
            overlay,
            placement: config.placement,
            config,
            presenter,
            listeners: Vec::new(),
            timeout: Timer::new(),
            refresh: FrameThrottle::new(),
            arrow: None,
        };
        self.wire(host, id, &mut instance, &plan, now);
        self.instances.insert(id, instance);
        log::debug!(
            "opened popover {id} ({}) with {:?}",
            handle.panel_id(),
            plan
        );
        Ok(handle)
    }

    fn wire(
        &mut self,
        host: &mut H,
        id: PopoverId,
        instance: &mut Instance<H>,
        plan: &DismissalPlan,
        now: Duration,
    ) {
        let mut subscriptions = Vec::new();
        if plan.backdrop {
            if let Some(backdrop) = instance.overlay.backdrop {
                subscriptions.push((
                    Subscription::new(EventTarget::Element(backdrop), EventKind::Click),
                    Wire::Dismiss(DismissSource::Backdrop),
                ));
            }
        }
        if plan.outside_pointer {
            subscriptions.push((
                Subscription::new(EventTarget::Document, EventKind::PointerDown),
                Wire::Dismiss(DismissSource::OutsidePointer),
            ));
        }
        if plan.escape {
            subscriptions.push((
                Subscription::new(EventTarget::Document, EventKind::KeyDown),
                Wire::Dismiss(DismissSource::Escape),
            ));
        }
        if plan.navigation {
            subscriptions.push((
                Subscription::new(EventTarget::Window, EventKind::Navigation),
                Wire::Dismiss(DismissSource::Navigation),
            ));
        }
        // The placement class follows the rendered side even without an arrow.
        subscriptions.push((
            Subscription::capture(EventTarget::Document, EventKind::Scroll),
            Wire::Reposition,
        ));
        subscriptions.push((
            Subscription::new(EventTarget::Window, EventKind::Resize),
            Wire::Reposition,
        ));
        instance.refresh.request();
        for (subscription, wire) in subscriptions {
            let listener = host.add_listener(subscription);
            instance.listeners.push(listener);
            self.routes.insert(listener, (id, wire));
        }
        if let Some(timeout) = plan.timeout {
            instance.timeout.arm(now, timeout);
            log::trace!("popover {id}: timeout armed for {timeout:?}");
        }
    }

    /// Close `popover`. Returns false if it was already closed.
    pub fn close(&mut self, host: &mut H, popover: &PopoverRef, reason: CloseReason) -> bool {
        self.close_by_id(host, popover.id(), reason).is_some()
    }

    /// Close the popover with `id`, returning its notification if this call closed it.
    pub fn close_by_id(
        &mut self,
        host: &mut H,
        id: PopoverId,
        reason: CloseReason,
    ) -> Option<Closed> {
        self.teardown(host, id, reason, true)
    }

    /// Tear down the popover whose pane the host removed on its own.
    ///
    /// Everything but the overlay detach runs as for a normal close.
    pub fn overlay_detached(&mut self, host: &mut H, pane: H::Element) -> Option<Closed> {
        let id = self
            .instances
            .iter()
            .find_map(|(id, i)| (i.overlay.pane == pane).then_some(*id))?;
        self.teardown(host, id, CloseReason::Programmatic, false)
    }

    fn teardown(
        &mut self,
        host: &mut H,
        id: PopoverId,
        reason: CloseReason,
        detach: bool,
    ) -> Option<Closed> {
        let mut instance = self.instances.remove(&id)?;
        if !instance.handle.begin_close() {
            return None;
        }
        for listener in instance.listeners.drain(..) {
            self.routes.remove(&listener);
            host.remove_listener(listener);
        }
        instance.timeout.cancel();
        instance.refresh.cancel();
        instance.presenter.release(host);
        if detach {
            host.detach_overlay(&instance.overlay);
        }
        instance.handle.finish_close(reason);
        log::debug!("closed popover {id}: {reason:?}");
        let closed = Closed { id, reason };
        self.closed.push(closed);
        Some(closed)
    }

    /// Route an event delivered to `listener`.
    ///
    /// Returns the notification if the event closed a popover. Events for
    /// listeners this controller does not own, or no longer owns, are ignored.
    pub fn handle_event(
        &mut self,
        host: &mut H,
        listener: ListenerId,
        event: &HostEvent<H::Element>,
    ) -> Option<Closed> {
        let &(id, wire) = self.routes.get(&listener)?;
        match wire {
            Wire::Reposition => {
                if let Some(instance) = self.instances.get_mut(&id) {
                    instance.refresh.request();
                }
                None
            }
            Wire::Dismiss(source) => {
                let instance = self.instances.get(&id)?;
                if !dismisses(host, instance, source, event) {
                    return None;
                }
                log::debug!("popover {id}: dismissed by {source:?}");
                self.teardown(host, id, source.reason(), true)
            }
        }
    }

    /// Fire every deadline due at `now`.
    pub fn advance(&mut self, host: &mut H, now: Duration) -> Vec<Closed> {
        let mut expired = Vec::new();
        for (id, instance) in &mut self.instances {
            instance.presenter.advance(host, now);
            if instance.timeout.fire(now) {
                expired.push(*id);
            }
        }
        expired
            .into_iter()
            .filter_map(|id| self.teardown(host, id, CloseReason::Timeout, true))
            .collect()
    }

    /// Earliest time [`advance`](Self::advance) has work to do.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.instances.values().fold(None, |acc, i| {
            earliest(acc, earliest(i.timeout.due(), i.presenter.next_deadline()))
        })
    }

    /// True while any popover waits for animation frames.
    pub fn wants_animation_frame(&self) -> bool {
        self.instances.values().any(|i| i.refresh.is_pending())
    }

    /// Advance every pending refresh by one frame.
    pub fn animation_frame(&mut self, host: &mut H) {
        for instance in self.instances.values_mut() {
            if instance.refresh.on_frame() {
                instance.refresh(host);
            }
        }
    }

    /// Copy the text content of `popover`. `None` if it is not open.
    pub fn copy(&mut self, host: &mut H, popover: &PopoverRef, now: Duration) -> Option<CopyStatus> {
        let instance = self.instances.get_mut(&popover.id())?;
        Some(instance.presenter.copy(host, now))
    }

    /// Report the outcome of a clipboard write started by [`copy`](Self::copy).
    ///
    /// Returns `None` for tickets no open popover is waiting on, for example
    /// when the popover closed while the write was in flight.
    pub fn clipboard_settled(
        &mut self,
        host: &mut H,
        ticket: ClipboardTicket,
        result: Result<(), ClipboardError>,
        now: Duration,
    ) -> Option<CopyStatus> {
        let status = self.instances.values_mut().find_map(|i| {
            i.presenter
                .clipboard_settled(host, ticket, result.clone(), now)
        });
        if status.is_none() {
            log::warn!("ignoring stale clipboard ticket {ticket:?}");
        }
        status
    }

    /// The presenter of an open popover.
    pub fn panel(&self, popover: &PopoverRef) -> Option<&PanelPresenter<H>> {
        self.instances.get(&popover.id()).map(|i| &i.presenter)
    }

    /// The frozen config of an open popover.
    pub fn config(&self, popover: &PopoverRef) -> Option<&PopoverConfig> {
        self.instances.get(&popover.id()).map(|i| &i.config)
    }

    /// The placement last detected for an open popover.
    pub fn placement(&self, popover: &PopoverRef) -> Option<Placement> {
        self.instances.get(&popover.id()).map(|i| i.placement)
    }

    /// True if `popover` is open in this controller.
    pub fn is_open(&self, popover: &PopoverRef) -> bool {
        self.instances.contains_key(&popover.id())
    }

    /// Number of open popovers.
    pub fn open_count(&self) -> usize {
        self.instances.len()
    }

    /// Number of listeners currently registered on behalf of open popovers.
    pub fn listener_count(&self) -> usize {
        self.routes.len()
    }

    /// Drain queued close notifications, oldest first.
    ///
    /// Listeners a [`PopoverTrigger`](crate::trigger::PopoverTrigger) added
    /// on the panel are not the controller's; call
    /// [`PopoverTrigger::sync`](crate::trigger::PopoverTrigger::sync) on each
    /// trigger right after draining so they are removed too.
    pub fn take_closed(&mut self) -> Vec<Closed> {
        core::mem::take(&mut self.closed)
    }

    /// Close every open popover with [`CloseReason::Disposed`].
    pub fn dispose(&mut self, host: &mut H) -> Vec<Closed> {
        let ids: Vec<PopoverId> = self.instances.keys().copied().collect();
        ids.into_iter()
            .filter_map(|id| self.teardown(host, id, CloseReason::Disposed, true))
            .collect()
    }
}

fn dismisses<H: Host>(
    host: &H,
    instance: &Instance<H>,
    source: DismissSource,
    event: &HostEvent<H::Element>,
) -> bool {
    match source {
        DismissSource::Backdrop => event.kind == EventKind::Click,
        DismissSource::Escape => event.kind == EventKind::KeyDown && event.key == Some(Key::Escape),
        DismissSource::Navigation => event.kind == EventKind::Navigation,
        DismissSource::OutsidePointer => {
            event.kind == EventKind::PointerDown && is_outside(host, instance, event)
        }
        DismissSource::Timeout => false,
    }
}

/// True if `event` landed outside both the panel and the trigger.
///
/// Events carrying neither a target nor a position are not treated as outside.
fn is_outside<H: Host>(host: &H, instance: &Instance<H>, event: &HostEvent<H::Element>) -> bool {
    let pane = instance.overlay.pane;
    let target = instance.target;
    if let Some(node) = event.target {
        return !host.contains(pane, node) && !host.contains(target, node);
    }
    let Some(position) = event.position else {
        return false;
    };
    [pane, target].into_iter().all(|element| {
        host.bounding_rect(element)
            .map(|rect| !rect.contains(position))
            .unwrap_or(true)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AutoClose, TriggerMode};
    use crate::presenter::COPIED_MESSAGE;
    use crate::testing::{ClipboardMode, TestHost};
    use core::pin::pin;
    use core::task::{Context, Poll, Waker};
    use kurbo::{Point, Rect};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn setup() -> (TestHost, PopoverController<TestHost>, u32) {
        let mut host = TestHost::new();
        let target = host.add_element(Rect::new(100.0, 100.0, 150.0, 120.0));
        (host, PopoverController::new(), target)
    }

    fn send(
        host: &mut TestHost,
        controller: &mut PopoverController<TestHost>,
        target: EventTarget<u32>,
        event: HostEvent<u32>,
    ) -> Vec<Closed> {
        host.listeners_for(target, event.kind)
            .into_iter()
            .filter_map(|l| controller.handle_event(host, l, &event))
            .collect()
    }

    #[test]
    fn open_attaches_and_wires() {
        let (mut host, mut c, target) = setup();
        let p = c
            .open(&mut host, target, "Hello".into(), &PopoverOptions::new(), ms(0))
            .unwrap();
        assert!(p.is_open());
        assert_eq!(p.panel_id(), "understory-popover-0");
        assert_eq!(c.open_count(), 1);
        let pane = c.panel(&p).unwrap().pane();
        assert_eq!(host.attribute(pane, "id"), Some("understory-popover-0"));
        assert_eq!(host.attribute(pane, "role"), Some("dialog"));
        assert!(host.has_class(pane, "understory-popover"));
        assert!(host.has_class(pane, "understory-popover--dialog"));
        assert!(host.has_class(pane, "understory-popover-bottom"));
        assert_eq!(host.focused, Some(pane));
        // Backdrop, outside, Escape, navigation, scroll, resize.
        assert_eq!(host.listener_count(), 6);
        assert_eq!(c.listener_count(), 6);
        assert!(host.last_spec().unwrap().has_backdrop);
        let rendered = host.rendered.last().unwrap();
        assert_eq!(rendered.panel_id, "understory-popover-0");
        assert_eq!(rendered.text.as_deref(), Some("Hello"));
    }

    #[test]
    fn open_on_detached_target_fails_fast() {
        let (mut host, mut c, target) = setup();
        host.detach(target);
        let err = c
            .open(&mut host, target, "x".into(), &PopoverOptions::new(), ms(0))
            .unwrap_err();
        assert_eq!(err, OpenError::TargetDetached);
        assert_eq!(host.overlays.len(), 0);
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn overlay_spec_reflects_config() {
        let (mut host, mut c, target) = setup();
        let options = PopoverOptions::new()
            .trigger(TriggerMode::Hover)
            .role(crate::config::PopoverRole::Tooltip)
            .panel_classes(vec![String::from("compact")])
            .max_width(240.0)
            .smart_positioning(false);
        c.open(&mut host, target, "x".into(), &options, ms(0)).unwrap();
        let spec = host.last_spec().unwrap();
        assert!(!spec.has_backdrop);
        assert_eq!(spec.strategies.len(), 1);
        assert_eq!(spec.max_width, Some(240.0));
        assert_eq!(
            spec.panel_classes,
            ["understory-popover", "understory-popover--tooltip", "compact"]
        );
    }

    #[test]
    fn closing_one_instance_leaves_others_open() {
        let (mut host, mut c, target) = setup();
        let other_target = host.add_element(Rect::new(300.0, 100.0, 350.0, 120.0));
        let opts = PopoverOptions::new();
        let a = c.open(&mut host, target, "A".into(), &opts, ms(0)).unwrap();
        let b = c.open(&mut host, other_target, "B".into(), &opts, ms(0)).unwrap();
        assert_ne!(a.panel_id(), b.panel_id());

        assert!(c.close(&mut host, &a, CloseReason::Programmatic));
        assert!(a.is_closed());
        assert!(b.is_open());
        assert!(c.is_open(&b));
        assert_eq!(host.overlays.len(), 1);
        assert_eq!(host.listener_count(), c.listener_count());
    }

    #[test]
    fn close_is_idempotent() {
        let (mut host, mut c, target) = setup();
        let p = c
            .open(&mut host, target, "x".into(), &PopoverOptions::new(), ms(0))
            .unwrap();
        assert!(c.close(&mut host, &p, CloseReason::CloseButton));
        assert!(!c.close(&mut host, &p, CloseReason::Programmatic));
        let closed = c.take_closed();
        assert_eq!(
            closed,
            [Closed {
                id: p.id(),
                reason: CloseReason::CloseButton
            }]
        );
        assert_eq!(p.close_reason(), Some(CloseReason::CloseButton));
        assert!(c.take_closed().is_empty());
    }

    #[test]
    fn no_listener_survives_teardown() {
        let (mut host, mut c, target) = setup();
        let p = c
            .open(
                &mut host,
                target,
                "x".into(),
                &PopoverOptions::new().trap_focus(true),
                ms(0),
            )
            .unwrap();
        assert!(!host.active_traps.is_empty());
        c.close(&mut host, &p, CloseReason::Programmatic);
        assert_eq!(host.listener_count(), 0);
        assert!(host.active_traps.is_empty());
        assert!(host.overlays.is_empty());
        c.take_closed();

        // A synthetic Escape after teardown reaches no one.
        let closed = send(
            &mut host,
            &mut c,
            EventTarget::Document,
            HostEvent::key_down(Key::Escape),
        );
        assert!(closed.is_empty());
        assert!(c.take_closed().is_empty());
    }

    #[test]
    fn stale_listener_ids_are_ignored() {
        let (mut host, mut c, target) = setup();
        let p = c
            .open(&mut host, target, "x".into(), &PopoverOptions::new(), ms(0))
            .unwrap();
        let escape = host.listeners_for(EventTarget::Document, EventKind::KeyDown)[0];
        c.close(&mut host, &p, CloseReason::Programmatic);
        let ev = HostEvent::key_down(Key::Escape);
        assert_eq!(c.handle_event(&mut host, escape, &ev), None);
    }

    #[test]
    fn escape_closes() {
        let (mut host, mut c, target) = setup();
        let p = c
            .open(&mut host, target, "x".into(), &PopoverOptions::new(), ms(0))
            .unwrap();
        let other_key = send(
            &mut host,
            &mut c,
            EventTarget::Document,
            HostEvent::key_down(Key::Enter),
        );
        assert!(other_key.is_empty());
        let closed = send(
            &mut host,
            &mut c,
            EventTarget::Document,
            HostEvent::key_down(Key::Escape),
        );
        assert_eq!(closed.len(), 1);
        assert_eq!(p.close_reason(), Some(CloseReason::Escape));
    }

    #[test]
    fn outside_pointer_closes_but_inside_does_not() {
        let (mut host, mut c, target) = setup();
        let p = c
            .open(&mut host, target, "x".into(), &PopoverOptions::new(), ms(0))
            .unwrap();
        let pane = c.panel(&p).unwrap().pane();
        let child = host.add_child(pane, Rect::new(0.0, 0.0, 1.0, 1.0));

        let inside = HostEvent::pointer_down(child, Point::new(0.5, 0.5));
        assert!(send(&mut host, &mut c, EventTarget::Document, inside).is_empty());
        let on_trigger = HostEvent::pointer_down(target, Point::new(110.0, 110.0));
        assert!(send(&mut host, &mut c, EventTarget::Document, on_trigger).is_empty());
        assert!(p.is_open());

        let elsewhere = host.add_element(Rect::new(500.0, 500.0, 510.0, 510.0));
        let outside = HostEvent::pointer_down(elsewhere, Point::new(505.0, 505.0));
        let closed = send(&mut host, &mut c, EventTarget::Document, outside);
        assert_eq!(closed.len(), 1);
        assert_eq!(p.close_reason(), Some(CloseReason::OutsidePointer));
    }

    #[test]
    fn outside_detection_falls_back_to_position() {
        let (mut host, mut c, target) = setup();
        let p = c
            .open(&mut host, target, "x".into(), &PopoverOptions::new(), ms(0))
            .unwrap();
        let mut ev = HostEvent::new(EventKind::PointerDown);
        ev.position = Some(Point::new(120.0, 110.0));
        assert!(send(&mut host, &mut c, EventTarget::Document, ev).is_empty());
        ev.position = Some(Point::new(700.0, 500.0));
        assert_eq!(send(&mut host, &mut c, EventTarget::Document, ev).len(), 1);
        assert!(p.is_closed());
    }

    #[test]
    fn backdrop_click_closes() {
        let (mut host, mut c, target) = setup();
        let p = c
            .open(&mut host, target, "x".into(), &PopoverOptions::new(), ms(0))
            .unwrap();
        let backdrop = host.overlays[0].backdrop.unwrap();
        let closed = send(
            &mut host,
            &mut c,
            EventTarget::Element(backdrop),
            HostEvent::click(backdrop),
        );
        assert_eq!(closed.len(), 1);
        assert_eq!(p.close_reason(), Some(CloseReason::Backdrop));
    }

    #[test]
    fn hover_auto_close_leaves_backdrop_inert() {
        let (mut host, mut c, target) = setup();
        let p = c
            .open(
                &mut host,
                target,
                "x".into(),
                &PopoverOptions::new().auto_close(AutoClose::Hover),
                ms(0),
            )
            .unwrap();
        let backdrop = host.overlays[0].backdrop.unwrap();
        assert!(host.listeners_for(EventTarget::Element(backdrop), EventKind::Click).is_empty());
        assert!(p.is_open());
    }

    #[test]
    fn navigation_closes_when_enabled() {
        let (mut host, mut c, target) = setup();
        let stays = c
            .open(
                &mut host,
                target,
                "x".into(),
                &PopoverOptions::new().close_on_navigation(false),
                ms(0),
            )
            .unwrap();
        let goes = c
            .open(&mut host, target, "y".into(), &PopoverOptions::new(), ms(0))
            .unwrap();
        let closed = send(
            &mut host,
            &mut c,
            EventTarget::Window,
            HostEvent::new(EventKind::Navigation),
        );
        assert_eq!(closed.len(), 1);
        assert!(stays.is_open());
        assert_eq!(goes.close_reason(), Some(CloseReason::Navigation));
    }

    #[test]
    fn timeout_closes_at_deadline() {
        let (mut host, mut c, target) = setup();
        let options = PopoverOptions::new()
            .auto_close(AutoClose::Timeout)
            .timeout(ms(500));
        let p = c.open(&mut host, target, "x".into(), &options, ms(1000)).unwrap();
        assert_eq!(c.next_deadline(), Some(ms(1500)));
        assert!(c.advance(&mut host, ms(1499)).is_empty());
        assert!(p.is_open());
        let closed = c.advance(&mut host, ms(1500));
        assert_eq!(
            closed,
            [Closed {
                id: p.id(),
                reason: CloseReason::Timeout
            }]
        );
        assert_eq!(c.next_deadline(), None);
    }

    #[test]
    fn refresh_detects_flip_and_aims_arrow() {
        let mut host = TestHost::new();
        // Near the bottom of an 800x600 viewport: no room below.
        let target = host.add_element(Rect::new(100.0, 560.0, 150.0, 580.0));
        let mut c = PopoverController::new();
        let p = c
            .open(&mut host, target, "x".into(), &PopoverOptions::new(), ms(0))
            .unwrap();
        let pane = c.panel(&p).unwrap().pane();
        assert!(c.wants_animation_frame());
        c.animation_frame(&mut host);
        assert!(host.style(pane, ARROW_STYLE_PROPERTIES[1]).is_none());
        c.animation_frame(&mut host);
        assert!(!c.wants_animation_frame());

        assert_eq!(c.placement(&p), Some(Placement::TOP));
        assert!(host.has_class(pane, "understory-popover-top"));
        assert!(!host.has_class(pane, "understory-popover-bottom"));
        assert_eq!(host.style(pane, ARROW_STYLE_PROPERTIES[1]), Some("50px"));
    }

    #[test]
    fn scroll_schedules_refresh_and_measure_failure_keeps_arrow() {
        let (mut host, mut c, target) = setup();
        let p = c
            .open(&mut host, target, "x".into(), &PopoverOptions::new(), ms(0))
            .unwrap();
        let pane = c.panel(&p).unwrap().pane();
        c.animation_frame(&mut host);
        c.animation_frame(&mut host);
        let arrow = host.style(pane, ARROW_STYLE_PROPERTIES[1]).map(String::from);
        assert!(arrow.is_some());

        let scroll = HostEvent::new(EventKind::Scroll);
        assert!(send(&mut host, &mut c, EventTarget::Document, scroll).is_empty());
        assert!(c.wants_animation_frame());
        host.fail_measure = true;
        c.animation_frame(&mut host);
        c.animation_frame(&mut host);
        assert_eq!(host.style(pane, ARROW_STYLE_PROPERTIES[1]).map(String::from), arrow);
        assert!(p.is_open());
    }

    #[test]
    fn hidden_arrow_still_tracks_flipped_placement() {
        let mut host = TestHost::new();
        let target = host.add_element(Rect::new(100.0, 560.0, 150.0, 580.0));
        let mut c = PopoverController::new();
        let p = c
            .open(
                &mut host,
                target,
                "x".into(),
                &PopoverOptions::new().show_arrow(false),
                ms(0),
            )
            .unwrap();
        let pane = c.panel(&p).unwrap().pane();
        // Backdrop, outside, Escape, navigation, scroll, resize.
        assert_eq!(host.listener_count(), 6);
        assert!(c.wants_animation_frame());
        c.animation_frame(&mut host);
        c.animation_frame(&mut host);

        assert_eq!(c.placement(&p), Some(Placement::TOP));
        assert!(host.has_class(pane, "understory-popover-top"));
        assert!(!host.has_class(pane, "understory-popover-bottom"));
        for property in ARROW_STYLE_PROPERTIES {
            assert!(host.style(pane, property).is_none());
        }
    }

    #[test]
    fn copy_falls_back_and_announces() {
        let (mut host, mut c, target) = setup();
        host.clipboard = ClipboardMode::Reject;
        let p = c
            .open(&mut host, target, "Hello".into(), &PopoverOptions::new(), ms(0))
            .unwrap();
        assert_eq!(c.copy(&mut host, &p, ms(10)), Some(CopyStatus::Copied));
        assert_eq!(host.legacy_copies, ["Hello"]);
        assert_eq!(host.last_announcement(), Some(COPIED_MESSAGE));
        assert_eq!(c.next_deadline(), Some(ms(1210)));
        c.advance(&mut host, ms(1210));
        assert_eq!(c.panel(&p).unwrap().live_message(), None);
    }

    #[test]
    fn clipboard_ticket_after_close_is_stale() {
        let (mut host, mut c, target) = setup();
        let p = c
            .open(&mut host, target, "Hello".into(), &PopoverOptions::new(), ms(0))
            .unwrap();
        let Some(CopyStatus::Pending(ticket)) = c.copy(&mut host, &p, ms(0)) else {
            panic!("expected pending write");
        };
        c.close(&mut host, &p, CloseReason::Programmatic);
        assert_eq!(c.clipboard_settled(&mut host, ticket, Ok(()), ms(5)), None);
        assert!(host.announcements.is_empty());
    }

    #[test]
    fn clipboard_success_announces() {
        let (mut host, mut c, target) = setup();
        let p = c
            .open(&mut host, target, "Hello".into(), &PopoverOptions::new(), ms(0))
            .unwrap();
        let Some(CopyStatus::Pending(ticket)) = c.copy(&mut host, &p, ms(0)) else {
            panic!("expected pending write");
        };
        assert_eq!(host.writes[0].1, "Hello");
        assert_eq!(
            c.clipboard_settled(&mut host, ticket, Ok(()), ms(5)),
            Some(CopyStatus::Copied)
        );
        assert!(host.legacy_copies.is_empty());
        assert_eq!(host.last_announcement(), Some(COPIED_MESSAGE));
    }

    #[test]
    fn closed_future_resolves_with_reason() {
        let (mut host, mut c, target) = setup();
        let p = c
            .open(&mut host, target, "x".into(), &PopoverOptions::new(), ms(0))
            .unwrap();
        let mut cx = Context::from_waker(Waker::noop());
        let mut closed = pin!(p.closed());
        assert_eq!(closed.as_mut().poll(&mut cx), Poll::Pending);
        c.close(&mut host, &p, CloseReason::CloseButton);
        assert_eq!(
            closed.as_mut().poll(&mut cx),
            Poll::Ready(CloseReason::CloseButton)
        );
    }

    #[test]
    fn overlay_detached_by_host_tears_down_without_detach() {
        let (mut host, mut c, target) = setup();
        let p = c
            .open(&mut host, target, "x".into(), &PopoverOptions::new(), ms(0))
            .unwrap();
        let pane = c.panel(&p).unwrap().pane();
        let closed = c.overlay_detached(&mut host, pane);
        assert_eq!(closed.map(|c| c.reason), Some(CloseReason::Programmatic));
        assert_eq!(host.detach_calls, 0);
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn dispose_closes_everything() {
        let (mut host, mut c, target) = setup();
        let opts = PopoverOptions::new();
        let a = c.open(&mut host, target, "a".into(), &opts, ms(0)).unwrap();
        let b = c.open(&mut host, target, "b".into(), &opts, ms(0)).unwrap();
        let closed = c.dispose(&mut host);
        assert_eq!(closed.len(), 2);
        assert_eq!(a.close_reason(), Some(CloseReason::Disposed));
        assert_eq!(b.close_reason(), Some(CloseReason::Disposed));
        assert_eq!(c.open_count(), 0);
        assert_eq!(host.listener_count(), 0);
        assert!(host.overlays.is_empty());
    }
}
