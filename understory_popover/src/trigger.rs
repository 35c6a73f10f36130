// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trigger interaction state machine.
//!
//! ## Overview
//!
//! A [`PopoverTrigger`] binds one element to one piece of content and
//! decides *when* its popover opens and closes. The controller decides
//! *how*.
//!
//! | Mode | Opens on | Closes on |
//! | --- | --- | --- |
//! | [`Click`](TriggerMode::Click) | click, Enter, Space | click, Escape, any dismissal source |
//! | [`Hover`](TriggerMode::Hover) | pointer enter or focus, after `open_delay` | leaving trigger and panel for `hover_close_delay`, Escape |
//! | [`Manual`](TriggerMode::Manual) | [`open`](PopoverTrigger::open) | [`close`](PopoverTrigger::close) |
//!
//! Hosts should suppress the synthetic click that follows Enter or Space
//! on button-like elements, or the popover toggles twice.
//!
//! ## Focus
//!
//! Hover popovers leave focus on the trigger unless `trap_focus` is set.
//! When a trapped hover popover does move focus, the trigger blur that
//! follows and the trigger focus caused by handing focus back are not
//! treated as interaction, so they neither close nor reopen the popover.
//!
//! ## Keeping in sync
//!
//! The controller can close the popover behind the trigger's back
//! (Escape, backdrop, timeout, navigation). Every entry point starts with
//! [`sync`](PopoverTrigger::sync), which notices the closed instance and
//! restores the trigger: `aria-expanded="false"`, linkage attributes
//! removed, panel listeners dropped, and focus returned for dialogs that
//! took it. Hosts call `sync` right after draining
//! [`PopoverController::take_closed`] so the panel listeners go with the
//! instance.

use alloc::vec::Vec;
use core::fmt;
use core::time::Duration;

use crate::config::{PopoverOptions, PopoverRole, TriggerMode};
use crate::content::PopoverContent;
use crate::controller::PopoverController;
use crate::error::OpenError;
use crate::host::{EventKind, EventTarget, Host, HostEvent, Key, ListenerId, Subscription};
use crate::hover::{HoverIntent, HoverTransition, Hovered};
use crate::instance::{CloseReason, PopoverRef};
use crate::timer::{Timer, earliest};

/// Opens and closes a popover in response to interaction with one element.
pub struct PopoverTrigger<H: Host> {
    element: H::Element,
    content: PopoverContent<H::Template, H::Component>,
    options: PopoverOptions,
    mode: TriggerMode,
    role: PopoverRole,
    open_delay: Duration,
    close_delay: Duration,
    closes_on_hover_leave: bool,
    moves_focus: bool,
    popover: Option<PopoverRef>,
    listeners: Vec<ListenerId>,
    panel_listeners: Vec<ListenerId>,
    hover: HoverIntent,
    open_timer: Timer,
    close_timer: Timer,
    /// The trigger blur caused by moving focus into the panel is pending.
    expect_blur: bool,
    /// The trigger focus caused by returning focus is pending.
    expect_focus: bool,
}

impl<H: Host> fmt::Debug for PopoverTrigger<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopoverTrigger")
            .field("element", &self.element)
            .field("mode", &self.mode)
            .field("role", &self.role)
            .field("popover", &self.popover)
            .field("hover", &self.hover)
            .field("open_timer", &self.open_timer)
            .field("close_timer", &self.close_timer)
            .finish_non_exhaustive()
    }
}

impl<H: Host> PopoverTrigger<H> {
    /// Bind `element` to `content`, resolving `options` against the controller's defaults.
    ///
    /// Nothing is registered until [`attach`](Self::attach).
    pub fn new(
        controller: &PopoverController<H>,
        element: H::Element,
        content: PopoverContent<H::Template, H::Component>,
        options: PopoverOptions,
    ) -> Self {
        let config = controller.resolve(&options);
        Self {
            element,
            content,
            mode: config.trigger,
            role: config.role,
            open_delay: config.open_delay,
            close_delay: config.hover_close_delay,
            closes_on_hover_leave: config.closes_on_hover_leave(),
            moves_focus: config.moves_focus(),
            options,
            popover: None,
            listeners: Vec::new(),
            panel_listeners: Vec::new(),
            hover: HoverIntent::new(),
            open_timer: Timer::new(),
            close_timer: Timer::new(),
            expect_blur: false,
            expect_focus: false,
        }
    }

    /// The trigger element.
    pub fn element(&self) -> H::Element {
        self.element
    }

    /// Resolved interaction mode.
    pub fn mode(&self) -> TriggerMode {
        self.mode
    }

    /// The current popover, open or not yet synced.
    pub fn popover(&self) -> Option<&PopoverRef> {
        self.popover.as_ref()
    }

    /// True while this trigger's popover is open.
    pub fn is_open(&self) -> bool {
        self.popover.as_ref().is_some_and(PopoverRef::is_open)
    }

    /// True once [`attach`](Self::attach) registered listeners.
    pub fn is_attached(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Next time [`advance`](Self::advance) has work to do.
    pub fn next_deadline(&self) -> Option<Duration> {
        earliest(self.open_timer.due(), self.close_timer.due())
    }

    /// Register the listeners for the trigger mode.
    pub fn attach(&mut self, host: &mut H) {
        if self.is_attached() {
            return;
        }
        let el = self.element;
        let kinds: &[EventKind] = match self.mode {
            TriggerMode::Click => &[EventKind::Click, EventKind::KeyDown],
            TriggerMode::Hover => &[
                EventKind::PointerEnter,
                EventKind::PointerLeave,
                EventKind::Focus,
                EventKind::Blur,
                EventKind::KeyDown,
            ],
            TriggerMode::Manual => &[],
        };
        for &kind in kinds {
            let listener = host.add_listener(Subscription::new(EventTarget::Element(el), kind));
            self.listeners.push(listener);
        }
        if self.mode != TriggerMode::Manual {
            host.set_attribute(el, "aria-haspopup", self.role.as_str());
            host.set_attribute(el, "aria-expanded", "false");
        }
        log::trace!("attached {:?} trigger to {el:?}", self.mode);
    }

    /// Remove every listener and cancel pending timers. An open popover stays open.
    pub fn detach(&mut self, host: &mut H) {
        for listener in self.listeners.drain(..).chain(self.panel_listeners.drain(..)) {
            host.remove_listener(listener);
        }
        self.open_timer.cancel();
        self.close_timer.cancel();
        self.hover.clear();
        self.expect_blur = false;
        self.expect_focus = false;
    }

    /// Close any open popover with [`CloseReason::Disposed`] and detach.
    pub fn dispose(&mut self, host: &mut H, controller: &mut PopoverController<H>) {
        self.close(host, controller, CloseReason::Disposed);
        self.detach(host);
    }

    /// Handle an event delivered to `listener`. Returns false if the listener is not ours.
    pub fn handle_event(
        &mut self,
        host: &mut H,
        controller: &mut PopoverController<H>,
        listener: ListenerId,
        event: &HostEvent<H::Element>,
        now: Duration,
    ) -> bool {
        self.sync(host);
        if self.panel_listeners.contains(&listener) {
            match event.kind {
                EventKind::PointerEnter => self.enter(host, controller, Hovered::PANEL, now),
                EventKind::PointerLeave => self.leave(host, controller, Hovered::PANEL, now),
                _ => {}
            }
            return true;
        }
        if !self.listeners.contains(&listener) {
            return false;
        }
        match event.kind {
            EventKind::Click if self.mode == TriggerMode::Click => {
                if let Err(err) = self.toggle(host, controller, now) {
                    log::warn!("trigger {:?}: {err}", self.element);
                }
            }
            EventKind::KeyDown => self.key(host, controller, event.key, now),
            EventKind::PointerEnter => self.enter(host, controller, Hovered::TRIGGER, now),
            EventKind::PointerLeave => self.leave(host, controller, Hovered::TRIGGER, now),
            EventKind::Focus => {
                if core::mem::take(&mut self.expect_focus) {
                    log::trace!("trigger {:?}: focus returned", self.element);
                } else {
                    self.enter(host, controller, Hovered::FOCUS, now);
                }
            }
            EventKind::Blur => {
                self.expect_focus = false;
                if core::mem::take(&mut self.expect_blur) {
                    // Focus moved into the panel and still counts as focus.
                    log::trace!("trigger {:?}: focus moved to panel", self.element);
                } else {
                    self.leave(host, controller, Hovered::FOCUS, now);
                }
            }
            _ => {}
        }
        true
    }

    fn key(
        &mut self,
        host: &mut H,
        controller: &mut PopoverController<H>,
        key: Option<Key>,
        now: Duration,
    ) {
        match key {
            Some(Key::Escape) if self.is_open() => {
                self.close(host, controller, CloseReason::Escape);
            }
            Some(Key::Enter | Key::Space) if self.mode == TriggerMode::Click && !self.is_open() => {
                if let Err(err) = self.open(host, controller, now) {
                    log::warn!("trigger {:?}: {err}", self.element);
                }
            }
            _ => {}
        }
    }

    fn enter(
        &mut self,
        host: &mut H,
        controller: &mut PopoverController<H>,
        region: Hovered,
        now: Duration,
    ) {
        self.hover.enter(region);
        if self.close_timer.cancel() {
            log::trace!("trigger {:?}: close canceled by re-entry", self.element);
        }
        if self.mode != TriggerMode::Hover || region == Hovered::PANEL || self.is_open() {
            return;
        }
        if self.open_delay.is_zero() {
            if let Err(err) = self.open(host, controller, now) {
                log::warn!("trigger {:?}: {err}", self.element);
            }
        } else if !self.open_timer.is_armed() {
            self.open_timer.arm(now, self.open_delay);
        }
    }

    fn leave(
        &mut self,
        host: &mut H,
        controller: &mut PopoverController<H>,
        region: Hovered,
        now: Duration,
    ) {
        if self.hover.leave(region) != Some(HoverTransition::Left) {
            return;
        }
        self.open_timer.cancel();
        if !self.closes_on_hover_leave || !self.is_open() {
            return;
        }
        if self.close_delay.is_zero() {
            self.close(host, controller, CloseReason::HoverLeave);
        } else {
            self.close_timer.arm(now, self.close_delay);
        }
    }

    /// Fire due open/close timers.
    pub fn advance(&mut self, host: &mut H, controller: &mut PopoverController<H>, now: Duration) {
        self.sync(host);
        if self.open_timer.fire(now) && !self.is_open() && self.hover.is_active() {
            if let Err(err) = self.open(host, controller, now) {
                log::warn!("trigger {:?}: {err}", self.element);
            }
        }
        if self.close_timer.fire(now) && self.is_open() && !self.hover.is_active() {
            self.close(host, controller, CloseReason::HoverLeave);
        }
    }

    /// Open the popover now. Returns the existing one if already open.
    pub fn open(
        &mut self,
        host: &mut H,
        controller: &mut PopoverController<H>,
        now: Duration,
    ) -> Result<PopoverRef, OpenError> {
        self.sync(host);
        if let Some(popover) = self.popover.as_ref().filter(|p| p.is_open()) {
            return Ok(popover.clone());
        }
        self.open_timer.cancel();
        self.close_timer.cancel();
        let popover = controller.open(
            host,
            self.element,
            self.content.clone(),
            &self.options,
            now,
        )?;

        let el = self.element;
        host.set_attribute(el, "aria-haspopup", self.role.as_str());
        host.set_attribute(el, "aria-expanded", "true");
        host.set_attribute(el, "aria-controls", popover.panel_id());
        if self.role == PopoverRole::Tooltip {
            host.set_attribute(el, "aria-describedby", popover.panel_id());
        }
        self.expect_blur = self.mode == TriggerMode::Hover
            && self.moves_focus
            && self.hover.current().contains(Hovered::FOCUS);
        if self.closes_on_hover_leave {
            if let Some(pane) = controller.panel(&popover).map(|p| p.pane()) {
                for kind in [EventKind::PointerEnter, EventKind::PointerLeave] {
                    let listener =
                        host.add_listener(Subscription::new(EventTarget::Element(pane), kind));
                    self.panel_listeners.push(listener);
                }
            }
        }
        self.popover = Some(popover.clone());
        Ok(popover)
    }

    /// Close the popover now. Returns false if it was not open.
    pub fn close(
        &mut self,
        host: &mut H,
        controller: &mut PopoverController<H>,
        reason: CloseReason,
    ) -> bool {
        self.open_timer.cancel();
        self.close_timer.cancel();
        let closed = self
            .popover
            .as_ref()
            .is_some_and(|p| controller.close(host, p, reason));
        self.sync(host);
        closed
    }

    /// Open if closed, close if open. Returns whether the popover is open afterwards.
    pub fn toggle(
        &mut self,
        host: &mut H,
        controller: &mut PopoverController<H>,
        now: Duration,
    ) -> Result<bool, OpenError> {
        self.sync(host);
        if self.is_open() {
            self.close(host, controller, CloseReason::Trigger);
            Ok(false)
        } else {
            self.open(host, controller, now).map(|_| true)
        }
    }

    /// Restore the trigger if its popover closed.
    pub fn sync(&mut self, host: &mut H) {
        let Some(popover) = self.popover.take_if(|p| !p.is_open()) else {
            return;
        };
        for listener in self.panel_listeners.drain(..) {
            host.remove_listener(listener);
        }
        self.close_timer.cancel();
        self.hover.leave(Hovered::PANEL);
        self.expect_blur = false;

        let el = self.element;
        host.set_attribute(el, "aria-expanded", "false");
        host.remove_attribute(el, "aria-controls");
        if self.role == PopoverRole::Tooltip {
            host.remove_attribute(el, "aria-describedby");
        }
        if self.role == PopoverRole::Dialog && self.moves_focus {
            host.focus(el);
            self.expect_focus = self.mode == TriggerMode::Hover;
        }
        log::debug!(
            "trigger {el:?}: popover {} closed ({:?})",
            popover.id(),
            popover.close_reason()
        );
    }
}
