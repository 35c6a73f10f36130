// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory recording host for unit tests.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use kurbo::{Rect, Size};
use understory_placement::FlexiblePositioner;

use crate::error::{ClipboardError, MeasureError};
use crate::host::{
    ClipboardTicket, EventKind, EventTarget, FocusTrapId, Host, ListenerId, OverlayHandle,
    OverlaySpec, Subscription,
};
use crate::presenter::{PanelBody, PanelView};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum ClipboardMode {
    /// Writes are accepted and settle later.
    Async,
    /// Writes are rejected immediately.
    Reject,
}

#[derive(Clone, Debug)]
pub(crate) struct RenderedPanel {
    pub(crate) panel_id: String,
    pub(crate) text: Option<String>,
}

#[derive(Debug)]
pub(crate) struct TestHost {
    next_element: u32,
    rects: BTreeMap<u32, Rect>,
    parents: BTreeMap<u32, u32>,
    attributes: BTreeMap<(u32, String), String>,
    classes: BTreeSet<(u32, String)>,
    styles: BTreeMap<(u32, String), String>,
    listeners: BTreeMap<ListenerId, Subscription<u32>>,
    next_listener: u64,
    next_trap: u64,
    next_ticket: u64,
    specs: Vec<OverlaySpec>,
    pub(crate) viewport: Rect,
    pub(crate) panel_size: Size,
    pub(crate) fail_measure: bool,
    pub(crate) has_focusable: bool,
    pub(crate) focused: Option<u32>,
    pub(crate) active_traps: BTreeSet<FocusTrapId>,
    pub(crate) overlays: Vec<OverlayHandle<u32>>,
    pub(crate) detach_calls: usize,
    pub(crate) rendered: Vec<RenderedPanel>,
    pub(crate) announcements: Vec<Option<String>>,
    pub(crate) clipboard: ClipboardMode,
    pub(crate) legacy_ok: bool,
    pub(crate) writes: Vec<(ClipboardTicket, String)>,
    pub(crate) legacy_copies: Vec<String>,
}

impl TestHost {
    pub(crate) fn new() -> Self {
        Self {
            next_element: 1,
            rects: BTreeMap::new(),
            parents: BTreeMap::new(),
            attributes: BTreeMap::new(),
            classes: BTreeSet::new(),
            styles: BTreeMap::new(),
            listeners: BTreeMap::new(),
            next_listener: 1,
            next_trap: 1,
            next_ticket: 1,
            specs: Vec::new(),
            viewport: Rect::new(0.0, 0.0, 800.0, 600.0),
            panel_size: Size::new(100.0, 40.0),
            fail_measure: false,
            has_focusable: false,
            focused: None,
            active_traps: BTreeSet::new(),
            overlays: Vec::new(),
            detach_calls: 0,
            rendered: Vec::new(),
            announcements: Vec::new(),
            clipboard: ClipboardMode::Async,
            legacy_ok: true,
            writes: Vec::new(),
            legacy_copies: Vec::new(),
        }
    }

    pub(crate) fn add_element(&mut self, rect: Rect) -> u32 {
        let id = self.next_element;
        self.next_element += 1;
        self.rects.insert(id, rect);
        id
    }

    pub(crate) fn add_child(&mut self, parent: u32, rect: Rect) -> u32 {
        let id = self.add_element(rect);
        self.parents.insert(id, parent);
        id
    }

    pub(crate) fn detach(&mut self, element: u32) {
        self.rects.remove(&element);
    }

    pub(crate) fn attribute(&self, element: u32, name: &str) -> Option<&str> {
        self.attributes
            .get(&(element, name.to_string()))
            .map(String::as_str)
    }

    pub(crate) fn has_class(&self, element: u32, class: &str) -> bool {
        self.classes.contains(&(element, class.to_string()))
    }

    pub(crate) fn style(&self, element: u32, property: &str) -> Option<&str> {
        self.styles
            .get(&(element, property.to_string()))
            .map(String::as_str)
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn listeners_for(&self, target: EventTarget<u32>, kind: EventKind) -> Vec<ListenerId> {
        self.listeners
            .iter()
            .filter(|(_, s)| s.target == target && s.kind == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    pub(crate) fn last_spec(&self) -> Option<&OverlaySpec> {
        self.specs.last()
    }

    pub(crate) fn last_announcement(&self) -> Option<&str> {
        self.announcements.iter().rev().find_map(|m| m.as_deref())
    }
}

impl Host for TestHost {
    type Element = u32;
    type Template = &'static str;
    type Component = &'static str;

    fn is_attached(&self, element: u32) -> bool {
        self.rects.contains_key(&element)
    }

    fn bounding_rect(&self, element: u32) -> Result<Rect, MeasureError> {
        if self.fail_measure {
            return Err(MeasureError::LayoutUnavailable);
        }
        self.rects.get(&element).copied().ok_or(MeasureError::Detached)
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn contains(&self, container: u32, node: u32) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == container {
                return true;
            }
            current = self.parents.get(&n).copied();
        }
        false
    }

    fn set_attribute(&mut self, element: u32, name: &str, value: &str) {
        self.attributes
            .insert((element, name.to_string()), value.to_string());
    }

    fn remove_attribute(&mut self, element: u32, name: &str) {
        self.attributes.remove(&(element, name.to_string()));
    }

    fn add_class(&mut self, element: u32, class: &str) {
        self.classes.insert((element, class.to_string()));
    }

    fn remove_class(&mut self, element: u32, class: &str) {
        self.classes.remove(&(element, class.to_string()));
    }

    fn set_style(&mut self, element: u32, property: &str, value: Option<&str>) {
        let key = (element, property.to_string());
        match value {
            Some(v) => {
                self.styles.insert(key, v.to_string());
            }
            None => {
                self.styles.remove(&key);
            }
        }
    }

    fn focus(&mut self, element: u32) {
        self.focused = Some(element);
    }

    fn focus_first_focusable(&mut self, container: u32) -> bool {
        if self.has_focusable {
            let child = self.add_child(container, Rect::ZERO);
            self.focused = Some(child);
        }
        self.has_focusable
    }

    fn activate_focus_trap(&mut self, _container: u32) -> FocusTrapId {
        let trap = FocusTrapId(self.next_trap);
        self.next_trap += 1;
        self.active_traps.insert(trap);
        trap
    }

    fn deactivate_focus_trap(&mut self, trap: FocusTrapId) {
        self.active_traps.remove(&trap);
    }

    fn attach_overlay(&mut self, target: u32, spec: &OverlaySpec) -> OverlayHandle<u32> {
        let target_rect = self.rects.get(&target).copied().unwrap_or(Rect::ZERO);
        let size = Size::new(
            spec.width.unwrap_or(self.panel_size.width),
            self.panel_size.height,
        );
        let strategies = if spec.flexible {
            &spec.strategies[..]
        } else {
            &spec.strategies[..spec.strategies.len().min(1)]
        };
        let rect = FlexiblePositioner {
            viewport_margin: spec.viewport_margin,
            push: spec.push,
        }
        .position(strategies, target_rect, size, self.viewport)
        .map(|p| p.rect)
        .unwrap_or_else(|| Rect::from_origin_size((0.0, 0.0), size));

        let pane = self.add_element(rect);
        for class in &spec.panel_classes {
            self.add_class(pane, class);
        }
        let backdrop = spec
            .has_backdrop
            .then(|| self.add_element(self.viewport));
        let handle = OverlayHandle { pane, backdrop };
        self.overlays.push(handle);
        self.specs.push(spec.clone());
        handle
    }

    fn detach_overlay(&mut self, overlay: &OverlayHandle<u32>) {
        self.detach_calls += 1;
        self.overlays.retain(|o| o != overlay);
        self.rects.remove(&overlay.pane);
        if let Some(backdrop) = overlay.backdrop {
            self.rects.remove(&backdrop);
        }
    }

    fn render_panel(&mut self, _pane: u32, view: &PanelView<'_, &'static str, &'static str>) {
        let text = match view.body {
            PanelBody::Text { text, .. } => Some(text.to_string()),
            PanelBody::Template { .. } | PanelBody::Component(_) => None,
        };
        self.rendered.push(RenderedPanel {
            panel_id: view.panel_id.to_string(),
            text,
        });
    }

    fn announce(&mut self, _pane: u32, message: Option<&str>) {
        self.announcements.push(message.map(String::from));
    }

    fn add_listener(&mut self, subscription: Subscription<u32>) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, subscription);
        id
    }

    fn remove_listener(&mut self, listener: ListenerId) {
        self.listeners.remove(&listener);
    }

    fn write_clipboard(&mut self, text: &str) -> Result<ClipboardTicket, ClipboardError> {
        match self.clipboard {
            ClipboardMode::Reject => Err(ClipboardError::Unavailable),
            ClipboardMode::Async => {
                let ticket = ClipboardTicket(self.next_ticket);
                self.next_ticket += 1;
                self.writes.push((ticket, text.to_string()));
                Ok(ticket)
            }
        }
    }

    fn legacy_copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        if !self.legacy_ok {
            return Err(ClipboardError::Failed);
        }
        self.legacy_copies.push(text.to_string());
        Ok(())
    }
}
