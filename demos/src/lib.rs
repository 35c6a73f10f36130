// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A logging in-memory host shared by the demos.
//!
//! Elements are named rectangles in a flat map with optional parents.
//! Overlays are laid out with the reference [`FlexiblePositioner`], and
//! every side effect the popover asks for is logged at `info`.

use std::collections::HashMap;

use kurbo::{Rect, Size};
use understory_placement::FlexiblePositioner;
use understory_popover::error::{ClipboardError, MeasureError};
use understory_popover::host::{
    ClipboardTicket, EventKind, EventTarget, FocusTrapId, Host, ListenerId, OverlayHandle,
    OverlaySpec, Subscription,
};
use understory_popover::presenter::{PanelBody, PanelView};

#[derive(Clone, Debug)]
struct Element {
    name: String,
    rect: Rect,
    parent: Option<u32>,
}

/// An in-memory page.
#[derive(Debug)]
pub struct DemoHost {
    elements: HashMap<u32, Element>,
    attributes: HashMap<(u32, String), String>,
    listeners: HashMap<ListenerId, Subscription<u32>>,
    next_id: u64,
    viewport: Rect,
    /// Size every panel is laid out with.
    pub panel_size: Size,
    /// Last text written to the clipboard.
    pub clipboard: Option<String>,
}

impl DemoHost {
    /// An empty page with the given viewport size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            elements: HashMap::new(),
            attributes: HashMap::new(),
            listeners: HashMap::new(),
            next_id: 1,
            viewport: Rect::new(0.0, 0.0, width, height),
            panel_size: Size::new(180.0, 60.0),
            clipboard: None,
        }
    }

    fn next(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a named element.
    pub fn add(&mut self, name: &str, rect: Rect) -> u32 {
        let id = self.next() as u32;
        self.elements.insert(
            id,
            Element {
                name: name.to_owned(),
                rect,
                parent: None,
            },
        );
        id
    }

    /// Move an element, as a scroll would.
    pub fn move_by(&mut self, element: u32, dx: f64, dy: f64) {
        if let Some(e) = self.elements.get_mut(&element) {
            e.rect = e.rect + kurbo::Vec2::new(dx, dy);
        }
    }

    /// Listeners matching `target` and `kind`, in registration order.
    pub fn listeners_for(&self, target: EventTarget<u32>, kind: EventKind) -> Vec<ListenerId> {
        let mut ids: Vec<ListenerId> = self
            .listeners
            .iter()
            .filter(|(_, s)| s.target == target && s.kind == kind)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Current attribute value.
    pub fn attribute(&self, element: u32, name: &str) -> Option<&str> {
        self.attributes
            .get(&(element, name.to_owned()))
            .map(String::as_str)
    }

    /// Current rectangle of an element.
    pub fn rect(&self, element: u32) -> Option<Rect> {
        self.elements.get(&element).map(|e| e.rect)
    }

    fn name(&self, element: u32) -> &str {
        self.elements
            .get(&element)
            .map_or("<detached>", |e| e.name.as_str())
    }
}

impl Host for DemoHost {
    type Element = u32;
    type Template = &'static str;
    type Component = &'static str;

    fn is_attached(&self, element: u32) -> bool {
        self.elements.contains_key(&element)
    }

    fn bounding_rect(&self, element: u32) -> Result<Rect, MeasureError> {
        self.rect(element).ok_or(MeasureError::Detached)
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
            current = self.elements.get(&n).and_then(|e| e.parent);
        }
        false
    }

    fn set_attribute(&mut self, element: u32, name: &str, value: &str) {
        log::info!("{}[{name}] = {value:?}", self.name(element));
        self.attributes
            .insert((element, name.to_owned()), value.to_owned());
    }

    fn remove_attribute(&mut self, element: u32, name: &str) {
        log::info!("{}[{name}] removed", self.name(element));
        self.attributes.remove(&(element, name.to_owned()));
    }

    fn add_class(&mut self, element: u32, class: &str) {
        log::info!("{} +.{class}", self.name(element));
    }

    fn remove_class(&mut self, element: u32, class: &str) {
        log::info!("{} -.{class}", self.name(element));
    }

    fn set_style(&mut self, element: u32, property: &str, value: Option<&str>) {
        log::info!("{} style {property}: {value:?}", self.name(element));
    }

    fn focus(&mut self, element: u32) {
        log::info!("focus -> {}", self.name(element));
    }

    fn focus_first_focusable(&mut self, container: u32) -> bool {
        log::info!("{} has no focusable children", self.name(container));
        false
    }

    fn activate_focus_trap(&mut self, container: u32) -> FocusTrapId {
        log::info!("focus trap on {}", self.name(container));
        FocusTrapId(self.next())
    }

    fn deactivate_focus_trap(&mut self, trap: FocusTrapId) {
        log::info!("focus trap {trap:?} released");
    }

    fn attach_overlay(&mut self, target: u32, spec: &OverlaySpec) -> OverlayHandle<u32> {
        let target_rect = self.rect(target).unwrap_or(Rect::ZERO);
        let size = Size::new(
            spec.width.unwrap_or(self.panel_size.width),
            self.panel_size.height,
        );
        let positioned = FlexiblePositioner {
            viewport_margin: spec.viewport_margin,
            push: spec.push,
        }
        .position(&spec.strategies, target_rect, size, self.viewport);
        let rect = positioned.map_or(Rect::from_origin_size(target_rect.origin(), size), |p| {
            log::info!(
                "overlay laid out with {} (strategy {}, pushed: {})",
                spec.strategies[p.strategy].placement,
                p.strategy,
                p.pushed
            );
            p.rect
        });
        let pane = self.add("panel", rect);
        let backdrop = spec.has_backdrop.then(|| self.add("backdrop", self.viewport));
        log::info!("overlay attached at {rect:?}, classes {:?}", spec.panel_classes);
        OverlayHandle { pane, backdrop }
    }

    fn detach_overlay(&mut self, overlay: &OverlayHandle<u32>) {
        log::info!("overlay detached");
        self.elements.remove(&overlay.pane);
        if let Some(backdrop) = overlay.backdrop {
            self.elements.remove(&backdrop);
        }
    }

    fn render_panel(&mut self, _pane: u32, view: &PanelView<'_, &'static str, &'static str>) {
        match &view.body {
            PanelBody::Text { text, label } => log::info!("render {label}: {text:?}"),
            PanelBody::Template { template, .. } => log::info!("render template {template}"),
            PanelBody::Component(component) => log::info!("render component {component}"),
        }
        log::info!(
            "  copy button: {}, close button: {}, arrow: {}",
            view.show_copy,
            view.show_close,
            view.show_arrow
        );
    }

    fn announce(&mut self, _pane: u32, message: Option<&str>) {
        log::info!("live region: {message:?}");
    }

    fn add_listener(&mut self, subscription: Subscription<u32>) -> ListenerId {
        let id = ListenerId(self.next());
        self.listeners.insert(id, subscription);
        id
    }

    fn remove_listener(&mut self, listener: ListenerId) {
        self.listeners.remove(&listener);
    }

    fn write_clipboard(&mut self, text: &str) -> Result<ClipboardTicket, ClipboardError> {
        // No async clipboard on this page; exercise the fallback.
        log::info!("async clipboard unavailable for {} bytes", text.len());
        Err(ClipboardError::Unavailable)
    }

    fn legacy_copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.clipboard = Some(text.to_owned());
        Ok(())
    }
}
