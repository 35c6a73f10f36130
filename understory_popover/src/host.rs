// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host seam: everything the popover needs from the embedding UI layer.
//!
//! ## Overview
//!
//! The popover crates never touch a DOM, a scene graph, or a clock. A
//! [`Host`] implementation measures elements, mutates attributes and styles,
//! attaches overlays, registers event listeners, and talks to the
//! clipboard. Events flow back in through
//! [`PopoverController::handle_event`](crate::controller::PopoverController::handle_event)
//! and [`PopoverTrigger::handle_event`](crate::trigger::PopoverTrigger::handle_event),
//! tagged with the [`ListenerId`] the host returned from
//! [`Host::add_listener`].
//!
//! ## Listener identity
//!
//! Each [`ListenerId`] names exactly one registration. Owners remove every
//! registration they made; an event delivered for an id that was already
//! removed is ignored, so hosts may deliver it to every owner without
//! bookkeeping of their own.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect};
use understory_placement::AnchorStrategy;

use crate::error::{ClipboardError, MeasureError};
use crate::presenter::PanelView;

/// Identifier of one listener registration, allocated by the host.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ListenerId(pub u64);

/// Identifier of an active focus trap, allocated by the host.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FocusTrapId(pub u64);

/// Identifier of a pending asynchronous clipboard write, allocated by the host.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ClipboardTicket(pub u64);

/// Where a listener is registered.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EventTarget<E> {
    /// A specific element.
    Element(E),
    /// The whole document; receives bubbled events from every element.
    Document,
    /// The window; receives resize and navigation.
    Window,
}

/// Event types the popover subscribes to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EventKind {
    /// Primary activation.
    Click,
    /// Pointer pressed.
    PointerDown,
    /// Pointer entered the element.
    PointerEnter,
    /// Pointer left the element.
    PointerLeave,
    /// Key pressed; see [`HostEvent::key`].
    KeyDown,
    /// Element gained keyboard focus.
    Focus,
    /// Element lost keyboard focus.
    Blur,
    /// Something scrolled.
    Scroll,
    /// The viewport resized.
    Resize,
    /// The host navigated to another location.
    Navigation,
}

/// Keys the popover reacts to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Key {
    /// Escape.
    Escape,
    /// Enter.
    Enter,
    /// Space bar.
    Space,
    /// Tab.
    Tab,
    /// Anything else.
    Other,
}

/// A listener registration request.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Subscription<E> {
    /// Where to listen.
    pub target: EventTarget<E>,
    /// What to listen for.
    pub kind: EventKind,
    /// Listen during the capture phase (needed for scroll, which does not bubble).
    pub capture: bool,
}

impl<E> Subscription<E> {
    /// A bubbling-phase subscription.
    pub fn new(target: EventTarget<E>, kind: EventKind) -> Self {
        Self {
            target,
            kind,
            capture: false,
        }
    }

    /// A capture-phase subscription.
    pub fn capture(target: EventTarget<E>, kind: EventKind) -> Self {
        Self {
            target,
            kind,
            capture: true,
        }
    }
}

/// An event delivered by the host.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HostEvent<E> {
    /// Event type.
    pub kind: EventKind,
    /// Element the event originated from, if any.
    pub target: Option<E>,
    /// Pointer position in viewport coordinates, for pointer events.
    pub position: Option<Point>,
    /// Key, for keyboard events.
    pub key: Option<Key>,
}

impl<E> HostEvent<E> {
    /// An event of `kind` with no payload.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            target: None,
            position: None,
            key: None,
        }
    }

    /// A click on `target`.
    pub fn click(target: E) -> Self {
        Self::new(EventKind::Click).on(target)
    }

    /// A pointer press on `target` at `position`.
    pub fn pointer_down(target: E, position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::new(EventKind::PointerDown).on(target)
        }
    }

    /// A key press.
    pub fn key_down(key: Key) -> Self {
        Self {
            key: Some(key),
            ..Self::new(EventKind::KeyDown)
        }
    }

    /// Set the originating element.
    #[must_use]
    pub fn on(mut self, target: E) -> Self {
        self.target = Some(target);
        self
    }
}

/// Everything a host needs to create and position an overlay.
#[derive(Clone, Debug)]
pub struct OverlaySpec {
    /// Anchor strategies to try in order; the first is the requested placement.
    pub strategies: Vec<AnchorStrategy>,
    /// Gap to keep between the panel and the viewport edges.
    pub viewport_margin: f64,
    /// Allow the layout to fall through to later strategies.
    pub flexible: bool,
    /// Push the panel on screen when no strategy fits.
    pub push: bool,
    /// Create a backdrop behind the panel.
    pub has_backdrop: bool,
    /// CSS classes for the overlay pane.
    pub panel_classes: Vec<String>,
    /// Fixed width, in pixels.
    pub width: Option<f64>,
    /// Maximum width, in pixels.
    pub max_width: Option<f64>,
    /// Maximum height, in pixels.
    pub max_height: Option<f64>,
}

/// Elements created by [`Host::attach_overlay`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OverlayHandle<E> {
    /// The pane hosting the panel.
    pub pane: E,
    /// The backdrop, if one was requested.
    pub backdrop: Option<E>,
}

/// The embedding UI layer.
///
/// All methods are infallible from the popover's point of view except
/// measurement and clipboard writes, whose failures are absorbed.
pub trait Host {
    /// Element handle.
    type Element: Copy + Eq + core::fmt::Debug;
    /// Opaque template handle, see [`PopoverContent::Template`](crate::content::PopoverContent::Template).
    type Template: Clone + core::fmt::Debug;
    /// Opaque component handle, see [`PopoverContent::Component`](crate::content::PopoverContent::Component).
    type Component: Clone + core::fmt::Debug;

    /// True if `element` is attached and measurable.
    fn is_attached(&self, element: Self::Element) -> bool;
    /// Current bounding box of `element` in viewport coordinates.
    fn bounding_rect(&self, element: Self::Element) -> Result<Rect, MeasureError>;
    /// The visible viewport.
    fn viewport(&self) -> Rect;
    /// True if `node` is `container` or one of its descendants.
    fn contains(&self, container: Self::Element, node: Self::Element) -> bool;

    /// Set an attribute.
    fn set_attribute(&mut self, element: Self::Element, name: &str, value: &str);
    /// Remove an attribute.
    fn remove_attribute(&mut self, element: Self::Element, name: &str);
    /// Add a CSS class.
    fn add_class(&mut self, element: Self::Element, class: &str);
    /// Remove a CSS class.
    fn remove_class(&mut self, element: Self::Element, class: &str);
    /// Set a style property, or remove it with `None`.
    fn set_style(&mut self, element: Self::Element, property: &str, value: Option<&str>);

    /// Move keyboard focus to `element`.
    fn focus(&mut self, element: Self::Element);
    /// Focus the first focusable descendant of `container`. Returns false if there is none.
    fn focus_first_focusable(&mut self, container: Self::Element) -> bool;
    /// Start constraining keyboard focus to `container`.
    fn activate_focus_trap(&mut self, container: Self::Element) -> FocusTrapId;
    /// Stop a focus trap.
    fn deactivate_focus_trap(&mut self, trap: FocusTrapId);

    /// Create an overlay anchored to `target` and position it with `spec`.
    fn attach_overlay(
        &mut self,
        target: Self::Element,
        spec: &OverlaySpec,
    ) -> OverlayHandle<Self::Element>;
    /// Remove an overlay created by [`attach_overlay`](Self::attach_overlay).
    fn detach_overlay(&mut self, overlay: &OverlayHandle<Self::Element>);
    /// Render panel content into the overlay pane.
    fn render_panel(
        &mut self,
        pane: Self::Element,
        view: &PanelView<'_, Self::Template, Self::Component>,
    );
    /// Set, or clear with `None`, the polite live-region message inside `pane`.
    fn announce(&mut self, pane: Self::Element, message: Option<&str>);

    /// Register a listener.
    fn add_listener(&mut self, subscription: Subscription<Self::Element>) -> ListenerId;
    /// Remove a listener registered with [`add_listener`](Self::add_listener).
    fn remove_listener(&mut self, listener: ListenerId);

    /// Start an asynchronous clipboard write.
    ///
    /// An immediate `Err` means the API is unusable here (missing, insecure
    /// context). Otherwise the host later reports the outcome through
    /// [`PopoverController::clipboard_settled`](crate::controller::PopoverController::clipboard_settled).
    fn write_clipboard(&mut self, text: &str) -> Result<ClipboardTicket, ClipboardError>;
    /// Synchronous selection-based copy: an off-screen text field is filled,
    /// selected, and copied with the legacy command.
    fn legacy_copy(&mut self, text: &str) -> Result<(), ClipboardError>;
}
