// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Popover configuration: resolved config, partial options, and their merge.
//!
//! ## Layers
//!
//! A [`PopoverController`](crate::controller::PopoverController) owns a set of
//! defaults (a full [`PopoverConfig`]). Every call to `open` passes a partial
//! [`PopoverOptions`]; only the fields it sets override the defaults, and the
//! merged [`PopoverConfig`] is frozen for the lifetime of that popover.
//!
//! ```
//! use core::time::Duration;
//! use understory_placement::Placement;
//! use understory_popover::config::{AutoClose, PopoverConfig, PopoverOptions, TriggerMode};
//!
//! let options = PopoverOptions::new()
//!     .trigger(TriggerMode::Hover)
//!     .placement(Placement::RIGHT_START)
//!     .hover_close_delay(Duration::from_millis(350));
//!
//! let config = options.merge_over(&PopoverConfig::default());
//! assert_eq!(config.trigger, TriggerMode::Hover);
//! assert_eq!(config.placement, Placement::RIGHT_START);
//! // Untouched fields keep their defaults.
//! assert_eq!(config.auto_close, AutoClose::Outside);
//! assert_eq!(config.offset, 8.0);
//! ```

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::time::Duration;

use understory_placement::Placement;

/// Interaction model deciding when a trigger opens and closes its popover.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TriggerMode {
    /// Click toggles; Enter/Space opens.
    #[default]
    Click,
    /// Pointer hover or keyboard focus opens after a delay; leaving closes after a delay.
    Hover,
    /// The host opens and closes explicitly.
    Manual,
}

/// ARIA role of the panel.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PopoverRole {
    /// Interactive panel; focus returns to the trigger when it closes.
    #[default]
    Dialog,
    /// Descriptive panel linked with `aria-describedby`.
    Tooltip,
}

impl PopoverRole {
    /// Attribute value, `"dialog"` or `"tooltip"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dialog => "dialog",
            Self::Tooltip => "tooltip",
        }
    }
}

/// Which interaction closes an open popover on its own.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AutoClose {
    /// Only explicit closes, Escape, and navigation.
    None,
    /// A pointer press outside the panel and trigger.
    #[default]
    Outside,
    /// The pointer leaving both trigger and panel.
    Hover,
    /// A fixed time after opening; see [`PopoverConfig::timeout`].
    Timeout,
}

/// Opaque payload handed to template content.
///
/// The popover never inspects it; templates downcast it back.
#[derive(Clone)]
pub struct PopoverData(Rc<dyn Any>);

impl PopoverData {
    /// Wrap a value.
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// Borrow the payload as `T`, if that is what it holds.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for PopoverData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PopoverData").finish_non_exhaustive()
    }
}

/// Fully resolved configuration of one popover.
#[derive(Clone, Debug)]
pub struct PopoverConfig {
    /// Interaction model of the trigger.
    pub trigger: TriggerMode,
    /// Requested placement.
    pub placement: Placement,
    /// Gap between trigger and panel, in pixels.
    pub offset: f64,
    /// Fixed panel width, in pixels.
    pub width: Option<f64>,
    /// Maximum panel width, in pixels.
    pub max_width: Option<f64>,
    /// Maximum panel height, in pixels.
    pub max_height: Option<f64>,
    /// Render a pointer arrow and keep it aimed at the trigger.
    pub show_arrow: bool,
    /// ARIA role of the panel.
    pub role: PopoverRole,
    /// Automatic dismissal policy.
    pub auto_close: AutoClose,
    /// Delay before closing after the pointer leaves (hover interactions).
    pub hover_close_delay: Duration,
    /// Delay before opening on hover or focus.
    pub open_delay: Duration,
    /// Lifetime for [`AutoClose::Timeout`]; ignored when zero or absent.
    pub timeout: Option<Duration>,
    /// Close when the host navigates.
    pub close_on_navigation: bool,
    /// Never create a backdrop, even for click triggers.
    pub disable_backdrop: bool,
    /// Keep keyboard focus inside the panel while open.
    pub trap_focus: bool,
    /// Render a header row.
    pub show_header: bool,
    /// Header text.
    pub header: Option<String>,
    /// Offer copy-to-clipboard for text content.
    pub show_copy: bool,
    /// Render a close button.
    pub show_close: bool,
    /// Let the layout flip the panel to fallback placements.
    pub smart_positioning: bool,
    /// Extra CSS classes for the panel.
    pub panel_classes: Vec<String>,
    /// Payload handed to template content.
    pub data: Option<PopoverData>,
}

/// Default close delay for hover interactions.
pub const DEFAULT_HOVER_CLOSE_DELAY: Duration = Duration::from_millis(200);

/// Default gap between trigger and panel.
pub const DEFAULT_OFFSET: f64 = 8.0;

impl Default for PopoverConfig {
    fn default() -> Self {
        Self {
            trigger: TriggerMode::Click,
            placement: Placement::BOTTOM,
            offset: DEFAULT_OFFSET,
            width: None,
            max_width: None,
            max_height: None,
            show_arrow: true,
            role: PopoverRole::Dialog,
            auto_close: AutoClose::Outside,
            hover_close_delay: DEFAULT_HOVER_CLOSE_DELAY,
            open_delay: Duration::ZERO,
            timeout: None,
            close_on_navigation: true,
            disable_backdrop: false,
            trap_focus: false,
            show_header: false,
            header: None,
            show_copy: true,
            show_close: true,
            smart_positioning: true,
            panel_classes: Vec::new(),
            data: None,
        }
    }
}

impl PopoverConfig {
    /// True if a backdrop is created: click triggers only, unless disabled.
    pub fn has_backdrop(&self) -> bool {
        self.trigger == TriggerMode::Click && !self.disable_backdrop
    }

    /// The timeout to arm, if [`AutoClose::Timeout`] is active with a positive duration.
    pub fn effective_timeout(&self) -> Option<Duration> {
        match (self.auto_close, self.timeout) {
            (AutoClose::Timeout, Some(t)) if !t.is_zero() => Some(t),
            _ => None,
        }
    }

    /// True if leaving the trigger and panel should close the popover.
    pub fn closes_on_hover_leave(&self) -> bool {
        self.trigger == TriggerMode::Hover || self.auto_close == AutoClose::Hover
    }

    /// True if opening moves focus into the panel and closing returns it.
    ///
    /// Hover popovers leave focus on the trigger unless a focus trap is requested.
    pub fn moves_focus(&self) -> bool {
        self.trap_focus || self.trigger != TriggerMode::Hover
    }
}

/// Partial configuration; unset fields fall back to the controller defaults.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct PopoverOptions {
    /// See [`PopoverConfig::trigger`].
    pub trigger: Option<TriggerMode>,
    /// See [`PopoverConfig::placement`].
    pub placement: Option<Placement>,
    /// See [`PopoverConfig::offset`].
    pub offset: Option<f64>,
    /// See [`PopoverConfig::width`].
    pub width: Option<f64>,
    /// See [`PopoverConfig::max_width`].
    pub max_width: Option<f64>,
    /// See [`PopoverConfig::max_height`].
    pub max_height: Option<f64>,
    /// See [`PopoverConfig::show_arrow`].
    pub show_arrow: Option<bool>,
    /// See [`PopoverConfig::role`].
    pub role: Option<PopoverRole>,
    /// See [`PopoverConfig::auto_close`].
    pub auto_close: Option<AutoClose>,
    /// See [`PopoverConfig::hover_close_delay`].
    #[cfg_attr(feature = "serde", serde(rename = "hoverCloseDelayMs", with = "millis"))]
    pub hover_close_delay: Option<Duration>,
    /// See [`PopoverConfig::open_delay`].
    #[cfg_attr(feature = "serde", serde(rename = "openDelayMs", with = "millis"))]
    pub open_delay: Option<Duration>,
    /// See [`PopoverConfig::timeout`].
    #[cfg_attr(feature = "serde", serde(rename = "timeoutMs", with = "millis"))]
    pub timeout: Option<Duration>,
    /// See [`PopoverConfig::close_on_navigation`].
    pub close_on_navigation: Option<bool>,
    /// See [`PopoverConfig::disable_backdrop`].
    pub disable_backdrop: Option<bool>,
    /// See [`PopoverConfig::trap_focus`].
    pub trap_focus: Option<bool>,
    /// See [`PopoverConfig::show_header`].
    pub show_header: Option<bool>,
    /// See [`PopoverConfig::header`].
    pub header: Option<String>,
    /// See [`PopoverConfig::show_copy`].
    pub show_copy: Option<bool>,
    /// See [`PopoverConfig::show_close`].
    pub show_close: Option<bool>,
    /// See [`PopoverConfig::smart_positioning`].
    pub smart_positioning: Option<bool>,
    /// See [`PopoverConfig::panel_classes`]. Replaces, does not extend, the defaults.
    pub panel_classes: Option<Vec<String>>,
    /// See [`PopoverConfig::data`].
    #[cfg_attr(feature = "serde", serde(skip))]
    pub data: Option<PopoverData>,
}

macro_rules! setters {
    ($($(#[$doc:meta])* $name:ident: $ty:ty;)*) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $name(mut self, value: $ty) -> Self {
                self.$name = Some(value);
                self
            }
        )*
    };
}

impl PopoverOptions {
    /// Options that override nothing.
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        /// Set the trigger mode.
        trigger: TriggerMode;
        /// Set the requested placement.
        placement: Placement;
        /// Set the trigger/panel gap.
        offset: f64;
        /// Set a fixed panel width.
        width: f64;
        /// Set a maximum panel width.
        max_width: f64;
        /// Set a maximum panel height.
        max_height: f64;
        /// Show or hide the arrow.
        show_arrow: bool;
        /// Set the ARIA role.
        role: PopoverRole;
        /// Set the auto-close policy.
        auto_close: AutoClose;
        /// Set the hover close delay.
        hover_close_delay: Duration;
        /// Set the open delay.
        open_delay: Duration;
        /// Set the auto-close timeout.
        timeout: Duration;
        /// Close, or not, on navigation.
        close_on_navigation: bool;
        /// Disable, or not, the backdrop.
        disable_backdrop: bool;
        /// Trap, or not, focus in the panel.
        trap_focus: bool;
        /// Show, or not, the header row.
        show_header: bool;
        /// Set the header text.
        header: String;
        /// Show, or not, the copy button.
        show_copy: bool;
        /// Show, or not, the close button.
        show_close: bool;
        /// Allow, or not, fallback placements.
        smart_positioning: bool;
        /// Set extra panel classes.
        panel_classes: Vec<String>;
        /// Attach a template payload.
        data: PopoverData;
    }

    /// Resolve these options against `defaults`.
    pub fn merge_over(&self, defaults: &PopoverConfig) -> PopoverConfig {
        PopoverConfig {
            trigger: self.trigger.unwrap_or(defaults.trigger),
            placement: self.placement.unwrap_or(defaults.placement),
            offset: self.offset.unwrap_or(defaults.offset),
            width: self.width.or(defaults.width),
            max_width: self.max_width.or(defaults.max_width),
            max_height: self.max_height.or(defaults.max_height),
            show_arrow: self.show_arrow.unwrap_or(defaults.show_arrow),
            role: self.role.unwrap_or(defaults.role),
            auto_close: self.auto_close.unwrap_or(defaults.auto_close),
            hover_close_delay: self.hover_close_delay.unwrap_or(defaults.hover_close_delay),
            open_delay: self.open_delay.unwrap_or(defaults.open_delay),
            timeout: self.timeout.or(defaults.timeout),
            close_on_navigation: self
                .close_on_navigation
                .unwrap_or(defaults.close_on_navigation),
            disable_backdrop: self.disable_backdrop.unwrap_or(defaults.disable_backdrop),
            trap_focus: self.trap_focus.unwrap_or(defaults.trap_focus),
            show_header: self.show_header.unwrap_or(defaults.show_header),
            header: self.header.clone().or_else(|| defaults.header.clone()),
            show_copy: self.show_copy.unwrap_or(defaults.show_copy),
            show_close: self.show_close.unwrap_or(defaults.show_close),
            smart_positioning: self.smart_positioning.unwrap_or(defaults.smart_positioning),
            panel_classes: self
                .panel_classes
                .clone()
                .unwrap_or_else(|| defaults.panel_classes.clone()),
            data: self.data.clone().or_else(|| defaults.data.clone()),
        }
    }
}

#[cfg(feature = "serde")]
mod millis {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
