// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Panel content: text, a host template, or a host component.

use alloc::string::String;

/// What a popover panel shows.
///
/// `T` and `C` are the host's opaque template and component handles; see
/// [`Host::Template`](crate::host::Host::Template) and
/// [`Host::Component`](crate::host::Host::Component).
#[derive(Clone, Debug, PartialEq)]
pub enum PopoverContent<T, C> {
    /// Literal text, shown preformatted. The only variant that can be copied.
    Text(String),
    /// A reusable template, instantiated with the popover's
    /// [`data`](crate::config::PopoverConfig::data) as context.
    Template(T),
    /// A component instantiated inside the panel.
    Component(C),
}

impl<T, C> PopoverContent<T, C> {
    /// The text, for [`Text`](Self::Text) content.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Template(_) | Self::Component(_) => None,
        }
    }
}

impl<T, C> From<String> for PopoverContent<T, C> {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl<T, C> From<&str> for PopoverContent<T, C> {
    fn from(text: &str) -> Self {
        Self::Text(text.into())
    }
}
