// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover intent: compute enter/leave transitions across trigger, panel and focus.
//!
//! A hover popover stays alive while the pointer is over the trigger *or*
//! the panel, or while the trigger holds keyboard focus. [`HoverIntent`]
//! tracks those regions as a [`Hovered`] set and reports a transition only
//! when the set goes from empty to non-empty or back. Moving the pointer
//! from the trigger into the panel therefore produces no transition at all.
//!
//! ```
//! use understory_popover::hover::{HoverIntent, HoverTransition, Hovered};
//! let mut h = HoverIntent::new();
//! assert_eq!(h.enter(Hovered::TRIGGER), Some(HoverTransition::Entered));
//! assert_eq!(h.enter(Hovered::PANEL), None);
//! assert_eq!(h.leave(Hovered::TRIGGER), None);
//! assert_eq!(h.leave(Hovered::PANEL), Some(HoverTransition::Left));
//! ```

bitflags::bitflags! {
    /// Regions currently keeping a hover popover alive.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Hovered: u8 {
        /// Pointer is over the trigger element.
        const TRIGGER = 0b0000_0001;
        /// Pointer is over the panel.
        const PANEL   = 0b0000_0010;
        /// Trigger has keyboard focus.
        const FOCUS   = 0b0000_0100;
    }
}

/// A hover transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HoverTransition {
    /// The first region was entered.
    Entered,
    /// The last region was left.
    Left,
}

/// Tracks which regions hold hover and reports aggregate transitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HoverIntent {
    current: Hovered,
}

impl HoverIntent {
    /// Nothing hovered.
    pub const fn new() -> Self {
        Self {
            current: Hovered::empty(),
        }
    }

    /// Regions currently held.
    pub fn current(&self) -> Hovered {
        self.current
    }

    /// True if any region is held.
    pub fn is_active(&self) -> bool {
        !self.current.is_empty()
    }

    /// Mark `regions` as entered.
    pub fn enter(&mut self, regions: Hovered) -> Option<HoverTransition> {
        self.update(self.current | regions)
    }

    /// Mark `regions` as left.
    pub fn leave(&mut self, regions: Hovered) -> Option<HoverTransition> {
        self.update(self.current - regions)
    }

    /// Forget every region.
    pub fn clear(&mut self) -> Option<HoverTransition> {
        self.update(Hovered::empty())
    }

    fn update(&mut self, next: Hovered) -> Option<HoverTransition> {
        let was = self.is_active();
        self.current = next;
        match (was, self.is_active()) {
            (false, true) => Some(HoverTransition::Entered),
            (true, false) => Some(HoverTransition::Left),
            _ => None,
        }
    }
}
