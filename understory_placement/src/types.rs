// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placement vocabulary: sides, alignments, and their twelve combinations.
//!
//! A [`Placement`] names where a floating panel sits relative to the element
//! that triggered it. The side picks the compass direction, the alignment
//! picks which edge of the target the panel lines up with along the other
//! axis.
//!
//! Placements have a canonical kebab-case form (`"top"`, `"bottom-start"`,
//! `"left-end"`, ...) which [`Display`](core::fmt::Display) produces and
//! [`FromStr`](core::str::FromStr) accepts.

use core::fmt;
use core::str::FromStr;

/// The side of the target that a panel is placed on.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    /// Above the target.
    Top,
    /// Below the target.
    Bottom,
    /// Left of the target.
    Left,
    /// Right of the target.
    Right,
}

impl Side {
    /// The side across the target from this one.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// True for [`Left`](Self::Left) and [`Right`](Self::Right).
    ///
    /// Panels on these sides run along the target's vertical edge, so their
    /// arrow moves vertically.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Alignment of the panel along the axis perpendicular to its [`Side`].
///
/// For top/bottom placements `Start` aligns left edges and `End` aligns
/// right edges. For left/right placements `Start` aligns top edges and `End`
/// aligns bottom edges.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Alignment {
    /// Centered on the target.
    #[default]
    Center,
    /// Aligned to the target's leading edge.
    Start,
    /// Aligned to the target's trailing edge.
    End,
}

/// A requested or detected panel placement.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Placement {
    /// Side of the target.
    pub side: Side,
    /// Alignment along the other axis.
    pub align: Alignment,
}

impl Placement {
    /// `top`
    pub const TOP: Self = Self::new(Side::Top, Alignment::Center);
    /// `top-start`
    pub const TOP_START: Self = Self::new(Side::Top, Alignment::Start);
    /// `top-end`
    pub const TOP_END: Self = Self::new(Side::Top, Alignment::End);
    /// `bottom`
    pub const BOTTOM: Self = Self::new(Side::Bottom, Alignment::Center);
    /// `bottom-start`
    pub const BOTTOM_START: Self = Self::new(Side::Bottom, Alignment::Start);
    /// `bottom-end`
    pub const BOTTOM_END: Self = Self::new(Side::Bottom, Alignment::End);
    /// `left`
    pub const LEFT: Self = Self::new(Side::Left, Alignment::Center);
    /// `left-start`
    pub const LEFT_START: Self = Self::new(Side::Left, Alignment::Start);
    /// `left-end`
    pub const LEFT_END: Self = Self::new(Side::Left, Alignment::End);
    /// `right`
    pub const RIGHT: Self = Self::new(Side::Right, Alignment::Center);
    /// `right-start`
    pub const RIGHT_START: Self = Self::new(Side::Right, Alignment::Start);
    /// `right-end`
    pub const RIGHT_END: Self = Self::new(Side::Right, Alignment::End);

    /// Every placement, grouped by side.
    pub const ALL: [Self; 12] = [
        Self::TOP,
        Self::TOP_START,
        Self::TOP_END,
        Self::BOTTOM,
        Self::BOTTOM_START,
        Self::BOTTOM_END,
        Self::LEFT,
        Self::LEFT_START,
        Self::LEFT_END,
        Self::RIGHT,
        Self::RIGHT_START,
        Self::RIGHT_END,
    ];

    /// Create a placement from a side and an alignment.
    pub const fn new(side: Side, align: Alignment) -> Self {
        Self { side, align }
    }

    /// The mirrored placement: opposite side, same alignment.
    pub const fn opposite(self) -> Self {
        Self::new(self.side.opposite(), self.align)
    }

    /// This placement's side with centered alignment.
    pub const fn centered(self) -> Self {
        Self::new(self.side, Alignment::Center)
    }

    /// See [`Side::is_vertical`].
    pub const fn is_vertical(self) -> bool {
        self.side.is_vertical()
    }

    /// Canonical kebab-case name, e.g. `"bottom-start"`.
    pub const fn as_str(self) -> &'static str {
        match (self.side, self.align) {
            (Side::Top, Alignment::Center) => "top",
            (Side::Top, Alignment::Start) => "top-start",
            (Side::Top, Alignment::End) => "top-end",
            (Side::Bottom, Alignment::Center) => "bottom",
            (Side::Bottom, Alignment::Start) => "bottom-start",
            (Side::Bottom, Alignment::End) => "bottom-end",
            (Side::Left, Alignment::Center) => "left",
            (Side::Left, Alignment::Start) => "left-start",
            (Side::Left, Alignment::End) => "left-end",
            (Side::Right, Alignment::Center) => "right",
            (Side::Right, Alignment::Start) => "right-start",
            (Side::Right, Alignment::End) => "right-end",
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::BOTTOM
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Placement`] from an unknown name.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown placement; expected one of top, bottom, left, right with an optional -start or -end suffix")]
pub struct ParsePlacementError;

impl FromStr for Placement {
    type Err = ParsePlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (side, align) = match s.split_once('-') {
            Some((side, "start")) => (side, Alignment::Start),
            Some((side, "end")) => (side, Alignment::End),
            Some(_) => return Err(ParsePlacementError),
            None => (s, Alignment::Center),
        };
        let side = [Side::Top, Side::Bottom, Side::Left, Side::Right]
            .into_iter()
            .find(|candidate| candidate.name() == side)
            .ok_or(ParsePlacementError)?;
        Ok(Self::new(side, align))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Placement {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Placement {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = alloc::string::String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
