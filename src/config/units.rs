//! Unit types for physical quantities.
//!
//! Provides type-safe representations of positions, step counts and step
//! rates to prevent unit confusion at compile time.

use core::ops::{Add, Sub};

use serde::Deserialize;

/// Linear position along an axis in whole millimeters.
///
/// This is the unit of the host's coordinate payload. Positions are unsigned;
/// a move between two positions is a signed distance (see [`Millimeters::delta_to`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Millimeters(pub u16);

impl Millimeters {
    /// Create a new Millimeters value.
    #[inline]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Signed distance from `self` to `target`.
    ///
    /// Widened to `i32` so a move towards the origin is negative instead of
    /// wrapping around as unsigned arithmetic would.
    #[inline]
    pub const fn delta_to(self, target: Millimeters) -> i32 {
        target.0 as i32 - self.0 as i32
    }
}

impl From<u16> for Millimeters {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

/// A gantry coordinate in the XY plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    /// X coordinate.
    pub x: Millimeters,
    /// Y coordinate.
    pub y: Millimeters,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: u16, y: u16) -> Self {
        Self {
            x: Millimeters(x),
            y: Millimeters(y),
        }
    }
}

/// Motor step count (always a magnitude; direction travels separately).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Steps(pub u32);

impl Steps {
    /// No motion.
    pub const ZERO: Self = Self(0);

    /// Create a new Steps value.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Check for a zero-length move.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for Steps {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Steps {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

/// Step rate in steps (full pulses) per second.
///
/// Zero means "this axis does not move".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Hertz(pub u32);

impl Hertz {
    /// Axis disabled.
    pub const ZERO: Self = Self(0);

    /// Create a new Hertz value.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Check whether this rate disables the axis.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Step period in nanoseconds, or `None` for a disabled axis.
    #[inline]
    pub const fn period_ns(self) -> Option<u64> {
        if self.0 == 0 {
            None
        } else {
            Some(1_000_000_000 / self.0 as u64)
        }
    }
}

/// Extension trait for creating unit types from primitives.
pub trait UnitExt {
    /// Convert to Millimeters.
    fn mm(self) -> Millimeters;
    /// Convert to Hertz.
    fn hz(self) -> Hertz;
}

impl UnitExt for u16 {
    #[inline]
    fn mm(self) -> Millimeters {
        Millimeters(self)
    }

    #[inline]
    fn hz(self) -> Hertz {
        Hertz(self as u32)
    }
}
