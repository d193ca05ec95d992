//! Axis configuration from TOML.

use core::fmt;

use serde::Deserialize;

use super::limits::TravelLimits;
use super::units::{Millimeters, Steps};

/// Maximum number of axes a machine can drive.
pub const MAX_AXES: usize = 3;

/// One linear degree of freedom of the gantry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    /// Gantry X.
    X,
    /// Gantry Y.
    Y,
    /// Tool height.
    Z,
}

impl Axis {
    /// All axes in arming order.
    pub const ALL: [Axis; MAX_AXES] = [Axis::X, Axis::Y, Axis::Z];

    /// Position of this axis in arming order.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(name)
    }
}

/// How the timer drives the STEP line on a compare match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Output flips on every match: two matches per step.
    #[default]
    Toggle,
    /// Output emits a full pulse on every match: one match per step.
    Pulse,
}

impl OutputMode {
    /// Compare matches needed for one full step.
    #[inline]
    pub const fn matches_per_step(self) -> u32 {
        match self {
            OutputMode::Toggle => 2,
            OutputMode::Pulse => 1,
        }
    }
}

/// Complete axis configuration from TOML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AxisConfig {
    /// Driver pulses per motor revolution.
    #[serde(default = "default_pulses_per_revolution")]
    pub pulses_per_revolution: u16,

    /// Lead screw pitch (carriage travel per revolution) in millimeters.
    #[serde(default = "default_pitch", rename = "lead_screw_pitch_mm")]
    pub lead_screw_pitch: f32,

    /// Timer output behaviour on the STEP line.
    #[serde(default)]
    pub output: OutputMode,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,

    /// Optional travel limits.
    #[serde(default)]
    pub travel: Option<TravelLimits>,
}

fn default_pulses_per_revolution() -> u16 {
    1000
}

fn default_pitch() -> f32 {
    8.0
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            pulses_per_revolution: default_pulses_per_revolution(),
            lead_screw_pitch: default_pitch(),
            output: OutputMode::default(),
            invert_direction: false,
            travel: None,
        }
    }
}

impl AxisConfig {
    /// Steps per millimeter of carriage travel.
    pub fn steps_per_mm(&self) -> f32 {
        self.pulses_per_revolution as f32 / self.lead_screw_pitch
    }

    /// Steps needed to cover `distance_mm`, rounded to the nearest step.
    pub fn steps_for(&self, distance_mm: u32) -> Steps {
        Steps(libm::roundf(distance_mm as f32 * self.steps_per_mm()) as u32)
    }

    /// Step index of the absolute `position`, measured from the origin.
    ///
    /// Moves step between these indices rather than rounding each delta, so
    /// a carriage with a fractional steps/mm ratio does not drift.
    pub fn steps_at(&self, position: Millimeters) -> Steps {
        self.steps_for(position.0 as u32)
    }
}
