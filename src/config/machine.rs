//! Machine configuration - root configuration structure.

use serde::Deserialize;

use super::axis::{Axis, AxisConfig};
use super::timer::TimerConfig;
use super::units::{Hertz, Point};

/// Root configuration structure from TOML.
///
/// Every section has defaults matching the reference bench (16 MHz AVR,
/// 1000 pulses/rev drivers on 8 mm lead screws), so an empty document is a
/// valid two-axis machine.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Step timer parameters.
    pub timer: TimerConfig,

    /// Motion planning parameters.
    pub motion: MotionConfig,

    /// Per-axis mechanics.
    pub axes: AxesConfig,

    /// Host protocol parameters.
    pub session: SessionConfig,

    /// End effector timing.
    pub effector: EffectorConfig,
}

/// Motion planning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Step rate of the axis with the longest travel.
    #[serde(rename = "base_frequency_hz")]
    pub base_frequency: Hertz,

    /// Time the drivers need to energize after ENABLE is asserted.
    pub enable_settle_ms: u32,

    /// Completion poll interval (also the diagnostic blink half-period).
    pub poll_interval_ms: u32,

    /// Give up on a move after this long.
    pub move_timeout_ms: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            base_frequency: Hertz(10_000),
            enable_settle_ms: 250,
            poll_interval_ms: 50,
            move_timeout_ms: 120_000,
        }
    }
}

/// Axis set. X and Y are always present; Z is optional.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    /// Gantry X.
    pub x: AxisConfig,
    /// Gantry Y.
    pub y: AxisConfig,
    /// Tool height.
    pub z: Option<AxisConfig>,
}

impl AxesConfig {
    /// Get an axis configuration.
    pub fn get(&self, axis: Axis) -> Option<&AxisConfig> {
        match axis {
            Axis::X => Some(&self.x),
            Axis::Y => Some(&self.y),
            Axis::Z => self.z.as_ref(),
        }
    }

    /// Iterate configured axes in arming order.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, &AxisConfig)> {
        Axis::ALL
            .into_iter()
            .filter_map(move |axis| self.get(axis).map(|config| (axis, config)))
    }

    /// Number of configured axes.
    pub fn count(&self) -> usize {
        if self.z.is_some() {
            3
        } else {
            2
        }
    }
}

/// Host protocol parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Coordinate reached by INITIALIZE.
    pub home: Point,

    /// Coordinate of the bin PLACE drops parts into.
    pub drop_off: Point,

    /// Run the INITIALIZE sequence before accepting commands.
    pub home_on_boot: bool,

    /// Idle delay while a coordinate payload is incomplete.
    pub ready_poll_ms: u32,

    /// Abandon an incomplete payload after this long.
    pub ready_timeout_ms: u32,

    /// Poll interval while waiting for the host to connect.
    pub connect_poll_ms: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            home: Point::new(50, 50),
            drop_off: Point::new(0, 0),
            home_on_boot: true,
            ready_poll_ms: 100,
            ready_timeout_ms: 5_000,
            connect_poll_ms: 20,
        }
    }
}

/// End effector timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EffectorConfig {
    /// Time the tool needs to travel fully down or up.
    pub travel_ms: u32,

    /// Time for the vacuum to build before lifting.
    pub grip_settle_ms: u32,

    /// Length of the vent pulse that drops the part.
    pub release_ms: u32,
}

impl Default for EffectorConfig {
    fn default() -> Self {
        Self {
            travel_ms: 400,
            grip_settle_ms: 300,
            release_ms: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_machine_has_two_axes() {
        let config = MachineConfig::default();
        let axes: heapless::Vec<Axis, 3> = config.axes.iter().map(|(a, _)| a).collect();

        assert_eq!(axes.as_slice(), &[Axis::X, Axis::Y]);
        assert_eq!(config.axes.count(), 2);
        assert!(config.axes.get(Axis::Z).is_none());
    }

    #[test]
    fn test_default_stations() {
        let session = SessionConfig::default();
        assert_eq!(session.home, Point::new(50, 50));
        assert_eq!(session.drop_off, Point::new(0, 0));
    }
}
