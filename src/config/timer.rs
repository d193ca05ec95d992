//! Step timer configuration.

use heapless::Vec;
use serde::Deserialize;

use super::axis::OutputMode;
use super::units::Hertz;
use crate::pulse::CompareSetting;

/// Maximum number of prescaler options a timer can advertise.
pub const MAX_PRESCALERS: usize = 8;

/// Hardware timer parameters shared by every axis channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Timer input clock before prescaling, in Hz.
    pub clock_hz: u32,

    /// Available clock prescalers, ascending.
    pub prescalers: Vec<u16, MAX_PRESCALERS>,

    /// Largest value the compare register holds.
    pub max_compare: u16,

    /// Rates strictly below this disable the axis.
    #[serde(rename = "min_frequency_hz")]
    pub min_frequency: Hertz,

    /// Mechanical ceiling of the motor/driver pair.
    #[serde(rename = "max_frequency_hz")]
    pub max_frequency: Hertz,

    /// Pause between arming consecutive axes, in microseconds.
    pub settle_us: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        let mut prescalers = Vec::new();
        for p in [1u16, 8, 64, 256, 1024] {
            let _ = prescalers.push(p);
        }

        Self {
            clock_hz: 16_000_000,
            prescalers,
            max_compare: u16::MAX,
            min_frequency: Hertz(100),
            max_frequency: Hertz(30_000),
            settle_us: 15,
        }
    }
}

impl TimerConfig {
    /// Compare register setting producing `frequency` steps per second on
    /// a channel driven in `output` mode.
    ///
    /// Returns `None` when no prescaler brings the compare value into range.
    pub fn compare_setting(&self, frequency: Hertz, output: OutputMode) -> Option<CompareSetting> {
        CompareSetting::for_frequency(
            self.clock_hz,
            &self.prescalers,
            self.max_compare,
            frequency,
            output.matches_per_step(),
        )
    }

    /// Highest step rate the timer can produce (compare value 0, no prescaling).
    pub fn frequency_limit(&self) -> Hertz {
        Hertz(self.clock_hz / 2)
    }

    /// Apply the frequency policy: below the minimum disables the axis,
    /// above the maximum is clamped.
    pub fn constrain(&self, frequency: Hertz) -> Hertz {
        if frequency < self.min_frequency {
            Hertz::ZERO
        } else if frequency > self.max_frequency {
            self.max_frequency
        } else {
            frequency
        }
    }
}
