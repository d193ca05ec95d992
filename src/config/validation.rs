//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{Axis, AxisConfig, MachineConfig, Point, TimerConfig};

/// Validate a machine configuration.
///
/// Checks:
/// - Axis mechanics are usable (pulses/rev and pitch > 0)
/// - The timer can produce the configured frequency range
/// - The base frequency lies within that range
/// - Poll intervals are non-zero and timeouts cover at least one poll
/// - Home and drop-off stations lie within axis travel
pub fn validate_config(config: &MachineConfig) -> Result<()> {
    for (axis, axis_config) in config.axes.iter() {
        validate_axis(axis, axis_config)?;
    }

    validate_timer(&config.timer)?;

    let base = config.motion.base_frequency;
    let (min, max) = (config.timer.min_frequency, config.timer.max_frequency);
    if base < min || base > max {
        return Err(Error::Config(ConfigError::BaseFrequencyOutOfRange {
            base: base.0,
            min: min.0,
            max: max.0,
        }));
    }

    validate_interval("motion.poll_interval_ms", config.motion.poll_interval_ms)?;
    validate_interval("session.ready_poll_ms", config.session.ready_poll_ms)?;
    validate_interval("session.connect_poll_ms", config.session.connect_poll_ms)?;

    validate_timeout(
        "motion.move_timeout_ms",
        config.motion.move_timeout_ms,
        config.motion.poll_interval_ms,
    )?;
    validate_timeout(
        "session.ready_timeout_ms",
        config.session.ready_timeout_ms,
        config.session.ready_poll_ms,
    )?;

    validate_station("home", config.session.home, config)?;
    validate_station("drop_off", config.session.drop_off, config)?;

    Ok(())
}

fn validate_axis(axis: Axis, config: &AxisConfig) -> Result<()> {
    if config.pulses_per_revolution == 0 {
        return Err(Error::Config(ConfigError::InvalidPulsesPerRevolution(axis)));
    }

    // Written to also reject NaN
    if !(config.lead_screw_pitch > 0.0) {
        return Err(Error::Config(ConfigError::InvalidPitch {
            axis,
            pitch: config.lead_screw_pitch,
        }));
    }

    Ok(())
}

fn validate_timer(timer: &TimerConfig) -> Result<()> {
    if timer.clock_hz == 0 {
        return Err(Error::Config(ConfigError::InvalidClock));
    }

    let prescalers = timer.prescalers.as_slice();
    let ascending = prescalers.windows(2).all(|w| w[0] < w[1]);
    if prescalers.is_empty() || prescalers[0] == 0 || !ascending {
        return Err(Error::Config(ConfigError::InvalidPrescalers));
    }

    if timer.min_frequency.is_zero() || timer.min_frequency >= timer.max_frequency {
        return Err(Error::Config(ConfigError::InvalidFrequencyRange {
            min: timer.min_frequency.0,
            max: timer.max_frequency.0,
        }));
    }

    let limit = timer.frequency_limit();
    if timer.max_frequency > limit {
        return Err(Error::Config(ConfigError::FrequencyAboveClock {
            max: timer.max_frequency.0,
            limit: limit.0,
        }));
    }

    Ok(())
}

fn validate_interval(name: &'static str, interval_ms: u32) -> Result<()> {
    if interval_ms == 0 {
        return Err(Error::Config(ConfigError::InvalidPollInterval(name)));
    }
    Ok(())
}

fn validate_timeout(name: &'static str, timeout_ms: u32, poll_ms: u32) -> Result<()> {
    if timeout_ms < poll_ms {
        return Err(Error::Config(ConfigError::InvalidTimeout {
            name,
            timeout_ms,
            poll_ms,
        }));
    }
    Ok(())
}

fn validate_station(name: &'static str, station: Point, config: &MachineConfig) -> Result<()> {
    for (axis, position) in [(Axis::X, station.x), (Axis::Y, station.y)] {
        let travel = config.axes.get(axis).and_then(|a| a.travel);
        if let Some(travel) = travel {
            if !travel.contains(position) {
                return Err(Error::Config(ConfigError::StationOutOfTravel {
                    name,
                    axis,
                    position: position.0,
                    max: travel.max.0,
                }));
            }
        }
    }
    Ok(())
}
