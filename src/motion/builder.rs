//! Builder pattern for MotionCoordinator.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::Vec;

use crate::config::{AxesConfig, Axis, MachineConfig, Millimeters, MotionConfig, TimerConfig, MAX_AXES};
use crate::error::{ConfigError, Error, MotionError, Result};
use crate::pulse::{AxisPulseState, InterruptControl, PulseChannel, PulseGenerator, StepTimer};

use super::coordinator::{AxisDrive, MotionCoordinator};

/// Hardware supplied for one axis.
struct AxisHardware<'a, T, PIN> {
    axis: Axis,
    timer: T,
    state: &'a AxisPulseState,
    dir: PIN,
    enable: PIN,
}

/// Builder for creating MotionCoordinator instances.
///
/// Defaults to [`MachineConfig::default()`] until
/// [`from_config`](Self::from_config) is called.
pub struct MotionCoordinatorBuilder<'a, T, IRQ, PIN, D>
where
    T: StepTimer,
    IRQ: InterruptControl,
    PIN: OutputPin,
    D: DelayNs,
{
    timer: TimerConfig,
    motion: MotionConfig,
    axes: AxesConfig,
    hardware: Vec<AxisHardware<'a, T, PIN>, MAX_AXES>,
    duplicate: Option<Axis>,
    interrupts: Option<IRQ>,
    delay: Option<D>,
}

impl<'a, T, IRQ, PIN, D> Default for MotionCoordinatorBuilder<'a, T, IRQ, PIN, D>
where
    T: StepTimer,
    IRQ: InterruptControl,
    PIN: OutputPin,
    D: DelayNs,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, IRQ, PIN, D> MotionCoordinatorBuilder<'a, T, IRQ, PIN, D>
where
    T: StepTimer,
    IRQ: InterruptControl,
    PIN: OutputPin,
    D: DelayNs,
{
    /// Create a new builder.
    pub fn new() -> Self {
        let defaults = MachineConfig::default();
        Self {
            timer: defaults.timer,
            motion: defaults.motion,
            axes: defaults.axes,
            hardware: Vec::new(),
            duplicate: None,
            interrupts: None,
            delay: None,
        }
    }

    /// Take timer, motion and axis parameters from a machine configuration.
    pub fn from_config(mut self, config: &MachineConfig) -> Self {
        self.timer = config.timer.clone();
        self.motion = config.motion;
        self.axes = config.axes.clone();
        self
    }

    /// Attach the hardware of one axis.
    ///
    /// `state` is the counter the axis' compare-match ISR updates; `enable`
    /// is active-low.
    pub fn axis(mut self, axis: Axis, timer: T, state: &'a AxisPulseState, dir: PIN, enable: PIN) -> Self {
        let hardware = AxisHardware {
            axis,
            timer,
            state,
            dir,
            enable,
        };
        if self.hardware.iter().any(|h| h.axis == axis) || self.hardware.push(hardware).is_err() {
            self.duplicate.get_or_insert(axis);
        }
        self
    }

    /// Set the global interrupt control.
    pub fn interrupts(mut self, interrupts: IRQ) -> Self {
        self.interrupts = Some(interrupts);
        self
    }

    /// Set the delay provider.
    pub fn delay(mut self, delay: D) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Build the MotionCoordinator.
    ///
    /// # Errors
    ///
    /// Returns an error if an axis is supplied twice, a configured axis has
    /// no hardware, hardware is supplied for an unconfigured axis, or the
    /// interrupt control or delay is missing.
    pub fn build(self) -> Result<MotionCoordinator<'a, T, IRQ, PIN, D>> {
        if let Some(axis) = self.duplicate {
            return Err(Error::Config(ConfigError::DuplicateAxis(axis)));
        }

        for (axis, _) in self.axes.iter() {
            if !self.hardware.iter().any(|h| h.axis == axis) {
                return Err(Error::Config(ConfigError::MissingAxis(axis)));
            }
        }

        let interrupts = self
            .interrupts
            .ok_or(Error::Config(ConfigError::MissingComponent("interrupts")))?;
        let delay = self
            .delay
            .ok_or(Error::Config(ConfigError::MissingComponent("delay")))?;

        let mut channels: Vec<PulseChannel<'a, T>, MAX_AXES> = Vec::new();
        let mut drives: Vec<AxisDrive<PIN>, MAX_AXES> = Vec::new();

        for hw in self.hardware {
            let config = self
                .axes
                .get(hw.axis)
                .ok_or(Error::Motion(MotionError::NoSuchAxis(hw.axis)))?;

            let _ = channels.push(PulseChannel::new(hw.axis, hw.timer, hw.state, config.output));
            let _ = drives.push(AxisDrive {
                axis: hw.axis,
                config: config.clone(),
                dir: hw.dir,
                enable: hw.enable,
                position: Millimeters::default(),
            });
        }
        drives.sort_unstable_by_key(|d| d.axis.index());

        let generator = PulseGenerator::new(channels, interrupts, self.timer)
            .map_err(|axis| Error::Config(ConfigError::DuplicateAxis(axis)))?;

        Ok(MotionCoordinator::new(generator, drives, self.motion, delay))
    }
}
