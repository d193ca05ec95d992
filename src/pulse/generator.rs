//! Multi-channel pulse generator.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::config::{Axis, OutputMode, TimerConfig, MAX_AXES};
use crate::error::MotionError;
use crate::motion::MotionPlan;

use super::state::{AxisPulseState, PulseSnapshot};
use super::timer::{InterruptControl, StepTimer};

/// One axis' timer together with its shared counter.
pub struct PulseChannel<'a, T: StepTimer> {
    axis: Axis,
    timer: T,
    state: &'a AxisPulseState,
    output: OutputMode,
}

impl<'a, T: StepTimer> PulseChannel<'a, T> {
    /// Bind a timer to the counter its ISR updates.
    pub fn new(axis: Axis, timer: T, state: &'a AxisPulseState, output: OutputMode) -> Self {
        Self {
            axis,
            timer,
            state,
            output,
        }
    }

    /// Axis driven by this channel.
    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Atomic copy of the channel's counter.
    #[inline]
    pub fn snapshot(&self) -> PulseSnapshot {
        self.state.snapshot()
    }

    fn disable(&mut self) {
        self.timer.stop();
        self.timer.disable_interrupt();
        self.timer.set_compare(0);
    }
}

/// Arms and disarms the step timers of every axis.
pub struct PulseGenerator<'a, T: StepTimer, IRQ: InterruptControl> {
    channels: Vec<PulseChannel<'a, T>, MAX_AXES>,
    interrupts: IRQ,
    timer: TimerConfig,
}

impl<'a, T: StepTimer, IRQ: InterruptControl> PulseGenerator<'a, T, IRQ> {
    /// Create a generator. Channels are armed in axis order regardless of
    /// the order they are supplied in; a repeated axis is rejected.
    pub fn new(
        channels: impl IntoIterator<Item = PulseChannel<'a, T>>,
        interrupts: IRQ,
        timer: TimerConfig,
    ) -> Result<Self, Axis> {
        let mut sorted: Vec<PulseChannel<'a, T>, MAX_AXES> = Vec::new();
        for channel in channels {
            if sorted.iter().any(|c| c.axis == channel.axis) {
                return Err(channel.axis);
            }
            let axis = channel.axis;
            sorted.push(channel).map_err(|_| axis)?;
        }
        sorted.sort_unstable_by_key(|c| c.axis.index());

        Ok(Self {
            channels: sorted,
            interrupts,
            timer,
        })
    }

    /// Timer parameters used to compute compare settings.
    pub fn timer_config(&self) -> &TimerConfig {
        &self.timer
    }

    /// Axes with a channel, in arming order.
    pub fn axes(&self) -> impl Iterator<Item = Axis> + '_ {
        self.channels.iter().map(|c| c.axis)
    }

    /// Counter snapshot for `axis`.
    pub fn snapshot(&self, axis: Axis) -> Option<PulseSnapshot> {
        self.channels.iter().find(|c| c.axis == axis).map(PulseChannel::snapshot)
    }

    /// First axis whose timer is still counting.
    pub fn busy_axis(&self) -> Option<Axis> {
        self.channels
            .iter()
            .find(|c| c.snapshot().active)
            .map(|c| c.axis)
    }

    /// First axis with a latched limit-switch fault.
    pub fn faulted_axis(&self) -> Option<Axis> {
        self.channels
            .iter()
            .find(|c| c.snapshot().faulted)
            .map(|c| c.axis)
    }

    /// Every channel has stopped.
    pub fn is_idle(&self) -> bool {
        self.busy_axis().is_none()
    }

    /// Program and start every channel for `plan`.
    ///
    /// Channels are configured one at a time in axis order with
    /// `settle_us` between them; global interrupts are enabled once, after
    /// the last channel. Channels absent from the plan, stationary in it, or
    /// whose frequency the timer cannot produce are explicitly disabled.
    ///
    /// Refused while any channel is busy or holds a latched fault; see
    /// [`clear_faults`](Self::clear_faults).
    pub fn arm<D: DelayNs>(&mut self, plan: &MotionPlan, delay: &mut D) -> Result<(), MotionError> {
        if let Some(axis) = self.faulted_axis() {
            return Err(MotionError::LimitSwitch(axis));
        }
        if let Some(axis) = self.busy_axis() {
            return Err(MotionError::Busy(axis));
        }

        let settle_us = self.timer.settle_us;
        let mut first = true;

        for channel in self.channels.iter_mut() {
            if !first && settle_us > 0 {
                delay.delay_us(settle_us);
            }
            first = false;

            let setting = plan.get(channel.axis).and_then(|p| {
                let frequency = self.timer.constrain(p.frequency);
                if p.steps.is_zero() || frequency.is_zero() {
                    return None;
                }
                let setting = self.timer.compare_setting(frequency, channel.output);
                if setting.is_none() {
                    warn!("axis {}: no compare setting for {} Hz", channel.axis, frequency.0);
                }
                setting.map(|s| (s, p.steps.0.saturating_mul(channel.output.matches_per_step())))
            });

            match setting {
                Some((setting, pulses)) => {
                    channel.state.arm(pulses);
                    channel.timer.set_compare(setting.compare);
                    channel.timer.enable_interrupt();
                    channel.timer.start(setting.prescaler);
                    trace!(
                        "axis {} armed: {} matches, OCR {} /{}",
                        channel.axis,
                        pulses,
                        setting.compare,
                        setting.prescaler
                    );
                }
                None => {
                    channel.disable();
                    channel.state.arm(0);
                    trace!("axis {} disabled", channel.axis);
                }
            }
        }

        self.interrupts.enable();
        Ok(())
    }

    /// Force every channel off: clock, interrupt and compare cleared.
    ///
    /// Counts and fault flags are kept for inspection.
    pub fn halt(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.disable();
            channel.state.disarm();
        }
        debug!("all channels halted");
    }

    /// Drop latched limit-switch faults so the channels can be armed again.
    pub fn clear_faults(&mut self) {
        for channel in self.channels.iter() {
            if channel.snapshot().faulted {
                info!("axis {}: limit fault cleared", channel.axis);
                channel.state.clear_fault();
            }
        }
    }
}
