//! Step timer abstraction and compare register arithmetic.

use crate::config::Hertz;

/// Compare register value and clock prescaler for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompareSetting {
    /// Value written to the output compare register.
    pub compare: u16,
    /// Clock divider selected for the channel.
    pub prescaler: u16,
}

impl CompareSetting {
    /// Find the setting that makes a CTC timer emit `frequency` steps per
    /// second, where one step takes `matches_per_step` compare matches.
    ///
    /// compare = round(clock / (prescaler * matches_per_step * frequency)) - 1,
    /// using the smallest prescaler whose compare value fits `max_compare`.
    /// Returns `None` for a zero frequency or when no prescaler fits.
    pub fn for_frequency(
        clock_hz: u32,
        prescalers: &[u16],
        max_compare: u16,
        frequency: Hertz,
        matches_per_step: u32,
    ) -> Option<Self> {
        if frequency.is_zero() || matches_per_step == 0 {
            return None;
        }

        let match_rate = frequency.0 as u64 * matches_per_step as u64;

        prescalers.iter().copied().filter(|&p| p > 0).find_map(|prescaler| {
            let divisor = prescaler as u64 * match_rate;
            let ticks = (clock_hz as u64 + divisor / 2) / divisor;
            if ticks == 0 || ticks - 1 > max_compare as u64 {
                return None;
            }
            Some(Self {
                compare: (ticks - 1) as u16,
                prescaler,
            })
        })
    }

    /// Step rate this setting actually produces.
    pub fn step_frequency(&self, clock_hz: u32, matches_per_step: u32) -> f32 {
        let ticks = self.prescaler as f32 * (self.compare as f32 + 1.0);
        clock_hz as f32 / (ticks * matches_per_step as f32)
    }
}

/// One hardware timer channel driving an axis STEP line in CTC mode.
///
/// The compare-match output action (toggle or pulse) is fixed when the
/// channel is set up; this trait only covers what changes per move.
pub trait StepTimer {
    /// Write the output compare register.
    fn set_compare(&mut self, compare: u16);

    /// Select the clock source with the given prescaler, starting the count.
    fn start(&mut self, prescaler: u16);

    /// Clear the clock select bits. The counter freezes and no further
    /// compare matches occur.
    fn stop(&mut self);

    /// Unmask the compare-match interrupt.
    fn enable_interrupt(&mut self);

    /// Mask the compare-match interrupt.
    fn disable_interrupt(&mut self);
}

impl<T: StepTimer + ?Sized> StepTimer for &mut T {
    fn set_compare(&mut self, compare: u16) {
        (**self).set_compare(compare)
    }

    fn start(&mut self, prescaler: u16) {
        (**self).start(prescaler)
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn enable_interrupt(&mut self) {
        (**self).enable_interrupt()
    }

    fn disable_interrupt(&mut self) {
        (**self).disable_interrupt()
    }
}

/// Global interrupt enable.
pub trait InterruptControl {
    /// Set the global interrupt enable bit.
    fn enable(&mut self);
}

impl<I: InterruptControl + ?Sized> InterruptControl for &mut I {
    fn enable(&mut self) {
        (**self).enable()
    }
}
