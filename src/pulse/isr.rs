//! Interrupt service bodies.
//!
//! Board code calls these from its interrupt vectors, passing the axis
//! counter and a handle to that axis' timer:
//!
//! ```rust,ignore
//! #[avr_device::interrupt(atmega32u4)]
//! fn TIMER1_COMPA() {
//!     pnp_motion::pulse::on_compare_match(&X_PULSES, &mut Timer1::steal());
//! }
//! ```

use super::state::{AxisPulseState, PulseEvent};
use super::timer::StepTimer;

/// Compare-match handler: count the match and stop the clock on the last one.
#[inline]
pub fn on_compare_match<T: StepTimer + ?Sized>(state: &AxisPulseState, timer: &mut T) -> PulseEvent {
    let event = state.record_match();
    if event == PulseEvent::TargetReached {
        timer.stop();
    }
    event
}

/// Limit-switch handler: stop the axis and latch the fault.
pub fn on_limit_switch<T: StepTimer + ?Sized>(state: &AxisPulseState, timer: &mut T) {
    timer.stop();
    timer.disable_interrupt();
    state.fault();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingTimer {
        stops: u32,
        irq_enabled: bool,
    }

    impl StepTimer for CountingTimer {
        fn set_compare(&mut self, _compare: u16) {}
        fn start(&mut self, _prescaler: u16) {}
        fn stop(&mut self) {
            self.stops += 1;
        }
        fn enable_interrupt(&mut self) {
            self.irq_enabled = true;
        }
        fn disable_interrupt(&mut self) {
            self.irq_enabled = false;
        }
    }

    #[test]
    fn test_clock_stopped_exactly_once() {
        let state = AxisPulseState::new();
        let mut timer = CountingTimer::default();
        state.arm(4);

        for _ in 0..10 {
            on_compare_match(&state, &mut timer);
        }

        assert_eq!(timer.stops, 1);
        assert_eq!(state.snapshot().count, 4);
    }

    #[test]
    fn test_limit_switch_faults_axis() {
        let state = AxisPulseState::new();
        let mut timer = CountingTimer {
            irq_enabled: true,
            ..Default::default()
        };
        state.arm(100);
        on_compare_match(&state, &mut timer);

        on_limit_switch(&state, &mut timer);

        assert_eq!(timer.stops, 1);
        assert!(!timer.irq_enabled);
        assert!(state.snapshot().faulted);
        assert_eq!(on_compare_match(&state, &mut timer), PulseEvent::Ignored);
    }
}
