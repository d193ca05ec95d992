//! Blocking completion wait.

use embedded_hal::delay::DelayNs;

use crate::error::MotionError;

use super::control::{MotionControl, MotionStatus};

/// Block until the last move finishes.
///
/// Polls `motion` every `poll_interval_ms`, calling `on_poll` before each
/// sleep. Returns the time waited in milliseconds. On a limit-switch fault,
/// or once `timeout_ms` has passed, every axis is halted and the error is
/// returned.
pub fn wait_for_idle<M, D, F>(
    motion: &mut M,
    delay: &mut D,
    poll_interval_ms: u32,
    timeout_ms: u32,
    mut on_poll: F,
) -> Result<u32, MotionError>
where
    M: MotionControl + ?Sized,
    D: DelayNs,
    F: FnMut(),
{
    let mut elapsed_ms: u32 = 0;

    loop {
        match motion.status() {
            MotionStatus::Idle => {
                debug!("move complete after {} ms", elapsed_ms);
                return Ok(elapsed_ms);
            }
            MotionStatus::Faulted(axis) => {
                motion.halt();
                error!("limit switch on axis {}", axis);
                return Err(MotionError::LimitSwitch(axis));
            }
            MotionStatus::Moving => {}
        }

        if elapsed_ms >= timeout_ms {
            motion.halt();
            error!("move timed out after {} ms", elapsed_ms);
            return Err(MotionError::Timeout { elapsed_ms });
        }

        on_poll();
        delay.delay_ms(poll_interval_ms);
        elapsed_ms = elapsed_ms.saturating_add(poll_interval_ms);
    }
}
