//! Motion interface consumed by the host protocol.

use crate::config::{Axis, Point};
use crate::error::MotionError;

/// Progress of the last issued move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionStatus {
    /// Every axis has stopped at its target.
    Idle,
    /// At least one axis is still stepping.
    Moving,
    /// A limit switch stopped this axis.
    Faulted(Axis),
}

/// A gantry that can be sent to XY coordinates and polled for completion.
pub trait MotionControl {
    /// Start a synchronized move to `target`. Returns once the timers are
    /// running; use [`status`](Self::status) to observe completion.
    fn move_xy(&mut self, target: Point) -> Result<(), MotionError>;

    /// Current progress.
    fn status(&self) -> MotionStatus;

    /// Stop every axis immediately.
    fn halt(&mut self);

    /// Drop a latched limit fault. Until then every move is refused with
    /// [`MotionError::LimitSwitch`].
    fn clear_faults(&mut self);
}

impl<M: MotionControl + ?Sized> MotionControl for &mut M {
    fn move_xy(&mut self, target: Point) -> Result<(), MotionError> {
        (**self).move_xy(target)
    }

    fn status(&self) -> MotionStatus {
        (**self).status()
    }

    fn halt(&mut self) {
        (**self).halt()
    }

    fn clear_faults(&mut self) {
        (**self).clear_faults()
    }
}
