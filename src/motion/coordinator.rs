//! Move-to-point coordinator.
//!
//! Owns the direction and enable lines of every axis, the pulse generator and
//! the remembered position of each carriage.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::Vec;

use crate::config::{Axis, AxisConfig, MotionConfig, Millimeters, Point, Steps, MAX_AXES};
use crate::error::MotionError;
use crate::pulse::{InterruptControl, PulseGenerator, StepTimer};

use super::builder::MotionCoordinatorBuilder;
use super::control::{MotionControl, MotionStatus};
use super::plan::{Direction, MotionPlan};

/// Pins and tracked position of one axis.
pub(crate) struct AxisDrive<PIN> {
    pub(crate) axis: Axis,
    pub(crate) config: AxisConfig,
    pub(crate) dir: PIN,
    pub(crate) enable: PIN,
    pub(crate) position: Millimeters,
}

impl<PIN: OutputPin> AxisDrive<PIN> {
    fn set_direction(&mut self, direction: Direction) -> Result<(), MotionError> {
        let pin_high = match direction {
            Direction::Forward => !self.config.invert_direction,
            Direction::Reverse => self.config.invert_direction,
        };

        if pin_high {
            self.dir.set_high().map_err(|_| MotionError::Pin)
        } else {
            self.dir.set_low().map_err(|_| MotionError::Pin)
        }
    }
}

/// Synchronized multi-axis move coordinator.
///
/// Generic over:
/// - `T`: step timer of each axis
/// - `IRQ`: global interrupt control
/// - `PIN`: direction and enable lines (use erased pins for mixed ports)
/// - `D`: delay provider for driver settle times
pub struct MotionCoordinator<'a, T, IRQ, PIN, D>
where
    T: StepTimer,
    IRQ: InterruptControl,
    PIN: OutputPin,
    D: DelayNs,
{
    generator: PulseGenerator<'a, T, IRQ>,
    drives: Vec<AxisDrive<PIN>, MAX_AXES>,
    motion: MotionConfig,
    delay: D,
}

impl<'a, T, IRQ, PIN, D> MotionCoordinator<'a, T, IRQ, PIN, D>
where
    T: StepTimer,
    IRQ: InterruptControl,
    PIN: OutputPin,
    D: DelayNs,
{
    /// Start building a coordinator.
    pub fn builder() -> MotionCoordinatorBuilder<'a, T, IRQ, PIN, D> {
        MotionCoordinatorBuilder::new()
    }

    pub(crate) fn new(
        generator: PulseGenerator<'a, T, IRQ>,
        drives: Vec<AxisDrive<PIN>, MAX_AXES>,
        motion: MotionConfig,
        delay: D,
    ) -> Self {
        Self {
            generator,
            drives,
            motion,
            delay,
        }
    }

    /// Configured axes in arming order.
    pub fn axes(&self) -> impl Iterator<Item = Axis> + '_ {
        self.drives.iter().map(|d| d.axis)
    }

    /// The pulse generator driving the step timers.
    pub fn generator(&self) -> &PulseGenerator<'a, T, IRQ> {
        &self.generator
    }

    /// Last commanded position of `axis`.
    ///
    /// Updated when a move is issued, not when it completes.
    pub fn position(&self, axis: Axis) -> Option<Millimeters> {
        self.drive(axis).map(|d| d.position)
    }

    /// Last commanded XY position.
    pub fn current_point(&self) -> Point {
        Point {
            x: self.position(Axis::X).unwrap_or_default(),
            y: self.position(Axis::Y).unwrap_or_default(),
        }
    }

    /// Compute the plan a move to `targets` would run, without moving.
    ///
    /// `targets` holds one coordinate per configured axis, in axis order.
    pub fn plan(&self, targets: &[Millimeters]) -> Result<MotionPlan, MotionError> {
        let resolved = self.resolve(targets)?;
        Ok(self.plan_resolved(&resolved))
    }

    /// Move every configured axis; `targets` holds one coordinate per axis.
    ///
    /// Refused with [`MotionError::LimitSwitch`] while a limit fault is
    /// latched, before any pin changes. [`clear_faults`](Self::clear_faults)
    /// re-arms.
    pub fn move_to(&mut self, targets: &[Millimeters]) -> Result<MotionPlan, MotionError> {
        if let Some(axis) = self.generator.faulted_axis() {
            warn!("axis {}: move refused, limit fault latched", axis);
            return Err(MotionError::LimitSwitch(axis));
        }
        if let Some(axis) = self.generator.busy_axis() {
            return Err(MotionError::Busy(axis));
        }

        let resolved = self.resolve(targets)?;
        let plan = self.plan_resolved(&resolved);

        for (drive, axis_plan) in self.drives.iter_mut().zip(plan.iter()) {
            drive.set_direction(axis_plan.direction)?;
            drive.enable.set_low().map_err(|_| MotionError::Pin)?;
        }
        self.delay.delay_ms(self.motion.enable_settle_ms);

        self.generator.arm(&plan, &mut self.delay)?;

        // Committed at issue time
        for (drive, target) in self.drives.iter_mut().zip(resolved.iter()) {
            drive.position = *target;
        }

        for p in plan.iter() {
            debug!("axis {}: {} steps at {} Hz", p.axis, p.steps.0, p.frequency.0);
        }
        Ok(plan)
    }

    /// Move X and Y; Z (if present) stays where it is.
    pub fn move_xy(&mut self, target: Point) -> Result<MotionPlan, MotionError> {
        info!("move to ({}, {})", target.x.0, target.y.0);
        let targets = self.targets_with(|axis, current| match axis {
            Axis::X => target.x,
            Axis::Y => target.y,
            Axis::Z => current,
        });
        self.move_to(&targets)
    }

    /// Move only the Z axis.
    pub fn move_z(&mut self, target: Millimeters) -> Result<MotionPlan, MotionError> {
        if self.drive(Axis::Z).is_none() {
            return Err(MotionError::NoSuchAxis(Axis::Z));
        }
        info!("move Z to {}", target.0);
        let targets = self.targets_with(|axis, current| match axis {
            Axis::Z => target,
            _ => current,
        });
        self.move_to(&targets)
    }

    /// Stop every axis immediately. Tracked positions are not corrected.
    pub fn halt(&mut self) {
        self.generator.halt();
    }

    /// Drop latched limit faults so moves are accepted again.
    pub fn clear_faults(&mut self) {
        self.generator.clear_faults();
    }

    /// De-energize every driver (enable lines are active-low).
    pub fn disable(&mut self) -> Result<(), MotionError> {
        for drive in self.drives.iter_mut() {
            drive.enable.set_high().map_err(|_| MotionError::Pin)?;
        }
        Ok(())
    }

    /// Current progress of the last move.
    pub fn status(&self) -> MotionStatus {
        if let Some(axis) = self.generator.faulted_axis() {
            MotionStatus::Faulted(axis)
        } else if self.generator.is_idle() {
            MotionStatus::Idle
        } else {
            MotionStatus::Moving
        }
    }

    fn drive(&self, axis: Axis) -> Option<&AxisDrive<PIN>> {
        self.drives.iter().find(|d| d.axis == axis)
    }

    fn targets_with(&self, f: impl Fn(Axis, Millimeters) -> Millimeters) -> Vec<Millimeters, MAX_AXES> {
        self.drives.iter().map(|d| f(d.axis, d.position)).collect()
    }

    /// Check the coordinate count and apply travel limits.
    fn resolve(&self, targets: &[Millimeters]) -> Result<Vec<Millimeters, MAX_AXES>, MotionError> {
        if targets.len() != self.drives.len() {
            return Err(MotionError::AxisCountMismatch {
                expected: self.drives.len(),
                got: targets.len(),
            });
        }

        let mut resolved = Vec::new();
        for (drive, &target) in self.drives.iter().zip(targets) {
            let limited = match &drive.config.travel {
                Some(travel) => travel.apply(target).ok_or(MotionError::OutOfTravel {
                    axis: drive.axis,
                    target: target.0,
                    max: travel.max.0,
                })?,
                None => target,
            };
            if limited != target {
                warn!("axis {}: target {} mm clamped to {} mm", drive.axis, target.0, limited.0);
            }
            let _ = resolved.push(limited);
        }
        Ok(resolved)
    }

    /// Step counts come from the rounded absolute step index of both ends,
    /// so rounding never accumulates over a sequence of moves.
    fn plan_resolved(&self, resolved: &[Millimeters]) -> MotionPlan {
        let moves = self.drives.iter().zip(resolved).map(|(drive, &target)| {
            let from = drive.config.steps_at(drive.position);
            let to = drive.config.steps_at(target);
            let direction = if to.0 >= from.0 {
                Direction::Forward
            } else {
                Direction::Reverse
            };
            (drive.axis, direction, Steps(from.0.abs_diff(to.0)))
        });
        MotionPlan::synchronized(moves, self.motion.base_frequency, self.generator.timer_config())
    }
}

impl<'a, T, IRQ, PIN, D> MotionControl for MotionCoordinator<'a, T, IRQ, PIN, D>
where
    T: StepTimer,
    IRQ: InterruptControl,
    PIN: OutputPin,
    D: DelayNs,
{
    fn move_xy(&mut self, target: Point) -> Result<(), MotionError> {
        MotionCoordinator::move_xy(self, target).map(|_| ())
    }

    fn status(&self) -> MotionStatus {
        MotionCoordinator::status(self)
    }

    fn halt(&mut self) {
        MotionCoordinator::halt(self)
    }

    fn clear_faults(&mut self) {
        MotionCoordinator::clear_faults(self)
    }
}
