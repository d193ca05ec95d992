//! Synchronized motion plans.
//!
//! Every axis of a plan starts together and, through speed matching, stops
//! together: the axis with the most steps runs at the base frequency and the
//! others are slowed in proportion to their step counts.

use heapless::Vec;

use crate::config::{Axis, Hertz, Steps, TimerConfig, MAX_AXES};

/// Direction of carriage travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Away from the origin.
    Forward,
    /// Towards the origin.
    Reverse,
}

impl Direction {
    /// Get direction from a signed distance. Zero counts as forward.
    #[inline]
    pub fn from_delta(delta: i32) -> Self {
        if delta >= 0 {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }
}

/// Plan for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisPlan {
    /// Axis this entry drives.
    pub axis: Axis,
    /// Direction line setting.
    pub direction: Direction,
    /// Full steps to emit.
    pub steps: Steps,
    /// Step rate; zero leaves the axis stationary.
    pub frequency: Hertz,
}

impl AxisPlan {
    /// The axis emits no steps in this plan.
    #[inline]
    pub fn is_stationary(&self) -> bool {
        self.steps.is_zero() || self.frequency.is_zero()
    }

    /// Predicted travel time in nanoseconds, `None` when stationary.
    pub fn travel_time_ns(&self) -> Option<u64> {
        if self.is_stationary() {
            return None;
        }
        Some(self.steps.0 as u64 * 1_000_000_000 / self.frequency.0 as u64)
    }
}

/// Per-axis frequencies and step counts for one move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MotionPlan {
    axes: Vec<AxisPlan, MAX_AXES>,
}

impl MotionPlan {
    /// Build a speed-matched plan.
    ///
    /// The axis with the most steps runs at `base` (after the timer's
    /// frequency policy). Every other axis runs at
    /// `floor(base * steps / max_steps)`; axes left with no steps, or slowed
    /// below the timer minimum, get frequency zero.
    ///
    /// Entries beyond [`MAX_AXES`] are ignored.
    pub fn synchronized(
        moves: impl IntoIterator<Item = (Axis, Direction, Steps)>,
        base: Hertz,
        timer: &TimerConfig,
    ) -> Self {
        let mut axes: Vec<AxisPlan, MAX_AXES> = Vec::new();
        for (axis, direction, steps) in moves {
            let _ = axes.push(AxisPlan {
                axis,
                direction,
                steps,
                frequency: Hertz::ZERO,
            });
        }

        let base_constrained = timer.constrain(base);
        if base_constrained != base {
            warn!("base frequency {} Hz constrained to {} Hz", base.0, base_constrained.0);
        }

        let longest = axes.iter().map(|p| p.steps.0).max().unwrap_or(0);
        if longest == 0 {
            return Self { axes };
        }

        for plan in axes.iter_mut() {
            if plan.steps.is_zero() {
                continue;
            }

            let scaled = Hertz((base_constrained.0 as u64 * plan.steps.0 as u64 / longest as u64) as u32);
            plan.frequency = timer.constrain(scaled);
            if plan.frequency.is_zero() {
                debug!("axis {} disabled: {} Hz below minimum", plan.axis, scaled.0);
            }
        }

        Self { axes }
    }

    /// Entry for `axis`, if it takes part in the plan.
    pub fn get(&self, axis: Axis) -> Option<&AxisPlan> {
        self.axes.iter().find(|p| p.axis == axis)
    }

    /// All entries in the order they were supplied.
    pub fn iter(&self) -> impl Iterator<Item = &AxisPlan> {
        self.axes.iter()
    }

    /// Number of axes in the plan.
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    /// The plan names no axes.
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// No axis emits a step.
    pub fn is_stationary(&self) -> bool {
        self.axes.iter().all(AxisPlan::is_stationary)
    }

    /// Predicted duration of the whole move in nanoseconds.
    pub fn duration_ns(&self) -> u64 {
        self.axes
            .iter()
            .filter_map(AxisPlan::travel_time_ns)
            .max()
            .unwrap_or(0)
    }
}
