//! Motion module for pnp-motion.
//!
//! Provides speed-matched motion plans, the move-to-point coordinator and
//! the blocking completion wait.

mod builder;
mod control;
mod coordinator;
mod plan;
mod wait;

pub use builder::MotionCoordinatorBuilder;
pub use control::{MotionControl, MotionStatus};
pub use coordinator::MotionCoordinator;
pub use plan::{AxisPlan, Direction, MotionPlan};
pub use wait::wait_for_idle;
