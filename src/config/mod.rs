//! Configuration module for pnp-motion.
//!
//! Provides types for loading and validating the machine configuration
//! from TOML files (with `std` feature) or pre-built values.

mod axis;
mod limits;
mod machine;
mod timer;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use axis::{Axis, AxisConfig, OutputMode, MAX_AXES};
pub use limits::{LimitPolicy, TravelLimits};
pub use machine::{AxesConfig, EffectorConfig, MachineConfig, MotionConfig, SessionConfig};
pub use timer::{TimerConfig, MAX_PRESCALERS};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Hertz, Millimeters, Point, Steps};
