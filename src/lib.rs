//! # pnp-motion
//!
//! Timer-driven stepper pulse generation and host protocol for a
//! pick-and-place gantry, with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Hardware step pulses**: each axis runs a timer in CTC mode; an ISR
//!   counts compare matches and stops the clock at the target
//! - **Synchronized moves**: per-axis step rates are matched so every axis
//!   starts and stops together
//! - **Host protocol**: byte-oriented command/status state machine driven by
//!   an explicit transition table
//! - **Configuration-driven**: machine geometry and timing from TOML files
//! - **no_std compatible**: core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pnp_motion::pulse::{on_compare_match, AxisPulseState};
//! use pnp_motion::{MachineConfig, MotionCoordinator, ProtocolSession};
//!
//! static X_PULSES: AxisPulseState = AxisPulseState::new();
//! static Y_PULSES: AxisPulseState = AxisPulseState::new();
//!
//! let config = MachineConfig::default();
//!
//! let motion = MotionCoordinator::builder()
//!     .from_config(&config)
//!     .axis(Axis::X, timer1, &X_PULSES, x_dir, x_enable)
//!     .axis(Axis::Y, timer3, &Y_PULSES, y_dir, y_enable)
//!     .interrupts(irq)
//!     .delay(delay)
//!     .build()?;
//!
//! let mut session = ProtocolSession::new(usb, motion, effector, led, delay, &config);
//! session.run()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing and the host
//!   critical-section implementation
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod error;
pub mod io;
pub mod motion;
pub mod protocol;
pub mod pulse;

// Re-exports for ergonomic API
pub use config::{validate_config, Axis, AxisConfig, MachineConfig};
pub use error::{Error, Result};
pub use io::{EndEffector, GpioEndEffector, Transport};
pub use motion::{wait_for_idle, Direction, MotionControl, MotionCoordinator, MotionPlan, MotionStatus};
pub use protocol::{Command, ProtocolSession, State, Status};
pub use pulse::{AxisPulseState, PulseGenerator, StepTimer};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Hertz, Millimeters, Point, Steps};
