//! Error types for pnp-motion.
//!
//! Provides unified error handling across configuration, motion, the host
//! protocol, the transport link and the end effector.

use core::fmt;

use crate::config::Axis;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all pnp-motion operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motion planning or execution error
    Motion(MotionError),
    /// Host protocol decoding error
    Protocol(ProtocolError),
    /// Transport link error
    Transport(TransportError),
    /// End effector actuation error
    EndEffector(EndEffectorError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Pulses per revolution must be > 0
    InvalidPulsesPerRevolution(Axis),
    /// Lead screw pitch must be > 0
    InvalidPitch {
        /// Offending axis
        axis: Axis,
        /// Configured pitch in millimeters
        pitch: f32,
    },
    /// Timer input clock must be > 0
    InvalidClock,
    /// Prescaler list must be non-empty, non-zero and strictly ascending
    InvalidPrescalers,
    /// Minimum step frequency must be below the maximum
    InvalidFrequencyRange {
        /// Configured minimum in Hz
        min: u32,
        /// Configured maximum in Hz
        max: u32,
    },
    /// Maximum step frequency cannot be produced by the timer clock
    FrequencyAboveClock {
        /// Configured maximum in Hz
        max: u32,
        /// Highest toggle frequency the clock supports in Hz
        limit: u32,
    },
    /// Base frequency must lie within [min, max]
    BaseFrequencyOutOfRange {
        /// Configured base frequency in Hz
        base: u32,
        /// Minimum step frequency in Hz
        min: u32,
        /// Maximum step frequency in Hz
        max: u32,
    },
    /// Poll interval must be > 0
    InvalidPollInterval(&'static str),
    /// Timeout must cover at least one poll interval
    InvalidTimeout {
        /// Setting name
        name: &'static str,
        /// Configured timeout in milliseconds
        timeout_ms: u32,
        /// Poll interval the timeout is counted in
        poll_ms: u32,
    },
    /// A fixed station lies beyond an axis' travel
    StationOutOfTravel {
        /// Station name
        name: &'static str,
        /// Offending axis
        axis: Axis,
        /// Station coordinate in millimeters
        position: u16,
        /// Axis travel in millimeters
        max: u16,
    },
    /// A required axis was not supplied to the builder
    MissingAxis(Axis),
    /// The same axis was supplied twice
    DuplicateAxis(Axis),
    /// A required builder component was not supplied
    MissingComponent(&'static str),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motion planning and execution errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// Pin operation failed
    Pin,
    /// Axis is not configured on this machine
    NoSuchAxis(Axis),
    /// Target does not name one coordinate per configured axis
    AxisCountMismatch {
        /// Configured axes
        expected: usize,
        /// Supplied coordinates
        got: usize,
    },
    /// Target exceeds the axis travel under the reject policy
    OutOfTravel {
        /// Offending axis
        axis: Axis,
        /// Requested target in millimeters
        target: u16,
        /// Axis travel in millimeters
        max: u16,
    },
    /// A new plan was issued while an axis was still counting
    Busy(Axis),
    /// Axes did not report completion in time
    Timeout {
        /// Time waited in milliseconds
        elapsed_ms: u32,
    },
    /// A limit switch forced an axis to stop
    LimitSwitch(Axis),
}

/// Host protocol decoding errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Byte is not a command the host may send
    UnknownCommand(u8),
    /// Byte is not a status the firmware emits
    UnknownStatus(u8),
    /// Coordinate payload has the wrong length
    PayloadLength(usize),
}

/// Transport link errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Host link dropped
    Disconnected,
    /// Byte could not be queued for transmission
    Write(u8),
}

/// End effector errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EndEffectorError {
    /// Pin operation failed
    Pin,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
            Error::Protocol(e) => write!(f, "Protocol error: {}", e),
            Error::Transport(e) => write!(f, "Transport error: {}", e),
            Error::EndEffector(e) => write!(f, "End effector error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidPulsesPerRevolution(axis) => {
                write!(f, "Axis {}: pulses per revolution must be > 0", axis)
            }
            ConfigError::InvalidPitch { axis, pitch } => {
                write!(f, "Axis {}: invalid lead screw pitch {}. Must be > 0", axis, pitch)
            }
            ConfigError::InvalidClock => write!(f, "Timer clock must be > 0"),
            ConfigError::InvalidPrescalers => {
                write!(f, "Prescalers must be non-empty, non-zero and ascending")
            }
            ConfigError::InvalidFrequencyRange { min, max } => {
                write!(f, "Invalid frequency range: min ({}) must be < max ({})", min, max)
            }
            ConfigError::FrequencyAboveClock { max, limit } => {
                write!(f, "Max frequency {} Hz exceeds timer limit {} Hz", max, limit)
            }
            ConfigError::BaseFrequencyOutOfRange { base, min, max } => {
                write!(f, "Base frequency {} Hz outside [{}, {}] Hz", base, min, max)
            }
            ConfigError::InvalidPollInterval(name) => write!(f, "{} must be > 0", name),
            ConfigError::InvalidTimeout { name, timeout_ms, poll_ms } => {
                write!(f, "{} ({} ms) shorter than its poll interval ({} ms)", name, timeout_ms, poll_ms)
            }
            ConfigError::StationOutOfTravel { name, axis, position, max } => {
                write!(f, "{} station at {} mm exceeds axis {} travel {} mm", name, position, axis, max)
            }
            ConfigError::MissingAxis(axis) => write!(f, "Axis {} is required", axis),
            ConfigError::DuplicateAxis(axis) => write!(f, "Axis {} supplied twice", axis),
            ConfigError::MissingComponent(name) => write!(f, "{} is required", name),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::Pin => write!(f, "GPIO pin operation failed"),
            MotionError::NoSuchAxis(axis) => write!(f, "Axis {} is not configured", axis),
            MotionError::AxisCountMismatch { expected, got } => {
                write!(f, "Expected {} coordinates, got {}", expected, got)
            }
            MotionError::OutOfTravel { axis, target, max } => {
                write!(f, "Axis {} target {} mm exceeds travel {} mm", axis, target, max)
            }
            MotionError::Busy(axis) => write!(f, "Axis {} is still moving", axis),
            MotionError::Timeout { elapsed_ms } => {
                write!(f, "Move did not complete within {} ms", elapsed_ms)
            }
            MotionError::LimitSwitch(axis) => write!(f, "Limit switch tripped on axis {}", axis),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::UnknownCommand(b) => write!(f, "Unknown command byte 0x{:02X}", b),
            ProtocolError::UnknownStatus(b) => write!(f, "Unknown status byte 0x{:02X}", b),
            ProtocolError::PayloadLength(len) => {
                write!(f, "Coordinate payload must be 4 bytes, got {}", len)
            }
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Disconnected => write!(f, "Host link disconnected"),
            TransportError::Write(b) => write!(f, "Failed to transmit byte 0x{:02X}", b),
        }
    }
}

impl fmt::Display for EndEffectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndEffectorError::Pin => write!(f, "GPIO pin operation failed"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}

impl From<EndEffectorError> for Error {
    fn from(e: EndEffectorError) -> Self {
        Error::EndEffector(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}

#[cfg(feature = "std")]
impl std::error::Error for ProtocolError {}

#[cfg(feature = "std")]
impl std::error::Error for TransportError {}

#[cfg(feature = "std")]
impl std::error::Error for EndEffectorError {}
