//! Wire vocabulary: command bytes, status bytes and the coordinate payload.

use crate::config::{Millimeters, Point};
use crate::error::ProtocolError;

/// Length of the MOVE coordinate payload.
pub const COORDINATE_PAYLOAD_LEN: usize = 4;

/// Commands the host sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// Move to the coordinates that follow.
    Move = 0x5A,
    /// Pick a part at the current position.
    Pick = 0xA5,
    /// Carry the held part to the drop-off station and release it.
    Place = 0x3C,
    /// Pause.
    Pause = 0xC3,
    /// Home the gantry.
    Initialize = 0x78,
    /// Completion query.
    IsFinished = 0xE1,
}

impl Command {
    /// All commands.
    pub const ALL: [Command; 6] = [
        Command::Move,
        Command::Pick,
        Command::Place,
        Command::Pause,
        Command::Initialize,
        Command::IsFinished,
    ];

    /// Wire value.
    #[inline]
    pub const fn byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = ProtocolError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Command::ALL
            .into_iter()
            .find(|c| c.byte() == byte)
            .ok_or(ProtocolError::UnknownCommand(byte))
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> u8 {
        command.byte()
    }
}

/// Status bytes reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Status {
    /// Waiting for the coordinate payload.
    Ready = 0x11,
    /// Move started.
    Moving = 0x22,
    /// Move finished.
    Moved = 0x44,
    /// Pick started.
    Picking = 0x88,
    /// Part held.
    Picked = 0x77,
    /// Place started.
    Placing = 0x66,
    /// Part dropped.
    Placed = 0x99,
    /// Pause acknowledged.
    Paused = 0x55,
    /// Homing started.
    Initializing = 0xAA,
    /// Homing finished.
    Initialized = 0xCC,
    /// Fault; only INITIALIZE is accepted until homed again.
    Error = 0x1E,
}

impl Status {
    /// All statuses.
    pub const ALL: [Status; 11] = [
        Status::Ready,
        Status::Moving,
        Status::Moved,
        Status::Picking,
        Status::Picked,
        Status::Placing,
        Status::Placed,
        Status::Paused,
        Status::Initializing,
        Status::Initialized,
        Status::Error,
    ];

    /// Wire value.
    #[inline]
    pub const fn byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Status {
    type Error = ProtocolError;

    fn try_from(byte: u8) -> Result<Self, ProtocolError> {
        Status::ALL
            .into_iter()
            .find(|s| s.byte() == byte)
            .ok_or(ProtocolError::UnknownStatus(byte))
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> u8 {
        status.byte()
    }
}

/// Decode a MOVE payload: X then Y, each a big-endian `u16`.
pub fn decode_coordinates(payload: &[u8]) -> Result<Point, ProtocolError> {
    match payload {
        &[x_hi, x_lo, y_hi, y_lo] => Ok(Point {
            x: Millimeters(u16::from_be_bytes([x_hi, x_lo])),
            y: Millimeters(u16::from_be_bytes([y_hi, y_lo])),
        }),
        _ => Err(ProtocolError::PayloadLength(payload.len())),
    }
}

/// Encode a MOVE payload (host side).
pub fn encode_coordinates(point: Point) -> [u8; COORDINATE_PAYLOAD_LEN] {
    let [x_hi, x_lo] = point.x.0.to_be_bytes();
    let [y_hi, y_lo] = point.y.0.to_be_bytes();
    [x_hi, x_lo, y_hi, y_lo]
}
