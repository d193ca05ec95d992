//! Host command/response protocol.
//!
//! The host sends single command bytes; the firmware answers with status
//! bytes. MOVE is acknowledged with READY and followed by a four byte
//! coordinate payload:
//!
//! ```text
//! host     firmware
//! 0x5A  ->
//!       <- 0x11 READY
//! x_hi x_lo y_hi y_lo ->
//!       <- 0x22 MOVING
//!       <- 0x44 MOVED
//! ```

mod codes;
mod session;
mod table;

pub use codes::{decode_coordinates, encode_coordinates, Command, Status, COORDINATE_PAYLOAD_LEN};
pub use session::ProtocolSession;
pub use table::{transition, Action, Event, State, Transition};
