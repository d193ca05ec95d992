//! Host link.

use crate::error::TransportError;

/// Byte-oriented duplex link to the host controller (USB CDC-ACM on the
/// reference board).
///
/// Enumeration and reconnection belong to the implementation; the protocol
/// only sees bytes and a connected flag.
pub trait Transport {
    /// Bring the link up. Called once before waiting for the host.
    fn init(&mut self) {}

    /// The host has opened the port.
    fn is_connected(&self) -> bool;

    /// Bytes waiting in the receive buffer.
    fn rx_available(&self) -> usize;

    /// Take one received byte.
    fn rx_char(&mut self) -> Option<u8>;

    /// Drop everything in the receive buffer.
    fn rx_flush(&mut self);

    /// Queue one byte for the host.
    fn tx_char(&mut self, byte: u8) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn init(&mut self) {
        (**self).init()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn rx_available(&self) -> usize {
        (**self).rx_available()
    }

    fn rx_char(&mut self) -> Option<u8> {
        (**self).rx_char()
    }

    fn rx_flush(&mut self) {
        (**self).rx_flush()
    }

    fn tx_char(&mut self, byte: u8) -> Result<(), TransportError> {
        (**self).tx_char(byte)
    }
}
