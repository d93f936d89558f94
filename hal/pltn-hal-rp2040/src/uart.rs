//! UART link adapters
//!
//! The node loop polls for bytes without blocking, so the receive side is
//! only read when the driver reports data ready. Both adapters work over
//! any `embedded-io` implementation; on target they wrap the halves of an
//! embassy-rp `BufferedUart`.

use embassy_rp::uart::Config;
use embedded_io::{Read, ReadReady, Write};
use pltn_core::traits::{ByteSink, ByteSource};

/// UART configuration for a link (8N1 at the given rate)
pub fn link_config(baudrate: u32) -> Config {
    let mut config = Config::default();
    config.baudrate = baudrate;
    config
}

/// Non-blocking byte source over a buffered receiver
pub struct UartSource<R> {
    rx: R,
    errors: u32,
}

impl<R: Read + ReadReady> UartSource<R> {
    pub fn new(rx: R) -> Self {
        Self { rx, errors: 0 }
    }

    /// Receive errors (overrun, framing, break) since boot
    pub fn errors(&self) -> u32 {
        self.errors
    }
}

impl<R: Read + ReadReady> ByteSource for UartSource<R> {
    fn read_byte(&mut self) -> Option<u8> {
        match self.rx.read_ready() {
            Ok(true) => {}
            Ok(false) => return None,
            Err(_) => {
                self.errors = self.errors.saturating_add(1);
                return None;
            }
        }

        let mut byte = [0u8; 1];
        match self.rx.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            Ok(_) => None,
            Err(_) => {
                self.errors = self.errors.saturating_add(1);
                None
            }
        }
    }
}

/// Byte sink over a buffered transmitter
pub struct UartSink<W> {
    tx: W,
}

impl<W: Write> UartSink<W> {
    pub fn new(tx: W) -> Self {
        Self { tx }
    }
}

impl<W: Write> ByteSink for UartSink<W> {
    type Error = W::Error;

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.tx.write_all(bytes)
    }
}
