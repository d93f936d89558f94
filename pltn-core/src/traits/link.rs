//! Serial link and clock seams

use crate::time::Instant;

/// Non-blocking byte input
pub trait ByteSource {
    /// Next available byte, or `None` if nothing is waiting
    fn read_byte(&mut self) -> Option<u8>;
}

/// Byte output
pub trait ByteSink {
    type Error;

    /// Write the whole buffer
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Monotonic millisecond clock
pub trait Clock {
    fn now(&self) -> Instant;
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }
}

impl<T: ByteSink + ?Sized> ByteSink for &mut T {
    type Error = T::Error;

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write_bytes(bytes)
    }
}

/// A node with no downstream neighbour
impl ByteSink for () {
    type Error = core::convert::Infallible;

    fn write_bytes(&mut self, _bytes: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }
}
