// src/common/hal_traits.rs

use core::fmt::Debug;

/// Abstraction for the receive side of the UART the board is wired to.
pub trait BenderSerial {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Attempts to read a single byte from the serial interface.
    ///
    /// Returns `Ok(byte)` if a byte was read, or `Err(nb::Error::WouldBlock)`
    /// if no byte is available yet. Other errors are returned as `Err(nb::Error::Other(Self::Error))`.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;
}

impl<T: BenderSerial + ?Sized> BenderSerial for &mut T {
    type Error = T::Error;

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        (**self).read_byte()
    }
}

/// Wraps any embedded-hal 0.2 serial reader.
#[cfg(feature = "impl-hal")]
#[derive(Debug)]
pub struct HalSerial<R>(pub R);

#[cfg(feature = "impl-hal")]
impl<R> BenderSerial for HalSerial<R>
where
    R: embedded_hal::serial::Read<u8>,
    R::Error: Debug,
{
    type Error = R::Error;

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        self.0.read()
    }
}
