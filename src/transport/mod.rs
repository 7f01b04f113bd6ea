//! Register transport
//!
//! The SX1276 is driven through addressed byte transfers framed by its chip
//! select line. Every transaction starts with an address byte whose most
//! significant bit selects the direction (`0` read, `1` write), followed by one
//! or more data bytes; the chip auto-increments the address for bursts except
//! on the FIFO register, where successive bytes stream through the FIFO.
//!
//! Chip select is the only mutual exclusion on the bus. Implementations must
//! hold it asserted for the whole transaction and release it on every exit
//! path, including zero-length bursts and failed transfers. The driver assumes
//! a single caller; sharing one transport between concurrent callers requires
//! wrapping it in a lock at the transaction level.
//!
//! Two implementations are provided:
//! - [`SpiTransport`]: a hardware SPI peripheral exposed as an
//!   [`embedded_hal::spi::SpiDevice`], which owns chip select
//! - [`BitBangTransport`]: software-toggled clock and data lines with a fixed
//!   half-period delay per bit

mod bitbang;
mod spi;

pub use bitbang::{BitBangError, BitBangTransport};
pub use spi::SpiTransport;

/// Direction bit set on the address byte of a write transaction.
pub const WRITE_FLAG: u8 = 0x80;

/// Address byte for a read of `address`.
#[inline]
pub const fn read_address(address: u8) -> u8 {
    address & !WRITE_FLAG
}

/// Address byte for a write of `address`.
#[inline]
pub const fn write_address(address: u8) -> u8 {
    address | WRITE_FLAG
}

/// Addressed byte-level access to the radio's register file.
///
/// Each call is exactly one chip-select-scoped bus transaction.
pub trait RegisterTransport {
    /// Error raised by the underlying bus.
    type Error;

    /// Reads `buffer.len()` bytes starting at `address`.
    fn read_burst(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error>;

    /// Writes `bytes` starting at `address`.
    fn write_burst(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Reads a single register.
    fn read_register(&mut self, address: u8) -> Result<u8, Self::Error> {
        let mut value = [0u8; 1];
        self.read_burst(address, &mut value)?;
        Ok(value[0])
    }

    /// Writes a single register.
    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
        self.write_burst(address, &[value])
    }
}

impl<T: RegisterTransport + ?Sized> RegisterTransport for &mut T {
    type Error = T::Error;

    fn read_burst(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        T::read_burst(self, address, buffer)
    }

    fn write_burst(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        T::write_burst(self, address, bytes)
    }

    fn read_register(&mut self, address: u8) -> Result<u8, Self::Error> {
        T::read_register(self, address)
    }

    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
        T::write_register(self, address, value)
    }
}
