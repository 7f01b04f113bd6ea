//! Software-clocked transport.
//!
//! Drives chip select, clock and data lines from GPIO pins in SPI mode 0
//! (clock idles low, data sampled on the rising edge, MSB first). Each clock
//! phase lasts a fixed `half_period_ns`.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use super::{read_address, write_address, RegisterTransport};

/// Which line failed while bit-banging a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitBangError {
    /// Chip select could not be driven.
    ChipSelect,
    /// Clock could not be driven.
    Clock,
    /// MOSI could not be driven.
    DataOut,
    /// MISO could not be sampled.
    DataIn,
}

/// Register transport over software-toggled GPIO lines.
pub struct BitBangTransport<CS, SCK, MOSI, MISO, D> {
    cs: CS,
    sck: SCK,
    mosi: MOSI,
    miso: MISO,
    delay: D,
    half_period_ns: u32,
}

impl<CS, SCK, MOSI, MISO, D> BitBangTransport<CS, SCK, MOSI, MISO, D>
where
    CS: OutputPin,
    SCK: OutputPin,
    MOSI: OutputPin,
    MISO: InputPin,
    D: DelayNs,
{
    /// Creates the transport and drives the lines to their idle state
    /// (chip select high, clock low).
    pub fn new(
        mut cs: CS,
        mut sck: SCK,
        mosi: MOSI,
        miso: MISO,
        delay: D,
        half_period_ns: u32,
    ) -> Result<Self, BitBangError> {
        cs.set_high().map_err(|_| BitBangError::ChipSelect)?;
        sck.set_low().map_err(|_| BitBangError::Clock)?;
        Ok(Self {
            cs,
            sck,
            mosi,
            miso,
            delay,
            half_period_ns,
        })
    }

    /// Releases the pins and the delay provider.
    pub fn release(self) -> (CS, SCK, MOSI, MISO, D) {
        (self.cs, self.sck, self.mosi, self.miso, self.delay)
    }

    fn transfer_byte(&mut self, out: u8) -> Result<u8, BitBangError> {
        let mut input = 0u8;
        for bit in (0..8).rev() {
            if out & (1 << bit) != 0 {
                self.mosi.set_high().map_err(|_| BitBangError::DataOut)?;
            } else {
                self.mosi.set_low().map_err(|_| BitBangError::DataOut)?;
            }
            self.delay.delay_ns(self.half_period_ns);

            self.sck.set_high().map_err(|_| BitBangError::Clock)?;
            if self.miso.is_high().map_err(|_| BitBangError::DataIn)? {
                input |= 1 << bit;
            }
            self.delay.delay_ns(self.half_period_ns);

            self.sck.set_low().map_err(|_| BitBangError::Clock)?;
        }
        Ok(input)
    }

    /// Runs `body` with chip select asserted. Chip select is released
    /// whether or not `body` succeeds.
    fn framed<F>(&mut self, body: F) -> Result<(), BitBangError>
    where
        F: FnOnce(&mut Self) -> Result<(), BitBangError>,
    {
        self.cs.set_low().map_err(|_| BitBangError::ChipSelect)?;
        let result = body(self);
        let released = self.cs.set_high().map_err(|_| BitBangError::ChipSelect);
        result.and(released)
    }
}

impl<CS, SCK, MOSI, MISO, D> RegisterTransport for BitBangTransport<CS, SCK, MOSI, MISO, D>
where
    CS: OutputPin,
    SCK: OutputPin,
    MOSI: OutputPin,
    MISO: InputPin,
    D: DelayNs,
{
    type Error = BitBangError;

    fn read_burst(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.framed(|bus| {
            bus.transfer_byte(read_address(address))?;
            for byte in buffer.iter_mut() {
                *byte = bus.transfer_byte(0x00)?;
            }
            Ok(())
        })
    }

    fn write_burst(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.framed(|bus| {
            bus.transfer_byte(write_address(address))?;
            for &byte in bytes {
                bus.transfer_byte(byte)?;
            }
            Ok(())
        })
    }
}
