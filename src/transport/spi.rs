//! Hardware SPI backed transport.

use embedded_hal::spi::{Operation, SpiDevice};

use super::{read_address, write_address, RegisterTransport};

/// Register transport over a hardware SPI peripheral.
///
/// Chip select is owned by the [`SpiDevice`], which asserts it for the
/// duration of [`SpiDevice::transaction`] and releases it on return, error
/// included.
pub struct SpiTransport<SPI> {
    spi: SPI,
}

impl<SPI> SpiTransport<SPI> {
    /// Wraps an SPI device. The bus must be configured for mode 0, MSB first.
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Releases the underlying SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> RegisterTransport for SpiTransport<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    fn read_burst(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.spi.transaction(&mut [
            Operation::Write(&[read_address(address)]),
            Operation::Read(buffer),
        ])
    }

    fn write_burst(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.spi.transaction(&mut [
            Operation::Write(&[write_address(address)]),
            Operation::Write(bytes),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    #[test]
    fn read_register_clears_direction_bit() {
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::write(0x42),
            SpiTransaction::read_vec(vec![0x12]),
            SpiTransaction::transaction_end(),
        ];
        let mut transport = SpiTransport::new(SpiMock::new(&expectations));

        assert_eq!(transport.read_register(0x42).unwrap(), 0x12);

        transport.release().done();
    }

    #[test]
    fn write_register_sets_direction_bit() {
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::write(0x81),
            SpiTransaction::write_vec(vec![0x85]),
            SpiTransaction::transaction_end(),
        ];
        let mut transport = SpiTransport::new(SpiMock::new(&expectations));

        transport.write_register(0x01, 0x85).unwrap();

        transport.release().done();
    }

    #[test]
    fn fifo_burst_is_a_single_transaction() {
        let payload = vec![0xDE, 0xAD, 0xBE, 0xEF, 0x01];
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::write(0x80),
            SpiTransaction::write_vec(payload.clone()),
            SpiTransaction::transaction_end(),
            SpiTransaction::transaction_start(),
            SpiTransaction::write(0x00),
            SpiTransaction::read_vec(payload.clone()),
            SpiTransaction::transaction_end(),
        ];
        let mut transport = SpiTransport::new(SpiMock::new(&expectations));

        transport.write_burst(0x00, &payload).unwrap();
        let mut readback = [0u8; 5];
        transport.read_burst(0x00, &mut readback).unwrap();
        assert_eq!(readback.as_slice(), payload.as_slice());

        transport.release().done();
    }
}
