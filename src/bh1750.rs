//! BH1750 ambient light sensor
//!
//! The sensor is put into continuous high-resolution mode once by
//! [`Bh1750::init`]; after that every [`read`](IlluminanceSource::read) is a
//! plain two-byte read of the latest measurement.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, SevenBitAddress};

use crate::console::BusScan;
use crate::error::SensorError;
use crate::telemetry::{Illuminance, IlluminanceSource};

/// Address with the ADDR pin low.
pub const DEFAULT_ADDRESS: SevenBitAddress = 0x23;

const POWER_ON: u8 = 0x01;
const CONTINUOUS_HIGH_RES: u8 = 0x10;

const POWER_ON_SETTLE_MS: u32 = 10;
/// Worst-case first high-resolution measurement.
const FIRST_MEASUREMENT_MS: u32 = 180;

/// BH1750 over I2C.
pub struct Bh1750<I2C> {
    i2c: I2C,
    address: SevenBitAddress,
}

impl<I2C> Bh1750<I2C>
where
    I2C: I2c,
{
    /// Wraps the bus. Call [`init`](Self::init) before reading.
    pub fn new(i2c: I2C, address: SevenBitAddress) -> Self {
        Self { i2c, address }
    }

    /// Powers the sensor on, starts continuous high-resolution measurement
    /// and waits for the first result.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[POWER_ON])?;
        delay.delay_ms(POWER_ON_SETTLE_MS);
        self.i2c.write(self.address, &[CONTINUOUS_HIGH_RES])?;
        delay.delay_ms(FIRST_MEASUREMENT_MS);
        debug!("BH1750 at {} ready", self.address);
        Ok(())
    }

    /// Raw measurement counts.
    pub fn read_raw(&mut self) -> Result<u16, I2C::Error> {
        let mut data = [0u8; 2];
        self.i2c.read(self.address, &mut data)?;
        Ok(u16::from_be_bytes(data))
    }

    /// Shared access to the bus, e.g. for [`scan_bus`].
    pub fn bus(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> IlluminanceSource for Bh1750<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn read(&mut self) -> Result<Illuminance, SensorError<Self::Error>> {
        let raw = self.read_raw().map_err(SensorError::Bus)?;
        if raw == 0 || raw == u16::MAX {
            warn!("BH1750 returned sentinel {}", raw);
            return Err(SensorError::Sentinel(raw));
        }
        Ok(centi_lux(raw))
    }
}

impl<I2C> BusScan for Bh1750<I2C>
where
    I2C: I2c,
{
    fn scan(&mut self, found: &mut dyn FnMut(u8)) -> usize {
        scan_bus(&mut self.i2c, found)
    }
}

/// lux = counts / 1.2, so hundredths of a lux = counts * 250 / 3.
///
/// Saturates at the largest value the wire format carries.
pub fn centi_lux(raw: u16) -> Illuminance {
    let scaled = u32::from(raw) * 250 / 3;
    Illuminance(u16::try_from(scaled).unwrap_or(u16::MAX))
}

/// Probes every 7-bit address with an empty write and reports the ones that
/// acknowledge.
///
/// Returns the number of devices found.
pub fn scan_bus<I2C, F>(i2c: &mut I2C, mut found: F) -> usize
where
    I2C: I2c,
    F: FnMut(SevenBitAddress),
{
    let mut count = 0;
    for address in 1..128 {
        if i2c.write(address, &[]).is_ok() {
            found(address);
            count += 1;
        }
    }
    count
}
