//! Operating modes
//!
//! The driver only ever drives these transitions:
//!
//! ```text
//! Sleep -> Standby -> Transmit -> Standby   (TxDone or timeout)
//!                  -> ReceiveContinuous     (until explicitly changed)
//! ```
//!
//! Sleep and standby can be requested from any mode. No transition is
//! rejected; the chip's own state is the source of truth and the mode held by
//! the driver is only a record of the last request.

/// Long range mode bit of `RegOpMode`. Always set by this driver.
pub const LONG_RANGE_MODE: u8 = 0x80;

/// Operating mode of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    /// Lowest power; the only mode in which LoRa framing can be selected
    Sleep = 0x00,
    /// Crystal running, ready for configuration
    Standby = 0x01,
    /// Transmits the FIFO payload, then falls back to standby
    Transmit = 0x03,
    /// Receives packets until the mode is changed
    ReceiveContinuous = 0x05,
}

/// Error type for invalid operating mode values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingModeError {
    /// Mode bits do not correspond to a mode used by this driver
    InvalidValue(u8),
    /// The long range bit is clear: the chip is in FSK/OOK mode
    NotLongRange(u8),
}

impl TryFrom<u8> for OperatingMode {
    type Error = OperatingModeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::Sleep),
            0x01 => Ok(Self::Standby),
            0x03 => Ok(Self::Transmit),
            0x05 => Ok(Self::ReceiveContinuous),
            invalid => Err(OperatingModeError::InvalidValue(invalid)),
        }
    }
}
