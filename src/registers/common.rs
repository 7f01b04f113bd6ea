//! Chip-level registers
//!
//! Operating mode, silicon version and sync word.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

use crate::mode::{OperatingMode, OperatingModeError, LONG_RANGE_MODE};

/// Silicon revision reported by every SX1276-based module.
pub const EXPECTED_VERSION: u8 = 0x12;

/// Operating mode register (address: 0x01)
///
/// Bit 7 selects LoRa framing and is set on every write. It can only be
/// changed while the chip is in sleep, which is why initialization passes
/// through sleep before anything else.
#[register(0x01u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct OpMode {
    /// Requested mode
    pub mode: OperatingMode,
}

/// Version register (address: 0x42)
///
/// Holds the silicon revision. Reads back [`EXPECTED_VERSION`] on a
/// correctly wired module.
#[register(0x42u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct Version {
    /// Full revision number (bits 7-4) and metal mask revision (bits 3-0)
    pub revision: u8,
}

/// LoRa sync word register (address: 0x39)
///
/// `0x12` for private networks, `0x34` for LoRaWAN.
#[register(0x39u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct SyncWord {
    pub value: u8,
}

impl FromByteArray for OpMode {
    type Error = OperatingModeError;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        if bytes[0] & LONG_RANGE_MODE == 0 {
            return Err(OperatingModeError::NotLongRange(bytes[0]));
        }
        Ok(Self {
            mode: OperatingMode::try_from(bytes[0] & 0x07)?,
        })
    }
}

impl ToByteArray for OpMode {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([LONG_RANGE_MODE | self.mode as u8])
    }
}

impl FromByteArray for Version {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { revision: bytes[0] })
    }
}

impl FromByteArray for SyncWord {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for SyncWord {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}
