//! LoRa modem configuration registers
//!
//! These registers set the physical layer parameters. Transmitter and
//! receiver must agree on bandwidth, coding rate, spreading factor, header
//! mode, CRC and sync word, otherwise packets are silently never received.

use core::convert::Infallible;

use regiface::{register, ToByteArray, WritableRegister};

use crate::config::{Bandwidth, CodingRate, SpreadingFactor};

/// Modem configuration 1 (address: 0x1D)
///
/// Bandwidth (bits 7-4), coding rate (bits 3-1) and header mode (bit 0).
#[register(0x1Du8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
pub struct ModemConfig1 {
    pub bandwidth: Bandwidth,
    pub coding_rate: CodingRate,
    /// Implicit header mode. The payload length must then be fixed and
    /// known to both ends.
    pub implicit_header: bool,
}

/// Modem configuration 2 (address: 0x1E)
///
/// Spreading factor (bits 7-4), continuous TX test mode (bit 3, never set
/// here), payload CRC (bit 2), RX timeout MSBs (bits 1-0, left at zero).
#[register(0x1Eu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
pub struct ModemConfig2 {
    pub spreading_factor: SpreadingFactor,
    /// Generate and check a CRC on the payload
    pub payload_crc: bool,
}

/// Modem configuration 3 (address: 0x26)
///
/// # Important Notes
/// - Low data rate optimization is mandated when the symbol duration
///   exceeds 16 ms (SF11 and SF12 at 125 kHz)
#[register(0x26u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
pub struct ModemConfig3 {
    pub low_data_rate_optimize: bool,
    /// LNA gain set by the internal AGC loop instead of [`super::Lna`]
    pub agc_auto: bool,
}

/// Preamble length (addresses: 0x20-0x21)
///
/// Number of preamble symbols, excluding the 4.25 fixed symbols added by
/// the modem.
#[register(0x20u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
pub struct PreambleLength {
    pub symbols: u16,
}

impl ToByteArray for ModemConfig1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.bandwidth as u8) << 4)
            | ((self.coding_rate as u8) << 1)
            | self.implicit_header as u8])
    }
}

impl ToByteArray for ModemConfig2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.spreading_factor as u8) << 4) | ((self.payload_crc as u8) << 2)])
    }
}

impl ToByteArray for ModemConfig3 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.low_data_rate_optimize as u8) << 3) | ((self.agc_auto as u8) << 2)])
    }
}

impl ToByteArray for PreambleLength {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok(self.symbols.to_be_bytes())
    }
}
