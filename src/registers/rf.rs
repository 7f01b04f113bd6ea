//! RF front-end registers
//!
//! This module contains registers related to the RF path:
//! - Carrier frequency
//! - Power amplifier selection, level and high-power DAC
//! - Over-current protection
//! - LNA gain
//! - Packet RSSI

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

use crate::frequency::TuningWord;

/// Offset between the raw packet RSSI and dBm on the high-frequency port
/// (862-1020 MHz). See section 5.5.5 of the datasheet.
pub const RSSI_OFFSET_HF: i16 = 157;

/// Carrier frequency (addresses: 0x06-0x08)
///
/// # Important Notes
/// - Written MSB, MID, LSB; the frequency change takes effect on the LSB
/// - Only writable in sleep or standby
#[register(0x06u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct Frf {
    pub word: TuningWord,
}

/// Power amplifier configuration (address: 0x09)
///
/// Pout = 17 - (15 - output_power) dBm on PA_BOOST,
/// Pmax - (15 - output_power) dBm on RFO, where Pmax = 10.8 + 0.6 * max_power.
#[register(0x09u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
pub struct PaConfig {
    /// Route output through PA_BOOST instead of RFO. The RFM95 only has
    /// PA_BOOST wired to the antenna.
    pub pa_boost: bool,
    /// 3 bits
    pub max_power: u8,
    /// 4 bits
    pub output_power: u8,
}

/// Over-current protection (address: 0x0B)
#[register(0x0Bu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
pub struct Ocp {
    pub enabled: bool,
    /// 5-bit trim. 0x17 allows 200 mA, needed for +20 dBm operation.
    pub trim: u8,
}

/// LNA settings (address: 0x0C)
#[register(0x0Cu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
pub struct Lna {
    /// 1 (maximum) to 6 (minimum). Ignored while AGC is enabled.
    pub gain: u8,
    /// 150% LNA current on the high-frequency port
    pub boost_hf: bool,
}

/// Packet RSSI (address: 0x1A)
///
/// RSSI of the last packet received, in the chip's raw units.
#[register(0x1Au8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct PktRssiValue {
    pub raw: u8,
}

impl PktRssiValue {
    /// Signal strength in dBm for the high-frequency front end.
    pub fn dbm(self) -> i16 {
        i16::from(self.raw) - RSSI_OFFSET_HF
    }
}

/// High-power DAC setting (address: 0x4D)
///
/// # Important Notes
/// - `HighPower` enables +20 dBm on PA_BOOST and must be paired with an
///   OCP trim of at least 150 mA
/// - Duty cycle must stay at or below 1% in high-power mode
#[register(0x4Du8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
pub enum PaDac {
    /// Default, up to +17 dBm
    Default,
    /// +20 dBm on PA_BOOST
    HighPower,
}

impl FromByteArray for Frf {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            word: TuningWord::from_bytes(bytes),
        })
    }
}

impl ToByteArray for Frf {
    type Error = Infallible;
    type Array = [u8; 3];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok(self.word.to_bytes())
    }
}

impl ToByteArray for PaConfig {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.pa_boost as u8) << 7)
            | ((self.max_power & 0x07) << 4)
            | (self.output_power & 0x0F)])
    }
}

impl ToByteArray for Ocp {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.enabled as u8) << 5) | (self.trim & 0x1F)])
    }
}

impl ToByteArray for Lna {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let boost = if self.boost_hf { 0x03 } else { 0x00 };
        Ok([((self.gain & 0x07) << 5) | boost])
    }
}

impl FromByteArray for PktRssiValue {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { raw: bytes[0] })
    }
}

impl ToByteArray for PaDac {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([match self {
            Self::Default => 0x84,
            Self::HighPower => 0x87,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rssi_uses_high_frequency_offset() {
        assert_eq!(PktRssiValue { raw: 100 }.dbm(), -57);
        assert_eq!(PktRssiValue { raw: 0 }.dbm(), -157);
        assert_eq!(PktRssiValue { raw: 255 }.dbm(), 98);
    }

    #[test]
    fn front_end_encoding() {
        let pa = PaConfig {
            pa_boost: true,
            max_power: 7,
            output_power: 15,
        };
        assert_eq!(pa.to_bytes().unwrap(), [0xFF]);
        assert_eq!(PaDac::HighPower.to_bytes().unwrap(), [0x87]);
        assert_eq!(
            Ocp {
                enabled: true,
                trim: 0x17
            }
            .to_bytes()
            .unwrap(),
            [0x37]
        );
        assert_eq!(
            Lna {
                gain: 1,
                boost_hf: true
            }
            .to_bytes()
            .unwrap(),
            [0x23]
        );
    }
}
