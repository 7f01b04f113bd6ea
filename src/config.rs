//! Radio configuration
//!
//! [`RadioConfig::default`] reproduces the long-range profile the sensor
//! nodes and base station are deployed with: 915 MHz, 125 kHz bandwidth,
//! SF12, coding rate 4/8, explicit header, payload CRC, 12 preamble
//! symbols, sync word 0x12 and +20 dBm on PA_BOOST.

use crate::registers::{Lna, ModemConfig1, ModemConfig2, ModemConfig3, Ocp, PaConfig, PaDac};

/// Signal bandwidth (`RegModemConfig1` bits 7-4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bandwidth {
    Khz7_8 = 0,
    Khz10_4 = 1,
    Khz15_6 = 2,
    Khz20_8 = 3,
    Khz31_25 = 4,
    Khz41_7 = 5,
    Khz62_5 = 6,
    Khz125 = 7,
    Khz250 = 8,
    Khz500 = 9,
}

/// Forward error correction rate (`RegModemConfig1` bits 3-1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodingRate {
    Cr4_5 = 1,
    Cr4_6 = 2,
    Cr4_7 = 3,
    Cr4_8 = 4,
}

/// Spreading factor (`RegModemConfig2` bits 7-4)
///
/// SF6 additionally requires implicit header mode and detection
/// optimization settings this driver does not apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpreadingFactor {
    Sf6 = 6,
    Sf7 = 7,
    Sf8 = 8,
    Sf9 = 9,
    Sf10 = 10,
    Sf11 = 11,
    Sf12 = 12,
}

/// Modem parameters. Both ends of the link must agree on all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModemConfig {
    pub bandwidth: Bandwidth,
    pub coding_rate: CodingRate,
    pub implicit_header: bool,
    pub spreading_factor: SpreadingFactor,
    pub payload_crc: bool,
    pub low_data_rate_optimize: bool,
    pub agc_auto: bool,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            bandwidth: Bandwidth::Khz125,
            coding_rate: CodingRate::Cr4_8,
            implicit_header: false,
            spreading_factor: SpreadingFactor::Sf12,
            payload_crc: true,
            low_data_rate_optimize: true,
            agc_auto: true,
        }
    }
}

impl ModemConfig {
    pub(crate) fn registers(&self) -> (ModemConfig1, ModemConfig2, ModemConfig3) {
        (
            ModemConfig1 {
                bandwidth: self.bandwidth,
                coding_rate: self.coding_rate,
                implicit_header: self.implicit_header,
            },
            ModemConfig2 {
                spreading_factor: self.spreading_factor,
                payload_crc: self.payload_crc,
            },
            ModemConfig3 {
                low_data_rate_optimize: self.low_data_rate_optimize,
                agc_auto: self.agc_auto,
            },
        )
    }
}

/// Transmit power settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerConfig {
    pub pa: PaConfig,
    pub dac: PaDac,
    pub ocp: Ocp,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            pa: PaConfig {
                pa_boost: true,
                max_power: 7,
                output_power: 15,
            },
            dac: PaDac::HighPower,
            ocp: Ocp {
                enabled: true,
                trim: 0x17,
            },
        }
    }
}

/// Configuration applied by [`crate::Rfm95::new`].
///
/// Immutable once the driver is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioConfig {
    /// Carrier frequency in Hz
    pub frequency_hz: u32,
    pub modem: ModemConfig,
    pub power: PowerConfig,
    pub lna: Lna,
    /// Preamble length in symbols
    pub preamble_length: u16,
    pub sync_word: u8,
    /// Time allowed for TxDone before the transmission is aborted
    pub tx_timeout_ms: u32,
    /// Pause between completion checks while waiting for TxDone
    pub poll_interval_us: u32,
    /// Read the IRQ flags register on every check, not only after a DIO0
    /// edge. Required when DIO0 is not wired to an interrupt-capable pin.
    pub poll_fallback: bool,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 915_000_000,
            modem: ModemConfig::default(),
            power: PowerConfig::default(),
            lna: Lna {
                gain: 1,
                boost_hf: true,
            },
            preamble_length: 12,
            sync_word: 0x12,
            tx_timeout_ms: 5_000,
            poll_interval_us: 1_000,
            poll_fallback: true,
        }
    }
}
