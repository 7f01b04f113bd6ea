//! Carrier frequency synthesis
//!
//! The synthesizer step is `FXOSC / 2^19` (about 61 Hz with the 32 MHz
//! crystal). The 24-bit tuning word is `floor(f * 2^19 / FXOSC)`; the product
//! overflows 32 bits for any sub-GHz carrier, so it is computed in 64 bits.

/// Crystal oscillator frequency of the RFM95 module.
pub const FXOSC_HZ: u64 = 32_000_000;

const FRF_SHIFT: u32 = 19;

/// 24-bit synthesizer tuning word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TuningWord(u32);

impl TuningWord {
    /// Largest representable word.
    pub const MAX: u32 = 0x00FF_FFFF;

    /// Raw 24-bit value.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// MSB, MID, LSB, in the order they are written to the chip.
    pub const fn to_bytes(self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }

    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self(((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32)
    }

    /// Carrier frequency this word tunes to, rounded down to the Hz.
    pub const fn frequency_hz(self) -> u32 {
        ((self.0 as u64 * FXOSC_HZ) >> FRF_SHIFT) as u32
    }
}

/// Computes the tuning word for a carrier of `frequency_hz`.
///
/// Frequencies above the 24-bit range (about 1.024 GHz, well outside the
/// chip's bands) saturate to [`TuningWord::MAX`].
pub const fn tuning_word_for(frequency_hz: u32) -> TuningWord {
    let word = ((frequency_hz as u64) << FRF_SHIFT) / FXOSC_HZ;
    if word > TuningWord::MAX as u64 {
        TuningWord(TuningWord::MAX)
    } else {
        TuningWord(word as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn us_915_band() {
        let word = tuning_word_for(915_000_000);
        assert_eq!(word.value(), 14_991_360);
        assert_eq!(word.value(), 0xE4C000);
        assert_eq!(word.to_bytes(), [0xE4, 0xC0, 0x00]);
    }

    #[test]
    fn eu_868_band() {
        let word = tuning_word_for(868_100_000);
        assert_eq!(word.to_bytes(), [0xD9, 0x06, 0x66]);
    }

    #[test]
    fn word_rounds_down() {
        // 61 Hz is just under one synthesizer step
        assert_eq!(tuning_word_for(61).value(), 0);
        assert_eq!(tuning_word_for(62).value(), 1);
    }

    #[test]
    fn frequency_read_back_is_within_one_step() {
        for hz in [433_175_000u32, 868_100_000, 915_000_000, 923_300_000] {
            let back = tuning_word_for(hz).frequency_hz();
            assert!(back <= hz && hz - back < 62, "{hz} -> {back}");
        }
    }

    #[test]
    fn bytes_round_trip() {
        let word = tuning_word_for(923_300_000);
        assert_eq!(TuningWord::from_bytes(word.to_bytes()), word);
    }
}
