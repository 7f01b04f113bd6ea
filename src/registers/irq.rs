//! Interrupt registers
//!
//! Every IRQ source latches a bit in [`IrqFlags`]. Bits stay set until the
//! host writes a `1` to them; writing `0` has no effect. Writing back the
//! exact value that was read therefore acknowledges precisely the events that
//! were observed, without losing any that latched after the read.

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

bitflags! {
    /// LoRa IRQ sources
    ///
    /// Shared bit layout of the mask and flags registers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Irq: u8 {
        /// Receive timeout (single receive mode only)
        const RX_TIMEOUT = 1 << 7;
        /// Packet reception complete
        const RX_DONE = 1 << 6;
        /// Payload CRC check failed
        const PAYLOAD_CRC_ERROR = 1 << 5;
        /// Valid header received in receive mode
        const VALID_HEADER = 1 << 4;
        /// FIFO payload transmission complete
        const TX_DONE = 1 << 3;
        /// Channel activity detection finished
        const CAD_DONE = 1 << 2;
        /// FHSS change channel
        const FHSS_CHANGE_CHANNEL = 1 << 1;
        /// Valid LoRa signal detected during CAD
        const CAD_DETECTED = 1;
    }
}

/// IRQ mask register (address: 0x11)
///
/// A set bit disables the corresponding IRQ source.
#[register(0x11u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
pub struct IrqFlagsMask {
    pub masked: Irq,
}

impl IrqFlagsMask {
    /// All sources enabled.
    pub const NONE: Self = Self {
        masked: Irq::empty(),
    };
}

/// IRQ flags register (address: 0x12)
///
/// Write-1-to-clear. See the module documentation.
#[register(0x12u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct IrqFlags {
    pub flags: Irq,
}

impl IrqFlags {
    /// Clears every latched flag when written.
    pub const CLEAR_ALL: Self = Self { flags: Irq::all() };
}

/// Event routed to DIO0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dio0Mapping {
    RxDone = 0b00,
    TxDone = 0b01,
    CadDone = 0b10,
}

/// DIO mapping register 1 (address: 0x40)
///
/// Only DIO0 is used by this driver; DIO1-3 are left on their first
/// function.
#[register(0x40u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
pub struct DioMapping1 {
    pub dio0: Dio0Mapping,
}

impl ToByteArray for IrqFlagsMask {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.masked.bits()])
    }
}

impl FromByteArray for IrqFlags {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: Irq::from_bits_retain(bytes[0]),
        })
    }
}

impl ToByteArray for IrqFlags {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.flags.bits()])
    }
}

impl ToByteArray for DioMapping1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(self.dio0 as u8) << 6])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dio0_mapping_occupies_top_bits() {
        let tx = DioMapping1 {
            dio0: Dio0Mapping::TxDone,
        };
        let rx = DioMapping1 {
            dio0: Dio0Mapping::RxDone,
        };
        assert_eq!(tx.to_bytes().unwrap(), [0x40]);
        assert_eq!(rx.to_bytes().unwrap(), [0x00]);
    }

    #[test]
    fn flags_round_trip_unknown_bits() {
        let flags = IrqFlags::from_bytes([0xFF]).unwrap();
        assert_eq!(flags, IrqFlags::CLEAR_ALL);
        assert_eq!(flags.to_bytes().unwrap(), [0xFF]);
    }
}
