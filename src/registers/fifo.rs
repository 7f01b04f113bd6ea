//! FIFO management registers
//!
//! The 256-byte FIFO is shared by transmit and receive. All SPI access to it
//! goes through the data register at address 0x00 and lands at
//! [`FifoAddrPtr`], which auto-increments per byte.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// FIFO data register address (burst access only).
pub const FIFO: u8 = 0x00;

/// FIFO SPI pointer (address: 0x0D)
#[register(0x0Du8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct FifoAddrPtr {
    pub address: u8,
}

/// Transmit base address in the FIFO (address: 0x0E)
#[register(0x0Eu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
pub struct FifoTxBaseAddr {
    pub address: u8,
}

/// Receive base address in the FIFO (address: 0x0F)
#[register(0x0Fu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
pub struct FifoRxBaseAddr {
    pub address: u8,
}

/// Start address of the last packet received (address: 0x10)
///
/// Only meaningful after RxDone.
#[register(0x10u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct FifoRxCurrentAddr {
    pub address: u8,
}

/// Payload length of the last packet received (address: 0x13)
#[register(0x13u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct RxNbBytes {
    pub count: u8,
}

/// Payload length (address: 0x22)
///
/// Number of FIFO bytes sent on the next transmission. Must be non-zero.
#[register(0x22u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
pub struct PayloadLength {
    pub length: u8,
}

macro_rules! single_byte {
    ($ty:ident, $field:ident, read) => {
        impl FromByteArray for $ty {
            type Error = Infallible;
            type Array = [u8; 1];

            fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
                Ok(Self { $field: bytes[0] })
            }
        }
    };
    ($ty:ident, $field:ident, write) => {
        impl ToByteArray for $ty {
            type Error = Infallible;
            type Array = [u8; 1];

            fn to_bytes(self) -> Result<Self::Array, Self::Error> {
                Ok([self.$field])
            }
        }
    };
}

single_byte!(FifoAddrPtr, address, read);
single_byte!(FifoAddrPtr, address, write);
single_byte!(FifoTxBaseAddr, address, write);
single_byte!(FifoRxBaseAddr, address, write);
single_byte!(FifoRxCurrentAddr, address, read);
single_byte!(RxNbBytes, count, read);
single_byte!(PayloadLength, length, write);
