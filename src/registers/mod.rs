//! Register definitions for the SX1276 in LoRa mode
//! Generated from the SX1276/77/78/79 datasheet, rev. 7
//!
//! Addresses are single bytes. Registers wider than one byte occupy
//! consecutive addresses and are transferred in a single burst, most
//! significant byte first.

mod common;
mod fifo;
mod irq;
mod modem;
mod rf;

pub use common::*;
pub use fifo::*;
pub use irq::*;
pub use modem::*;
pub use rf::*;
