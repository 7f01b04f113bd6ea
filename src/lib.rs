#![cfg_attr(not(test), no_std)]
//! RFM95 LoRa Radio Driver
//!
//! This crate provides a type-safe interface for the HopeRF RFM95 module, built
//! around the Semtech SX1276 long range transceiver, operated in LoRa mode.
//!
//! # Features
//! - Register access over hardware SPI or bit-banged GPIO
//! - Carrier frequency programming: 137-1020 MHz
//! - LoRa modem: SF6-12, BW 7.8-500 kHz, CR 4/5-4/8
//! - Output power up to +20 dBm on PA_BOOST
//! - Blocking transmit with a bounded TxDone wait
//! - Non-blocking continuous receive with truncation reporting
//! - DIO0 interrupt hand-off, with register polling as a fallback
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`transport`]: Byte-level register transactions
//!   - [`transport::SpiTransport`]: hardware SPI peripheral
//!   - [`transport::BitBangTransport`]: software-toggled lines
//!
//! - [`device`]: Typed register access on top of a transport
//!
//! - [`registers`]: Register definitions for direct hardware access
//!
//! - [`radio`]: The packet engine
//!   - [`Rfm95`]: initialization, mode control, transmit, receive, RSSI
//!   - [`irq`]: completion detection from DIO0 edges and IRQ flags
//!
//! - Application collaborators
//!   - [`telemetry`]: illuminance wire format, sensor node and base station
//!   - [`bh1750`]: BH1750 light sensor
//!   - [`console`]: serial command shell
//!
//! # Usage
//! Bring-up follows a fixed sequence, performed by [`Rfm95::new`]:
//!
//! 1. Pulse the reset line
//! 2. Enter sleep, then standby (LoRa framing is only selectable in sleep)
//! 3. Program the carrier frequency
//! 4. Program the modem, preamble, sync word, LNA and power amplifier
//! 5. Set the FIFO base addresses and enable every IRQ source
//! 6. Verify the silicon version
//!
//! # Important Notes
//! - Frequency and modem registers are only writable in sleep or standby
//! - The IRQ flags register is write-1-to-clear
//! - The driver assumes a single caller; the bus is not locked
//!
//! # Example
//! ```no_run
//! use embedded_hal::{delay::DelayNs, spi::SpiDevice};
//! use rfm95::{Clock, Error, InterruptFlag, RadioConfig, Rfm95, SpiTransport, Unwired};
//!
//! static DIO0: InterruptFlag = InterruptFlag::new();
//!
//! fn transmit<SPI, D, C>(spi: SPI, delay: D, clock: C) -> Result<(), Error>
//! where
//!     SPI: SpiDevice,
//!     D: DelayNs,
//!     C: Clock,
//! {
//!     let mut radio = Rfm95::new(
//!         SpiTransport::new(spi),
//!         &mut Unwired,
//!         &DIO0,
//!         delay,
//!         clock,
//!         RadioConfig::default(),
//!     )?;
//!
//!     radio.send(b"hello")
//! }
//! ```

#[macro_use]
mod fmt;

pub mod bh1750;
pub mod clock;
pub mod config;
pub mod console;
pub mod device;
pub mod error;
pub mod frequency;
pub mod irq;
pub mod mode;
pub mod radio;
pub mod registers;
pub mod telemetry;
pub mod transport;

pub use clock::Clock;
pub use config::{Bandwidth, CodingRate, ModemConfig, PowerConfig, RadioConfig, SpreadingFactor};
pub use device::Device;
pub use error::{Error, NodeError, SensorError};
pub use frequency::{tuning_word_for, TuningWord};
pub use irq::{CompletionDetector, InterruptFlag, IrqEvent};
pub use mode::OperatingMode;
pub use radio::{RadioContext, Received, Rfm95, Unwired, MAX_PAYLOAD};
pub use telemetry::{
    BaseStation, Illuminance, IlluminanceSource, SensorNode, StationEvent, StatusDisplay,
};
pub use transport::{BitBangTransport, RegisterTransport, SpiTransport};
