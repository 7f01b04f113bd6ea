//! RFM95 Device Interface
//!
//! This module provides typed access to the SX1276 register file on top of a
//! [`RegisterTransport`]. It supports:
//! - Reading and writing registers described in [`crate::registers`]
//! - Streaming bytes into and out of the FIFO
//! - Raw register access for diagnostics
//!
//! Registers wider than one byte are transferred as a single burst starting at
//! their first address, most significant byte first.
//!
//! # Example
//! ```no_run
//! # fn example<T: rfm95::RegisterTransport>(transport: T) -> Result<(), rfm95::Error> {
//! use rfm95::{Device, registers::Version};
//!
//! let mut device = Device::new(transport);
//! let version: Version = device.read_register()?;
//! device.write_fifo(&[0x01, 0x02, 0x03])?;
//! # Ok(())
//! # }
//! ```

use core::convert::Infallible;

use regiface::{ByteArray, ReadableRegister, WritableRegister};

use crate::registers::FIFO;
use crate::transport::RegisterTransport;
use crate::Error;

/// Typed register interface over a [`RegisterTransport`].
pub struct Device<T> {
    transport: T,
}

impl<T> Device<T> {
    /// Creates a new Device wrapping the provided transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Releases the underlying transport.
    pub fn release(self) -> T {
        self.transport
    }
}

impl<T> Device<T>
where
    T: RegisterTransport,
{
    /// Reads a register value from the device.
    ///
    /// # Errors
    /// * [`Error::Bus`] - the transaction failed
    /// * [`Error::Deserialization`] - the value read is not a valid `R`
    pub fn read_register<R>(&mut self) -> Result<R, Error>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw_value = R::Array::new();
        let bytes = raw_value.as_mut();

        if let [single] = bytes {
            *single = self
                .transport
                .read_register(R::id())
                .map_err(|_| Error::Bus)?;
        } else {
            self.transport
                .read_burst(R::id(), bytes)
                .map_err(|_| Error::Bus)?;
        }

        R::from_bytes(raw_value).map_err(|_| Error::Deserialization)
    }

    /// Writes a value to a device register.
    ///
    /// # Errors
    /// * [`Error::Bus`] - the transaction failed
    pub fn write_register<R>(&mut self, register: R) -> Result<(), Error>
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        let raw_value = match register.to_bytes() {
            Ok(raw) => raw,
            Err(never) => match never {},
        };

        let result = match raw_value.as_ref() {
            [single] => self.transport.write_register(R::id(), *single),
            bytes => self.transport.write_burst(R::id(), bytes),
        };
        result.map_err(|_| Error::Bus)
    }

    /// Streams `bytes` into the FIFO at the current FIFO pointer.
    pub fn write_fifo(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.transport
            .write_burst(FIFO, bytes)
            .map_err(|_| Error::Bus)
    }

    /// Fills `bytes` from the FIFO at the current FIFO pointer.
    pub fn read_fifo(&mut self, bytes: &mut [u8]) -> Result<(), Error> {
        self.transport
            .read_burst(FIFO, bytes)
            .map_err(|_| Error::Bus)
    }

    /// Reads the register at `address` without interpretation.
    pub fn read_raw(&mut self, address: u8) -> Result<u8, Error> {
        self.transport
            .read_register(address)
            .map_err(|_| Error::Bus)
    }

    /// Writes `value` to the register at `address` without interpretation.
    pub fn write_raw(&mut self, address: u8, value: u8) -> Result<(), Error> {
        self.transport
            .write_register(address, value)
            .map_err(|_| Error::Bus)
    }
}
