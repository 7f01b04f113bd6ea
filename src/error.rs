//! Error types
//!
//! Every recoverable condition is reported to the immediate caller as a
//! `Result`. Bus failures are collapsed into [`Error::Bus`]; the underlying
//! transport error is not carried, matching how register access errors are
//! reported throughout the driver.

/// Errors raised by the radio driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A register transaction could not be completed.
    Bus,
    /// Driving the reset line failed.
    Pin,
    /// A register value read back from the chip could not be decoded.
    Deserialization,
    /// The version register did not hold the expected silicon revision.
    UnexpectedVersion(u8),
    /// Payload length outside `1..=255`. Rejected before any bus traffic.
    InvalidLength(usize),
    /// TxDone was not observed within the configured budget. The radio has
    /// been forced back to standby.
    TransmitTimeout,
}

/// Failure reported by an illuminance source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError<E> {
    /// The sensor bus transaction failed.
    Bus(E),
    /// The sensor returned an all-zero or all-one raw value.
    Sentinel(u16),
}

/// Failure of a sensor-to-radio transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeError<E> {
    /// The sensor read failed; nothing was transmitted.
    Sensor(SensorError<E>),
    /// The radio rejected or failed the transmission.
    Radio(Error),
}

impl<E> From<Error> for NodeError<E> {
    fn from(err: Error) -> Self {
        NodeError::Radio(err)
    }
}

impl<E> From<SensorError<E>> for NodeError<E> {
    fn from(err: SensorError<E>) -> Self {
        NodeError::Sensor(err)
    }
}
