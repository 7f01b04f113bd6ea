//! RFM95 packet engine
//!
//! [`Rfm95`] owns the register interface and the single [`RadioContext`] for
//! one physical radio. It can only be obtained from [`Rfm95::new`], which
//! runs the full initialization sequence and verifies the silicon version; a
//! failed initialization leaves no driver to misuse.
//!
//! # Transmit
//! [`Rfm95::send`] loads the FIFO, enters transmit mode and polls for TxDone
//! against [`RadioConfig::tx_timeout_ms`]. The deadline is the only way a
//! transmission is cancelled: on expiry the radio is forced to standby, which
//! aborts it.
//!
//! # Receive
//! [`Rfm95::start_receive`] enters continuous receive once.
//! [`Rfm95::try_receive`] is then polled without ever blocking; the radio
//! stays in receive between packets.
//!
//! # Example
//! ```no_run
//! # fn example<T, D, C>(transport: T, delay: D, clock: C) -> Result<(), rfm95::Error>
//! # where T: rfm95::RegisterTransport, D: embedded_hal::delay::DelayNs, C: rfm95::Clock {
//! use rfm95::{InterruptFlag, RadioConfig, Rfm95, Unwired};
//!
//! static DIO0: InterruptFlag = InterruptFlag::new();
//!
//! let config = RadioConfig::default();
//! let mut radio = Rfm95::new(transport, &mut Unwired, &DIO0, delay, clock, config)?;
//! radio.send(&[0xF4, 0x01])?;
//!
//! radio.start_receive()?;
//! let mut buffer = [0u8; 64];
//! if let Some(packet) = radio.try_receive(&mut buffer)? {
//!     let rssi = radio.rssi()?;
//! }
//! # Ok(())
//! # }
//! ```

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::clock::{elapsed_ms, Clock};
use crate::config::RadioConfig;
use crate::device::Device;
use crate::frequency::tuning_word_for;
use crate::irq::{CompletionDetector, InterruptFlag};
use crate::mode::OperatingMode;
use crate::registers::{
    Dio0Mapping, DioMapping1, FifoAddrPtr, FifoRxBaseAddr, FifoRxCurrentAddr, FifoTxBaseAddr, Frf,
    IrqFlags, IrqFlagsMask, OpMode, PayloadLength, PktRssiValue, PreambleLength, RxNbBytes,
    SyncWord, Version, EXPECTED_VERSION,
};
use crate::transport::RegisterTransport;
use crate::Error;

/// Largest payload the FIFO can carry in one packet.
pub const MAX_PAYLOAD: usize = 255;

/// Reset low time, and settle time after release.
const RESET_PULSE_MS: u32 = 10;

/// Stand-in for a reset line that is not connected.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unwired;

impl ErrorType for Unwired {
    type Error = Infallible;
}

impl OutputPin for Unwired {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Outcome of a successful receive poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Received {
    /// Bytes written to the caller's buffer
    pub len: usize,
    /// Payload length reported by the radio
    pub declared: usize,
}

impl Received {
    /// The packet did not fit the buffer; only the first `len` bytes were
    /// read and the rest is lost.
    pub fn is_truncated(&self) -> bool {
        self.declared > self.len
    }
}

/// Mutable state of one radio.
#[derive(Debug)]
pub struct RadioContext<'a> {
    mode: OperatingMode,
    detector: CompletionDetector<'a>,
}

impl<'a> RadioContext<'a> {
    fn new(interrupt: &'a InterruptFlag, poll_fallback: bool) -> Self {
        Self {
            mode: OperatingMode::Sleep,
            detector: CompletionDetector::new(interrupt, poll_fallback),
        }
    }

    /// Last mode requested. The chip itself is authoritative.
    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    pub fn transmit_complete(&self) -> bool {
        self.detector.transmit_complete()
    }

    pub fn receive_complete(&self) -> bool {
        self.detector.receive_complete()
    }
}

/// RFM95 driver.
///
/// Generic over the register transport, a delay provider used for the reset
/// pulse and poll pacing, and a millisecond clock used for the transmit
/// deadline.
pub struct Rfm95<'a, T, D, C> {
    device: Device<T>,
    context: RadioContext<'a>,
    config: RadioConfig,
    delay: D,
    clock: C,
}

impl<'a, T, D, C> Rfm95<'a, T, D, C>
where
    T: RegisterTransport,
    D: DelayNs,
    C: Clock,
{
    /// Resets and configures the radio, then checks its version.
    ///
    /// On success the radio is in standby with every IRQ source enabled and
    /// no flag latched.
    ///
    /// # Arguments
    ///
    /// * `transport` - register transport to the chip
    /// * `reset` - reset line, or [`Unwired`]
    /// * `interrupt` - flag set by the DIO0 interrupt handler
    /// * `delay` - delay provider
    /// * `clock` - millisecond clock for the transmit deadline
    /// * `config` - radio parameters
    ///
    /// # Errors
    ///
    /// * [`Error::Pin`] - the reset line could not be driven
    /// * [`Error::Bus`] - a register transaction failed
    /// * [`Error::UnexpectedVersion`] - the chip did not identify as an SX1276
    pub fn new<RST>(
        transport: T,
        reset: &mut RST,
        interrupt: &'a InterruptFlag,
        delay: D,
        clock: C,
        config: RadioConfig,
    ) -> Result<Self, Error>
    where
        RST: OutputPin,
    {
        let mut radio = Self {
            device: Device::new(transport),
            context: RadioContext::new(interrupt, config.poll_fallback),
            config,
            delay,
            clock,
        };
        radio.reset(reset)?;
        radio.configure()?;
        Ok(radio)
    }

    fn reset<RST: OutputPin>(&mut self, reset: &mut RST) -> Result<(), Error> {
        reset.set_low().map_err(|_| Error::Pin)?;
        self.delay.delay_ms(RESET_PULSE_MS);
        reset.set_high().map_err(|_| Error::Pin)?;
        self.delay.delay_ms(RESET_PULSE_MS);
        Ok(())
    }

    fn configure(&mut self) -> Result<(), Error> {
        // LoRa framing can only be selected from sleep.
        self.set_mode(OperatingMode::Sleep)?;
        self.set_mode(OperatingMode::Standby)?;
        self.device.write_register(IrqFlags::CLEAR_ALL)?;

        let word = tuning_word_for(self.config.frequency_hz);
        debug!("carrier {} Hz, tuning word {}", self.config.frequency_hz, word.value());
        self.device.write_register(Frf { word })?;

        let (config1, config2, config3) = self.config.modem.registers();
        self.device.write_register(config1)?;
        self.device.write_register(config2)?;
        self.device.write_register(config3)?;
        self.device.write_register(PreambleLength {
            symbols: self.config.preamble_length,
        })?;
        self.device.write_register(SyncWord {
            value: self.config.sync_word,
        })?;
        self.device.write_register(self.config.lna)?;
        self.device.write_register(self.config.power.pa)?;
        self.device.write_register(self.config.power.dac)?;
        self.device.write_register(self.config.power.ocp)?;

        self.device.write_register(FifoTxBaseAddr { address: 0 })?;
        self.device.write_register(FifoRxBaseAddr { address: 0 })?;
        self.device.write_register(IrqFlagsMask::NONE)?;
        self.device.write_register(IrqFlags::CLEAR_ALL)?;

        let Version { revision } = self.device.read_register()?;
        debug!("RFM95 version: {}", revision);
        if revision != EXPECTED_VERSION {
            error!("unexpected chip version {}", revision);
            return Err(Error::UnexpectedVersion(revision));
        }

        Ok(())
    }

    /// Requests an operating mode. The long range bit is always set.
    pub fn set_mode(&mut self, mode: OperatingMode) -> Result<(), Error> {
        self.device.write_register(OpMode { mode })?;
        self.context.mode = mode;
        Ok(())
    }

    /// Reads the operating mode back from the chip.
    pub fn read_mode(&mut self) -> Result<OperatingMode, Error> {
        let OpMode { mode } = self.device.read_register()?;
        Ok(mode)
    }

    /// Transmits `payload` and waits for TxDone.
    ///
    /// Returns to standby on completion and on timeout.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidLength`] - empty or longer than [`MAX_PAYLOAD`];
    ///   nothing is sent to the chip
    /// * [`Error::TransmitTimeout`] - TxDone not seen within
    ///   [`RadioConfig::tx_timeout_ms`]
    /// * [`Error::Bus`] - a register transaction failed
    pub fn send(&mut self, payload: &[u8]) -> Result<(), Error> {
        if payload.is_empty() || payload.len() > MAX_PAYLOAD {
            warn!("invalid payload length {}", payload.len());
            return Err(Error::InvalidLength(payload.len()));
        }

        self.set_mode(OperatingMode::Standby)?;
        self.device.write_register(FifoAddrPtr { address: 0 })?;
        self.device.write_fifo(payload)?;
        self.device.write_register(PayloadLength {
            length: payload.len() as u8,
        })?;

        self.device.write_register(IrqFlags::CLEAR_ALL)?;
        self.device.write_register(DioMapping1 {
            dio0: Dio0Mapping::TxDone,
        })?;

        debug!("sending {} bytes", payload.len());
        self.context.detector.take_transmit_complete();
        self.set_mode(OperatingMode::Transmit)?;

        match self.wait_transmit_done() {
            Ok(()) => {
                self.set_mode(OperatingMode::Standby)?;
                debug!("packet sent");
                Ok(())
            }
            Err(err) => {
                // Standby aborts whatever the modem is still doing.
                self.set_mode(OperatingMode::Standby)?;
                Err(err)
            }
        }
    }

    fn wait_transmit_done(&mut self) -> Result<(), Error> {
        let started = self.clock.now_ms();
        loop {
            self.context.detector.service(&mut self.device)?;
            if self.context.detector.take_transmit_complete() {
                return Ok(());
            }
            if elapsed_ms(&mut self.clock, started) >= self.config.tx_timeout_ms {
                warn!("TxDone not seen after {} ms", self.config.tx_timeout_ms);
                return Err(Error::TransmitTimeout);
            }
            self.delay.delay_us(self.config.poll_interval_us);
        }
    }

    /// Enters continuous receive with DIO0 mapped to RxDone.
    ///
    /// The radio stays in receive until another mode is requested; packets
    /// are collected with [`try_receive`](Self::try_receive).
    pub fn start_receive(&mut self) -> Result<(), Error> {
        self.device.write_register(IrqFlags::CLEAR_ALL)?;
        self.device.write_register(DioMapping1 {
            dio0: Dio0Mapping::RxDone,
        })?;
        self.device.write_register(FifoAddrPtr { address: 0 })?;
        self.context.detector.reset();
        self.set_mode(OperatingMode::ReceiveContinuous)
    }

    /// Collects a received packet into `buffer`, if one is ready.
    ///
    /// Never blocks. Returns `Ok(None)` when nothing has arrived, or when the
    /// only event was a CRC failure (the packet is dropped). A packet longer
    /// than `buffer` is truncated: the excess stays in the FIFO and is lost.
    pub fn try_receive(&mut self, buffer: &mut [u8]) -> Result<Option<Received>, Error> {
        self.context.detector.service(&mut self.device)?;
        if !self.context.detector.take_receive_complete() {
            return Ok(None);
        }

        let RxNbBytes { count } = self.device.read_register()?;
        let declared = usize::from(count);
        let len = declared.min(buffer.len());
        if len < declared {
            warn!("packet of {} bytes truncated to {}", declared, len);
        }

        let FifoRxCurrentAddr { address } = self.device.read_register()?;
        self.device.write_register(FifoAddrPtr { address })?;
        self.device.read_fifo(&mut buffer[..len])?;

        Ok(Some(Received { len, declared }))
    }

    /// RSSI of the last received packet, in dBm.
    pub fn rssi(&mut self) -> Result<i16, Error> {
        let rssi: PktRssiValue = self.device.read_register()?;
        Ok(rssi.dbm())
    }

    /// Reads the silicon version register.
    pub fn version(&mut self) -> Result<u8, Error> {
        let Version { revision } = self.device.read_register()?;
        Ok(revision)
    }

    pub fn context(&self) -> &RadioContext<'a> {
        &self.context
    }

    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    /// Register-level access for diagnostics.
    pub fn device(&mut self) -> &mut Device<T> {
        &mut self.device
    }

    /// Releases the transport, delay provider and clock.
    pub fn release(self) -> (T, D, C) {
        (self.device.release(), self.delay, self.clock)
    }
}
