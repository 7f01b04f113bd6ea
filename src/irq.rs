//! Completion detection
//!
//! DIO0 raises an edge when the event it is mapped to fires. The interrupt
//! handler only records that an edge happened, through an [`InterruptFlag`];
//! everything else runs in the foreground from [`CompletionDetector::service`]:
//!
//! 1. If an edge is pending, clear it, read `RegIrqFlags` and write the same
//!    value back to acknowledge exactly the events that were observed.
//! 2. RxDone without a CRC error latches `receive_complete`.
//! 3. Otherwise TxDone latches `transmit_complete`.
//! 4. Otherwise a lone CRC error drops the packet.
//!
//! When no edge was seen and polling fallback is enabled, the same register
//! is read and interpreted identically, so a board without DIO0 wired behaves
//! exactly like one with it.
//!
//! # Example
//! ```no_run
//! use rfm95::InterruptFlag;
//!
//! static DIO0: InterruptFlag = InterruptFlag::new();
//!
//! // In the GPIO interrupt handler for the DIO0 rising edge:
//! fn on_dio0_edge() {
//!     DIO0.signal();
//! }
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use crate::device::Device;
use crate::registers::{Irq, IrqFlags};
use crate::transport::RegisterTransport;
use crate::Error;

/// One-slot hand-off from the DIO0 interrupt handler to the foreground.
///
/// The handler only ever calls [`signal`](Self::signal); the foreground only
/// ever calls [`take`](Self::take).
#[derive(Debug)]
pub struct InterruptFlag {
    pending: AtomicBool,
}

impl InterruptFlag {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Records a DIO0 edge. Safe to call from interrupt context.
    pub fn signal(&self) {
        self.pending.store(true, Ordering::Release);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Clears the flag, returning whether an edge was pending.
    pub fn take(&self) -> bool {
        critical_section::with(|_| {
            let pending = self.pending.load(Ordering::Acquire);
            self.pending.store(false, Ordering::Relaxed);
            pending
        })
    }
}

impl Default for InterruptFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// What a single service pass observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqEvent {
    ReceiveComplete,
    TransmitComplete,
    /// Payload CRC mismatch. The packet is discarded.
    CrcError,
    /// Flags that complete neither transmit nor receive (raw bits).
    Other(u8),
}

/// Reconciles DIO0 edges and register polling into two sticky flags.
#[derive(Debug)]
pub struct CompletionDetector<'a> {
    interrupt: &'a InterruptFlag,
    poll_fallback: bool,
    transmit_complete: bool,
    receive_complete: bool,
}

impl<'a> CompletionDetector<'a> {
    pub fn new(interrupt: &'a InterruptFlag, poll_fallback: bool) -> Self {
        Self {
            interrupt,
            poll_fallback,
            transmit_complete: false,
            receive_complete: false,
        }
    }

    pub fn transmit_complete(&self) -> bool {
        self.transmit_complete
    }

    pub fn receive_complete(&self) -> bool {
        self.receive_complete
    }

    /// Returns and clears `transmit_complete`.
    pub fn take_transmit_complete(&mut self) -> bool {
        core::mem::take(&mut self.transmit_complete)
    }

    /// Returns and clears `receive_complete`.
    pub fn take_receive_complete(&mut self) -> bool {
        core::mem::take(&mut self.receive_complete)
    }

    /// Clears both sticky flags.
    pub fn reset(&mut self) {
        self.transmit_complete = false;
        self.receive_complete = false;
    }

    /// Runs one detection pass.
    ///
    /// Returns the event latched by this pass, if any.
    pub fn service<T>(&mut self, device: &mut Device<T>) -> Result<Option<IrqEvent>, Error>
    where
        T: RegisterTransport,
    {
        if self.interrupt.take() {
            if let Some(event) = self.latch(device)? {
                return Ok(Some(event));
            }
        }

        if self.poll_fallback {
            return self.latch(device);
        }

        Ok(None)
    }

    fn latch<T>(&mut self, device: &mut Device<T>) -> Result<Option<IrqEvent>, Error>
    where
        T: RegisterTransport,
    {
        let IrqFlags { flags } = device.read_register()?;
        if flags.is_empty() {
            return Ok(None);
        }

        // Acknowledge before acting, otherwise the same event is seen again.
        device.write_register(IrqFlags { flags })?;

        Ok(Some(self.evaluate(flags)))
    }

    fn evaluate(&mut self, flags: Irq) -> IrqEvent {
        let crc_error = flags.contains(Irq::PAYLOAD_CRC_ERROR);

        if flags.contains(Irq::RX_DONE) && !crc_error {
            self.receive_complete = true;
            IrqEvent::ReceiveComplete
        } else if flags.contains(Irq::TX_DONE) {
            self.transmit_complete = true;
            IrqEvent::TransmitComplete
        } else if crc_error {
            warn!("payload CRC error, packet dropped");
            IrqEvent::CrcError
        } else {
            trace!("unhandled irq flags {}", flags.bits());
            IrqEvent::Other(flags.bits())
        }
    }
}
