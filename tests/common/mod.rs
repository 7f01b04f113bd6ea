//! Simulated SX1276 for driving the packet engine without hardware.

#![allow(dead_code)]

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use rfm95::{Clock, InterruptFlag, RegisterTransport};

pub const REG_FIFO: u8 = 0x00;
pub const REG_OP_MODE: u8 = 0x01;
pub const REG_FIFO_ADDR_PTR: u8 = 0x0D;
pub const REG_FIFO_RX_CURRENT_ADDR: u8 = 0x10;
pub const REG_IRQ_FLAGS: u8 = 0x12;
pub const REG_RX_NB_BYTES: u8 = 0x13;
pub const REG_PKT_RSSI_VALUE: u8 = 0x1A;
pub const REG_PAYLOAD_LENGTH: u8 = 0x22;
pub const REG_DIO_MAPPING_1: u8 = 0x40;
pub const REG_VERSION: u8 = 0x42;

pub const IRQ_RX_DONE: u8 = 0x40;
pub const IRQ_PAYLOAD_CRC_ERROR: u8 = 0x20;
pub const IRQ_TX_DONE: u8 = 0x08;

const MODE_MASK: u8 = 0x07;
const MODE_STANDBY: u8 = 0x01;
const MODE_TRANSMIT: u8 = 0x03;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Read { address: u8, len: usize },
    Write { address: u8, bytes: Vec<u8> },
}

struct Chip {
    registers: [u8; 128],
    fifo: [u8; 256],
    log: Vec<Access>,
    fifo_bytes_read: usize,
    /// Transactions left before TxDone latches; `None` never completes.
    tx_done_after: Option<usize>,
    tx_countdown: Option<usize>,
    dio0: Option<&'static InterruptFlag>,
}

/// Register-level model of an SX1276 in LoRa mode.
///
/// `RegIrqFlags` (0x12) is write-1-to-clear: writing a byte clears exactly the
/// bits set in it and leaves the others latched. Every other register stores
/// what is written. The FIFO data register (0x00) streams through a 256-byte
/// FIFO at `RegFifoAddrPtr`, which auto-increments and wraps; bursts to any
/// other address auto-increment the address.
///
/// Entering transmit mode arms a countdown of bus transactions after which
/// TxDone latches and the chip falls back to standby, like the real part.
///
/// The handle is cheap to clone; clones share one chip.
#[derive(Clone)]
pub struct SimulatedChip {
    chip: Rc<RefCell<Chip>>,
}

impl SimulatedChip {
    pub fn new() -> Self {
        let mut registers = [0u8; 128];
        registers[REG_VERSION as usize] = 0x12;
        registers[REG_OP_MODE as usize] = 0x09;
        Self {
            chip: Rc::new(RefCell::new(Chip {
                registers,
                fifo: [0; 256],
                log: Vec::new(),
                fifo_bytes_read: 0,
                tx_done_after: Some(3),
                tx_countdown: None,
                dio0: None,
            })),
        }
    }

    pub fn with_version(self, version: u8) -> Self {
        self.set_register(REG_VERSION, version);
        self
    }

    /// Transactions between entering transmit and TxDone, `None` for never.
    pub fn with_tx_done_after(self, transactions: Option<usize>) -> Self {
        self.chip.borrow_mut().tx_done_after = transactions;
        self
    }

    /// Signals `flag` whenever an IRQ latches, as a wired DIO0 would.
    pub fn with_dio0(self, flag: &'static InterruptFlag) -> Self {
        self.chip.borrow_mut().dio0 = Some(flag);
        self
    }

    pub fn register(&self, address: u8) -> u8 {
        self.chip.borrow().registers[address as usize]
    }

    pub fn set_register(&self, address: u8, value: u8) {
        self.chip.borrow_mut().registers[address as usize] = value;
    }

    pub fn mode_bits(&self) -> u8 {
        self.register(REG_OP_MODE) & MODE_MASK
    }

    pub fn fifo(&self, start: usize, len: usize) -> Vec<u8> {
        self.chip.borrow().fifo[start..start + len].to_vec()
    }

    pub fn transactions(&self) -> usize {
        self.chip.borrow().log.len()
    }

    pub fn log(&self) -> Vec<Access> {
        self.chip.borrow().log.clone()
    }

    pub fn fifo_bytes_read(&self) -> usize {
        self.chip.borrow().fifo_bytes_read
    }

    /// Places a received packet at FIFO address `at` and latches RxDone,
    /// plus the CRC error flag when `crc_ok` is false.
    pub fn deliver(&self, at: u8, payload: &[u8], crc_ok: bool) {
        self.deliver_without_edge(at, payload, crc_ok);
        if let Some(flag) = self.chip.borrow().dio0 {
            flag.signal();
        }
    }

    /// As [`deliver`](Self::deliver) but without pulsing DIO0.
    pub fn deliver_without_edge(&self, at: u8, payload: &[u8], crc_ok: bool) {
        let mut chip = self.chip.borrow_mut();
        for (offset, byte) in payload.iter().enumerate() {
            chip.fifo[(at as usize + offset) % 256] = *byte;
        }
        chip.registers[REG_FIFO_RX_CURRENT_ADDR as usize] = at;
        chip.registers[REG_RX_NB_BYTES as usize] = payload.len() as u8;
        let mut flags = IRQ_RX_DONE;
        if !crc_ok {
            flags |= IRQ_PAYLOAD_CRC_ERROR;
        }
        chip.registers[REG_IRQ_FLAGS as usize] |= flags;
    }
}

impl Default for SimulatedChip {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip {
    fn tick(&mut self) {
        let Some(remaining) = self.tx_countdown else {
            return;
        };
        if remaining > 0 {
            self.tx_countdown = Some(remaining - 1);
            return;
        }
        self.tx_countdown = None;
        self.registers[REG_IRQ_FLAGS as usize] |= IRQ_TX_DONE;
        let mode = &mut self.registers[REG_OP_MODE as usize];
        *mode = (*mode & !MODE_MASK) | MODE_STANDBY;
        if let Some(flag) = self.dio0 {
            flag.signal();
        }
    }

    fn store(&mut self, address: u8, value: u8) {
        match address {
            REG_FIFO => {
                let pointer = &mut self.registers[REG_FIFO_ADDR_PTR as usize];
                self.fifo[*pointer as usize] = value;
                *pointer = pointer.wrapping_add(1);
            }
            REG_IRQ_FLAGS => self.registers[REG_IRQ_FLAGS as usize] &= !value,
            REG_OP_MODE => {
                self.registers[REG_OP_MODE as usize] = value;
                self.tx_countdown = if value & MODE_MASK == MODE_TRANSMIT {
                    self.tx_done_after
                } else {
                    None
                };
                if self.tx_countdown == Some(0) {
                    self.tick();
                }
            }
            _ => self.registers[address as usize & 0x7F] = value,
        }
    }

    fn load(&mut self, address: u8) -> u8 {
        if address == REG_FIFO {
            let pointer = &mut self.registers[REG_FIFO_ADDR_PTR as usize];
            let value = self.fifo[*pointer as usize];
            *pointer = pointer.wrapping_add(1);
            self.fifo_bytes_read += 1;
            value
        } else {
            self.registers[address as usize & 0x7F]
        }
    }
}

fn next(address: u8) -> u8 {
    if address == REG_FIFO {
        REG_FIFO
    } else {
        address.wrapping_add(1)
    }
}

impl RegisterTransport for SimulatedChip {
    type Error = Infallible;

    fn read_burst(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        let mut chip = self.chip.borrow_mut();
        chip.tick();
        chip.log.push(Access::Read {
            address,
            len: buffer.len(),
        });
        let mut current = address;
        for slot in buffer.iter_mut() {
            *slot = chip.load(current);
            current = next(current);
        }
        Ok(())
    }

    fn write_burst(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut chip = self.chip.borrow_mut();
        chip.tick();
        chip.log.push(Access::Write {
            address,
            bytes: bytes.to_vec(),
        });
        let mut current = address;
        for byte in bytes {
            chip.store(current, *byte);
            current = next(current);
        }
        Ok(())
    }
}

/// Clock that advances a fixed step every time it is read.
#[derive(Debug, Clone, Copy)]
pub struct TickClock {
    pub now: u32,
    pub step: u32,
}

impl TickClock {
    pub fn new(step: u32) -> Self {
        Self { now: 0, step }
    }
}

impl Clock for TickClock {
    fn now_ms(&mut self) -> u32 {
        let now = self.now;
        self.now = self.now.wrapping_add(self.step);
        now
    }
}
