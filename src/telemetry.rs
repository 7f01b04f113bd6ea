//! Illuminance telemetry over the radio link
//!
//! A sensor node reads an [`IlluminanceSource`] and transmits the sample as a
//! two-byte packet; a base station receives packets and renders them on a
//! [`StatusDisplay`].
//!
//! # Wire format
//! Illuminance in hundredths of a lux, unsigned 16-bit, little-endian. A
//! packet of any other length is not a reading. Nothing in the packet
//! identifies the format, so both ends must agree on it out of band.

use core::fmt::{self, Write};

use embedded_hal::delay::DelayNs;
use heapless::String;

use crate::clock::Clock;
use crate::error::{NodeError, SensorError};
use crate::radio::Rfm95;
use crate::transport::RegisterTransport;
use crate::Error;

/// Height of the status display in pixels.
pub const DISPLAY_HEIGHT: i32 = 64;
/// Height of one glyph at scale 1, in pixels.
pub const GLYPH_HEIGHT: i32 = 8;

/// Receive buffer size used by [`BaseStation`].
pub const STATION_BUFFER: usize = 64;

/// Idle polls between two frames of the waiting animation.
const WAITING_FRAME_POLLS: u32 = 3;
const WAITING_MAX_DOTS: usize = 3;

const WAITING_TEXT: &str = "Waiting for data";
/// "655.35 Lux"
const READING_LINE_MAX: usize = 10;
/// "Waiting for data..."
const WAITING_LINE_MAX: usize = WAITING_TEXT.len() + WAITING_MAX_DOTS;

/// Illuminance in hundredths of a lux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Illuminance(pub u16);

impl Illuminance {
    /// Encoded size on the wire.
    pub const WIRE_LEN: usize = 2;

    pub const fn from_centi_lux(centi_lux: u16) -> Self {
        Self(centi_lux)
    }

    pub const fn centi_lux(self) -> u16 {
        self.0
    }

    /// Whole lux, truncated.
    pub const fn whole(self) -> u16 {
        self.0 / 100
    }

    pub const fn hundredths(self) -> u16 {
        self.0 % 100
    }

    pub const fn to_bytes(self) -> [u8; Self::WIRE_LEN] {
        self.0.to_le_bytes()
    }

    /// Decodes a received payload. `None` unless `bytes` is exactly
    /// [`WIRE_LEN`](Self::WIRE_LEN) long.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [low, high] => Some(Self(u16::from_le_bytes([*low, *high]))),
            _ => None,
        }
    }
}

impl fmt::Display for Illuminance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.whole(), self.hundredths())
    }
}

/// A light sensor.
pub trait IlluminanceSource {
    /// Bus error of the sensor.
    type Error;

    /// Takes one sample. All-zero and all-one raw readings are reported as
    /// [`SensorError::Sentinel`], never as a value.
    fn read(&mut self) -> Result<Illuminance, SensorError<Self::Error>>;
}

/// A text display, written in whole frames.
///
/// Calls are fire-and-forget; a display that fails to update has nothing
/// useful to report back.
pub trait StatusDisplay {
    fn clear(&mut self);

    /// Draws `text` horizontally centred with its top edge at `y`.
    fn draw_centered_text(&mut self, text: &str, y: i32, scale: u8);

    /// Pushes the frame to the panel.
    fn present(&mut self);
}

/// Shows the terminal radio failure screen.
pub fn show_fatal<P: StatusDisplay>(display: &mut P) {
    display.clear();
    display.draw_centered_text("LoRa failure", 20, 2);
    display.draw_centered_text("Check wiring", 42, 1);
    display.present();
}

/// Shows the failure screen and stops. Only an external reset recovers.
pub fn halt<P: StatusDisplay, D: DelayNs>(display: &mut P, delay: &mut D) -> ! {
    error!("radio initialization failed, halting");
    show_fatal(display);
    loop {
        delay.delay_ms(1_000);
    }
}

/// Reads a sensor and transmits the sample.
pub struct SensorNode<S> {
    sensor: S,
}

impl<S> SensorNode<S>
where
    S: IlluminanceSource,
{
    pub fn new(sensor: S) -> Self {
        Self { sensor }
    }

    pub fn sensor(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn release(self) -> S {
        self.sensor
    }

    /// Samples the sensor and sends the reading.
    ///
    /// A failed read is returned as [`NodeError::Sensor`] and nothing is
    /// transmitted.
    pub fn send_now<T, D, C>(
        &mut self,
        radio: &mut Rfm95<'_, T, D, C>,
    ) -> Result<Illuminance, NodeError<S::Error>>
    where
        T: RegisterTransport,
        D: DelayNs,
        C: Clock,
    {
        let sample = match self.sensor.read() {
            Ok(sample) => sample,
            Err(err) => {
                warn!("sensor read failed, nothing sent");
                return Err(err.into());
            }
        };

        radio.send(&sample.to_bytes())?;
        info!("sent {} centi-lux", sample.centi_lux());
        Ok(sample)
    }
}

/// Outcome of one [`BaseStation::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StationEvent {
    /// Nothing was received.
    Idle,
    /// An illuminance packet was received and displayed.
    Reading { illuminance: Illuminance, rssi: i16 },
    /// A packet of another length was received. The bytes are available
    /// from [`BaseStation::last_packet`].
    Raw { len: usize, truncated: bool },
}

/// "Waiting for data" animation shown until the first reading arrives.
#[derive(Debug, Clone, Default)]
pub struct WaitingAnimation {
    ticks: u32,
    dots: usize,
}

impl WaitingAnimation {
    pub const fn new() -> Self {
        Self { ticks: 0, dots: 0 }
    }

    /// Counts one idle poll. Returns the number of dots to draw when a new
    /// frame is due.
    pub fn tick(&mut self) -> Option<usize> {
        self.ticks = self.ticks.wrapping_add(1);
        if self.ticks % WAITING_FRAME_POLLS != 0 {
            return None;
        }
        self.dots = self.dots % WAITING_MAX_DOTS + 1;
        Some(self.dots)
    }
}

/// Receiving end of the telemetry link.
///
/// Call [`poll`](Self::poll) periodically after
/// [`Rfm95::start_receive`].
pub struct BaseStation {
    buffer: [u8; STATION_BUFFER],
    len: usize,
    has_reading: bool,
    waiting: WaitingAnimation,
}

impl Default for BaseStation {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseStation {
    pub const fn new() -> Self {
        Self {
            buffer: [0; STATION_BUFFER],
            len: 0,
            has_reading: false,
            waiting: WaitingAnimation::new(),
        }
    }

    /// Bytes of the last packet received, truncated to the buffer.
    pub fn last_packet(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    pub fn has_reading(&self) -> bool {
        self.has_reading
    }

    /// Collects at most one packet and updates the display. Never blocks.
    pub fn poll<T, D, C, P>(
        &mut self,
        radio: &mut Rfm95<'_, T, D, C>,
        display: &mut P,
    ) -> Result<StationEvent, Error>
    where
        T: RegisterTransport,
        D: DelayNs,
        C: Clock,
        P: StatusDisplay,
    {
        let received = match radio.try_receive(&mut self.buffer)? {
            Some(received) if received.len > 0 => received,
            _ => {
                self.len = 0;
                if !self.has_reading {
                    if let Some(dots) = self.waiting.tick() {
                        show_waiting(display, dots);
                    }
                }
                return Ok(StationEvent::Idle);
            }
        };
        self.len = received.len;

        let illuminance = match Illuminance::from_bytes(self.last_packet()) {
            Some(illuminance) if !received.is_truncated() => illuminance,
            _ => {
                debug!("raw packet of {} bytes: {}", received.len, Hex(self.last_packet()));
                return Ok(StationEvent::Raw {
                    len: received.len,
                    truncated: received.is_truncated(),
                });
            }
        };

        self.has_reading = true;
        show_reading(display, illuminance);
        let rssi = radio.rssi()?;
        info!("received {} centi-lux, RSSI {} dBm", illuminance.centi_lux(), rssi);

        Ok(StationEvent::Reading { illuminance, rssi })
    }
}

fn reading_line(illuminance: Illuminance) -> String<READING_LINE_MAX> {
    let mut line = String::new();
    let fits = write!(line, "{} Lux", illuminance).is_ok();
    debug_assert!(fits, "reading line overflow");
    line
}

fn waiting_line(dots: usize) -> String<WAITING_LINE_MAX> {
    let mut line = String::new();
    let mut fits = line.push_str(WAITING_TEXT).is_ok();
    for _ in 0..dots.min(WAITING_MAX_DOTS) {
        fits &= line.push('.').is_ok();
    }
    debug_assert!(fits, "waiting line overflow");
    line
}

fn show_reading<P: StatusDisplay>(display: &mut P, illuminance: Illuminance) {
    let line = reading_line(illuminance);

    display.clear();
    display.draw_centered_text(&line, (DISPLAY_HEIGHT - 2 * GLYPH_HEIGHT) / 2, 2);
    display.present();
}

fn show_waiting<P: StatusDisplay>(display: &mut P, dots: usize) {
    let line = waiting_line(dots);

    display.clear();
    display.draw_centered_text(&line, (DISPLAY_HEIGHT - GLYPH_HEIGHT) / 2, 1);
    display.present();
}

/// Space-separated lowercase hex rendering of a byte slice, for logs.
struct Hex<'a>(&'a [u8]);

impl fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, byte) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_char(' ')?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Hex<'_> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=[u8]:x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::{String as StdString, ToString};
    use std::vec::Vec;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<Vec<(StdString, i32, u8)>>,
        pending: Vec<(StdString, i32, u8)>,
    }

    impl StatusDisplay for Recorder {
        fn clear(&mut self) {
            self.pending.clear();
        }

        fn draw_centered_text(&mut self, text: &str, y: i32, scale: u8) {
            self.pending.push((text.to_string(), y, scale));
        }

        fn present(&mut self) {
            self.frames.push(core::mem::take(&mut self.pending));
        }
    }

    #[test]
    fn illuminance_is_little_endian() {
        let lux = Illuminance(500);
        assert_eq!(lux.to_bytes(), [0xF4, 0x01]);
        assert_eq!(Illuminance::from_bytes(&[0xF4, 0x01]), Some(lux));
    }

    #[test]
    fn other_lengths_are_not_readings() {
        assert_eq!(Illuminance::from_bytes(&[]), None);
        assert_eq!(Illuminance::from_bytes(&[0xF4]), None);
        assert_eq!(Illuminance::from_bytes(&[0xF4, 0x01, 0x00]), None);
    }

    #[test]
    fn illuminance_display() {
        assert_eq!(Illuminance(500).to_string(), "5.00");
        assert_eq!(Illuminance(12_345).to_string(), "123.45");
        assert_eq!(Illuminance(7).to_string(), "0.07");
        assert_eq!(Illuminance(u16::MAX).to_string(), "655.35");
    }

    #[test]
    fn longest_lines_fit_their_buffers() {
        assert_eq!(reading_line(Illuminance(u16::MAX)).as_str(), "655.35 Lux");
        assert_eq!(reading_line(Illuminance(0)).as_str(), "0.00 Lux");
        assert_eq!(waiting_line(WAITING_MAX_DOTS).as_str(), "Waiting for data...");
        assert_eq!(waiting_line(1).as_str(), "Waiting for data.");
    }

    #[test]
    fn raw_packets_render_as_hex() {
        assert_eq!(Hex(&[0x0A, 0xFF, 0x00]).to_string(), "0a ff 00");
        assert_eq!(Hex(&[]).to_string(), "");
    }

    #[test]
    fn waiting_animation_cycles_every_third_poll() {
        let mut animation = WaitingAnimation::new();
        let frames: Vec<_> = (0..12).map(|_| animation.tick()).collect();
        assert_eq!(
            frames,
            [
                None,
                None,
                Some(1),
                None,
                None,
                Some(2),
                None,
                None,
                Some(3),
                None,
                None,
                Some(1)
            ]
        );
    }

    #[test]
    fn fatal_screen() {
        let mut display = Recorder::default();
        show_fatal(&mut display);
        assert_eq!(
            display.frames,
            [vec![
                ("LoRa failure".to_string(), 20, 2),
                ("Check wiring".to_string(), 42, 1)
            ]]
        );
    }

    #[test]
    fn reading_frame() {
        let mut display = Recorder::default();
        show_reading(&mut display, Illuminance(500));
        assert_eq!(display.frames, [vec![("5.00 Lux".to_string(), 24, 2)]]);
    }
}
