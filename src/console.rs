//! Operator console
//!
//! A line-oriented command shell for the sensor node, fed one byte at a time
//! from a serial port. Commands:
//!
//! | Command  | Action                                   |
//! |----------|------------------------------------------|
//! | `help`   | list commands                            |
//! | `reboot` | reset the board                          |
//! | `led`    | toggle the indicator LED                 |
//! | `send`   | read the light sensor and transmit it    |
//! | `radio`  | show the radio version and mode          |
//! | `scan`   | list devices on the sensor bus           |
//!
//! The console only calls public driver operations. When the radio failed to
//! initialize it is passed as `None` and radio commands report that instead.

use core::fmt::{self, Write};

use embedded_hal::delay::DelayNs;
use heapless::String;

use crate::clock::Clock;
use crate::error::{NodeError, SensorError};
use crate::radio::Rfm95;
use crate::telemetry::{IlluminanceSource, SensorNode};
use crate::transport::RegisterTransport;

/// Longest command line accepted; further input is dropped.
pub const LINE_MAX: usize = 63;

pub const PROMPT: &str = "RUNTIME>";

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;
const BELL: u8 = 0x07;

/// Board services the console needs beyond the radio and sensor.
pub trait Board {
    /// Resets the processor.
    fn reboot(&mut self);

    /// Inverts the indicator LED, returning its new state.
    fn toggle_led(&mut self) -> bool;
}

/// A bus that can be probed for attached devices.
pub trait BusScan {
    /// Calls `found` with every responding address and returns how many
    /// there were.
    fn scan(&mut self, found: &mut dyn FnMut(u8)) -> usize;
}

/// Accumulates typed bytes into a command line with echo.
#[derive(Debug, Default)]
pub struct LineEditor {
    line: String<LINE_MAX>,
}

impl LineEditor {
    pub const fn new() -> Self {
        Self {
            line: String::new(),
        }
    }

    /// Feeds one received byte, echoing it to `echo`.
    ///
    /// Returns the finished line on CR or LF.
    pub fn feed<W: Write>(
        &mut self,
        byte: u8,
        echo: &mut W,
    ) -> Result<Option<String<LINE_MAX>>, fmt::Error> {
        match byte {
            BACKSPACE | DELETE => {
                if self.line.pop().is_some() {
                    echo.write_str("\x08 \x08")?;
                }
            }
            BELL => {}
            b'\r' | b'\n' => {
                echo.write_char('\n')?;
                return Ok(Some(core::mem::take(&mut self.line)));
            }
            byte if byte == b' ' || byte.is_ascii_graphic() => {
                if self.line.push(char::from(byte)).is_ok() {
                    echo.write_char(char::from(byte))?;
                }
            }
            _ => {}
        }
        Ok(None)
    }

    /// Text typed so far.
    pub fn pending(&self) -> &str {
        &self.line
    }
}

/// A parsed command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    Reboot,
    Led,
    Send,
    Radio,
    Scan,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    /// Parses the first space-separated token of `line`. Arguments after it
    /// are ignored. `None` for a blank line.
    pub fn parse(line: &'a str) -> Option<Self> {
        let token = line.split(' ').find(|token| !token.is_empty())?;
        Some(match token {
            "help" => Self::Help,
            "reboot" => Self::Reboot,
            "led" => Self::Led,
            "send" => Self::Send,
            "radio" => Self::Radio,
            "scan" => Self::Scan,
            other => Self::Unknown(other),
        })
    }
}

/// Command shell bound to a board.
pub struct Console<B> {
    board: B,
    editor: LineEditor,
}

impl<B> Console<B>
where
    B: Board,
{
    pub fn new(board: B) -> Self {
        Self {
            board,
            editor: LineEditor::new(),
        }
    }

    pub fn board(&mut self) -> &mut B {
        &mut self.board
    }

    /// Prints the command list and the first prompt.
    pub fn start<W: Write>(&mut self, out: &mut W) -> fmt::Result {
        help(out)?;
        out.write_str(PROMPT)
    }

    /// Feeds one received byte and runs the command it completes, if any.
    pub fn feed<W, T, D, C, S>(
        &mut self,
        byte: u8,
        out: &mut W,
        radio: Option<&mut Rfm95<'_, T, D, C>>,
        node: &mut SensorNode<S>,
    ) -> fmt::Result
    where
        W: Write,
        T: RegisterTransport,
        D: DelayNs,
        C: Clock,
        S: IlluminanceSource + BusScan,
    {
        let Some(line) = self.editor.feed(byte, out)? else {
            return Ok(());
        };

        if let Some(command) = Command::parse(&line) {
            self.execute(command, out, radio, node)?;
        }
        out.write_str(PROMPT)
    }

    /// Runs one command, writing its report to `out`.
    pub fn execute<W, T, D, C, S>(
        &mut self,
        command: Command<'_>,
        out: &mut W,
        radio: Option<&mut Rfm95<'_, T, D, C>>,
        node: &mut SensorNode<S>,
    ) -> fmt::Result
    where
        W: Write,
        T: RegisterTransport,
        D: DelayNs,
        C: Clock,
        S: IlluminanceSource + BusScan,
    {
        match command {
            Command::Help => help(out),
            Command::Reboot => {
                writeln!(out, "Rebooting...")?;
                self.board.reboot();
                Ok(())
            }
            Command::Led => {
                let on = self.board.toggle_led();
                writeln!(out, "LED {}.", if on { "on" } else { "off" })
            }
            Command::Send => {
                let Some(radio) = radio else {
                    return writeln!(out, "LoRa not available.");
                };
                writeln!(out, "Reading BH1750...")?;
                match node.send_now(radio) {
                    Ok(sample) => {
                        writeln!(out, "Illuminance: {} lux", sample)?;
                        writeln!(out, "Sent via LoRa.")
                    }
                    Err(NodeError::Sensor(SensorError::Sentinel(raw))) => {
                        writeln!(out, "BH1750 read failed (raw 0x{:04X}).", raw)
                    }
                    Err(NodeError::Sensor(SensorError::Bus(_))) => {
                        writeln!(out, "BH1750 read failed.")
                    }
                    Err(NodeError::Radio(err)) => writeln!(out, "LoRa send failed: {:?}", err),
                }
            }
            Command::Radio => {
                let Some(radio) = radio else {
                    return writeln!(out, "LoRa not available.");
                };
                match (radio.version(), radio.read_mode()) {
                    (Ok(version), Ok(mode)) => {
                        writeln!(out, "LoRa version: 0x{:02X}", version)?;
                        writeln!(out, "Mode: {:?}", mode)
                    }
                    (Err(err), _) | (_, Err(err)) => writeln!(out, "LoRa read failed: {:?}", err),
                }
            }
            Command::Scan => {
                writeln!(out, "Scanning I2C bus...")?;
                let mut result = Ok(());
                let count = node.sensor().scan(&mut |address| {
                    if result.is_ok() {
                        result = writeln!(out, "  device at 0x{:02X}", address);
                    }
                });
                result?;
                writeln!(out, "Scan complete, {} found.", count)
            }
            Command::Unknown(token) => {
                writeln!(out, "Unknown command '{}'. Type 'help'.", token)
            }
        }
    }
}

fn help<W: Write>(out: &mut W) -> fmt::Result {
    writeln!(out, "Available commands:")?;
    writeln!(out, "help        - this command")?;
    writeln!(out, "reboot      - reboot CPU")?;
    writeln!(out, "led         - toggle LED")?;
    writeln!(out, "send        - read BH1750 and send via LoRa")?;
    writeln!(out, "radio       - LoRa module information")?;
    writeln!(out, "scan        - scan I2C bus")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::Illuminance;
    use crate::transport::SpiTransport;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::spi::Mock as SpiMock;
    use std::string::String as StdString;

    type NoRadio<'a> = Rfm95<'a, SpiTransport<SpiMock<u8>>, NoopDelay, Frozen>;

    struct Frozen;

    impl Clock for Frozen {
        fn now_ms(&mut self) -> u32 {
            0
        }
    }

    #[derive(Default)]
    struct TestBoard {
        led: bool,
        reboots: usize,
    }

    impl Board for TestBoard {
        fn reboot(&mut self) {
            self.reboots += 1;
        }

        fn toggle_led(&mut self) -> bool {
            self.led = !self.led;
            self.led
        }
    }

    struct FakeSensor {
        reading: Result<Illuminance, SensorError<()>>,
        devices: &'static [u8],
        reads: usize,
    }

    impl IlluminanceSource for FakeSensor {
        type Error = ();

        fn read(&mut self) -> Result<Illuminance, SensorError<()>> {
            self.reads += 1;
            self.reading
        }
    }

    impl BusScan for FakeSensor {
        fn scan(&mut self, found: &mut dyn FnMut(u8)) -> usize {
            for &address in self.devices {
                found(address);
            }
            self.devices.len()
        }
    }

    fn node() -> SensorNode<FakeSensor> {
        SensorNode::new(FakeSensor {
            reading: Ok(Illuminance(500)),
            devices: &[0x23, 0x3C],
            reads: 0,
        })
    }

    fn run(
        console: &mut Console<TestBoard>,
        node: &mut SensorNode<FakeSensor>,
        input: &str,
    ) -> StdString {
        let mut out = StdString::new();
        for byte in input.bytes() {
            console
                .feed(byte, &mut out, None::<&mut NoRadio<'_>>, node)
                .unwrap();
        }
        out
    }

    #[test]
    fn editor_handles_backspace_and_bell() {
        let mut editor = LineEditor::new();
        let mut echo = StdString::new();

        for byte in *b"lex\x08d\x07" {
            assert_eq!(editor.feed(byte, &mut echo).unwrap(), None);
        }
        assert_eq!(editor.pending(), "led");

        let line = editor.feed(b'\r', &mut echo).unwrap().unwrap();
        assert_eq!(line.as_str(), "led");
        assert_eq!(echo, "lex\x08 \x08d\n");
        assert_eq!(editor.pending(), "");
    }

    #[test]
    fn backspace_on_empty_line_echoes_nothing() {
        let mut editor = LineEditor::new();
        let mut echo = StdString::new();

        editor.feed(DELETE, &mut echo).unwrap();
        assert!(echo.is_empty());
    }

    #[test]
    fn editor_drops_input_past_the_limit() {
        let mut editor = LineEditor::new();
        let mut echo = StdString::new();

        for _ in 0..LINE_MAX + 5 {
            editor.feed(b'a', &mut echo).unwrap();
        }
        assert_eq!(editor.pending().len(), LINE_MAX);
        assert_eq!(echo.len(), LINE_MAX);
    }

    #[test]
    fn parse_uses_first_token() {
        assert_eq!(Command::parse("help"), Some(Command::Help));
        assert_eq!(Command::parse("  send now"), Some(Command::Send));
        assert_eq!(Command::parse("scan"), Some(Command::Scan));
        assert_eq!(Command::parse("enviar"), Some(Command::Unknown("enviar")));
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn led_and_reboot_reach_the_board() {
        let mut console = Console::new(TestBoard::default());
        let mut node = node();

        let out = run(&mut console, &mut node, "led\rled\rreboot\r");
        assert!(out.contains("LED on."));
        assert!(out.contains("LED off."));
        assert_eq!(console.board().reboots, 1);
        assert!(!console.board().led);
    }

    #[test]
    fn send_without_radio_does_not_read_sensor() {
        let mut console = Console::new(TestBoard::default());
        let mut node = node();

        let out = run(&mut console, &mut node, "send\r");
        assert!(out.contains("LoRa not available."));
        assert_eq!(node.sensor().reads, 0);
    }

    #[test]
    fn scan_lists_devices() {
        let mut console = Console::new(TestBoard::default());
        let mut node = node();

        let out = run(&mut console, &mut node, "scan\n");
        assert!(out.contains("  device at 0x23\n  device at 0x3C\n"));
        assert!(out.contains("Scan complete, 2 found."));
    }

    #[test]
    fn unknown_command_prints_hint_and_prompt() {
        let mut console = Console::new(TestBoard::default());
        let mut node = node();

        let out = run(&mut console, &mut node, "info\r");
        assert_eq!(out, "info\nUnknown command 'info'. Type 'help'.\nRUNTIME>");
    }

    #[test]
    fn blank_line_only_prompts() {
        let mut console = Console::new(TestBoard::default());
        let mut node = node();

        assert_eq!(run(&mut console, &mut node, "\r"), "\nRUNTIME>");
    }
}
