//! Console sink and transmitter
//!
//! Prints decoded signals as text or JSON lines and transmitted frames in
//! candump format.

use crate::candump;
use can_signal_codec::{CanFrame, DecodedSignal, FrameTransmitter, SignalSink, SignalValue};
use clap::ValueEnum;

/// How decoded signals are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `0x100 Name(id) = value`
    Text,
    /// One JSON object per signal
    Json,
}

/// Sink printing every decoded signal to stdout
pub struct ConsoleSink {
    format: OutputFormat,
    current_frame: u32,
    printed: usize,
}

impl ConsoleSink {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            current_frame: 0,
            printed: 0,
        }
    }

    /// Number of signals printed so far
    pub fn printed(&self) -> usize {
        self.printed
    }

    fn print(&mut self, name: &str, signal_id: u32, value: SignalValue) {
        let signal = DecodedSignal {
            name: name.to_string(),
            signal_id,
            frame_id: self.current_frame,
            value,
        };
        if let Some(line) = render(self.format, &signal) {
            println!("{}", line);
            self.printed += 1;
        }
    }
}

impl SignalSink for ConsoleSink {
    fn on_frame(&mut self, frame: &CanFrame) {
        self.current_frame = frame.id;
    }

    fn on_bool(&mut self, name: &str, signal_id: u32, value: bool) {
        self.print(name, signal_id, SignalValue::Bool(value));
    }

    fn on_u8(&mut self, name: &str, signal_id: u32, value: u8) {
        self.print(name, signal_id, SignalValue::UInt8(value));
    }

    fn on_u16(&mut self, name: &str, signal_id: u32, value: u16) {
        self.print(name, signal_id, SignalValue::UInt16(value));
    }
}

/// Render one decoded signal in the requested format
///
/// Returns `None` if the signal cannot be serialized; nothing is printed then.
pub fn render(format: OutputFormat, signal: &DecodedSignal) -> Option<String> {
    match format {
        OutputFormat::Text => Some(format!(
            "0x{:X} {}({}) = {}",
            signal.frame_id, signal.name, signal.signal_id, signal.value
        )),
        OutputFormat::Json => match serde_json::to_string(signal) {
            Ok(line) => Some(line),
            Err(e) => {
                log::warn!("Failed to serialize signal {}: {}", signal.name, e);
                None
            }
        },
    }
}

/// Transmitter printing each frame as a candump line
pub struct CandumpTransmitter {
    interface: String,
    sent: usize,
}

impl CandumpTransmitter {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            sent: 0,
        }
    }

    /// Number of frames transmitted so far
    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl FrameTransmitter for CandumpTransmitter {
    fn transmit(&mut self, frame_id: u32, dlc: u8, data: &[u8; 8]) {
        let frame = CanFrame::new(frame_id, dlc, *data);
        println!("{}", candump::format_frame(&self.interface, &frame));
        self.sent += 1;
    }
}
