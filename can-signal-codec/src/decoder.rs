//! Frame decoder
//!
//! Matches inbound frames against the signal table, extracts and range-checks
//! every matching signal, and hands accepted values to a [`SignalSink`].
//!
//! Sinks are called synchronously, in table order, on the caller's thread.
//! A panicking sink unwinds through `process_frame`; sinks must not panic.

use crate::codec::SignalCodec;
use crate::config::CodecConfig;
use crate::signals::{SignalDescriptor, SignalTable};
use crate::types::{CanFrame, DecodedSignal, SignalValue};

/// Receiver of decoded signal values, one method per value type
///
/// Every method defaults to doing nothing, so an application only implements
/// the types it cares about.
pub trait SignalSink {
    /// Called once per frame that passed the frame filter, before its signals
    fn on_frame(&mut self, _frame: &CanFrame) {}

    fn on_bool(&mut self, _name: &str, _signal_id: u32, _value: bool) {}

    fn on_u8(&mut self, _name: &str, _signal_id: u32, _value: u8) {}

    fn on_u16(&mut self, _name: &str, _signal_id: u32, _value: u16) {}
}

/// Sink that discards every value
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SignalSink for NullSink {}

/// Sink that records every delivered value in arrival order
#[derive(Debug, Clone, Default)]
pub struct SignalCollector {
    current_frame: u32,
    signals: Vec<DecodedSignal>,
}

impl SignalCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values collected so far
    pub fn signals(&self) -> &[DecodedSignal] {
        &self.signals
    }

    /// Take the collected values, leaving the collector empty
    pub fn drain(&mut self) -> Vec<DecodedSignal> {
        std::mem::take(&mut self.signals)
    }

    fn push(&mut self, name: &str, signal_id: u32, value: SignalValue) {
        self.signals.push(DecodedSignal {
            name: name.to_string(),
            signal_id,
            frame_id: self.current_frame,
            value,
        });
    }
}

impl SignalSink for SignalCollector {
    fn on_frame(&mut self, frame: &CanFrame) {
        self.current_frame = frame.id;
    }

    fn on_bool(&mut self, name: &str, signal_id: u32, value: bool) {
        self.push(name, signal_id, SignalValue::Bool(value));
    }

    fn on_u8(&mut self, name: &str, signal_id: u32, value: u8) {
        self.push(name, signal_id, SignalValue::UInt8(value));
    }

    fn on_u16(&mut self, name: &str, signal_id: u32, value: u16) {
        self.push(name, signal_id, SignalValue::UInt16(value));
    }
}

/// Why a matching signal was not delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The frame's DLC does not cover the signal's last bit
    FrameTooShort { dlc: u8, required_dlc: u8 },
    /// The extracted value is outside `[min, max]`
    OutOfRange { value: u16, min: u32, max: u32 },
}

/// A matching signal that was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSignal {
    pub name: String,
    pub signal_id: u32,
    pub reason: SkipReason,
}

/// Outcome of processing one frame
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameReport {
    /// CAN ID of the processed frame
    pub frame_id: u32,
    /// True if the frame was dropped by the configured frame filter
    pub filtered: bool,
    /// Signals delivered to the sink, in table order
    pub decoded: Vec<DecodedSignal>,
    /// Matching signals that were skipped, in table order
    pub skipped: Vec<SkippedSignal>,
}

impl FrameReport {
    /// Number of table entries that matched the frame ID
    pub fn matched(&self) -> usize {
        self.decoded.len() + self.skipped.len()
    }
}

/// Decodes inbound frames against a signal table
pub struct SignalDecoder<'a, S: SignalSink> {
    table: &'a SignalTable,
    sink: S,
    config: CodecConfig,
}

impl<'a, S: SignalSink> SignalDecoder<'a, S> {
    /// Create a decoder with the default configuration
    pub fn new(table: &'a SignalTable, sink: S) -> Self {
        Self::with_config(table, sink, CodecConfig::default())
    }

    /// Create a decoder with an explicit configuration
    pub fn with_config(table: &'a SignalTable, sink: S, config: CodecConfig) -> Self {
        log::info!(
            "Signal decoder initialized with {} signals",
            table.len()
        );
        Self { table, sink, config }
    }

    /// The sink receiving decoded values
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the sink, e.g. to drain collected values
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the decoder and return its sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Decode every signal the table defines for this frame
    ///
    /// A signal that does not fit the frame's DLC, or whose value is out of
    /// range, is logged and skipped; the remaining signals are still processed.
    pub fn process_frame(&mut self, frame: &CanFrame) -> FrameReport {
        log::debug!(
            "CAN frame processing started can_id: 0x{:X}, dlc: {}",
            frame.id,
            frame.dlc
        );

        let mut report = FrameReport {
            frame_id: frame.id,
            ..FrameReport::default()
        };

        if !self.config.should_process_frame(frame.id) {
            log::trace!("Frame 0x{:X} filtered out", frame.id);
            report.filtered = true;
            return report;
        }

        self.sink.on_frame(frame);

        let table = self.table;
        for (idx, signal) in table.signals_for_frame(frame.id).enumerate() {
            log::debug!(
                "Processing signal [{}] {}({}), s: {}, e: {}, min: {}, max: {}, type: {}",
                idx + 1,
                signal.name,
                signal.signal_id,
                signal.start_bit,
                signal.end_bit,
                signal.min,
                signal.max,
                signal.signal_type
            );

            match self.process_signal(frame, signal) {
                Ok(decoded) => report.decoded.push(decoded),
                Err(reason) => report.skipped.push(SkippedSignal {
                    name: signal.name.clone(),
                    signal_id: signal.signal_id,
                    reason,
                }),
            }
        }

        report
    }

    /// Extract, range-check and dispatch a single signal
    fn process_signal(
        &mut self,
        frame: &CanFrame,
        signal: &SignalDescriptor,
    ) -> std::result::Result<DecodedSignal, SkipReason> {
        if !frame.fits(signal) {
            log::warn!(
                "DLC({}) too small to process signal {}({}) ending at bit {}",
                frame.dlc,
                signal.name,
                signal.signal_id,
                signal.end_bit
            );
            return Err(SkipReason::FrameTooShort {
                dlc: frame.dlc,
                required_dlc: signal.required_dlc(),
            });
        }

        let raw = SignalCodec::extract(signal, &frame.data);
        if !signal.in_range(u32::from(raw)) {
            log::warn!(
                "{}({}): value ({}) out of bounds min: {}, max: {}",
                signal.name,
                signal.signal_id,
                raw,
                signal.min,
                signal.max
            );
            return Err(SkipReason::OutOfRange {
                value: raw,
                min: signal.min,
                max: signal.max,
            });
        }

        let value = SignalValue::from_raw(signal.signal_type, raw);
        match value {
            SignalValue::Bool(v) => self.sink.on_bool(&signal.name, signal.signal_id, v),
            SignalValue::UInt8(v) => self.sink.on_u8(&signal.name, signal.signal_id, v),
            SignalValue::UInt16(v) => self.sink.on_u16(&signal.name, signal.signal_id, v),
        }

        Ok(DecodedSignal {
            name: signal.name.clone(),
            signal_id: signal.signal_id,
            frame_id: frame.id,
            value,
        })
    }
}

/// Decode a single frame into a list of values without keeping a decoder around
pub fn decode_frame(table: &SignalTable, frame: &CanFrame) -> FrameReport {
    SignalDecoder::new(table, NullSink).process_frame(frame)
}
