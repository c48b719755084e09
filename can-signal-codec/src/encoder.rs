//! Signal encoder
//!
//! Looks up a signal by name, packs a validated value into the live output
//! buffer of its frame, and hands the mutated frame to a [`FrameTransmitter`].
//!
//! The encoder owns the live buffers and `send_*` takes `&mut self`, so the
//! read-modify-write on a buffer cannot race. Hosts that share an encoder
//! between threads must wrap it in their own lock.

use crate::codec::SignalCodec;
use crate::config::{CodecConfig, TypeCheckPolicy};
use crate::signals::SignalTable;
use crate::types::{CanFrame, CodecError, Result, SignalType, SignalValue};

/// Outbound side of the transport
pub trait FrameTransmitter {
    /// Transmit the current contents of an output buffer
    fn transmit(&mut self, frame_id: u32, dlc: u8, data: &[u8; 8]);
}

/// Records every transmitted frame, in order
impl FrameTransmitter for Vec<CanFrame> {
    fn transmit(&mut self, frame_id: u32, dlc: u8, data: &[u8; 8]) {
        self.push(CanFrame::new(frame_id, dlc, *data));
    }
}

/// Live output frame buffers, one per outbound CAN ID
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameBuffers {
    frames: Vec<CanFrame>,
}

impl FrameBuffers {
    /// Build the buffer set, rejecting two buffers with the same CAN ID
    pub fn new(frames: Vec<CanFrame>) -> Result<Self> {
        for (idx, frame) in frames.iter().enumerate() {
            if frames[..idx].iter().any(|f| f.id == frame.id) {
                return Err(CodecError::Configuration(format!(
                    "duplicate output buffer for frame 0x{:X}",
                    frame.id
                )));
            }
            if frame.dlc > crate::types::MAX_DLC {
                return Err(CodecError::InvalidFrame(format!(
                    "output buffer 0x{:X} has DLC {}",
                    frame.id, frame.dlc
                )));
            }
        }
        Ok(Self { frames })
    }

    /// Buffer for a CAN ID
    pub fn get(&self, frame_id: u32) -> Option<&CanFrame> {
        self.frames.iter().find(|f| f.id == frame_id)
    }

    /// Mutable buffer for a CAN ID
    pub fn get_mut(&mut self, frame_id: u32) -> Option<&mut CanFrame> {
        self.frames.iter_mut().find(|f| f.id == frame_id)
    }

    /// All buffers
    pub fn frames(&self) -> &[CanFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Encodes named signal values into live output frames
pub struct SignalEncoder<'a, T: FrameTransmitter> {
    table: &'a SignalTable,
    buffers: FrameBuffers,
    transmitter: T,
    config: CodecConfig,
}

impl<'a, T: FrameTransmitter> SignalEncoder<'a, T> {
    /// Create an encoder with the default configuration
    ///
    /// Fails with `CodecError::Configuration` if `buffers` is empty.
    pub fn new(table: &'a SignalTable, buffers: FrameBuffers, transmitter: T) -> Result<Self> {
        Self::with_config(table, buffers, transmitter, CodecConfig::default())
    }

    /// Create an encoder with an explicit configuration
    pub fn with_config(
        table: &'a SignalTable,
        buffers: FrameBuffers,
        transmitter: T,
        config: CodecConfig,
    ) -> Result<Self> {
        if buffers.is_empty() {
            return Err(CodecError::Configuration(
                "signal encoder needs at least one output frame buffer".to_string(),
            ));
        }

        for frame_id in table.frame_ids() {
            if buffers.get(frame_id).is_none() {
                log::debug!("No output buffer for frame 0x{:X}, its signals cannot be sent", frame_id);
            }
        }

        log::info!(
            "Signal encoder initialized with {} output buffers, type check {:?}",
            buffers.len(),
            config.type_check
        );

        Ok(Self {
            table,
            buffers,
            transmitter,
            config,
        })
    }

    /// The live output buffers
    pub fn buffers(&self) -> &FrameBuffers {
        &self.buffers
    }

    /// The transmitter receiving encoded frames
    pub fn transmitter(&self) -> &T {
        &self.transmitter
    }

    /// Mutable access to the transmitter
    pub fn transmitter_mut(&mut self) -> &mut T {
        &mut self.transmitter
    }

    /// Consume the encoder and return its buffers and transmitter
    pub fn into_parts(self) -> (FrameBuffers, T) {
        (self.buffers, self.transmitter)
    }

    /// Send a `Bool` signal
    pub fn send_bool(&mut self, name: &str, value: bool) -> Result<()> {
        self.send(name, SignalValue::Bool(value))
    }

    /// Send a `UInt8` signal
    pub fn send_u8(&mut self, name: &str, value: u8) -> Result<()> {
        self.send(name, SignalValue::UInt8(value))
    }

    /// Send a `UInt16` signal
    pub fn send_u16(&mut self, name: &str, value: u16) -> Result<()> {
        self.send(name, SignalValue::UInt16(value))
    }

    /// Pack `value` into the signal's output buffer and transmit the frame
    ///
    /// The variant of `value` selects the entry point type used by the type
    /// check. Nothing is transmitted and the buffer is left untouched when
    /// any lookup or check fails.
    pub fn send(&mut self, name: &str, value: SignalValue) -> Result<()> {
        let table = self.table;

        let Some(signal) = table.find_by_name(name) else {
            log::warn!("Signal '{}' not found", name);
            return Err(CodecError::SignalNotFound(name.to_string()));
        };

        let Some(frame) = self.buffers.get_mut(signal.frame_id) else {
            log::warn!("Frame '0x{:X}' not found", signal.frame_id);
            return Err(CodecError::FrameNotFound(signal.frame_id));
        };

        let entry_type = value.signal_type();
        let expected = self.config.type_check.expected_type(entry_type);
        let raw = value.raw();

        if signal.signal_type != expected || !signal.in_range(raw) {
            log::warn!(
                "{}({}) provided val: {}, type: {}. Expected min: {}, max: {}, type: {}, signal type: {}",
                name,
                signal.signal_id,
                raw,
                entry_type,
                signal.min,
                signal.max,
                expected,
                signal.signal_type
            );

            return Err(if signal.signal_type != expected {
                CodecError::TypeMismatch {
                    name: name.to_string(),
                    expected,
                    actual: signal.signal_type,
                }
            } else {
                CodecError::OutOfRange {
                    name: name.to_string(),
                    value: raw,
                    min: signal.min,
                    max: signal.max,
                }
            });
        }

        if !frame.fits(signal) {
            log::warn!(
                "Output buffer 0x{:X} DLC({}) too small for signal {}({})",
                frame.id,
                frame.dlc,
                name,
                signal.signal_id
            );
            return Err(CodecError::FrameTooShort {
                name: name.to_string(),
                frame_id: frame.id,
                dlc: frame.dlc,
                end_bit: signal.end_bit,
            });
        }

        // In range and at most 16 bits wide, so the cast cannot truncate.
        SignalCodec::pack(signal, raw as u16, &mut frame.data);

        log::debug!(
            "Encoded {}({}) = {} into frame 0x{:X}",
            name,
            signal.signal_id,
            value,
            frame.id
        );
        self.transmitter.transmit(frame.id, frame.dlc, &frame.data);

        Ok(())
    }

    /// The type check policy in effect
    pub fn type_check(&self) -> TypeCheckPolicy {
        self.config.type_check
    }
}

/// Entry point type accepted for a descriptor type under a policy
///
/// Returns `None` when no entry point can send the signal.
pub fn sendable_as(policy: TypeCheckPolicy, declared: SignalType) -> Option<SignalType> {
    match policy {
        TypeCheckPolicy::EntryPoint => Some(declared),
        TypeCheckPolicy::LegacyUInt8 if declared == SignalType::UInt8 => Some(SignalType::UInt8),
        TypeCheckPolicy::LegacyUInt8 => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::SignalDescriptor;

    fn table() -> SignalTable {
        SignalTable::new(vec![
            SignalDescriptor {
                frame_id: 0x400,
                signal_id: 10,
                name: "Speed".to_string(),
                start_bit: 0,
                end_bit: 7,
                min: 0,
                max: 250,
                signal_type: SignalType::UInt8,
            },
            SignalDescriptor {
                frame_id: 0x400,
                signal_id: 11,
                name: "Brake".to_string(),
                start_bit: 8,
                end_bit: 8,
                min: 0,
                max: 1,
                signal_type: SignalType::Bool,
            },
            SignalDescriptor {
                frame_id: 0x401,
                signal_id: 12,
                name: "Orphan".to_string(),
                start_bit: 0,
                end_bit: 7,
                min: 0,
                max: 255,
                signal_type: SignalType::UInt8,
            },
        ])
        .unwrap()
    }

    fn buffers() -> FrameBuffers {
        FrameBuffers::new(vec![CanFrame::new(0x400, 8, [0; 8])]).unwrap()
    }

    #[test]
    fn test_empty_buffers_rejected() {
        let table = table();
        let result = SignalEncoder::new(&table, FrameBuffers::default(), Vec::new());
        assert!(matches!(result, Err(CodecError::Configuration(_))));
    }

    #[test]
    fn test_duplicate_buffers_rejected() {
        let result = FrameBuffers::new(vec![
            CanFrame::new(0x400, 8, [0; 8]),
            CanFrame::new(0x400, 2, [0; 8]),
        ]);
        assert!(matches!(result, Err(CodecError::Configuration(_))));
    }

    #[test]
    fn test_send_u8_transmits_mutated_buffer() {
        let table = table();
        let mut encoder = SignalEncoder::new(&table, buffers(), Vec::new()).unwrap();

        encoder.send_u8("Speed", 42).unwrap();

        assert_eq!(encoder.buffers().get(0x400).unwrap().data[0], 42);
        assert_eq!(encoder.transmitter().len(), 1);
        assert_eq!(encoder.transmitter()[0], CanFrame::new(0x400, 8, [42, 0, 0, 0, 0, 0, 0, 0]));
    }

    #[test]
    fn test_lookup_misses() {
        let table = table();
        let mut encoder = SignalEncoder::new(&table, buffers(), Vec::new()).unwrap();

        assert_eq!(
            encoder.send_u8("Missing", 1),
            Err(CodecError::SignalNotFound("Missing".to_string()))
        );
        assert_eq!(encoder.send_u8("Orphan", 1), Err(CodecError::FrameNotFound(0x401)));
        assert!(encoder.transmitter().is_empty());
    }

    #[test]
    fn test_entry_point_type_check() {
        let table = table();
        let mut encoder = SignalEncoder::new(&table, buffers(), Vec::new()).unwrap();

        encoder.send_bool("Brake", true).unwrap();
        assert_eq!(encoder.buffers().get(0x400).unwrap().data[1], 0x01);

        let err = encoder.send_u16("Speed", 42).unwrap_err();
        assert_eq!(
            err,
            CodecError::TypeMismatch {
                name: "Speed".to_string(),
                expected: SignalType::UInt16,
                actual: SignalType::UInt8,
            }
        );
        assert_eq!(encoder.transmitter().len(), 1);
    }

    #[test]
    fn test_legacy_type_check_only_sends_uint8_signals() {
        let table = table();
        let config = CodecConfig::new().with_type_check(TypeCheckPolicy::LegacyUInt8);
        let mut encoder = SignalEncoder::with_config(&table, buffers(), Vec::new(), config).unwrap();

        assert!(matches!(
            encoder.send_bool("Brake", true),
            Err(CodecError::TypeMismatch { .. })
        ));
        // A UInt8 signal goes through any entry point under the legacy check
        encoder.send_u16("Speed", 7).unwrap();
        assert_eq!(encoder.buffers().get(0x400).unwrap().data[0], 7);
        assert_eq!(sendable_as(TypeCheckPolicy::LegacyUInt8, SignalType::Bool), None);
    }

    #[test]
    fn test_out_of_range_leaves_buffer_untouched() {
        let table = table();
        let mut encoder = SignalEncoder::new(&table, buffers(), Vec::new()).unwrap();

        let err = encoder.send_u8("Speed", 251).unwrap_err();
        assert!(matches!(err, CodecError::OutOfRange { value: 251, max: 250, .. }));
        assert_eq!(encoder.buffers().get(0x400).unwrap().data, [0; 8]);
        assert!(encoder.transmitter().is_empty());
    }

    #[test]
    fn test_short_output_buffer() {
        let table = table();
        let buffers = FrameBuffers::new(vec![CanFrame::new(0x400, 1, [0; 8])]).unwrap();
        let mut encoder = SignalEncoder::new(&table, buffers, Vec::new()).unwrap();

        encoder.send_u8("Speed", 1).unwrap();
        assert!(matches!(
            encoder.send_bool("Brake", true),
            Err(CodecError::FrameTooShort { dlc: 1, end_bit: 8, .. })
        ));

        let (buffers, sent) = encoder.into_parts();
        assert_eq!(buffers.get(0x400).unwrap().data[1], 0);
        assert_eq!(sent.len(), 1);
    }
}
