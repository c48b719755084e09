//! Core types for the CAN signal codec
//!
//! This module defines the frame structure exchanged with the transport layer,
//! the typed signal values delivered to the application, and the error type
//! shared by every codec operation.

use crate::signals::SignalDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Maximum payload length of a classic CAN frame in bytes
pub const MAX_DLC: u8 = 8;

/// A classic CAN frame with a fixed 8-byte payload
///
/// Only the first `dlc` bytes of `data` are valid. The remaining bytes are
/// carried along untouched so that an output buffer can be mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CanFrame {
    /// CAN identifier (11-bit or 29-bit)
    pub id: u32,
    /// Data length code - number of valid payload bytes (0-8)
    pub dlc: u8,
    /// Frame payload
    pub data: [u8; 8],
}

impl CanFrame {
    /// Create a frame from its raw parts
    pub fn new(id: u32, dlc: u8, data: [u8; 8]) -> Self {
        Self { id, dlc, data }
    }

    /// Create a frame whose DLC equals the length of `payload`
    ///
    /// Returns `CodecError::InvalidFrame` if the payload is longer than 8 bytes.
    pub fn from_slice(id: u32, payload: &[u8]) -> Result<Self> {
        if payload.len() > MAX_DLC as usize {
            return Err(CodecError::InvalidFrame(format!(
                "payload of {} bytes exceeds {} bytes for frame 0x{:X}",
                payload.len(),
                MAX_DLC,
                id
            )));
        }

        let mut data = [0u8; 8];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            id,
            dlc: payload.len() as u8,
            data,
        })
    }

    /// The valid part of the payload
    pub fn payload(&self) -> &[u8] {
        let len = usize::from(self.dlc.min(MAX_DLC));
        &self.data[..len]
    }

    /// Number of valid payload bits (`dlc * 8`)
    pub fn bit_len(&self) -> u16 {
        u16::from(self.dlc) * 8
    }

    /// Check whether the whole bit range of a signal lies within the valid payload
    pub fn fits(&self, descriptor: &SignalDescriptor) -> bool {
        u16::from(descriptor.end_bit) < self.bit_len()
    }
}

/// Declared value type of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    /// Single flag, read from one byte
    Bool,
    /// Up to 8 bits, read from one byte
    UInt8,
    /// Up to 16 bits, read as a little-endian word
    UInt16,
}

impl SignalType {
    /// Number of payload bytes the codec reads or writes for this type
    pub fn window_bytes(self) -> u8 {
        match self {
            SignalType::Bool | SignalType::UInt8 => 1,
            SignalType::UInt16 => 2,
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalType::Bool => write!(f, "bool"),
            SignalType::UInt8 => write!(f, "uint8"),
            SignalType::UInt16 => write!(f, "uint16"),
        }
    }
}

impl FromStr for SignalType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(SignalType::Bool),
            "uint8" | "u8" => Ok(SignalType::UInt8),
            "uint16" | "u16" => Ok(SignalType::UInt16),
            _ => Err(CodecError::UnsupportedSignalType(s.to_string())),
        }
    }
}

/// A typed signal value, tagged with the variant it was decoded as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    Bool(bool),
    UInt8(u8),
    UInt16(u16),
}

impl SignalValue {
    /// The type this value belongs to
    pub fn signal_type(&self) -> SignalType {
        match self {
            SignalValue::Bool(_) => SignalType::Bool,
            SignalValue::UInt8(_) => SignalType::UInt8,
            SignalValue::UInt16(_) => SignalType::UInt16,
        }
    }

    /// Raw integer representation used for range checks and packing
    pub fn raw(&self) -> u32 {
        match self {
            SignalValue::Bool(v) => u32::from(*v),
            SignalValue::UInt8(v) => u32::from(*v),
            SignalValue::UInt16(v) => u32::from(*v),
        }
    }

    /// Build a value of the given type from a raw extracted field
    ///
    /// The caller guarantees `raw` fits the type (the mask width does).
    pub fn from_raw(signal_type: SignalType, raw: u16) -> Self {
        match signal_type {
            SignalType::Bool => SignalValue::Bool(raw != 0),
            SignalType::UInt8 => SignalValue::UInt8(raw as u8),
            SignalType::UInt16 => SignalValue::UInt16(raw),
        }
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Bool(v) => write!(f, "{}", v),
            SignalValue::UInt8(v) => write!(f, "{}", v),
            SignalValue::UInt16(v) => write!(f, "{}", v),
        }
    }
}

/// A signal value delivered by the decoder, with its identifying metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedSignal {
    /// Signal name from the descriptor table
    pub name: String,
    /// Diagnostic signal identifier
    pub signal_id: u32,
    /// Frame the signal was decoded from
    pub frame_id: u32,
    /// Decoded value
    pub value: SignalValue,
}

/// Errors that can occur while configuring or running the codec
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid descriptor '{name}': {reason}")]
    InvalidDescriptor { name: String, reason: String },

    #[error("Duplicate signal name: {0}")]
    DuplicateSignalName(String),

    #[error("Signal not found: {0}")]
    SignalNotFound(String),

    #[error("Frame buffer not found: CAN ID 0x{0:X}")]
    FrameNotFound(u32),

    #[error("Signal '{name}' has type {actual}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: SignalType,
        actual: SignalType,
    },

    #[error("Signal '{name}' value {value} out of bounds [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("Frame 0x{frame_id:X} DLC({dlc}) too small for signal '{name}' ending at bit {end_bit}")]
    FrameTooShort {
        name: String,
        frame_id: u32,
        dlc: u8,
        end_bit: u8,
    },

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Signal type not supported: {0}")]
    UnsupportedSignalType(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_from_slice() {
        let frame = CanFrame::from_slice(0x123, &[0xAB, 0xCD]).unwrap();
        assert_eq!(frame.dlc, 2);
        assert_eq!(frame.payload(), &[0xAB, 0xCD]);
        assert_eq!(frame.data[2..], [0; 6]);
        assert_eq!(frame.bit_len(), 16);
    }

    #[test]
    fn test_frame_from_slice_too_long() {
        let result = CanFrame::from_slice(0x123, &[0; 9]);
        assert!(matches!(result, Err(CodecError::InvalidFrame(_))));
    }

    #[test]
    fn test_signal_type_parsing() {
        assert_eq!("bool".parse::<SignalType>().unwrap(), SignalType::Bool);
        assert_eq!("UInt8".parse::<SignalType>().unwrap(), SignalType::UInt8);
        assert_eq!("u16".parse::<SignalType>().unwrap(), SignalType::UInt16);
        assert_eq!(
            "float".parse::<SignalType>(),
            Err(CodecError::UnsupportedSignalType("float".to_string()))
        );
    }

    #[test]
    fn test_signal_value_conversions() {
        assert_eq!(SignalValue::Bool(true).raw(), 1);
        assert_eq!(SignalValue::UInt16(0xBEEF).raw(), 0xBEEF);
        assert_eq!(SignalValue::from_raw(SignalType::Bool, 1), SignalValue::Bool(true));
        assert_eq!(SignalValue::from_raw(SignalType::UInt8, 200), SignalValue::UInt8(200));
        assert_eq!(SignalValue::UInt8(7).signal_type(), SignalType::UInt8);
    }

    #[test]
    fn test_signal_value_display() {
        assert_eq!(format!("{}", SignalValue::Bool(false)), "false");
        assert_eq!(format!("{}", SignalValue::UInt16(513)), "513");
    }
}
