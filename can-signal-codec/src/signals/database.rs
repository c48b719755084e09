//! Signal descriptor table
//!
//! Holds the ordered, immutable list of signal descriptors and the lookup
//! indices (frame ID → descriptors, name → descriptor) built once at
//! construction.

use crate::config::CodecConfig;
use crate::signals::mask::{mask_for, MAX_SIGNAL_WIDTH};
use crate::types::{CodecError, Result, SignalType, MAX_DLC};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Largest identifier representable in a 29-bit extended CAN frame
pub const MAX_CAN_ID: u32 = 0x1FFF_FFFF;

/// Static description of one signal inside a frame payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalDescriptor {
    /// CAN ID of the frame that carries this signal
    pub frame_id: u32,
    /// Diagnostic identifier (not used for lookup)
    pub signal_id: u32,
    /// Unique name, used by the encoder for lookup
    pub name: String,
    /// First bit of the field (zero-based, LSB of byte 0 is bit 0)
    pub start_bit: u8,
    /// Last bit of the field, inclusive
    pub end_bit: u8,
    /// Minimum accepted raw value (inclusive)
    pub min: u32,
    /// Maximum accepted raw value (inclusive)
    pub max: u32,
    /// Declared value type
    #[serde(rename = "type")]
    pub signal_type: SignalType,
}

/// Byte/bit position of a signal field, derived from its descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    /// Index of the first payload byte the field touches
    pub byte_offset: usize,
    /// Position of the field's LSB within that byte (0..=7)
    pub bit_shift: u8,
    /// All-ones mask of the field width
    pub mask: u16,
}

impl SignalDescriptor {
    /// Width of the field in bits (0 if `end_bit < start_bit`)
    pub fn width(&self) -> u16 {
        if self.end_bit < self.start_bit {
            0
        } else {
            u16::from(self.end_bit) - u16::from(self.start_bit) + 1
        }
    }

    /// Compute the byte offset, shift and mask for this field
    ///
    /// Descriptors that fail validation produce a zero mask.
    pub fn layout(&self) -> FieldLayout {
        FieldLayout {
            byte_offset: usize::from(self.start_bit / 8),
            bit_shift: self.start_bit % 8,
            mask: u8::try_from(self.width())
                .ok()
                .and_then(mask_for)
                .unwrap_or(0),
        }
    }

    /// Number of payload bytes needed to hold the whole field
    pub fn required_dlc(&self) -> u8 {
        self.end_bit / 8 + 1
    }

    /// Check whether a raw value lies within `[min, max]`
    pub fn in_range(&self, raw: u32) -> bool {
        raw >= self.min && raw <= self.max
    }

    /// Validate the descriptor against the codec's layout constraints
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| CodecError::InvalidDescriptor {
            name: self.name.clone(),
            reason,
        };

        if self.name.is_empty() {
            return Err(invalid("empty signal name".to_string()));
        }
        if self.frame_id > MAX_CAN_ID {
            return Err(invalid(format!("frame ID 0x{:X} exceeds 29 bits", self.frame_id)));
        }
        if self.end_bit < self.start_bit {
            return Err(invalid(format!(
                "end bit {} before start bit {}",
                self.end_bit, self.start_bit
            )));
        }

        let width = self.width();
        if width > u16::from(MAX_SIGNAL_WIDTH) {
            return Err(invalid(format!(
                "width {} exceeds {} bits",
                width, MAX_SIGNAL_WIDTH
            )));
        }

        let window = self.signal_type.window_bytes();
        let layout = self.layout();
        if u16::from(layout.bit_shift) + width > u16::from(window) * 8 {
            return Err(invalid(format!(
                "bits {}..={} cross the {}-byte window of a {} signal",
                self.start_bit, self.end_bit, window, self.signal_type
            )));
        }
        if layout.byte_offset + usize::from(window) > usize::from(MAX_DLC) {
            return Err(invalid(format!(
                "{}-byte window at byte {} exceeds the {}-byte payload",
                window, layout.byte_offset, MAX_DLC
            )));
        }

        if self.min > self.max {
            return Err(invalid(format!("min {} greater than max {}", self.min, self.max)));
        }
        if self.signal_type == SignalType::Bool && self.max > 1 {
            return Err(invalid(format!("bool signal with max {}", self.max)));
        }

        Ok(())
    }
}

/// The ordered signal table with lookup indices
#[derive(Debug, Clone)]
pub struct SignalTable {
    /// Descriptors in table order
    signals: Vec<SignalDescriptor>,

    /// Key: frame ID, Value: descriptor indices in table order
    by_frame: HashMap<u32, Vec<usize>>,

    /// Key: signal name, Value: index of the first descriptor with that name
    by_name: HashMap<String, usize>,
}

impl SignalTable {
    /// Build a table with the default configuration (unique names required)
    pub fn new(signals: Vec<SignalDescriptor>) -> Result<Self> {
        Self::with_config(signals, &CodecConfig::default())
    }

    /// Build a table, validating every descriptor
    ///
    /// Duplicate names are rejected when `config.require_unique_names` is set.
    /// Otherwise the first descriptor with a given name wins the name lookup.
    pub fn with_config(signals: Vec<SignalDescriptor>, config: &CodecConfig) -> Result<Self> {
        let mut by_frame: HashMap<u32, Vec<usize>> = HashMap::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for (idx, signal) in signals.iter().enumerate() {
            signal.validate()?;

            if by_name.contains_key(&signal.name) {
                if config.require_unique_names {
                    return Err(CodecError::DuplicateSignalName(signal.name.clone()));
                }
                log::warn!(
                    "Duplicate signal name '{}' ({}), lookup keeps the first entry",
                    signal.name,
                    signal.signal_id
                );
            } else {
                by_name.insert(signal.name.clone(), idx);
            }

            by_frame.entry(signal.frame_id).or_default().push(idx);
        }

        log::info!(
            "Signal table built: {} signals across {} frames",
            signals.len(),
            by_frame.len()
        );

        Ok(Self {
            signals,
            by_frame,
            by_name,
        })
    }

    /// All descriptors in table order
    pub fn signals(&self) -> &[SignalDescriptor] {
        &self.signals
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// True if the table holds no descriptors
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Descriptors carried by a frame, in table order
    pub fn signals_for_frame(&self, frame_id: u32) -> impl Iterator<Item = &SignalDescriptor> + '_ {
        self.by_frame
            .get(&frame_id)
            .into_iter()
            .flatten()
            .map(move |idx| &self.signals[*idx])
    }

    /// Look up a descriptor by exact name
    pub fn find_by_name(&self, name: &str) -> Option<&SignalDescriptor> {
        self.by_name.get(name).map(|idx| &self.signals[*idx])
    }

    /// All distinct frame IDs, sorted
    pub fn frame_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.by_frame.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Get table statistics
    pub fn stats(&self) -> TableStats {
        TableStats {
            num_signals: self.signals.len(),
            num_frames: self.by_frame.len(),
        }
    }
}

/// Table statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    /// Total number of signal descriptors
    pub num_signals: usize,
    /// Number of distinct frame IDs
    pub num_frames: usize,
}
