//! Codec configuration types
//!
//! Policy knobs for table construction, the encoder's type check and the
//! decoder's frame filter. Everything else about the codec is fixed by the
//! descriptor table itself.

use crate::types::SignalType;
use serde::{Deserialize, Serialize};

/// Configuration shared by the table, decoder and encoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Reject tables containing the same signal name twice
    #[serde(default = "default_true")]
    pub require_unique_names: bool,

    /// How the encoder checks a descriptor's type against the entry point used
    #[serde(default)]
    pub type_check: TypeCheckPolicy,

    /// Optional: only decode frames with these CAN IDs
    #[serde(default)]
    pub frame_filter: Option<Vec<u32>>,
}

fn default_true() -> bool {
    true
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            require_unique_names: true,
            type_check: TypeCheckPolicy::default(),
            frame_filter: None,
        }
    }
}

/// Type check applied by the encoder before packing a value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeCheckPolicy {
    /// The descriptor's type must match the entry point's type
    #[default]
    EntryPoint,
    /// Every entry point requires a `UInt8` descriptor, as legacy firmware did.
    /// Bool and UInt16 signals can never be sent under this policy.
    LegacyUInt8,
}

impl TypeCheckPolicy {
    /// The descriptor type an entry point of type `entry` accepts
    pub fn expected_type(self, entry: SignalType) -> SignalType {
        match self {
            TypeCheckPolicy::EntryPoint => entry,
            TypeCheckPolicy::LegacyUInt8 => SignalType::UInt8,
        }
    }
}

impl CodecConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: require or relax unique signal names
    pub fn with_unique_names(mut self, required: bool) -> Self {
        self.require_unique_names = required;
        self
    }

    /// Builder method: set the encoder type check policy
    pub fn with_type_check(mut self, policy: TypeCheckPolicy) -> Self {
        self.type_check = policy;
        self
    }

    /// Builder method: set frame filter
    pub fn with_frame_filter(mut self, frame_ids: Vec<u32>) -> Self {
        self.frame_filter = Some(frame_ids);
        self
    }

    /// Check if a frame should be decoded
    pub fn should_process_frame(&self, frame_id: u32) -> bool {
        match &self.frame_filter {
            Some(ids) => ids.contains(&frame_id),
            None => true,
        }
    }
}
