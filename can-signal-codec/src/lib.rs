//! CAN Signal Codec Library
//!
//! Decodes and encodes bit-packed signals inside classic CAN frames, driven by
//! a static table of signal descriptors (bit range, inclusive bounds, value
//! type, owning frame ID).
//!
//! # Architecture
//!
//! - [`SignalTable`] validates descriptors and indexes them by frame ID and name
//! - [`SignalCodec`] reads and writes one bit field inside an 8-byte payload
//! - [`SignalDecoder`] dispatches range-checked values of an inbound frame to a
//!   [`SignalSink`]
//! - [`SignalEncoder`] packs a named value into its live output buffer and hands
//!   the frame to a [`FrameTransmitter`]
//!
//! The library does NOT:
//! - Parse DBC files
//! - Apply scaling, offsets or physical units
//! - Handle multiplexed signals or fields wider than 16 bits
//! - Talk to a CAN bus
//!
//! # Example Usage
//!
//! ```
//! use can_signal_codec::{
//!     CanFrame, FrameBuffers, SignalCollector, SignalDecoder, SignalDescriptor,
//!     SignalEncoder, SignalTable, SignalType,
//! };
//!
//! let table = SignalTable::new(vec![SignalDescriptor {
//!     frame_id: 0x400,
//!     signal_id: 1,
//!     name: "Speed".to_string(),
//!     start_bit: 0,
//!     end_bit: 7,
//!     min: 0,
//!     max: 250,
//!     signal_type: SignalType::UInt8,
//! }])
//! .unwrap();
//!
//! // Encode into a live buffer; the transmitter records what went out
//! let buffers = FrameBuffers::new(vec![CanFrame::new(0x400, 8, [0; 8])]).unwrap();
//! let mut encoder = SignalEncoder::new(&table, buffers, Vec::new()).unwrap();
//! encoder.send_u8("Speed", 42).unwrap();
//! let sent = encoder.transmitter()[0];
//!
//! // Decode the transmitted frame again
//! let mut decoder = SignalDecoder::new(&table, SignalCollector::new());
//! decoder.process_frame(&sent);
//! assert_eq!(decoder.sink().signals()[0].name, "Speed");
//! ```

// Public modules
pub mod codec;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod signals;
pub mod types;

// Re-export main types for convenience
pub use codec::SignalCodec;
pub use config::{CodecConfig, TypeCheckPolicy};
pub use decoder::{
    decode_frame, FrameReport, NullSink, SignalCollector, SignalDecoder, SignalSink, SkipReason,
    SkippedSignal,
};
pub use encoder::{sendable_as, FrameBuffers, FrameTransmitter, SignalEncoder};
pub use signals::{SignalDescriptor, SignalTable, TableStats};
pub use types::{CanFrame, CodecError, DecodedSignal, Result, SignalType, SignalValue};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: an empty table decodes nothing
        let table = SignalTable::new(Vec::new()).unwrap();
        let report = decode_frame(&table, &CanFrame::default());
        assert_eq!(report.matched(), 0);
        assert_eq!(table.stats().num_signals, 0);
    }
}
