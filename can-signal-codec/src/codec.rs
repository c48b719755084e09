//! Signal Codec Engine
//!
//! Reads and writes a single signal's bit field inside a frame payload. The
//! engine knows nothing about ranges, callbacks or DLC; it trusts descriptors
//! that passed `SignalDescriptor::validate`.

use crate::signals::SignalDescriptor;
use crate::types::SignalType;
use byteorder::{ByteOrder, LittleEndian};

/// Bit-level read/write of signal fields
pub struct SignalCodec;

impl SignalCodec {
    /// Extract the raw value of a signal from frame data
    ///
    /// `Bool` and `UInt8` fields are read from one byte, `UInt16` fields from a
    /// little-endian word starting at the field's first byte. Bytes outside the
    /// 8-byte payload read as zero.
    pub fn extract(descriptor: &SignalDescriptor, data: &[u8; 8]) -> u16 {
        let layout = descriptor.layout();
        let byte = layout.byte_offset;

        let word = match descriptor.signal_type {
            SignalType::Bool | SignalType::UInt8 => {
                data.get(byte).copied().map(u16::from).unwrap_or(0)
            }
            SignalType::UInt16 => data
                .get(byte..byte + 2)
                .map(LittleEndian::read_u16)
                .unwrap_or(0),
        };

        (word >> layout.bit_shift) & layout.mask
    }

    /// Pack a raw value into frame data, touching only the signal's bits
    ///
    /// Target bits are cleared before the new value is written, so signals
    /// sharing a byte are preserved. Value bits above the field width are
    /// discarded.
    pub fn pack(descriptor: &SignalDescriptor, value: u16, data: &mut [u8; 8]) {
        let layout = descriptor.layout();
        let byte = layout.byte_offset;
        let bits = value & layout.mask;

        match descriptor.signal_type {
            SignalType::Bool | SignalType::UInt8 => {
                if let Some(target) = data.get_mut(byte) {
                    // The validated field never leaves this byte.
                    let mask = (layout.mask << layout.bit_shift) as u8;
                    *target &= !mask;
                    *target |= (bits << layout.bit_shift) as u8;
                }
            }
            SignalType::UInt16 => {
                if let Some(window) = data.get_mut(byte..byte + 2) {
                    let mut word = LittleEndian::read_u16(window);
                    word &= !(layout.mask << layout.bit_shift);
                    word |= bits << layout.bit_shift;
                    LittleEndian::write_u16(window, word);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(start: u8, end: u8, ty: SignalType) -> SignalDescriptor {
        SignalDescriptor {
            frame_id: 0x100,
            signal_id: 1,
            name: "Test".to_string(),
            start_bit: start,
            end_bit: end,
            min: 0,
            max: 0xFFFF,
            signal_type: ty,
        }
    }

    #[test]
    fn test_extract_bool() {
        let data = [0x01, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(SignalCodec::extract(&descriptor(0, 0, SignalType::Bool), &data), 1);
        assert_eq!(SignalCodec::extract(&descriptor(1, 1, SignalType::Bool), &data), 0);
    }

    #[test]
    fn test_extract_uint8_with_shift() {
        // Bits 12..=14 of 0xAB 0xCD: byte 1 = 0b1100_1101, shift 4 → 0b1100, mask 3 bits → 0b100
        let data = [0xAB, 0xCD, 0, 0, 0, 0, 0, 0];
        assert_eq!(SignalCodec::extract(&descriptor(12, 14, SignalType::UInt8), &data), 0b100);
        assert_eq!(SignalCodec::extract(&descriptor(8, 15, SignalType::UInt8), &data), 0xCD);
    }

    #[test]
    fn test_extract_uint16_little_endian() {
        let data = [0xAB, 0xCD, 0xEF, 0x12, 0, 0, 0, 0];
        assert_eq!(SignalCodec::extract(&descriptor(0, 15, SignalType::UInt16), &data), 0xCDAB);
        // 12 bits starting at bit 12: word at byte 1 = 0xEFCD, >> 4 = 0x0EFC
        assert_eq!(SignalCodec::extract(&descriptor(12, 23, SignalType::UInt16), &data), 0x0EFC);
    }

    #[test]
    fn test_pack_clears_existing_bits() {
        let d = descriptor(7, 7, SignalType::Bool);
        let mut data = [0xFF; 8];
        SignalCodec::pack(&d, 0, &mut data);
        assert_eq!(data[0], 0x7F);
        assert_eq!(data[1], 0xFF);
    }

    #[test]
    fn test_pack_discards_bits_above_width() {
        let d = descriptor(2, 4, SignalType::UInt8);
        let mut data = [0u8; 8];
        SignalCodec::pack(&d, 0xFF, &mut data);
        assert_eq!(data[0], 0b0001_1100);
    }

    #[test]
    fn test_pack_uint16_straddling_bytes() {
        let d = descriptor(12, 23, SignalType::UInt16);
        let mut data = [0u8; 8];
        SignalCodec::pack(&d, 0xABC, &mut data);
        assert_eq!(data[1], 0xC0);
        assert_eq!(data[2], 0xAB);
        assert_eq!(SignalCodec::extract(&d, &data), 0xABC);
    }

    #[test]
    fn test_roundtrip_all_widths() {
        for width in 1..=16u8 {
            let ty = if width <= 8 { SignalType::UInt8 } else { SignalType::UInt16 };
            let start = if width <= 8 { 8 + (8 - width) } else { 16 + (16 - width) };
            let d = descriptor(start, start + width - 1, ty);
            let max = ((1u32 << width) - 1) as u16;

            for value in [0, 1, max / 2, max] {
                let mut data = [0x5A; 8];
                SignalCodec::pack(&d, value, &mut data);
                assert_eq!(
                    SignalCodec::extract(&d, &data),
                    value,
                    "roundtrip failed for width {} value {}",
                    width,
                    value
                );
            }
        }
    }
}
