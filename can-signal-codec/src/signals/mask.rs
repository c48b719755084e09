//! Bit mask lookup
//!
//! Maps a field width (1..=16) to a mask with that many low-order bits set.

/// Widest field the codec supports
pub const MAX_SIGNAL_WIDTH: u8 = 16;

/// Masks indexed by `width - 1`
const BIT_MASKS: [u16; MAX_SIGNAL_WIDTH as usize] = [
    0x0001, 0x0003, 0x0007, 0x000f, 0x001f, 0x003f, 0x007f, 0x00ff,
    0x01ff, 0x03ff, 0x07ff, 0x0fff, 0x1fff, 0x3fff, 0x7fff, 0xffff,
];

/// All-ones mask of `width` bits, or `None` outside `1..=16`
pub fn mask_for(width: u8) -> Option<u16> {
    if width == 0 {
        return None;
    }
    BIT_MASKS.get(usize::from(width) - 1).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_table_matches_shift() {
        for width in 1..=MAX_SIGNAL_WIDTH {
            let expected = ((1u32 << width) - 1) as u16;
            assert_eq!(mask_for(width), Some(expected), "width {}", width);
        }
    }

    #[test]
    fn test_mask_out_of_domain() {
        assert_eq!(mask_for(0), None);
        assert_eq!(mask_for(17), None);
    }
}
