//! Packer: combines a tag with the tally fields into a 16-bit word.
//!
//! ```text
//!  15    12 11           4 3    2 1    0
//! +--------+--------------+------+------+
//! |  tag   |    tally     | cand | dist |
//! +--------+--------------+------+------+
//! ```

use std::fmt;

use crate::utils::bits::to_binary_string;

const TAG_SHIFT: u32 = 12;
const TALLY_SHIFT: u32 = 4;
const CANDIDATE_SHIFT: u32 = 2;

/// Width of the packed word, in bits.
pub const PACKED_BITS: u32 = 16;

/// Packs `tag | tally | candidate | district`, MSB to LSB.
///
/// Each input is masked to its declared width (4, 8, 2, 2 bits) first.
///
/// # Examples
///
/// ```
/// use tallytag::packer::pack;
///
/// assert_eq!(pack(0b1111, 0, 0, 0), 0b1111_0000_0000_0000);
/// assert_eq!(pack(0b0101, 86, 1, 3), 0b0101_0101_0110_0111);
/// ```
pub fn pack(tag: u8, tally: u8, candidate: u8, district: u8) -> u16 {
    ((tag as u16 & 0xF) << TAG_SHIFT)
        | ((tally as u16) << TALLY_SHIFT)
        | ((candidate as u16 & 0x3) << CANDIDATE_SHIFT)
        | (district as u16 & 0x3)
}

/// Fields recovered from a packed word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedWord {
    /// Bits 15..12.
    pub tag: u8,
    /// Bits 11..4.
    pub tally: u8,
    /// Bits 3..2.
    pub candidate: u8,
    /// Bits 1..0.
    pub district: u8,
}

impl PackedWord {
    /// The packed 16-bit value.
    pub fn word(&self) -> u16 {
        pack(self.tag, self.tally, self.candidate, self.district)
    }
}

impl fmt::Display for PackedWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_binary_string(self.word() as u64, PACKED_BITS))
    }
}

/// Splits a packed word back into its fields.
pub fn unpack(word: u16) -> PackedWord {
    PackedWord {
        tag: (word >> TAG_SHIFT) as u8 & 0xF,
        tally: (word >> TALLY_SHIFT) as u8,
        candidate: (word >> CANDIDATE_SHIFT) as u8 & 0x3,
        district: word as u8 & 0x3,
    }
}
