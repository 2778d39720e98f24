//! KeyDecoder: unpacks a 32-bit key into the eight transform parameters.
//!
//! Layout, MSB to LSB:
//!
//! ```text
//!  31   29 28   26 25   23 22 21 20 19 18 17 16 15 14    12 11        0
//! +-------+-------+-------+-----+-----+-----+-----+--------+-----------+
//! |  bf   |  by   |  bx   | py  | px  |  s  |  r  |   bs   |  unused   |
//! +-------+-------+-------+-----+-----+-----+-----+--------+-----------+
//! ```

use std::fmt;

use crate::error::TagError;
use crate::{NUM_BLOCKS, TAG_SIZE};

const BF_SHIFT: u32 = 29;
const BY_SHIFT: u32 = 26;
const BX_SHIFT: u32 = 23;
const PY_SHIFT: u32 = 21;
const PX_SHIFT: u32 = 19;
const S_SHIFT: u32 = 17;
const R_SHIFT: u32 = 15;
const BS_SHIFT: u32 = 12;

const MASK3: u32 = 0x7;
const MASK2: u32 = 0x3;

/// Transform parameters decoded from a raw 32-bit key.
///
/// Block indices (`bf`, `by`, `bx`, `bs`) lie in `0..NUM_BLOCKS`; bit
/// offsets (`px`, `py`) and the rotation `r` lie in `0..TAG_SIZE`; the
/// swap width `s` lies in `1..=TAG_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedKey {
    /// Block that gets every bit complemented.
    pub bf: usize,
    /// Second block of the swap pair.
    pub by: usize,
    /// First block of the swap pair.
    pub bx: usize,
    /// Starting bit offset of the swap window in `by`.
    pub py: u32,
    /// Starting bit offset of the swap window in `bx`.
    pub px: u32,
    /// Number of bits exchanged by the swap.
    pub s: u32,
    /// Left-rotation amount applied to block `bs`.
    pub r: u32,
    /// Block that gets rotated.
    pub bs: usize,
}

impl DecodedKey {
    /// Decodes a raw 32-bit key.
    ///
    /// Every field is reduced into its domain, with a raw swap width of 0
    /// meaning a full block. Total over all `u32` inputs.
    ///
    /// # Examples
    ///
    /// ```
    /// use tallytag::DecodedKey;
    ///
    /// let k = DecodedKey::decode(0x3211_0000);
    /// assert_eq!((k.bf, k.by, k.bx), (1, 4, 4));
    /// assert_eq!((k.px, k.s, k.r), (2, 4, 2));
    /// ```
    pub fn decode(raw: u32) -> Self {
        let field3 = |shift: u32| ((raw >> shift) & MASK3) as usize % NUM_BLOCKS;
        let field2 = |shift: u32| ((raw >> shift) & MASK2) % TAG_SIZE;

        let s = match ((raw >> S_SHIFT) & MASK2) % TAG_SIZE {
            0 => TAG_SIZE,
            s => s,
        };

        DecodedKey {
            bf: field3(BF_SHIFT),
            by: field3(BY_SHIFT),
            bx: field3(BX_SHIFT),
            py: field2(PY_SHIFT),
            px: field2(PX_SHIFT),
            s,
            r: field2(R_SHIFT),
            bs: field3(BS_SHIFT),
        }
    }

    /// Builds a key from explicit parameters.
    ///
    /// # Parameters
    /// - `bf`, `by`, `bx`, `bs`: Block indices in `0..NUM_BLOCKS`.
    /// - `py`, `px`, `r`: Bit offsets and rotation in `0..TAG_SIZE`.
    /// - `s`: Swap width in `1..=TAG_SIZE`.
    ///
    /// # Returns
    /// The key, unchanged; nothing is reduced.
    ///
    /// # Errors
    /// Returns [`TagError::ValueOutOfRange`] naming the first field outside
    /// its domain.
    ///
    /// # Examples
    ///
    /// ```
    /// use tallytag::DecodedKey;
    ///
    /// let k = DecodedKey::new(1, 4, 4, 0, 2, 4, 2, 0).unwrap();
    /// assert_eq!(k, DecodedKey::decode(0x3211_0000));
    /// assert!(DecodedKey::new(0, 0, 0, 0, 0, 0, 0, 0).is_err());
    /// ```
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bf: usize,
        by: usize,
        bx: usize,
        py: u32,
        px: u32,
        s: u32,
        r: u32,
        bs: usize,
    ) -> Result<Self, TagError> {
        let key = DecodedKey {
            bf,
            by,
            bx,
            py,
            px,
            s,
            r,
            bs,
        };
        key.validate()?;
        Ok(key)
    }

    /// Reduces every field into its domain the same way [`decode`](Self::decode)
    /// reduces raw key bits.
    ///
    /// Keys built by hand may carry out-of-range fields; the transform only
    /// ever sees the normalized form.
    pub fn normalized(&self) -> Self {
        let s = match self.s % TAG_SIZE {
            0 => TAG_SIZE,
            s => s,
        };
        DecodedKey {
            bf: self.bf % NUM_BLOCKS,
            by: self.by % NUM_BLOCKS,
            bx: self.bx % NUM_BLOCKS,
            py: self.py % TAG_SIZE,
            px: self.px % TAG_SIZE,
            s,
            r: self.r % TAG_SIZE,
            bs: self.bs % NUM_BLOCKS,
        }
    }

    /// Checks that every field lies in its domain.
    ///
    /// # Errors
    /// Returns [`TagError::ValueOutOfRange`] naming the first bad field.
    pub fn validate(&self) -> Result<(), TagError> {
        let blocks = [("bf", self.bf), ("by", self.by), ("bx", self.bx), ("bs", self.bs)];
        for (field, value) in blocks {
            if value >= NUM_BLOCKS {
                return Err(TagError::ValueOutOfRange {
                    field,
                    value: value as u64,
                    bits: 3,
                });
            }
        }
        let offsets = [("py", self.py), ("px", self.px), ("r", self.r)];
        for (field, value) in offsets {
            if value >= TAG_SIZE {
                return Err(TagError::ValueOutOfRange {
                    field,
                    value: value as u64,
                    bits: 2,
                });
            }
        }
        if self.s == 0 || self.s > TAG_SIZE {
            return Err(TagError::ValueOutOfRange {
                field: "s",
                value: self.s as u64,
                bits: 2,
            });
        }
        Ok(())
    }

    /// Packs the parameters back into a raw key; the unused low 12 bits are zero.
    ///
    /// A full-block swap (`s == TAG_SIZE`) is written as raw 0.
    ///
    /// # Errors
    /// Returns [`TagError::ValueOutOfRange`] if a field is outside its domain.
    pub fn encode(&self) -> Result<u32, TagError> {
        self.validate()?;
        let s_raw = self.s % TAG_SIZE;
        Ok(((self.bf as u32) << BF_SHIFT)
            | ((self.by as u32) << BY_SHIFT)
            | ((self.bx as u32) << BX_SHIFT)
            | (self.py << PY_SHIFT)
            | (self.px << PX_SHIFT)
            | (s_raw << S_SHIFT)
            | (self.r << R_SHIFT)
            | ((self.bs as u32) << BS_SHIFT))
    }

    /// Whether the swap step has any effect for this key.
    pub fn swaps(&self) -> bool {
        self.bx != self.by
    }
}

impl From<u32> for DecodedKey {
    fn from(raw: u32) -> Self {
        DecodedKey::decode(raw)
    }
}

impl fmt::Display for DecodedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bf={} by={} bx={} py={} px={} s={} r={} bs={}",
            self.bf, self.by, self.bx, self.py, self.px, self.s, self.r, self.bs
        )
    }
}

/// Parses a key literal written as `0x` hex, `0b` binary or decimal.
///
/// Underscores between digits are ignored.
///
/// # Errors
/// Returns [`TagError::InvalidKeyLiteral`] if the literal is empty, has
/// invalid digits, or does not fit in 32 bits.
pub fn parse_key_literal(literal: &str) -> Result<u32, TagError> {
    let cleaned: String = literal.trim().chars().filter(|&c| c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else {
        (lower.as_str(), 10)
    };
    if digits.is_empty() {
        return Err(TagError::InvalidKeyLiteral(literal.to_string()));
    }
    u32::from_str_radix(digits, radix).map_err(|_| TagError::InvalidKeyLiteral(literal.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_zero_key() {
        let k = DecodedKey::decode(0);
        assert_eq!(
            k,
            DecodedKey {
                bf: 0,
                by: 0,
                bx: 0,
                py: 0,
                px: 0,
                s: 4,
                r: 0,
                bs: 0
            }
        );
    }

    #[test]
    fn test_decode_default_run_key() {
        let k = DecodedKey::decode(0x3211_0000);
        assert_eq!(
            k,
            DecodedKey {
                bf: 1,
                by: 4,
                bx: 4,
                py: 0,
                px: 2,
                s: 4,
                r: 2,
                bs: 0
            }
        );
        assert!(!k.swaps());
    }

    #[test]
    fn test_decode_every_field() {
        let k = DecodedKey::decode(0x55BC_D000);
        assert_eq!(k.to_string(), "bf=2 by=5 bx=3 py=1 px=3 s=2 r=1 bs=5");
        assert!(k.swaps());
    }

    #[test]
    fn test_decode_ignores_low_bits() {
        assert_eq!(DecodedKey::decode(0x55BC_D000), DecodedKey::decode(0x55BC_DFFF));
    }

    #[test]
    fn test_decode_all_ones() {
        let k = DecodedKey::decode(u32::MAX);
        assert_eq!(k.to_string(), "bf=7 by=7 bx=7 py=3 px=3 s=3 r=3 bs=7");
    }

    #[test]
    fn test_swap_width_zero_means_full_block() {
        for raw_s in 0..4u32 {
            let k = DecodedKey::decode(raw_s << S_SHIFT);
            let expected = if raw_s == 0 { TAG_SIZE } else { raw_s };
            assert_eq!(k.s, expected, "raw s={}", raw_s);
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        for raw in [0u32, 0x3211_0000, 0x55BC_D000, 0xE427_A000, 0xFFFF_F000] {
            let k = DecodedKey::decode(raw);
            assert_eq!(k.encode().unwrap(), raw, "raw=0x{:08X}", raw);
        }
    }

    #[test]
    fn test_validate_rejects_out_of_domain() {
        let mut k = DecodedKey::decode(0);
        k.bs = 8;
        assert_eq!(
            k.encode(),
            Err(TagError::ValueOutOfRange {
                field: "bs",
                value: 8,
                bits: 3
            })
        );

        let mut k = DecodedKey::decode(0);
        k.s = 0;
        assert!(matches!(
            k.validate(),
            Err(TagError::ValueOutOfRange { field: "s", .. })
        ));

        let mut k = DecodedKey::decode(0);
        k.r = 4;
        assert!(matches!(
            k.validate(),
            Err(TagError::ValueOutOfRange { field: "r", .. })
        ));
    }

    #[test]
    fn test_new_accepts_valid_fields() {
        let k = DecodedKey::new(7, 1, 0, 1, 0, 3, 3, 2).unwrap();
        assert_eq!(k, DecodedKey::decode(0xE427_A000));
        assert_eq!(k.encode().unwrap(), 0xE427_A000);
    }

    #[test]
    fn test_new_rejects_block_index() {
        assert_eq!(
            DecodedKey::new(0, 8, 0, 0, 0, 4, 0, 0),
            Err(TagError::ValueOutOfRange {
                field: "by",
                value: 8,
                bits: 3
            })
        );
    }

    #[test]
    fn test_new_rejects_offset_and_rotation() {
        assert_eq!(
            DecodedKey::new(0, 0, 0, 0, 4, 4, 0, 0),
            Err(TagError::ValueOutOfRange {
                field: "px",
                value: 4,
                bits: 2
            })
        );
        assert!(matches!(
            DecodedKey::new(0, 0, 0, 0, 0, 4, 5, 0),
            Err(TagError::ValueOutOfRange { field: "r", .. })
        ));
    }

    #[test]
    fn test_new_rejects_swap_width() {
        assert_eq!(
            DecodedKey::new(0, 0, 0, 0, 0, 0, 0, 0),
            Err(TagError::ValueOutOfRange {
                field: "s",
                value: 0,
                bits: 2
            })
        );
        assert!(DecodedKey::new(0, 0, 0, 0, 0, 5, 0, 0).is_err());
    }

    #[test]
    fn test_normalized() {
        let k = DecodedKey {
            bf: 9,
            by: 8,
            bx: 15,
            py: 5,
            px: 4,
            s: 8,
            r: 6,
            bs: 10,
        };
        assert_eq!(k.normalized().to_string(), "bf=1 by=0 bx=7 py=1 px=0 s=4 r=2 bs=2");
        assert!(k.normalized().validate().is_ok());

        let decoded = DecodedKey::decode(0xE427_A000);
        assert_eq!(decoded.normalized(), decoded);
    }

    #[test]
    fn test_from_u32() {
        let k: DecodedKey = 0xE427_A000.into();
        assert_eq!(k, DecodedKey::decode(0xE427_A000));
    }

    #[test]
    fn test_parse_key_literal_forms() {
        assert_eq!(parse_key_literal("0x32110000").unwrap(), 0x3211_0000);
        assert_eq!(parse_key_literal("0X3211_0000").unwrap(), 0x3211_0000);
        assert_eq!(parse_key_literal("0b101").unwrap(), 5);
        assert_eq!(parse_key_literal(" 4294967295 ").unwrap(), u32::MAX);
    }

    #[test]
    fn test_parse_key_literal_rejects() {
        for bad in ["", "0x", "0xZZ", "4294967296", "0x1_0000_0000", "-1", "0b2"] {
            assert_eq!(
                parse_key_literal(bad),
                Err(TagError::InvalidKeyLiteral(bad.to_string())),
                "literal {:?}",
                bad
            );
        }
    }
}
