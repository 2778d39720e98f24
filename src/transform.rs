//! Transform: the keyed Flip, Swap, Rotate, XOR-reduce pipeline.
//!
//! A record is split into `NUM_BLOCKS` blocks of `TAG_SIZE` bits and the
//! four steps are applied in that fixed order:
//!
//! ```text
//! record ──split──▶ [A0 .. A7]
//!                     │ Flip    A[bf] = !A[bf]
//!                     │ Swap    s bits, A[bx]@px <-> A[by]@py   (skipped when bx == by)
//!                     │ Rotate  A[bs] = rotl(A[bs], r)
//!                     ▼
//!                  A0 ^ A1 ^ .. ^ A7 = tag
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::blocks::split_record;
use crate::error::TagError;
use crate::key::DecodedKey;
use crate::utils::bits::{self, mask, to_binary_string};
use crate::{NUM_BLOCKS, TAG_SIZE};

/// How a cyclic swap offset is mapped onto a bit position inside a block.
///
/// Both conventions select `s` consecutive offsets `(p + i) mod TAG_SIZE`;
/// they disagree on which physical bit an offset names. The tags differ
/// whenever `1 < s < TAG_SIZE` or the windows start at different offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SwapConvention {
    /// Offset `o` names bit `o`, counted from the least significant bit.
    ///
    /// This is the convention the hardware comparison vectors are built with.
    #[default]
    LsbCyclic,
    /// Offset `o` names bit `TAG_SIZE - 1 - o`, i.e. counted from the most
    /// significant bit.
    MsbIndexed,
}

impl SwapConvention {
    /// Physical bit position (LSB = 0) for window element `i` starting at `p`.
    #[inline]
    fn bit_position(self, p: u32, i: u32) -> u32 {
        let offset = (p + i) % TAG_SIZE;
        match self {
            SwapConvention::LsbCyclic => offset,
            SwapConvention::MsbIndexed => TAG_SIZE - 1 - offset,
        }
    }
}

impl fmt::Display for SwapConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapConvention::LsbCyclic => write!(f, "lsb"),
            SwapConvention::MsbIndexed => write!(f, "msb"),
        }
    }
}

impl FromStr for SwapConvention {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lsb" | "lsb-cyclic" => Ok(SwapConvention::LsbCyclic),
            "msb" | "msb-indexed" => Ok(SwapConvention::MsbIndexed),
            _ => Err(TagError::UnknownSwapConvention(s.to_string())),
        }
    }
}

/// Complements every bit of a block.
#[inline]
pub fn flip_block(block: u8) -> u8 {
    !block & mask(TAG_SIZE) as u8
}

/// Exchanges `s` bits between blocks `a` and `b`.
///
/// The `i`-th bit of `a`'s window (starting at offset `pa`) trades places
/// with the `i`-th bit of `b`'s window (starting at offset `pb`). Offsets
/// wrap around the block. Returns the new `(a, b)`.
///
/// With `s == TAG_SIZE` and `pa == pb` the two blocks are exchanged whole;
/// with `pa != pb` each block receives the other rotated by the offset gap.
pub fn swap_windows(a: u8, b: u8, pa: u32, pb: u32, s: u32, convention: SwapConvention) -> (u8, u8) {
    let mut new_a = a;
    let mut new_b = b;
    for i in 0..s.min(TAG_SIZE) {
        let ia = convention.bit_position(pa, i);
        let ib = convention.bit_position(pb, i);
        new_a = bits::with_bit(new_a, ia, bits::bit(b, ib));
        new_b = bits::with_bit(new_b, ib, bits::bit(a, ia));
    }
    (new_a, new_b)
}

/// Rotates a block left by `r mod TAG_SIZE` positions.
#[inline]
pub fn rotate_block(block: u8, r: u32) -> u8 {
    bits::block_left_rotation(block, r, TAG_SIZE)
}

/// XORs all blocks together into a single `TAG_SIZE`-bit value.
pub fn xor_reduce(blocks: &[u8]) -> u8 {
    blocks.iter().fold(0u8, |acc, &b| acc ^ b) & mask(TAG_SIZE) as u8
}

/// Block states captured after each step of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagTrace {
    /// Blocks straight out of the splitter.
    pub split: [u8; NUM_BLOCKS],
    /// After Flip.
    pub flipped: [u8; NUM_BLOCKS],
    /// After Swap.
    pub swapped: [u8; NUM_BLOCKS],
    /// After Rotate.
    pub rotated: [u8; NUM_BLOCKS],
    /// XOR of the rotated blocks.
    pub tag: u8,
}

fn write_blocks(f: &mut fmt::Formatter<'_>, label: &str, blocks: &[u8]) -> fmt::Result {
    write!(f, "{:<7}:", label)?;
    for (i, &b) in blocks.iter().enumerate() {
        write!(f, " A{}={}", i, to_binary_string(b as u64, TAG_SIZE))?;
    }
    writeln!(f)
}

impl fmt::Display for TagTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_blocks(f, "split", &self.split)?;
        write_blocks(f, "flip", &self.flipped)?;
        write_blocks(f, "swap", &self.swapped)?;
        write_blocks(f, "rotate", &self.rotated)?;
        write!(f, "{:<7}: {}", "tag", to_binary_string(self.tag as u64, TAG_SIZE))
    }
}

/// Computes tags for records under one key.
///
/// The key is normalized on construction, so every block index the
/// pipeline touches is in range and tag computation cannot fail.
///
/// # Examples
///
/// ```
/// use tallytag::{DecodedKey, TagGenerator};
///
/// let generator = TagGenerator::new(DecodedKey::decode(0x3211_0000));
/// assert_eq!(generator.tag_of(0), 0b1111);
/// assert_eq!(generator.tag_of(1), 0b1011);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagGenerator {
    key: DecodedKey,
    convention: SwapConvention,
}

impl TagGenerator {
    /// Creates a generator using the canonical [`SwapConvention::LsbCyclic`].
    pub fn new(key: DecodedKey) -> Self {
        Self::with_convention(key, SwapConvention::default())
    }

    /// Creates a generator with an explicit swap convention.
    pub fn with_convention(key: DecodedKey, convention: SwapConvention) -> Self {
        let key = key.normalized();
        debug!(%key, %convention, "tag generator ready");
        TagGenerator { key, convention }
    }

    /// The normalized key in use.
    pub fn key(&self) -> &DecodedKey {
        &self.key
    }

    /// The swap convention in use.
    pub fn convention(&self) -> SwapConvention {
        self.convention
    }

    fn flip(&self, blocks: &mut [u8; NUM_BLOCKS]) {
        blocks[self.key.bf] = flip_block(blocks[self.key.bf]);
    }

    fn swap(&self, blocks: &mut [u8; NUM_BLOCKS]) {
        let k = &self.key;
        if !k.swaps() {
            return;
        }
        let (x, y) = swap_windows(blocks[k.bx], blocks[k.by], k.px, k.py, k.s, self.convention);
        blocks[k.bx] = x;
        blocks[k.by] = y;
    }

    fn rotate(&self, blocks: &mut [u8; NUM_BLOCKS]) {
        blocks[self.key.bs] = rotate_block(blocks[self.key.bs], self.key.r);
    }

    /// Computes the tag of a 31-bit record. Bit 31 of `record` is ignored.
    pub fn tag_of(&self, record: u32) -> u8 {
        let mut blocks = split_record(record);
        self.flip(&mut blocks);
        self.swap(&mut blocks);
        self.rotate(&mut blocks);
        xor_reduce(&blocks)
    }

    /// Runs the pipeline on `record` and keeps every intermediate state.
    pub fn trace(&self, record: u32) -> TagTrace {
        let split = split_record(record);
        let mut blocks = split;
        self.flip(&mut blocks);
        let flipped = blocks;
        self.swap(&mut blocks);
        let swapped = blocks;
        self.rotate(&mut blocks);
        TagTrace {
            split,
            flipped,
            swapped,
            rotated: blocks,
            tag: xor_reduce(&blocks),
        }
    }
}

/// Computes the tag of `record` under `key` with the canonical convention.
pub fn tag_of(record: u32, key: &DecodedKey) -> u8 {
    TagGenerator::new(*key).tag_of(record)
}
