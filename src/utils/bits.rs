//! Bit helpers for narrow fixed-width values.
//!
//! Blocks in this crate are at most 8 bits wide and are carried in a `u8`.
//! Every helper here takes the logical width explicitly so that bits above
//! the width are never observed.

/// Largest block width, in bits, that fits the `u8` block carrier.
pub const MAX_BLOCK_BITS: u32 = 8;

/// Returns a mask with the low `bits` bits set.
///
/// # Parameters
/// - `bits`: Number of low bits to set. Values of 64 or more saturate.
///
/// # Returns
/// `2^bits - 1`, or `u64::MAX` when `bits >= 64`.
pub fn mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Rotates a `width`-bit block left (toward its most significant bit).
///
/// The bit leaving the top re-enters at bit 0. Bits of `value` above
/// `width` are discarded first.
///
/// # Parameters
/// - `value`: The block to rotate.
/// - `shift`: Rotation amount; reduced modulo `width`, so `width` is the identity.
/// - `width`: Block width in bits, 1..=8. Callers guarantee the range.
///
/// # Returns
/// The rotated block, confined to its low `width` bits.
#[inline]
pub(crate) fn block_left_rotation(value: u8, shift: u32, width: u32) -> u8 {
    debug_assert!((1..=MAX_BLOCK_BITS).contains(&width));
    let m = mask(width) as u32;
    let v = value as u32 & m;
    let shift = shift % width;
    if shift == 0 {
        return v as u8;
    }
    (((v << shift) | (v >> (width - shift))) & m) as u8
}

/// Renders the low `width` bits of `value` as `0`/`1` characters.
///
/// # Parameters
/// - `value`: The value to render.
/// - `width`: Number of characters to produce; higher bits are ignored.
///
/// # Returns
/// A `width`-character string, most significant bit first, zero-padded.
pub fn to_binary_string(value: u64, width: u32) -> String {
    (0..width)
        .rev()
        .map(|i| if (value >> i) & 1 == 1 { '1' } else { '0' })
        .collect()
}

/// Reads bit `pos` (LSB = 0) of `value`.
#[inline]
pub(crate) fn bit(value: u8, pos: u32) -> u8 {
    (value >> pos) & 1
}

/// Returns `value` with bit `pos` set to the low bit of `b`.
#[inline]
pub(crate) fn with_bit(value: u8, pos: u32, b: u8) -> u8 {
    (value & !(1 << pos)) | ((b & 1) << pos)
}
