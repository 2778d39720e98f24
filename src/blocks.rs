//! BlockSplitter: partitions a zero-padded record into fixed-size blocks.
//!
//! Block 0 always holds the least significant `block_bits` of the record.

use crate::error::TagError;
use crate::utils::bits::{mask, MAX_BLOCK_BITS};
use crate::{NUM_BLOCKS, RECORD_SIZE, TAG_SIZE};

/// Widest record the splitter accepts, in bits.
pub const MAX_RECORD_BITS: u32 = 64;

/// Number of blocks needed to cover a record.
///
/// # Parameters
/// - `record_bits`: Record width in bits.
/// - `block_bits`: Block width in bits; must be non-zero.
///
/// # Returns
/// `ceil(record_bits / block_bits)`.
pub fn block_count(record_bits: u32, block_bits: u32) -> usize {
    record_bits.div_ceil(block_bits) as usize
}

fn check_geometry(record_bits: u32, block_bits: u32) -> Result<(), TagError> {
    if block_bits == 0 || block_bits > MAX_BLOCK_BITS {
        return Err(TagError::InvalidBlockWidth(block_bits));
    }
    if record_bits == 0 || record_bits > MAX_RECORD_BITS {
        return Err(TagError::ValueOutOfRange {
            field: "record_bits",
            value: record_bits as u64,
            bits: MAX_RECORD_BITS,
        });
    }
    Ok(())
}

/// Splits `record` into `ceil(record_bits / block_bits)` blocks, LSB block first.
///
/// Bits of `record` above `record_bits` are dropped before splitting; the
/// top block is zero-extended on its most significant side.
///
/// # Errors
/// - [`TagError::InvalidBlockWidth`] if `block_bits` is 0 or above 8.
/// - [`TagError::ValueOutOfRange`] if `record_bits` is 0 or above 64.
///
/// # Examples
///
/// ```
/// use tallytag::blocks::split;
///
/// let blocks = split(0x123, 12, 4).unwrap();
/// assert_eq!(blocks, vec![0x3, 0x2, 0x1]);
/// ```
pub fn split(record: u64, record_bits: u32, block_bits: u32) -> Result<Vec<u8>, TagError> {
    check_geometry(record_bits, block_bits)?;
    let value = record & mask(record_bits);
    let block_mask = mask(block_bits);
    let blocks = (0..block_count(record_bits, block_bits))
        .map(|i| ((value >> (i as u32 * block_bits)) & block_mask) as u8)
        .collect();
    Ok(blocks)
}

/// Splits a record with the fixed tag geometry.
///
/// Equivalent to `split(record, RECORD_SIZE, TAG_SIZE)` without the
/// geometry checks, which always pass for the fixed constants.
///
/// # Parameters
/// - `record`: The record value. Bit 31 lies outside the record and is dropped.
///
/// # Returns
/// `NUM_BLOCKS` blocks of `TAG_SIZE` bits, least significant block first.
pub fn split_record(record: u32) -> [u8; NUM_BLOCKS] {
    let value = record as u64 & mask(RECORD_SIZE);
    let block_mask = mask(TAG_SIZE);
    let mut blocks = [0u8; NUM_BLOCKS];
    for (i, block) in blocks.iter_mut().enumerate() {
        *block = ((value >> (i as u32 * TAG_SIZE)) & block_mask) as u8;
    }
    blocks
}

/// Reassembles blocks produced by [`split`] into the zero-extended record.
///
/// Block bits above `block_bits` are ignored.
///
/// # Errors
/// - [`TagError::InvalidBlockWidth`] if `block_bits` is 0 or above 8.
/// - [`TagError::ValueOutOfRange`] if the blocks span more than 64 bits.
pub fn join(blocks: &[u8], block_bits: u32) -> Result<u64, TagError> {
    if block_bits == 0 || block_bits > MAX_BLOCK_BITS {
        return Err(TagError::InvalidBlockWidth(block_bits));
    }
    let total_bits = blocks.len() as u64 * block_bits as u64;
    if total_bits > MAX_RECORD_BITS as u64 {
        return Err(TagError::ValueOutOfRange {
            field: "record_bits",
            value: total_bits,
            bits: MAX_RECORD_BITS,
        });
    }
    let block_mask = mask(block_bits);
    Ok(blocks
        .iter()
        .rev()
        .fold(0u64, |acc, &b| (acc << block_bits) | (b as u64 & block_mask)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_count() {
        assert_eq!(block_count(RECORD_SIZE, TAG_SIZE), NUM_BLOCKS);
        assert_eq!(block_count(32, 4), 8);
        assert_eq!(block_count(33, 4), 9);
        assert_eq!(block_count(1, 8), 1);
    }

    #[test]
    fn test_split_lsb_first() {
        let blocks = split(0x0123_4567, RECORD_SIZE, TAG_SIZE).unwrap();
        assert_eq!(blocks, vec![0x7, 0x6, 0x5, 0x4, 0x3, 0x2, 0x1, 0x0]);
    }

    #[test]
    fn test_split_zero_extends_top_block() {
        // 27 ones: block 6 keeps three bits, block 7 is padding
        let blocks = split(0x07FF_FFFF, RECORD_SIZE, TAG_SIZE).unwrap();
        assert_eq!(blocks, vec![0xF, 0xF, 0xF, 0xF, 0xF, 0xF, 0x7, 0x0]);
    }

    #[test]
    fn test_split_masks_excess_bits() {
        // bit 31 lies outside a 31-bit record
        let blocks = split(0xFFFF_FFFF, RECORD_SIZE, TAG_SIZE).unwrap();
        assert_eq!(blocks[7], 0x7);
        assert!(blocks[..7].iter().all(|&b| b == 0xF));
    }

    #[test]
    fn test_split_other_geometries() {
        assert_eq!(split(0b1_0110, 5, 2).unwrap(), vec![0b10, 0b01, 0b01]);
        assert_eq!(split(0xABCD, 16, 8).unwrap(), vec![0xCD, 0xAB]);
        assert_eq!(split(u64::MAX, 64, 8).unwrap(), vec![0xFF; 8]);
        assert_eq!(split(u64::MAX, 64, 3).unwrap().len(), 22);
    }

    #[test]
    fn test_split_invalid_geometry() {
        assert_eq!(split(0, 31, 0), Err(TagError::InvalidBlockWidth(0)));
        assert_eq!(split(0, 31, 9), Err(TagError::InvalidBlockWidth(9)));
        assert!(matches!(
            split(0, 0, 4),
            Err(TagError::ValueOutOfRange { field: "record_bits", .. })
        ));
        assert!(matches!(
            split(0, 65, 4),
            Err(TagError::ValueOutOfRange { field: "record_bits", .. })
        ));
    }

    #[test]
    fn test_join_inverts_split() {
        for record in [0u64, 1, 0x0123_4567, 0x05A5_A5A5, 0x7FFF_FFFF] {
            let blocks = split(record, RECORD_SIZE, TAG_SIZE).unwrap();
            assert_eq!(join(&blocks, TAG_SIZE).unwrap(), record);
        }
        let full = split(u64::MAX, 64, 8).unwrap();
        assert_eq!(join(&full, 8).unwrap(), u64::MAX);
    }

    #[test]
    fn test_split_record_matches_split() {
        for record in [0u32, 1, 0x0123_4567, 0x05A5_A5A5, 0x07FF_FFFF, u32::MAX] {
            let fixed = split_record(record);
            let general = split(record as u64, RECORD_SIZE, TAG_SIZE).unwrap();
            assert_eq!(fixed.to_vec(), general, "record=0x{:08X}", record);
        }
    }

    #[test]
    fn test_join_rejects() {
        assert_eq!(join(&[1, 2], 0), Err(TagError::InvalidBlockWidth(0)));
        assert!(join(&[0; 17], 4).is_err());
        assert_eq!(join(&[], 4).unwrap(), 0);
    }
}
