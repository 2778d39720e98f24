//! Keyed 4-bit integrity tags for fixed-width tally records.
//!
//! A 31-bit record is split into eight 4-bit blocks, and a 32-bit key
//! selects which blocks get flipped, bit-swapped and rotated before all
//! blocks are XORed into a 4-bit tag. The tag is a lightweight tamper
//! marker for hardware test vectors, not a cryptographic digest.
//!
//! # Architecture
//!
//! ```text
//! DecodedKey  (key)        32-bit key -> eight structural parameters
//!     │
//! split       (blocks)     record -> [A0 .. A7], A0 least significant
//!     │
//! TagGenerator (transform) Flip -> Swap -> Rotate -> XOR-reduce
//!     │
//! pack        (packer)     tag | tally | candidate | district
//! ```
//!
//! # Examples
//!
//! ```
//! use tallytag::{pack, DecodedKey, TagGenerator};
//!
//! let generator = TagGenerator::new(DecodedKey::decode(0x3211_0000));
//! let tag = generator.tag_of(0x0000_0001);
//! assert_eq!(tag, 0b1011);
//! assert_eq!(pack(tag, 0, 0, 1), 0b1011_0000_0000_0001);
//! ```
//!
//! Pick the superseded MSB-indexed swap convention explicitly:
//!
//! ```
//! use tallytag::{DecodedKey, SwapConvention, TagGenerator};
//!
//! let key = DecodedKey::decode(0xE427_A000);
//! let msb = TagGenerator::with_convention(key, SwapConvention::MsbIndexed);
//! assert_eq!(msb.tag_of(1), 0b1110);
//! assert_eq!(TagGenerator::new(key).tag_of(1), 0b1101);
//! ```

#![deny(clippy::all)]

pub mod blocks;
pub mod error;
pub mod key;
pub mod packer;
pub mod record;
pub mod transform;
pub mod utils;
pub mod vectors;

pub use error::TagError;
pub use key::{parse_key_literal, DecodedKey};
pub use packer::{pack, unpack, PackedWord};
pub use record::{RecordPolicy, TallyEntry};
pub use transform::{tag_of, SwapConvention, TagGenerator, TagTrace};
pub use vectors::{sanity_vectors, TestVector, VectorTable};

/// Width of a block and of the resulting tag, in bits.
pub const TAG_SIZE: u32 = 4;

/// Width of a record, in bits.
pub const RECORD_SIZE: u32 = 31;

/// Number of blocks a record is split into.
pub const NUM_BLOCKS: usize = RECORD_SIZE.div_ceil(TAG_SIZE) as usize;

/// Key used by the hardware testbench runs.
pub const DEFAULT_KEY: u32 = 0x3211_0000;
