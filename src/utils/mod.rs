//! Shared bit-level helpers.

pub mod bits;
