//! Error types for the tallytag library.

use std::fmt;

/// Errors produced by the tallytag library.
///
/// The tag transform itself is total; these only surface from the checked
/// constructors and parsers around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// A field value does not fit its declared bit width.
    ValueOutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The value that was supplied.
        value: u64,
        /// Declared width of the field, in bits.
        bits: u32,
    },
    /// Block width is outside the supported range [1, 8].
    InvalidBlockWidth(u32),
    /// A key literal could not be parsed as a 32-bit value.
    InvalidKeyLiteral(String),
    /// The swap convention name is not recognised.
    UnknownSwapConvention(String),
    /// The record policy name is not recognised.
    UnknownRecordPolicy(String),
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagError::ValueOutOfRange { field, value, bits } => {
                write!(f, "Value {} for field '{}' exceeds {} bits", value, field, bits)
            }
            TagError::InvalidBlockWidth(width) => {
                write!(f, "Block width {} is outside the valid range [1, 8]", width)
            }
            TagError::InvalidKeyLiteral(literal) => {
                write!(f, "Invalid 32-bit key literal '{}'", literal)
            }
            TagError::UnknownSwapConvention(name) => {
                write!(f, "Unknown swap convention '{}' (expected lsb or msb)", name)
            }
            TagError::UnknownRecordPolicy(name) => {
                write!(
                    f,
                    "Unknown record policy '{}' (expected plain or testbench)",
                    name
                )
            }
        }
    }
}

impl std::error::Error for TagError {}

/// Checks that `value` fits in `bits` bits.
pub(crate) fn check_width(field: &'static str, value: u64, bits: u32) -> Result<(), TagError> {
    if value & !crate::utils::bits::mask(bits) != 0 {
        return Err(TagError::ValueOutOfRange { field, value, bits });
    }
    Ok(())
}
