//! Error types for encoding, decoding and querying IP fields.

use thiserror::Error;

/// Errors raised while decoding a stored representation.
///
/// A decoding failure always means the stored string is corrupt: it was not
/// produced by the encoder, or it was damaged by a migration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The stored representation is the empty string.
    #[error("Empty stored representation")]
    Empty,

    /// The leading tag character does not name a supported IP version.
    #[error("Unsupported protocol version: {0}")]
    UnsupportedVersion(char),

    /// The number of bits after the tag does not fit the version.
    #[error("Invalid bit count for IPv{version}: expected {expected}, found {found}")]
    InvalidLength {
        /// IP version named by the tag
        version: u8,
        /// Expected number of bits (an upper bound for networks)
        expected: usize,
        /// Number of bits actually present
        found: usize,
    },

    /// A character other than `'0'` or `'1'` appeared in the bit string.
    #[error("Invalid bit {found:?} at position {position}")]
    InvalidBit {
        /// Offset within the bit string, not counting the tag
        position: usize,
        /// The offending character
        found: char,
    },

    /// The address or network constructor rejected the decoded value.
    #[error("Invalid prefix: {0}")]
    InvalidPrefix(String),
}

/// Errors that can occur when converting or querying IP field values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IpFieldError {
    /// A stored representation could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A query operand is neither an IP value nor text that parses as one.
    #[error("{0}")]
    InvalidOperand(String),

    /// A value was rejected by a field.
    #[error("{0}")]
    Validation(String),

    /// A field was declared with options it cannot honor.
    #[error("Improperly configured: {0}")]
    Configuration(String),
}

impl IpFieldError {
    /// Whether this error was caused by a corrupt stored representation.
    pub fn is_decode(&self) -> bool {
        matches!(self, IpFieldError::Decode(_))
    }
}
