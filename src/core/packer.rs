//! Bit-string packing for stored representations.
//!
//! Bits are rendered most-significant first, one ASCII `'0'`/`'1'` per bit,
//! bytes concatenated in network byte order.

use crate::error::DecodeError;

/// Expand bytes into a bit string, 8 characters per byte.
pub fn bytes_to_bits(bytes: &[u8]) -> String {
    let mut bits = String::with_capacity(bytes.len() * 8);

    for byte in bytes {
        for shift in (0..8).rev() {
            bits.push(if (byte >> shift) & 1 == 1 { '1' } else { '0' });
        }
    }

    bits
}

/// Right-pad a bit string with `'0'` up to `width` characters.
///
/// Strings already at or over `width` are returned unchanged.
pub fn pad_bits(bits: &str, width: usize) -> String {
    let mut padded = String::with_capacity(width.max(bits.len()));
    padded.push_str(bits);

    while padded.len() < width {
        padded.push('0');
    }

    padded
}

/// Interpret a bit string of at most 128 characters as an unsigned integer.
///
/// The empty string is zero.
pub fn bits_to_u128(bits: &str) -> Result<u128, DecodeError> {
    let mut value = 0u128;

    for (position, ch) in bits.chars().enumerate() {
        let bit = match ch {
            '0' => 0,
            '1' => 1,
            found => return Err(DecodeError::InvalidBit { position, found }),
        };
        value = value
            .checked_mul(2)
            .ok_or_else(|| DecodeError::InvalidPrefix("bit string exceeds 128 bits".to_string()))?
            | bit;
    }

    Ok(value)
}
