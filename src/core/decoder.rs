//! Stored-representation decoding.
//!
//! This module turns stored representations back into addresses and
//! networks. Network host bits are zero-filled here, never on disk.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use tracing::trace;

use crate::core::packer::{bits_to_u128, pad_bits};
use crate::error::DecodeError;
use crate::types::IpVersion;

/// Split a representation into its version and bit string.
pub fn split_tag(repr: &str) -> Result<(IpVersion, &str), DecodeError> {
    let mut chars = repr.chars();
    let tag = chars.next().ok_or(DecodeError::Empty)?;
    let version = IpVersion::from_tag(tag).ok_or(DecodeError::UnsupportedVersion(tag))?;

    Ok((version, chars.as_str()))
}

fn address_from_bits(version: IpVersion, bits: &str) -> Result<IpAddr, DecodeError> {
    let value = bits_to_u128(bits)?;

    let addr = match version {
        IpVersion::V4 => {
            let value = u32::try_from(value)
                .map_err(|_| DecodeError::InvalidPrefix(format!("{} does not fit IPv4", value)))?;
            IpAddr::V4(Ipv4Addr::from(value))
        }
        IpVersion::V6 => IpAddr::V6(Ipv6Addr::from(value)),
    };

    Ok(addr)
}

/// Decode a stored representation into an address.
///
/// # Errors
///
/// Fails if the string is empty, the tag is not `4` or `6`, the bit count is
/// not the full width of the version, or a non-binary character is present.
///
/// # Examples
///
/// ```
/// use ipfields::{decode_address, DecodeError};
///
/// let addr = decode_address("400001010000000000000000000000001").unwrap();
/// assert_eq!(addr.to_string(), "10.0.0.1");
///
/// assert_eq!(decode_address("5").unwrap_err(), DecodeError::UnsupportedVersion('5'));
/// ```
pub fn decode_address(repr: &str) -> Result<IpAddr, DecodeError> {
    let (version, bits) = split_tag(repr)?;

    if bits.len() != version.bits() {
        return Err(DecodeError::InvalidLength {
            version: version.number(),
            expected: version.bits(),
            found: bits.len(),
        });
    }

    let addr = address_from_bits(version, bits)?;
    trace!(%repr, %addr, "decoded address");
    Ok(addr)
}

/// Decode a stored representation into a network.
///
/// The prefix length is the number of bits present; the remaining host bits
/// are filled with zeros.
///
/// # Examples
///
/// ```
/// use ipfields::decode_network;
///
/// let net = decode_network("400001010").unwrap();
/// assert_eq!(net.to_string(), "10.0.0.0/8");
///
/// let everything = decode_network("6").unwrap();
/// assert_eq!(everything.to_string(), "::/0");
/// ```
pub fn decode_network(repr: &str) -> Result<IpNet, DecodeError> {
    let (version, bits) = split_tag(repr)?;
    let prefix_len = bits.len();

    if prefix_len > version.bits() {
        return Err(DecodeError::InvalidLength {
            version: version.number(),
            expected: version.bits(),
            found: prefix_len,
        });
    }

    let padded = pad_bits(bits, version.bits());
    let prefix = prefix_len as u8;

    let net = match address_from_bits(version, &padded)? {
        IpAddr::V4(addr) => Ipv4Net::new(addr, prefix)
            .map(IpNet::V4)
            .map_err(|e| DecodeError::InvalidPrefix(e.to_string()))?,
        IpAddr::V6(addr) => Ipv6Net::new(addr, prefix)
            .map(IpNet::V6)
            .map_err(|e| DecodeError::InvalidPrefix(e.to_string()))?,
    };

    trace!(%repr, %net, "decoded network");
    Ok(net)
}
