//! Stored-representation encoding.
//!
//! A stored representation is the version tag followed by the address bits.
//! Networks keep only their first `prefix_len` bits, so the representation
//! of a network is a string prefix of every address it contains.

use std::net::IpAddr;

use ipnet::IpNet;
use tracing::trace;

use crate::core::packer::bytes_to_bits;
use crate::types::{IpValue, IpVersion};

/// Packed big-endian bytes of an address.
fn packed(addr: &IpAddr) -> Vec<u8> {
    match addr {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    }
}

/// Encode an address into its stored representation.
///
/// # Examples
///
/// ```
/// use ipfields::encode_address;
///
/// let repr = encode_address(&"10.0.0.1".parse().unwrap());
/// assert_eq!(repr, "400001010000000000000000000000001");
/// ```
pub fn encode_address(addr: &IpAddr) -> String {
    let version = IpVersion::of_addr(addr);
    let mut repr = String::with_capacity(version.bits() + 1);
    repr.push(version.tag());
    repr.push_str(&bytes_to_bits(&packed(addr)));

    trace!(%addr, %repr, "encoded address");
    repr
}

/// Encode a network into its stored representation.
///
/// Host bits are dropped, not zero-filled: the bit string is exactly
/// `prefix_len` characters long.
///
/// # Examples
///
/// ```
/// use ipfields::encode_network;
///
/// assert_eq!(encode_network(&"10.0.0.0/8".parse().unwrap()), "400001010");
/// assert_eq!(encode_network(&"0.0.0.0/0".parse().unwrap()), "4");
/// ```
pub fn encode_network(net: &IpNet) -> String {
    let version = IpVersion::of_net(net);
    let prefix_len = net.prefix_len() as usize;
    let bits = bytes_to_bits(&packed(&net.network()));

    let mut repr = String::with_capacity(prefix_len + 1);
    repr.push(version.tag());
    repr.push_str(&bits[..prefix_len]);

    trace!(%net, %repr, "encoded network");
    repr
}

/// Encode either kind of value.
pub fn encode_value(value: &IpValue) -> String {
    match value {
        IpValue::Address(addr) => encode_address(addr),
        IpValue::Network(net) => encode_network(net),
    }
}

/// Column capacity needed for representations of `version`.
///
/// An unpinned column has to hold either version, so it is sized for IPv6.
pub fn max_representation_length(version: Option<IpVersion>) -> usize {
    version.unwrap_or(IpVersion::V6).bits() + 1
}
