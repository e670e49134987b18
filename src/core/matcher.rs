//! Relationship matching over stored representations.
//!
//! Containment between networks and addresses reduces to a string-prefix
//! test on their representations. This module resolves operands to
//! representations and evaluates the relationships in memory; the SQL
//! rendition of the same tests lives in [`crate::sql::lookup`].

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

use tracing::debug;

use crate::core::encoder::{encode_address, encode_network};
use crate::error::IpFieldError;
use crate::types::{parse_address, parse_network, Operand};

/// Networks considered private by the `isprivate` lookup, as
/// `(network address, prefix length)`.
pub const PRIVATE_NETWORKS: [(IpAddr, u8); 5] = [
    (IpAddr::V4(Ipv4Addr::new(192, 168, 0, 0)), 16),
    (IpAddr::V4(Ipv4Addr::new(10, 0, 0, 0)), 8),
    (IpAddr::V4(Ipv4Addr::new(172, 16, 0, 0)), 12),
    (IpAddr::V6(Ipv6Addr::new(0xfc00, 0, 0, 0, 0, 0, 0, 0)), 8),
    (IpAddr::V6(Ipv6Addr::new(0xfd00, 0, 0, 0, 0, 0, 0, 0)), 8),
];

/// Stored representations of [`PRIVATE_NETWORKS`], in the same order.
pub fn private_network_reprs() -> &'static [String] {
    static REPRS: OnceLock<Vec<String>> = OnceLock::new();

    REPRS.get_or_init(|| {
        PRIVATE_NETWORKS
            .iter()
            .map(|(addr, prefix_len)| {
                // tag plus the prefix bits
                let mut repr = encode_address(addr);
                repr.truncate(1 + *prefix_len as usize);
                repr
            })
            .collect()
    })
}

/// Resolve a lookup operand to its stored representation.
///
/// Text is parsed as an address first and as a network second.
///
/// # Errors
///
/// Returns [`IpFieldError::InvalidOperand`] for text that parses as neither,
/// and for operands that are not IP values or text.
///
/// # Examples
///
/// ```
/// use ipfields::{normalize_rhs, Operand};
///
/// assert_eq!(normalize_rhs(&Operand::from("10.0.0.0/8")).unwrap(), "400001010");
/// assert!(normalize_rhs(&Operand::from("192.168.1.0.1")).is_err());
/// ```
pub fn normalize_rhs(value: &Operand) -> Result<String, IpFieldError> {
    match value {
        Operand::Address(addr) => Ok(encode_address(addr)),
        Operand::Network(net) => Ok(encode_network(net)),
        Operand::Text(text) => {
            if let Ok(addr) = parse_address(text, None) {
                return Ok(encode_address(&addr));
            }
            match parse_network(text, None) {
                Ok(net) => Ok(encode_network(&net)),
                Err(_) => {
                    debug!(operand = %text, "rejected lookup operand");
                    Err(IpFieldError::InvalidOperand(format!(
                        "{} does not appear to be an IPv4, IPv6 address or network.",
                        text
                    )))
                }
            }
        }
        other => Err(IpFieldError::InvalidOperand(format!(
            "Invalid rhs for lookup: got {}. Must be one of str, address or network.",
            other.kind_name()
        ))),
    }
}

/// Whether `container_repr` denotes a network containing `contained_repr`.
///
/// Both arguments are stored representations. Representations of different
/// versions never contain each other since their tags differ.
pub fn contains(container_repr: &str, contained_repr: &str) -> bool {
    contained_repr.starts_with(container_repr)
}

/// Whether `lhs` lies within the network denoted by `rhs`.
///
/// # Examples
///
/// ```
/// use ipfields::{is_subnet_of, Operand};
///
/// let inner = Operand::from("192.168.1.0/24");
/// assert!(is_subnet_of(&inner, &Operand::from("192.168.0.0/16")).unwrap());
/// assert!(!is_subnet_of(&inner, &Operand::from("192.168.1.128/25")).unwrap());
/// ```
pub fn is_subnet_of(lhs: &Operand, rhs: &Operand) -> Result<bool, IpFieldError> {
    Ok(contains(&normalize_rhs(rhs)?, &normalize_rhs(lhs)?))
}

/// Whether `lhs` contains the network or address denoted by `rhs`.
pub fn is_supernet_of(lhs: &Operand, rhs: &Operand) -> Result<bool, IpFieldError> {
    Ok(contains(&normalize_rhs(lhs)?, &normalize_rhs(rhs)?))
}

/// Whether the representation lies within one of the private networks.
pub fn is_private_repr(repr: &str) -> bool {
    private_network_reprs()
        .iter()
        .any(|private| contains(private, repr))
}

/// Whether `value` lies within one of the private networks.
pub fn is_private(value: &Operand) -> Result<bool, IpFieldError> {
    Ok(is_private_repr(&normalize_rhs(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipnet::IpNet;

    #[test]
    fn test_private_network_reprs() {
        let reprs = private_network_reprs();
        assert_eq!(reprs.len(), PRIVATE_NETWORKS.len());
        assert_eq!(reprs[0], "41100000010101000");
        assert_eq!(reprs[1], "400001010");
        assert_eq!(reprs[2], "4101011000001");
        assert_eq!(reprs[3], "611111100");
        assert_eq!(reprs[4], "611111101");
    }

    #[test]
    fn test_private_networks_match_their_cidr_text() {
        let texts = ["192.168.0.0/16", "10.0.0.0/8", "172.16.0.0/12", "fc00::/8", "fd00::/8"];

        for ((addr, prefix_len), text) in PRIVATE_NETWORKS.iter().zip(texts) {
            let net: IpNet = text.parse().unwrap();
            assert_eq!(net.addr(), *addr, "address mismatch for {}", text);
            assert_eq!(net.prefix_len(), *prefix_len, "prefix mismatch for {}", text);
            assert_eq!(net.trunc(), net, "{} has host bits set", text);
        }

        for (repr, text) in private_network_reprs().iter().zip(texts) {
            assert_eq!(*repr, encode_network(&text.parse().unwrap()));
        }
    }

    #[test]
    fn test_normalize_rhs_prefers_address() {
        let addr: IpAddr = "10.0.0.1".parse().unwrap();
        assert_eq!(normalize_rhs(&Operand::from("10.0.0.1")).unwrap(), encode_address(&addr));
    }

    #[test]
    fn test_normalize_rhs_rejects_malformed_text() {
        let err = normalize_rhs(&Operand::from("192.168.1.0.1")).unwrap_err();
        match err {
            IpFieldError::InvalidOperand(msg) => assert!(msg.contains("192.168.1.0.1")),
            other => panic!("Expected InvalidOperand, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_rhs_rejects_other_kinds() {
        for operand in [Operand::Bool(true), Operand::Integer(10), Operand::Null] {
            assert!(matches!(
                normalize_rhs(&operand),
                Err(IpFieldError::InvalidOperand(_))
            ));
        }
    }

    #[test]
    fn test_subnet_and_supernet() {
        let net24 = Operand::from("192.168.1.0/24");
        let net16 = Operand::from("192.168.0.0/16");
        let net8 = Operand::from("192.0.0.0/8");

        assert!(is_subnet_of(&net24, &net16).unwrap());
        assert!(!is_subnet_of(&net16, &net24).unwrap());
        assert!(is_supernet_of(&net16, &net24).unwrap());
        assert!(is_supernet_of(&net8, &net16).unwrap());
        assert!(!is_supernet_of(&net16, &net8).unwrap());
    }

    #[test]
    fn test_address_operands() {
        let net = Operand::from("192.168.0.0/16");
        let addr = Operand::from("192.168.1.1");

        assert!(is_subnet_of(&addr, &net).unwrap());
        assert!(is_supernet_of(&net, &addr).unwrap());
        assert!(!is_subnet_of(&Operand::from("192.168.1.0/24"), &addr).unwrap());
    }

    #[test]
    fn test_zero_prefix_contains_everything() {
        let everything = Operand::from("0.0.0.0/0");
        assert!(is_subnet_of(&Operand::from("8.8.8.8"), &everything).unwrap());
        assert!(is_subnet_of(&Operand::from("255.255.255.255"), &everything).unwrap());
        assert!(!is_subnet_of(&Operand::from("::1"), &everything).unwrap());
    }

    #[test]
    fn test_is_private() {
        assert!(is_private(&Operand::from("10.1.2.3")).unwrap());
        assert!(is_private(&Operand::from("172.31.255.255")).unwrap());
        assert!(is_private(&Operand::from("fd12::1")).unwrap());
        assert!(!is_private(&Operand::from("8.8.8.8")).unwrap());
        assert!(!is_private(&Operand::from("172.32.0.0")).unwrap());
        assert!(!is_private(&Operand::from("111.111.111.0/24")).unwrap());
    }

    #[test]
    fn test_wider_network_is_not_private() {
        // 10.0.0.0/7 covers more than the private block
        assert!(!is_private(&Operand::from("10.0.0.0/7")).unwrap());
    }
}
