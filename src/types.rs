//! Core data structures for IP field values and query operands.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use serde::{Deserialize, Serialize};

/// IP protocol version of an address or network.
///
/// Serialized as the bare integer `4` or `6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum IpVersion {
    /// IPv4, 32-bit addresses
    V4,
    /// IPv6, 128-bit addresses
    V6,
}

impl IpVersion {
    /// Address width in bits.
    pub const fn bits(self) -> usize {
        match self {
            IpVersion::V4 => 32,
            IpVersion::V6 => 128,
        }
    }

    /// Version number (4 or 6).
    pub const fn number(self) -> u8 {
        match self {
            IpVersion::V4 => 4,
            IpVersion::V6 => 6,
        }
    }

    /// Tag character that leads a stored representation.
    pub const fn tag(self) -> char {
        match self {
            IpVersion::V4 => '4',
            IpVersion::V6 => '6',
        }
    }

    /// Look up the version named by a tag character.
    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            '4' => Some(IpVersion::V4),
            '6' => Some(IpVersion::V6),
            _ => None,
        }
    }

    /// Version of an address.
    pub fn of_addr(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => IpVersion::V4,
            IpAddr::V6(_) => IpVersion::V6,
        }
    }

    /// Version of a network.
    pub fn of_net(net: &IpNet) -> Self {
        match net {
            IpNet::V4(_) => IpVersion::V4,
            IpNet::V6(_) => IpVersion::V6,
        }
    }
}

impl TryFrom<u8> for IpVersion {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(IpVersion::V4),
            6 => Ok(IpVersion::V6),
            other => Err(format!("ip_version must be one of 4, 6 or null, got {}", other)),
        }
    }
}

impl From<IpVersion> for u8 {
    fn from(version: IpVersion) -> Self {
        version.number()
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IPv{}", self.number())
    }
}

/// A decoded IP value: a single host address or a CIDR network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpValue {
    /// Single host address
    Address(IpAddr),
    /// CIDR block
    Network(IpNet),
}

impl IpValue {
    /// IP version of the value.
    pub fn version(&self) -> IpVersion {
        match self {
            IpValue::Address(addr) => IpVersion::of_addr(addr),
            IpValue::Network(net) => IpVersion::of_net(net),
        }
    }

    /// Full address width of the value's version (32 or 128).
    pub fn max_prefix_len(&self) -> u8 {
        self.version().bits() as u8
    }

    /// Prefix length; addresses count as host-sized networks.
    pub fn prefix_len(&self) -> u8 {
        match self {
            IpValue::Address(_) => self.max_prefix_len(),
            IpValue::Network(net) => net.prefix_len(),
        }
    }
}

impl From<IpAddr> for IpValue {
    fn from(addr: IpAddr) -> Self {
        IpValue::Address(addr)
    }
}

impl From<IpNet> for IpValue {
    fn from(net: IpNet) -> Self {
        IpValue::Network(net)
    }
}

impl fmt::Display for IpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpValue::Address(addr) => fmt::Display::fmt(addr, f),
            IpValue::Network(net) => fmt::Display::fmt(net, f),
        }
    }
}

/// An IP value together with the width it declares to length validators.
///
/// The declared width is the full address width of the value's version, so a
/// value always reports 32 or 128 regardless of its prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldValue {
    value: IpValue,
    declared_width: u8,
}

impl FieldValue {
    /// Wrap a value, declaring its version's full width.
    pub fn new(value: impl Into<IpValue>) -> Self {
        let value = value.into();
        Self {
            declared_width: value.max_prefix_len(),
            value,
        }
    }

    /// The wrapped value.
    pub fn value(&self) -> &IpValue {
        &self.value
    }

    /// Width reported to length validators.
    pub fn declared_width(&self) -> u8 {
        self.declared_width
    }

    /// Unwrap into the inner value.
    pub fn into_inner(self) -> IpValue {
        self.value
    }

    /// The wrapped address, if this is an address.
    pub fn as_address(&self) -> Option<IpAddr> {
        match self.value {
            IpValue::Address(addr) => Some(addr),
            IpValue::Network(_) => None,
        }
    }

    /// The wrapped network, if this is a network.
    pub fn as_network(&self) -> Option<IpNet> {
        match self.value {
            IpValue::Network(net) => Some(net),
            IpValue::Address(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

/// A value supplied to a field or to the right-hand side of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Already decoded address
    Address(IpAddr),
    /// Already decoded network
    Network(IpNet),
    /// Text to be parsed as an address or network
    Text(String),
    /// Boolean, as taken by `isprivate`
    Bool(bool),
    /// Integer; never a valid IP operand
    Integer(i64),
    /// SQL NULL
    Null,
}

impl Operand {
    /// Short name of the operand's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Operand::Address(_) => "address",
            Operand::Network(_) => "network",
            Operand::Text(_) => "str",
            Operand::Bool(_) => "bool",
            Operand::Integer(_) => "int",
            Operand::Null => "null",
        }
    }
}

impl From<IpAddr> for Operand {
    fn from(addr: IpAddr) -> Self {
        Operand::Address(addr)
    }
}

impl From<Ipv4Addr> for Operand {
    fn from(addr: Ipv4Addr) -> Self {
        Operand::Address(addr.into())
    }
}

impl From<Ipv6Addr> for Operand {
    fn from(addr: Ipv6Addr) -> Self {
        Operand::Address(addr.into())
    }
}

impl From<IpNet> for Operand {
    fn from(net: IpNet) -> Self {
        Operand::Network(net)
    }
}

impl From<Ipv4Net> for Operand {
    fn from(net: Ipv4Net) -> Self {
        Operand::Network(net.into())
    }
}

impl From<Ipv6Net> for Operand {
    fn from(net: Ipv6Net) -> Self {
        Operand::Network(net.into())
    }
}

impl From<IpValue> for Operand {
    fn from(value: IpValue) -> Self {
        match value {
            IpValue::Address(addr) => Operand::Address(addr),
            IpValue::Network(net) => Operand::Network(net),
        }
    }
}

impl From<&str> for Operand {
    fn from(text: &str) -> Self {
        Operand::Text(text.to_string())
    }
}

impl From<String> for Operand {
    fn from(text: String) -> Self {
        Operand::Text(text)
    }
}

impl From<bool> for Operand {
    fn from(value: bool) -> Self {
        Operand::Bool(value)
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Integer(value)
    }
}

/// Parse an address, optionally pinned to one IP version.
pub fn parse_address(text: &str, version: Option<IpVersion>) -> Result<IpAddr, String> {
    let parsed = match version {
        Some(IpVersion::V4) => text.parse::<Ipv4Addr>().map(IpAddr::V4).ok(),
        Some(IpVersion::V6) => text.parse::<Ipv6Addr>().map(IpAddr::V6).ok(),
        None => text.parse::<IpAddr>().ok(),
    };

    parsed.ok_or_else(|| match version {
        Some(v) => format!("'{}' does not appear to be an {} address", text, v),
        None => format!("'{}' does not appear to be an IPv4 or IPv6 address", text),
    })
}

/// Parse a network, optionally pinned to one IP version.
///
/// A bare address is accepted as a host-sized network. Host bits must be zero.
pub fn parse_network(text: &str, version: Option<IpVersion>) -> Result<IpNet, String> {
    let net = match text.parse::<IpNet>() {
        Ok(net) => net,
        Err(_) => match text.parse::<IpAddr>() {
            Ok(addr) => IpNet::from(addr),
            Err(_) => {
                return Err(match version {
                    Some(v) => format!("'{}' does not appear to be an {} network", text, v),
                    None => format!("'{}' does not appear to be an IPv4 or IPv6 network", text),
                });
            }
        },
    };

    if let Some(v) = version {
        if IpVersion::of_net(&net) != v {
            return Err(format!("'{}' does not appear to be an {} network", text, v));
        }
    }

    if net.trunc() != net {
        return Err(format!("{} has host bits set", net));
    }

    Ok(net)
}
