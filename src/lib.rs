//! ipfields - IP addresses and networks as ordered, prefix-searchable strings
//!
//! This crate stores IPv4/IPv6 addresses and networks in ordinary text
//! columns while keeping two properties of native IP types:
//!
//! - **Ordering**: representations of the same version sort like the
//!   addresses they encode
//! - **Containment as prefix**: a network's representation is a string prefix
//!   of the representation of everything inside it, so subnet and supernet
//!   queries become indexable `LIKE 'prefix%'` predicates
//!
//! # Quick Start
//!
//! ```
//! use ipfields::{encode_address, encode_network, decode_network, is_subnet_of, Operand};
//! use ipfields::sql::{Expr, LookupKind, LookupRegistry, SqliteDialect};
//!
//! // Encode values for storage
//! let host = encode_address(&"192.168.1.7".parse().unwrap());
//! let net = encode_network(&"192.168.0.0/16".parse().unwrap());
//! assert!(host.starts_with(&net));
//!
//! // Decode them back
//! assert_eq!(decode_network(&net)?.to_string(), "192.168.0.0/16");
//!
//! // Evaluate relationships in memory
//! assert!(is_subnet_of(&Operand::from("192.168.1.0/24"), &Operand::from("192.168.0.0/16"))?);
//!
//! // Or build a predicate for the database
//! let predicate = LookupRegistry::default().build(
//!     LookupKind::Subnets,
//!     &SqliteDialect,
//!     &Expr::column("field"),
//!     &Expr::value("192.168.0.0/16"),
//! )?;
//! assert_eq!(predicate.sql, "\"field\" LIKE ? ESCAPE '\\'");
//! # Ok::<(), ipfields::IpFieldError>(())
//! ```
//!
//! # Stored Representation
//!
//! `<tag><bits>` where the tag is `4` or `6` and the bits are `'0'`/`'1'`
//! characters, most significant first:
//!
//! | Value   | Bits                         | Example                  |
//! |---------|------------------------------|--------------------------|
//! | Address | all 32 or 128 address bits   | `10.0.0.1` -> `400001010...0001` |
//! | Network | the first `prefix_len` bits  | `10.0.0.0/8` -> `400001010` |
//!
//! Columns need `bits + 1` characters: 33 for IPv4-only fields, 129 otherwise.
//!
//! # Error Handling
//!
//! Codec functions return `Result<T, DecodeError>`; everything else returns
//! `Result<T, IpFieldError>`. Common error cases:
//!
//! - Corrupt stored representations (bad tag, wrong bit count)
//! - Lookup operands that are not IP values or parseable text
//! - Field values of the wrong kind or version

// Re-export codec functions
pub use crate::core::{
    decode_address, decode_network, encode_address, encode_network, encode_value,
    max_representation_length,
};

// Re-export relationship matching
pub use crate::core::{
    contains, is_private, is_subnet_of, is_supernet_of, normalize_rhs, PRIVATE_NETWORKS,
};

// Re-export public types
pub use error::{DecodeError, IpFieldError};
pub use field::{ColumnSpec, FieldOptions, IpAddressField, IpField, IpNetworkField};
pub use types::{FieldValue, IpValue, IpVersion, Operand};

// Module declarations
pub mod error;
pub mod types;
pub mod core;
pub mod sql;
pub mod field;
