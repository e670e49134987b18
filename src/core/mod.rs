//! Core encoding and matching functionality.
//!
//! This module contains the stored-representation operations:
//! - Encoding addresses and networks to tagged bit strings
//! - Decoding bit strings back to addresses and networks
//! - Bit packing and padding
//! - Prefix-based relationship matching

pub mod encoder;
pub mod decoder;
pub mod matcher;
pub mod packer;

// Re-export main functionality
pub use encoder::{encode_address, encode_network, encode_value, max_representation_length};
pub use decoder::{decode_address, decode_network, split_tag};
pub use matcher::{
    contains, is_private, is_private_repr, is_subnet_of, is_supernet_of, normalize_rhs,
    private_network_reprs, PRIVATE_NETWORKS,
};
pub use packer::{bits_to_u128, bytes_to_bits, pad_bits};
