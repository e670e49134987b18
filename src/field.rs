//! IP address and network fields.
//!
//! A field stores its values as stored representations in a text column of
//! fixed capacity, converts between application values and stored strings,
//! cleans user input, and builds the lookup predicates registered on it.
//!
//! # Examples
//!
//! ```
//! use ipfields::{FieldOptions, IpField, IpNetworkField, Operand};
//!
//! let field = IpNetworkField::new(FieldOptions::default())?;
//! assert_eq!(field.max_length(), 129);
//!
//! let stored = field.to_db(&Operand::from("10.0.0.0/8"))?;
//! assert_eq!(stored.as_deref(), Some("400001010"));
//!
//! let net = field.from_db(stored.as_deref())?;
//! assert_eq!(net.map(|n| n.to_string()), Some("10.0.0.0/8".to_string()));
//! # Ok::<(), ipfields::IpFieldError>(())
//! ```

use std::fmt;
use std::net::IpAddr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::decoder::{decode_address, decode_network};
use crate::core::encoder::{encode_value, max_representation_length};
use crate::error::{DecodeError, IpFieldError};
use crate::sql::dialect::SqlDialect;
use crate::sql::expr::{Expr, Predicate};
use crate::sql::lookup::{LookupKind, LookupRegistry};
use crate::types::{parse_address, parse_network, FieldValue, IpValue, IpVersion, Operand};

/// Declaration options shared by both field kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldOptions {
    /// Pin the field to one IP version, or accept both
    pub ip_version: Option<IpVersion>,
    /// Column is nullable and form input is optional
    pub null: bool,
    /// Blank values; IP fields reject this option
    pub blank: bool,
    /// Column carries a unique constraint
    pub unique: bool,
}

impl FieldOptions {
    /// Options pinned to `version`.
    pub fn pinned(version: IpVersion) -> Self {
        Self {
            ip_version: Some(version),
            ..Self::default()
        }
    }

    /// Set whether the field is nullable.
    pub fn nullable(mut self, null: bool) -> Self {
        self.null = null;
        self
    }

    /// Set whether the column is unique.
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Parse options from a JSON object.
    ///
    /// ```
    /// use ipfields::{FieldOptions, IpVersion};
    ///
    /// let options = FieldOptions::from_json(r#"{"ip_version": 4, "null": true}"#).unwrap();
    /// assert_eq!(options.ip_version, Some(IpVersion::V4));
    /// assert!(options.null);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, IpFieldError> {
        serde_json::from_str(json).map_err(|e| IpFieldError::Configuration(e.to_string()))
    }
}

/// Column declaration derived from a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    /// Maximum stored length in characters
    pub max_length: usize,
    /// Nullable column
    pub null: bool,
    /// Unique constraint
    pub unique: bool,
}

fn check_options(options: &FieldOptions, kind: &str) -> Result<(), IpFieldError> {
    if options.blank {
        return Err(IpFieldError::Configuration(format!("IP {} fields cannot be blank", kind)));
    }
    Ok(())
}

fn is_empty_input(operand: &Operand) -> bool {
    match operand {
        Operand::Null => true,
        Operand::Text(text) => text.is_empty(),
        _ => false,
    }
}

/// Conversion and query behaviour shared by IP fields.
pub trait IpField {
    /// Application-side value type.
    type Value: Copy + fmt::Display;

    /// `"address"` or `"network"`, used in messages.
    const KIND: &'static str;

    /// Declaration options.
    fn options(&self) -> &FieldOptions;

    /// Lookups that can be queried on this field.
    fn lookups(&self) -> &LookupRegistry;

    /// Extract a typed value of this field's kind from an operand.
    fn typed(operand: &Operand) -> Option<Self::Value>;

    /// Parse text honoring the pinned version.
    fn parse(&self, text: &str) -> Result<Self::Value, IpFieldError>;

    /// Decode a stored representation.
    fn decode(repr: &str) -> Result<Self::Value, DecodeError>;

    /// Convert into the generic value.
    fn into_ip_value(value: Self::Value) -> IpValue;

    /// Column capacity for the pinned version.
    fn max_length(&self) -> usize {
        max_representation_length(self.options().ip_version)
    }

    /// Column declaration for schema generation.
    fn column(&self) -> ColumnSpec {
        ColumnSpec {
            max_length: self.max_length(),
            null: self.options().null,
            unique: self.options().unique,
        }
    }

    /// Reject values whose declared width exceeds the column capacity.
    ///
    /// Values converted by [`IpField::to_value`] always fit; this checks a
    /// [`FieldValue`] built elsewhere before it is written to this column.
    fn validate_width(&self, value: &FieldValue) -> Result<(), IpFieldError> {
        let width = value.declared_width() as usize;
        if width >= self.max_length() {
            return Err(IpFieldError::Validation(format!(
                "Ensure this value has at most {} characters (it has {}).",
                self.max_length() - 1,
                width
            )));
        }
        Ok(())
    }

    /// Convert an incoming value to the field's value.
    ///
    /// Null and empty text convert to `None`.
    fn to_value(&self, operand: &Operand) -> Result<Option<FieldValue>, IpFieldError> {
        if is_empty_input(operand) {
            return Ok(None);
        }

        let value = match (Self::typed(operand), operand) {
            (Some(value), _) => {
                let ip_value = Self::into_ip_value(value);
                if let Some(pinned) = self.options().ip_version {
                    if ip_value.version() != pinned {
                        return Err(IpFieldError::Validation(format!(
                            "Expected an {} {}, got {}",
                            pinned,
                            Self::KIND,
                            ip_value
                        )));
                    }
                }
                FieldValue::new(ip_value)
            }
            (None, Operand::Text(text)) => FieldValue::new(Self::into_ip_value(self.parse(text)?)),
            (None, other) => {
                return Err(IpFieldError::Validation(format!(
                    "Invalid value for an IP {} field: got {}",
                    Self::KIND,
                    other.kind_name()
                )));
            }
        };

        Ok(Some(value))
    }

    /// Convert an incoming value to its stored representation.
    fn to_db(&self, operand: &Operand) -> Result<Option<String>, IpFieldError> {
        let stored = self.to_value(operand)?.map(|value| encode_value(value.value()));
        debug!(kind = Self::KIND, stored = ?stored, "prepared value for storage");
        Ok(stored)
    }

    /// Convert a stored representation back to the field's value.
    fn from_db(&self, repr: Option<&str>) -> Result<Option<Self::Value>, IpFieldError> {
        let Some(repr) = repr else {
            return Ok(None);
        };

        match Self::decode(repr) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(kind = Self::KIND, %repr, error = %e, "stored value failed to decode");
                Err(e.into())
            }
        }
    }

    /// Clean form input.
    ///
    /// Absent or empty input is `None` for nullable fields and an error
    /// otherwise.
    fn clean(&self, input: Option<&str>) -> Result<Option<Self::Value>, IpFieldError> {
        match input {
            None | Some("") if self.options().null => Ok(None),
            None | Some("") => Err(IpFieldError::Validation("This field is required.".to_string())),
            Some(text) => self.parse(text).map(Some),
        }
    }

    /// Build the predicate for the lookup called `name`.
    fn lookup(
        &self,
        name: &str,
        dialect: &dyn SqlDialect,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<Predicate, IpFieldError> {
        self.lookups().build_by_name(name, dialect, lhs, rhs)
    }
}

/// Field holding a single host address.
#[derive(Debug, Clone)]
pub struct IpAddressField {
    options: FieldOptions,
    lookups: LookupRegistry,
}

impl IpAddressField {
    /// Create an address field.
    ///
    /// # Errors
    ///
    /// Returns [`IpFieldError::Configuration`] if `blank` is set.
    pub fn new(options: FieldOptions) -> Result<Self, IpFieldError> {
        check_options(&options, "address")?;
        Ok(Self {
            options,
            lookups: LookupRegistry::with_kinds(&[LookupKind::Subnets, LookupKind::IsPrivate]),
        })
    }
}

impl IpField for IpAddressField {
    type Value = IpAddr;

    const KIND: &'static str = "address";

    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn lookups(&self) -> &LookupRegistry {
        &self.lookups
    }

    fn typed(operand: &Operand) -> Option<IpAddr> {
        match operand {
            Operand::Address(addr) => Some(*addr),
            _ => None,
        }
    }

    fn parse(&self, text: &str) -> Result<IpAddr, IpFieldError> {
        parse_address(text, self.options.ip_version).map_err(IpFieldError::Validation)
    }

    fn decode(repr: &str) -> Result<IpAddr, DecodeError> {
        decode_address(repr)
    }

    fn into_ip_value(value: IpAddr) -> IpValue {
        IpValue::Address(value)
    }
}

/// Field holding a CIDR network.
#[derive(Debug, Clone)]
pub struct IpNetworkField {
    options: FieldOptions,
    lookups: LookupRegistry,
}

impl IpNetworkField {
    /// Create a network field.
    ///
    /// # Errors
    ///
    /// Returns [`IpFieldError::Configuration`] if `blank` is set.
    pub fn new(options: FieldOptions) -> Result<Self, IpFieldError> {
        check_options(&options, "network")?;
        Ok(Self {
            options,
            lookups: LookupRegistry::default(),
        })
    }
}

impl IpField for IpNetworkField {
    type Value = IpNet;

    const KIND: &'static str = "network";

    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn lookups(&self) -> &LookupRegistry {
        &self.lookups
    }

    fn typed(operand: &Operand) -> Option<IpNet> {
        match operand {
            Operand::Network(net) => Some(*net),
            Operand::Address(addr) => Some(IpNet::from(*addr)),
            _ => None,
        }
    }

    fn parse(&self, text: &str) -> Result<IpNet, IpFieldError> {
        parse_network(text, self.options.ip_version).map_err(IpFieldError::Validation)
    }

    fn decode(repr: &str) -> Result<IpNet, DecodeError> {
        decode_network(repr)
    }

    fn into_ip_value(value: IpNet) -> IpValue {
        IpValue::Network(value)
    }
}
