//! Integration tests for field conversion and form cleaning.

use std::collections::HashSet;
use std::net::IpAddr;

use ipfields::*;
use ipnet::IpNet;

fn address_fields() -> Vec<IpAddressField> {
    vec![
        IpAddressField::new(FieldOptions::default()).unwrap(),
        IpAddressField::new(FieldOptions::default().nullable(true)).unwrap(),
        IpAddressField::new(FieldOptions::default().unique(true)).unwrap(),
    ]
}

#[test]
fn test_form_ipv4_valid() {
    for field in address_fields() {
        let cleaned = field.clean(Some("10.0.0.1")).unwrap();
        assert_eq!(cleaned, Some("10.0.0.1".parse::<IpAddr>().unwrap()));
    }
}

#[test]
fn test_form_ipv4_invalid() {
    for field in address_fields() {
        assert!(field.clean(Some("10.0.0.0.1")).is_err());
    }
}

#[test]
fn test_form_ipv6_valid() {
    for field in address_fields() {
        let cleaned = field.clean(Some("2001:0:1::2")).unwrap();
        assert_eq!(cleaned, Some("2001:0:1::2".parse::<IpAddr>().unwrap()));
    }
}

#[test]
fn test_form_ipv6_invalid() {
    for field in address_fields() {
        assert!(field.clean(Some("2001:0::1::2")).is_err());
    }
}

#[test]
fn test_change_round_trips_through_storage() {
    let field = IpAddressField::new(FieldOptions::default()).unwrap();

    for (before, after) in [("10.1.2.3", "10.1.2.4"), ("2001:0:1::2", "2001:0:1::3")] {
        let stored = field.to_db(&Operand::from(before)).unwrap();
        assert_eq!(field.from_db(stored.as_deref()).unwrap(), Some(before.parse().unwrap()));

        let cleaned = field.clean(Some(after)).unwrap().unwrap();
        let stored = field.to_db(&Operand::from(cleaned)).unwrap();
        assert_eq!(field.from_db(stored.as_deref()).unwrap(), Some(after.parse().unwrap()));
    }
}

#[test]
fn test_null_ip() {
    let field = IpAddressField::new(FieldOptions::default().nullable(true)).unwrap();

    assert_eq!(field.clean(None).unwrap(), None);
    assert_eq!(field.to_db(&Operand::Null).unwrap(), None);
    assert_eq!(field.from_db(None).unwrap(), None);
    assert!(field.column().null);
}

#[test]
fn test_unique_values_collide_in_storage() {
    let field = IpAddressField::new(FieldOptions::default().unique(true)).unwrap();
    let mut index = HashSet::new();

    for value in ["192.168.1.1", "abde::abde"] {
        let first = field.to_db(&Operand::from(value)).unwrap().unwrap();
        let parsed: IpAddr = value.parse().unwrap();
        let second = field.to_db(&Operand::from(parsed)).unwrap().unwrap();

        assert!(index.insert(first));
        assert!(!index.insert(second), "duplicate {} should collide", value);
    }
}

#[test]
fn test_pinned_ipv4_field() {
    let field = IpAddressField::new(FieldOptions::pinned(IpVersion::V4)).unwrap();

    assert_eq!(field.max_length(), 33);
    assert!(field.clean(Some("10.0.0.1")).is_ok());
    assert!(field.clean(Some("2001:0:1::2")).is_err());
    assert!(field.to_db(&Operand::from("::1")).is_err());
}

#[test]
fn test_network_field_conversion() {
    let field = IpNetworkField::new(FieldOptions::default()).unwrap();

    let stored = field.to_db(&Operand::from("192.168.1.0/24")).unwrap();
    assert_eq!(stored.as_deref(), Some("4110000001010100000000001"));
    assert_eq!(
        field.from_db(stored.as_deref()).unwrap(),
        Some("192.168.1.0/24".parse::<IpNet>().unwrap())
    );

    let value = field.to_value(&Operand::from("fd00::/8")).unwrap().unwrap();
    assert_eq!(value.declared_width(), 128);
    assert_eq!(value.as_network(), Some("fd00::/8".parse().unwrap()));
}

#[test]
fn test_network_form_cleaning() {
    let field = IpNetworkField::new(FieldOptions::pinned(IpVersion::V6)).unwrap();

    assert_eq!(field.clean(Some("fc00::/8")).unwrap(), Some("fc00::/8".parse().unwrap()));
    assert!(field.clean(Some("10.0.0.0/8")).is_err());
    assert!(field.clean(Some("fc00::1/8")).is_err());
    assert!(field.clean(None).is_err());
}

#[test]
fn test_corrupt_storage_surfaces_decode_error() {
    let field = IpNetworkField::new(FieldOptions::default()).unwrap();

    let err = field.from_db(Some("7101")).unwrap_err();
    assert!(err.is_decode());
    assert_eq!(err, IpFieldError::Decode(DecodeError::UnsupportedVersion('7')));
}

#[test]
fn test_options_from_json() {
    let options = FieldOptions::from_json(r#"{"ip_version": 4, "null": true, "unique": false}"#).unwrap();
    let field = IpNetworkField::new(options).unwrap();

    assert_eq!(
        field.column(),
        ColumnSpec { max_length: 33, null: true, unique: false }
    );

    let options = FieldOptions::from_json(r#"{"blank": true}"#).unwrap();
    assert!(matches!(IpAddressField::new(options), Err(IpFieldError::Configuration(_))));
}
