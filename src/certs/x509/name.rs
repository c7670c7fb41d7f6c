// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};

use x509_cert::{
    attr::{AttributeTypeAndValue, AttributeValue},
    der::{
        asn1::{Any, SetOfVec},
        oid::ObjectIdentifier,
        Tag, Tagged,
    },
    name::{Name, RdnSequence, RelativeDistinguishedName},
};
use std::convert::TryFrom;

/// id-at-commonName.
pub const COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
/// id-at-countryName.
pub const COUNTRY_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
/// id-at-localityName.
pub const LOCALITY_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");
/// id-at-stateOrProvinceName.
pub const STATE_OR_PROVINCE_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.8");
/// id-at-organizationName.
pub const ORGANIZATION_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
/// id-at-organizationalUnitName.
pub const ORGANIZATIONAL_UNIT_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.11");

/// One attribute of a distinguished name.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct X509NameEntry {
    /// Attribute type.
    pub field: ObjectIdentifier,

    /// Attribute value as text.
    pub value: String,
}

impl X509NameEntry {
    /// Pairs an attribute type with its value.
    pub fn new(field: ObjectIdentifier, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// A distinguished name in encoding order.
pub type X509Name = Vec<X509NameEntry>;

/// Each entry becomes its own single-valued RDN holding a UTF8String.
pub(crate) fn encode_name(name: &[X509NameEntry]) -> Result<Name> {
    let mut rdns = Vec::with_capacity(name.len());
    for entry in name {
        let value = Any::new(Tag::Utf8String, entry.value.as_bytes())?;
        let atv = AttributeTypeAndValue {
            oid: entry.field,
            value: AttributeValue::from(value),
        };
        rdns.push(RelativeDistinguishedName(SetOfVec::try_from(vec![atv])?));
    }
    Ok(RdnSequence(rdns))
}

/// Flattens every RDN in order.
pub(crate) fn decode_name(name: &Name) -> Result<X509Name> {
    let mut entries = Vec::new();
    for rdn in name.0.iter() {
        for atv in rdn.0.iter() {
            entries.push(X509NameEntry {
                field: atv.oid,
                value: decode_string_value(&atv.value)?,
            });
        }
    }
    Ok(entries)
}

fn decode_string_value(value: &Any) -> Result<String> {
    let bytes = value.value();
    match value.tag() {
        Tag::Utf8String
        | Tag::PrintableString
        | Tag::Ia5String
        | Tag::VisibleString
        | Tag::NumericString => String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::internal("name attribute is not valid UTF-8")),
        // T.61 in practice carries Latin-1.
        Tag::TeletexString => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        Tag::BmpString => decode_bmp(bytes),
        Tag::VideotexString => Err(Error::unimplemented(
            "VideotexString name attributes are not supported",
        )),
        tag => Err(Error::internal(format!(
            "unsupported name attribute encoding {tag}"
        ))),
    }
}

/// UCS-2, big endian.
fn decode_bmp(bytes: &[u8]) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Error::internal("BMPString has an odd length"));
    }
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|_| Error::internal("BMPString is not valid UCS-2"))
}
