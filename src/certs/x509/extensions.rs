// SPDX-License-Identifier: Apache-2.0

use crate::{
    certs::KeyUsageInformation,
    error::{Error, Result},
};

use x509_cert::{
    der::{
        asn1::{Ia5String, OctetString},
        oid::ObjectIdentifier,
        Decode, Encode,
    },
    ext::{
        pkix::{
            self,
            crl::dp::{DistributionPoint, Reasons},
            name::{DistributionPointName, GeneralName},
            KeyUsages,
        },
        Extension,
    },
};
use std::convert::TryFrom;

pub(crate) const SUBJECT_KEY_IDENTIFIER: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("2.5.29.14");
pub(crate) const KEY_USAGE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.15");
pub(crate) const BASIC_CONSTRAINTS: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.19");
pub(crate) const CRL_DISTRIBUTION_POINTS: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("2.5.29.31");
pub(crate) const AUTHORITY_KEY_IDENTIFIER: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("2.5.29.35");

/// The basicConstraints extension.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct BasicConstraints {
    /// Whether the subject is a CA.
    pub is_ca: bool,

    /// Maximum number of CA certificates that may follow this one.
    pub pathlen: Option<u64>,
}

/// Revocation reasons covered by a CRL distribution point.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct ReasonFlags {
    /// keyCompromise (1).
    pub key_compromise: bool,
    /// cACompromise (2).
    pub ca_compromise: bool,
    /// affiliationChanged (3).
    pub affiliation_changed: bool,
    /// superseded (4).
    pub superseded: bool,
    /// cessationOfOperation (5).
    pub cessation_of_operation: bool,
    /// certificateHold (6).
    pub certificate_hold: bool,
    /// privilegeWithdrawn (7).
    pub privilege_withdrawn: bool,
    /// aACompromise (8).
    pub aa_compromise: bool,
}

impl ReasonFlags {
    fn table(&self) -> [(bool, Reasons); 8] {
        [
            (self.key_compromise, Reasons::KeyCompromise),
            (self.ca_compromise, Reasons::CaCompromise),
            (self.affiliation_changed, Reasons::AffiliationChanged),
            (self.superseded, Reasons::Superseded),
            (self.cessation_of_operation, Reasons::CessationOfOperation),
            (self.certificate_hold, Reasons::CertificateHold),
            (self.privilege_withdrawn, Reasons::PrivilegeWithdrawn),
            (self.aa_compromise, Reasons::AaCompromise),
        ]
    }

    fn to_asn1(self) -> pkix::crl::dp::ReasonFlags {
        let mut flags = pkix::crl::dp::ReasonFlags::default();
        for (set, reason) in self.table() {
            if set {
                flags |= reason;
            }
        }
        flags
    }

    fn from_asn1(flags: pkix::crl::dp::ReasonFlags) -> Self {
        Self {
            key_compromise: flags.contains(Reasons::KeyCompromise),
            ca_compromise: flags.contains(Reasons::CaCompromise),
            affiliation_changed: flags.contains(Reasons::AffiliationChanged),
            superseded: flags.contains(Reasons::Superseded),
            cessation_of_operation: flags.contains(Reasons::CessationOfOperation),
            certificate_hold: flags.contains(Reasons::CertificateHold),
            privilege_withdrawn: flags.contains(Reasons::PrivilegeWithdrawn),
            aa_compromise: flags.contains(Reasons::AaCompromise),
        }
    }
}

/// A single CRL distribution point, named by URI.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CrlDistributionPoints {
    /// Where the CRL can be fetched.
    pub uri: String,

    /// Reasons covered, or `None` for all reasons.
    pub reasons: Option<ReasonFlags>,
}

/// An extension carried through verbatim.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct X509Extension {
    /// Extension identifier.
    pub oid: ObjectIdentifier,

    /// The critical flag.
    pub is_critical: bool,

    /// DER encoding of the value wrapped by extnValue.
    pub value: Vec<u8>,
}

/// How the builder fills in the subjectKeyIdentifier extension.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum SubjectKeyIdMethod {
    /// Omit the extension.
    #[default]
    None,

    /// SHA-1 of the subjectPublicKey BIT STRING contents (RFC 5280, 4.2.1.2).
    SubjectPublicKeySha1,
}

/// Extensions of a parsed certificate, split by the ones this crate models.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct ParsedExtensions {
    pub(crate) authority_key_identifier: Option<Vec<u8>>,
    pub(crate) subject_key_identifier: Option<Vec<u8>>,
    pub(crate) key_usage: Option<KeyUsageInformation>,
    pub(crate) basic_constraints: Option<BasicConstraints>,
    pub(crate) crl_distribution_points: Option<CrlDistributionPoints>,
    pub(crate) other: Vec<X509Extension>,
}

impl ParsedExtensions {
    pub(crate) fn parse(extensions: &[Extension]) -> Result<Self> {
        let mut parsed = Self::default();

        for ext in extensions {
            let oid = ext.extn_id;
            let value = ext.extn_value.as_bytes();

            if oid == AUTHORITY_KEY_IDENTIFIER {
                let aki = pkix::AuthorityKeyIdentifier::from_der(value)?;
                parsed.authority_key_identifier =
                    aki.key_identifier.map(|id| id.as_bytes().to_vec());
            } else if oid == SUBJECT_KEY_IDENTIFIER {
                let ski = pkix::SubjectKeyIdentifier::from_der(value)?;
                parsed.subject_key_identifier = Some(ski.0.as_bytes().to_vec());
            } else if oid == KEY_USAGE {
                let ku = pkix::KeyUsage::from_der(value)?;
                parsed.key_usage = Some(KeyUsageInformation {
                    certificate_signing: ku.0.contains(KeyUsages::KeyCertSign),
                    crl_signing: ku.0.contains(KeyUsages::CRLSign),
                    digital_signature: ku.0.contains(KeyUsages::DigitalSignature),
                });
            } else if oid == BASIC_CONSTRAINTS {
                let bc = pkix::BasicConstraints::from_der(value)?;
                parsed.basic_constraints = Some(BasicConstraints {
                    is_ca: bc.ca,
                    pathlen: bc.path_len_constraint.map(u64::from),
                });
            } else if oid == CRL_DISTRIBUTION_POINTS {
                let points = pkix::CrlDistributionPoints::from_der(value)?;
                parsed.crl_distribution_points = Some(decode_crl_distribution_point(&points)?);
            } else {
                parsed.other.push(X509Extension {
                    oid,
                    is_critical: ext.critical,
                    value: value.to_vec(),
                });
            }
        }

        Ok(parsed)
    }
}

fn decode_crl_distribution_point(
    points: &pkix::CrlDistributionPoints,
) -> Result<CrlDistributionPoints> {
    let point = points
        .0
        .first()
        .ok_or_else(|| Error::internal("CRL distribution points extension is empty"))?;

    let uri = match &point.distribution_point {
        Some(DistributionPointName::FullName(names)) => names.iter().find_map(|name| match name {
            GeneralName::UniformResourceIdentifier(uri) => Some(uri.to_string()),
            _ => None,
        }),
        _ => None,
    }
    .ok_or_else(|| Error::internal("CRL distribution point does not name a URI"))?;

    Ok(CrlDistributionPoints {
        uri,
        reasons: point.reasons.map(ReasonFlags::from_asn1),
    })
}

fn extension(oid: ObjectIdentifier, critical: bool, der: Vec<u8>) -> Result<Extension> {
    Ok(Extension {
        extn_id: oid,
        critical,
        extn_value: OctetString::new(der)?,
    })
}

pub(crate) fn authority_key_identifier_extension(key_id: &[u8]) -> Result<Extension> {
    let aki = pkix::AuthorityKeyIdentifier {
        key_identifier: Some(OctetString::new(key_id)?),
        authority_cert_issuer: None,
        authority_cert_serial_number: None,
    };
    extension(AUTHORITY_KEY_IDENTIFIER, false, aki.to_der()?)
}

pub(crate) fn subject_key_identifier_extension(key_id: &[u8]) -> Result<Extension> {
    let ski = pkix::SubjectKeyIdentifier(OctetString::new(key_id)?);
    extension(SUBJECT_KEY_IDENTIFIER, false, ski.to_der()?)
}

pub(crate) fn key_usage_extension(usage: &KeyUsageInformation) -> Result<Extension> {
    let mut ku = pkix::KeyUsage(Default::default());
    if usage.digital_signature {
        ku.0 |= KeyUsages::DigitalSignature;
    }
    if usage.certificate_signing {
        ku.0 |= KeyUsages::KeyCertSign;
    }
    if usage.crl_signing {
        ku.0 |= KeyUsages::CRLSign;
    }
    extension(KEY_USAGE, true, ku.to_der()?)
}

pub(crate) fn basic_constraints_extension(constraints: &BasicConstraints) -> Result<Extension> {
    let path_len_constraint = constraints
        .pathlen
        .map(u8::try_from)
        .transpose()
        .map_err(|_| Error::invalid_argument("basic constraints pathlen must be at most 255"))?;

    let bc = pkix::BasicConstraints {
        ca: constraints.is_ca,
        path_len_constraint,
    };
    extension(BASIC_CONSTRAINTS, true, bc.to_der()?)
}

pub(crate) fn crl_distribution_points_extension(crl: &CrlDistributionPoints) -> Result<Extension> {
    let uri = Ia5String::new(crl.uri.as_str())
        .map_err(|_| Error::invalid_argument("CRL distribution point URI must be IA5"))?;

    let point = DistributionPoint {
        distribution_point: Some(DistributionPointName::FullName(vec![
            GeneralName::UniformResourceIdentifier(uri),
        ])),
        reasons: crl.reasons.map(ReasonFlags::to_asn1),
        crl_issuer: None,
    };
    let points = pkix::CrlDistributionPoints(vec![point]);
    extension(CRL_DISTRIBUTION_POINTS, false, points.to_der()?)
}

pub(crate) fn passthrough_extension(ext: &X509Extension) -> Result<Extension> {
    extension(ext.oid, ext.is_critical, ext.value.clone())
}
