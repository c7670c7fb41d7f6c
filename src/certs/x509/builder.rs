// SPDX-License-Identifier: Apache-2.0

use super::{
    extensions::{self, BasicConstraints, CrlDistributionPoints, SubjectKeyIdMethod, X509Extension},
    name::{self, X509Name},
    types::{SerialNumber, X509Validity, X509Version},
    X509Certificate,
};
use crate::{
    certs::KeyUsageInformation,
    crypto::SigningKey,
    error::{Error, Result},
};

use sha1::{Digest, Sha1};
use x509_cert::{
    der::{asn1::BitString, Decode, Encode},
    spki::SubjectPublicKeyInfoOwned,
    TbsCertificate,
};

/// Describes a certificate to be signed.
///
/// `serial_number`, `issuer`, `validity`, `subject` and
/// `subject_public_key_der` are mandatory. Every other field is optional and
/// leaves the corresponding extension out when unset.
#[derive(Clone, Debug, Default)]
pub struct X509CertificateBuilder {
    /// Certificate version. Extensions require [`X509Version::V3`].
    pub version: X509Version,

    /// Non-negative serial number.
    pub serial_number: Option<SerialNumber>,

    /// Issuer name.
    pub issuer: Option<X509Name>,

    /// Validity window.
    pub validity: Option<X509Validity>,

    /// Subject name.
    pub subject: Option<X509Name>,

    /// DER-encoded SubjectPublicKeyInfo of the certified key.
    pub subject_public_key_der: Option<Vec<u8>>,

    /// Key identifier for the authorityKeyIdentifier extension.
    pub authority_key_identifier: Option<Vec<u8>>,

    /// How to derive the subjectKeyIdentifier extension.
    pub subject_key_identifier_method: SubjectKeyIdMethod,

    /// Contents of the keyUsage extension.
    pub key_usage: Option<KeyUsageInformation>,

    /// Contents of the basicConstraints extension.
    pub basic_constraints: Option<BasicConstraints>,

    /// Contents of the cRLDistributionPoints extension.
    pub crl_distribution_points: Option<CrlDistributionPoints>,

    /// Extensions appended verbatim after the modeled ones.
    pub other_extensions: Vec<X509Extension>,
}

fn require<'a, T>(field: &'a Option<T>, name: &str) -> Result<&'a T> {
    field
        .as_ref()
        .ok_or_else(|| Error::invalid_argument(format!("X509CertificateBuilder: missing {name}")))
}

impl X509CertificateBuilder {
    /// Lays out the certificate body, signs it with `key` and returns the
    /// resulting certificate.
    pub fn sign_and_build(&self, key: &dyn SigningKey) -> Result<X509Certificate> {
        let serial = require(&self.serial_number, "serial_number")?;
        let issuer = require(&self.issuer, "issuer")?;
        let validity = require(&self.validity, "validity")?;
        let subject = require(&self.subject, "subject")?;
        let subject_key = require(&self.subject_public_key_der, "subject_public_key_der")?;

        if serial.is_negative() {
            return Err(Error::invalid_argument(
                "X509CertificateBuilder: serial_number must be non-negative",
            ));
        }

        let spki = SubjectPublicKeyInfoOwned::from_der(subject_key).map_err(|e| {
            Error::invalid_argument(format!("X509CertificateBuilder: bad subject key: {e}"))
        })?;

        let exts = self.build_extensions(&spki)?;
        if !exts.is_empty() && self.version != X509Version::V3 {
            return Err(Error::invalid_argument(
                "X509CertificateBuilder: extensions require version 3",
            ));
        }

        let algorithm = key.signature_algorithm();
        let tbs = TbsCertificate {
            version: self.version.into(),
            serial_number: x509_cert::serial_number::SerialNumber::new(serial.as_bytes())?,
            signature: algorithm.clone(),
            issuer: name::encode_name(issuer)?,
            validity: validity.to_asn1()?,
            subject: name::encode_name(subject)?,
            subject_public_key_info: spki,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: if exts.is_empty() { None } else { Some(exts) },
        };

        let signature = key.sign(&tbs.to_der()?)?;
        let certificate = x509_cert::Certificate {
            tbs_certificate: tbs,
            signature_algorithm: algorithm,
            signature: BitString::from_bytes(&signature)?,
        };

        // Re-parse so the accessors report exactly what was encoded.
        X509Certificate::from_der(&certificate.to_der()?)
    }

    fn build_extensions(
        &self,
        spki: &SubjectPublicKeyInfoOwned,
    ) -> Result<Vec<x509_cert::ext::Extension>> {
        let mut exts = Vec::new();

        if let Some(aki) = &self.authority_key_identifier {
            exts.push(extensions::authority_key_identifier_extension(aki)?);
        }

        if self.subject_key_identifier_method == SubjectKeyIdMethod::SubjectPublicKeySha1 {
            let digest = Sha1::digest(spki.subject_public_key.raw_bytes());
            exts.push(extensions::subject_key_identifier_extension(&digest)?);
        }

        if let Some(usage) = &self.key_usage {
            exts.push(extensions::key_usage_extension(usage)?);
        }

        if let Some(bc) = &self.basic_constraints {
            exts.push(extensions::basic_constraints_extension(bc)?);
        }

        if let Some(crl) = &self.crl_distribution_points {
            exts.push(extensions::crl_distribution_points_extension(crl)?);
        }

        for other in &self.other_extensions {
            exts.push(extensions::passthrough_extension(other)?);
        }

        Ok(exts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        certs::{
            x509::{X509NameEntry, COMMON_NAME},
            CertificateInterface,
        },
        crypto::EcdsaP256Sha256SigningKey,
        error::ErrorCode,
    };
    use std::time::{Duration, UNIX_EPOCH};

    fn signer() -> EcdsaP256Sha256SigningKey {
        EcdsaP256Sha256SigningKey::from_bytes(&[0x11; 32]).unwrap()
    }

    fn minimal() -> X509CertificateBuilder {
        let start = UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        X509CertificateBuilder {
            serial_number: Some(SerialNumber::from(42i64)),
            issuer: Some(vec![X509NameEntry::new(COMMON_NAME, "issuer")]),
            validity: Some(X509Validity::new(start, start + Duration::from_secs(3600))),
            subject: Some(vec![X509NameEntry::new(COMMON_NAME, "subject")]),
            subject_public_key_der: Some(signer().public_key_der().unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_fields_named() {
        let mut builder = minimal();
        builder.validity = None;
        let err = builder.sign_and_build(&signer()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert!(err.message().contains("validity"));

        let err = X509CertificateBuilder::default()
            .sign_and_build(&signer())
            .unwrap_err();
        assert!(err.message().contains("serial_number"));
    }

    #[test]
    fn test_negative_serial_rejected() {
        let mut builder = minimal();
        builder.serial_number = Some(SerialNumber::from(-5i64));
        let err = builder.sign_and_build(&signer()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[test]
    fn test_extensions_require_v3() {
        let mut builder = minimal();
        builder.version = X509Version::V1;
        assert!(builder.sign_and_build(&signer()).is_ok());

        builder.basic_constraints = Some(BasicConstraints {
            is_ca: true,
            pathlen: None,
        });
        let err = builder.sign_and_build(&signer()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[test]
    fn test_self_signed_verifies() {
        let mut builder = minimal();
        builder.basic_constraints = Some(BasicConstraints {
            is_ca: true,
            pathlen: Some(0),
        });
        let cert = builder.sign_and_build(&signer()).unwrap();

        assert_eq!(cert.is_ca(), Some(true));
        assert_eq!(cert.cert_path_length(), Some(0));
        assert!(cert.verify_signature(&cert).is_ok());
    }
}
