// SPDX-License-Identifier: Apache-2.0

//! X.509 certificates.
//!
//! [`X509Certificate`] is immutable once parsed. Extensions are decoded up
//! front so that a malformed extension is reported when the certificate is
//! created rather than when an accessor is first called.

mod builder;
mod csr;
mod extensions;
mod name;
mod signature;
mod types;

pub use builder::X509CertificateBuilder;
pub use csr::{extract_pkcs10_subject_key_der, Pkcs10Request};
pub use extensions::{
    BasicConstraints, CrlDistributionPoints, ReasonFlags, SubjectKeyIdMethod, X509Extension,
};
pub use name::{
    X509Name, X509NameEntry, COMMON_NAME, COUNTRY_NAME, LOCALITY_NAME, ORGANIZATIONAL_UNIT_NAME,
    ORGANIZATION_NAME, STATE_OR_PROVINCE_NAME,
};
pub use types::{SerialNumber, X509Validity, X509Version};

use super::{Certificate, CertificateFormat, CertificateInterface, KeyUsageInformation};
use crate::{
    error::{Error, Result},
    util::pem,
};

use extensions::ParsedExtensions;
use log::debug;
use x509_cert::der::{pem::LineEnding, Decode, Encode, EncodePem};

/// A parsed X.509 certificate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct X509Certificate {
    inner: x509_cert::Certificate,
    extensions: ParsedExtensions,
}

impl X509Certificate {
    /// Parses a tagged certificate blob. Only X.509 formats are accepted.
    pub fn create(certificate: &Certificate) -> Result<Self> {
        match certificate.format {
            CertificateFormat::X509Pem => Self::from_pem(&certificate.data),
            CertificateFormat::X509Der => Self::from_der(&certificate.data),
            CertificateFormat::Unknown => Err(Error::invalid_argument(
                "Certificate format is not an X.509 format",
            )),
        }
    }

    /// Parses a PEM-armored certificate.
    pub fn from_pem(pem: impl AsRef<[u8]>) -> Result<Self> {
        let der = pem::decode_labeled(pem.as_ref(), pem::CERTIFICATE_LABEL)?;
        Self::from_der(&der)
    }

    /// Parses a DER-encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let inner = x509_cert::Certificate::from_der(der)?;
        Self::from_inner(inner)
    }

    pub(crate) fn from_inner(inner: x509_cert::Certificate) -> Result<Self> {
        let extensions = match &inner.tbs_certificate.extensions {
            Some(exts) => ParsedExtensions::parse(exts)?,
            None => ParsedExtensions::default(),
        };
        Ok(Self { inner, extensions })
    }

    /// Re-encodes this certificate as PEM.
    pub fn to_pem_certificate(&self) -> Result<Certificate> {
        let pem = self.inner.to_pem(LineEnding::LF)?;
        Ok(Certificate::new(CertificateFormat::X509Pem, pem))
    }

    /// Re-encodes this certificate as DER.
    pub fn to_der_certificate(&self) -> Result<Certificate> {
        Ok(Certificate::new(CertificateFormat::X509Der, self.inner.to_der()?))
    }

    /// The certificate version.
    pub fn version(&self) -> X509Version {
        self.inner.tbs_certificate.version.into()
    }

    /// The serial number.
    pub fn serial_number(&self) -> SerialNumber {
        SerialNumber::from_twos_complement(self.inner.tbs_certificate.serial_number.as_bytes())
    }

    /// The issuer distinguished name.
    pub fn issuer_name(&self) -> Result<X509Name> {
        name::decode_name(&self.inner.tbs_certificate.issuer)
    }

    /// The validity window.
    pub fn validity(&self) -> X509Validity {
        X509Validity::from_asn1(&self.inner.tbs_certificate.validity)
    }

    /// The subject distinguished name.
    pub fn subject_name(&self) -> Result<X509Name> {
        name::decode_name(&self.inner.tbs_certificate.subject)
    }

    /// The keyIdentifier of the authorityKeyIdentifier extension.
    pub fn authority_key_identifier(&self) -> Option<&[u8]> {
        self.extensions.authority_key_identifier.as_deref()
    }

    /// The subjectKeyIdentifier extension.
    pub fn subject_key_identifier(&self) -> Option<&[u8]> {
        self.extensions.subject_key_identifier.as_deref()
    }

    /// The basicConstraints extension.
    pub fn basic_constraints(&self) -> Option<BasicConstraints> {
        self.extensions.basic_constraints
    }

    /// The first entry of the cRLDistributionPoints extension.
    pub fn crl_distribution_points(&self) -> Option<&CrlDistributionPoints> {
        self.extensions.crl_distribution_points.as_ref()
    }

    /// Every extension not exposed by a dedicated accessor, in encoding order.
    pub fn other_extensions(&self) -> &[X509Extension] {
        &self.extensions.other
    }

    /// The underlying ASN.1 structure.
    pub fn as_asn1(&self) -> &x509_cert::Certificate {
        &self.inner
    }
}

impl CertificateInterface for X509Certificate {
    fn verify_signature(&self, issuer: &dyn CertificateInterface) -> Result<()> {
        let tbs = self.inner.tbs_certificate.to_der()?;
        let issuer_key = issuer.subject_key_der()?;

        signature::verify_signed_data(
            &self.inner.signature_algorithm,
            &tbs,
            self.inner.signature.raw_bytes(),
            &issuer_key,
        )
        .map_err(|e| {
            debug!("certificate signature check failed: {e}");
            e
        })
    }

    fn subject_key_der(&self) -> Result<Vec<u8>> {
        Ok(self.inner.tbs_certificate.subject_public_key_info.to_der()?)
    }

    fn is_ca(&self) -> Option<bool> {
        self.extensions.basic_constraints.map(|bc| bc.is_ca)
    }

    fn cert_path_length(&self) -> Option<u64> {
        self.extensions.basic_constraints.and_then(|bc| bc.pathlen)
    }

    fn key_usage(&self) -> Option<KeyUsageInformation> {
        self.extensions.key_usage
    }

    fn as_x509(&self) -> Option<&X509Certificate> {
        Some(self)
    }
}
