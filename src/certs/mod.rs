// SPDX-License-Identifier: Apache-2.0

//! Certificate containers, the common certificate capability, and the
//! issuer/subject verification policy.

/// Test-only certificates with opaque keys.
pub mod fake;

/// X.509 certificates and PKCS#10 signing requests.
pub mod x509;

mod verify;

pub use verify::verify_certificate_chain;

use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};

/// Encoding of a [`Certificate`] payload.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CertificateFormat {
    /// Not set. Never accepted by a parser.
    #[default]
    Unknown,

    /// PEM-armored X.509 certificate.
    X509Pem,

    /// DER-encoded X.509 certificate.
    X509Der,
}

/// A tagged certificate blob as exchanged between components.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    /// How `data` is encoded.
    pub format: CertificateFormat,

    /// The encoded certificate.
    #[serde(with = "serde_bytes")]
    pub data: Vec<u8>,
}

impl Certificate {
    /// Wraps `data` with its format tag.
    pub fn new(format: CertificateFormat, data: impl Into<Vec<u8>>) -> Self {
        Self {
            format,
            data: data.into(),
        }
    }
}

/// Encoding of a [`CertificateSigningRequest`] payload.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CsrFormat {
    /// Not set. Never accepted by a parser.
    #[default]
    Unknown,

    /// DER-encoded PKCS#10 request.
    Pkcs10Der,

    /// PEM-armored PKCS#10 request.
    Pkcs10Pem,
}

/// A tagged certificate signing request blob.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CertificateSigningRequest {
    /// How `data` is encoded.
    pub format: CsrFormat,

    /// The encoded request.
    #[serde(with = "serde_bytes")]
    pub data: Vec<u8>,
}

impl CertificateSigningRequest {
    /// Wraps `data` with its format tag.
    pub fn new(format: CsrFormat, data: impl Into<Vec<u8>>) -> Self {
        Self {
            format,
            data: data.into(),
        }
    }
}

/// Optional checks applied by [`CertificateInterface::verify`] on top of the
/// mandatory signature check.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// If the issuer states whether it is a CA, require that it is one.
    pub issuer_ca: bool,

    /// Require the distance from the subject to the issuer not to exceed the
    /// issuer's path length constraint, if it has one. Certificates with an
    /// unknown CA status count as CAs when measuring distance.
    pub max_pathlen: bool,

    /// If the issuer carries key usage information, require that it allows
    /// certificate signing.
    pub issuer_key_usage: bool,
}

impl VerificationConfig {
    /// Sets every check to `all_fields`.
    pub fn new(all_fields: bool) -> Self {
        Self {
            issuer_ca: all_fields,
            max_pathlen: all_fields,
            issuer_key_usage: all_fields,
        }
    }

    /// Enables every check.
    pub fn all() -> Self {
        Self::new(true)
    }
}

/// Permitted uses of a certified key.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct KeyUsageInformation {
    /// The key may verify certificate signatures.
    pub certificate_signing: bool,

    /// The key may verify CRL signatures.
    pub crl_signing: bool,

    /// The key may verify other digital signatures.
    pub digital_signature: bool,
}

/// Something that certifies a public key and can be checked against the
/// certificate of its issuer.
///
/// Every optional accessor returns `None` when the underlying encoding makes
/// no assertion, which is distinct from an explicit `false`.
pub trait CertificateInterface {
    /// Checks only that this certificate was signed by `issuer`'s subject key.
    fn verify_signature(&self, issuer: &dyn CertificateInterface) -> Result<()>;

    /// DER-encoded SubjectPublicKeyInfo (or the opaque key of a fake).
    fn subject_key_der(&self) -> Result<Vec<u8>>;

    /// Whether this is a CA certificate, if known.
    fn is_ca(&self) -> Option<bool>;

    /// The maximum number of CA certificates allowed below this one.
    fn cert_path_length(&self) -> Option<u64>;

    /// Permitted uses of the subject key, if asserted.
    fn key_usage(&self) -> Option<KeyUsageInformation>;

    /// Checks this certificate against `issuer` under `config`.
    ///
    /// The signature is checked first and the optional checks follow in the
    /// order issuer CA, path length, key usage. The first failure is returned.
    fn verify(&self, issuer: &dyn CertificateInterface, config: &VerificationConfig) -> Result<()> {
        verify::verify_issued_by(self, issuer, config)
    }

    /// Downcast to the X.509 variant.
    fn as_x509(&self) -> Option<&x509::X509Certificate> {
        None
    }
}

/// Parses `certificate` into the matching [`CertificateInterface`] variant.
pub fn create_certificate(certificate: &Certificate) -> Result<Box<dyn CertificateInterface>> {
    match certificate.format {
        CertificateFormat::X509Pem | CertificateFormat::X509Der => {
            Ok(Box::new(x509::X509Certificate::create(certificate)?))
        }
        CertificateFormat::Unknown => Err(Error::invalid_argument(
            "Unknown certificate format; cannot create a certificate",
        )),
    }
}
