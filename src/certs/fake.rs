// SPDX-License-Identifier: Apache-2.0

use super::{Certificate, CertificateFormat, CertificateInterface, KeyUsageInformation};
use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};

/// A certificate whose "signature" is the issuer's subject key itself.
///
/// The payload of a fake [`Certificate`] is the bincode encoding of this
/// struct, regardless of the format tag.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct FakeCertificate {
    /// Opaque subject key.
    #[serde(with = "serde_bytes")]
    pub subject_key: Vec<u8>,

    /// Subject key of the expected issuer.
    #[serde(with = "serde_bytes")]
    pub issuer_key: Vec<u8>,

    /// Whether this is a CA certificate, if known.
    pub is_ca: Option<bool>,

    /// Path length constraint, if any.
    pub pathlength: Option<u64>,
}

impl FakeCertificate {
    /// Builds a fake certificate from its parts.
    pub fn new(
        subject_key: impl Into<Vec<u8>>,
        issuer_key: impl Into<Vec<u8>>,
        is_ca: Option<bool>,
        pathlength: Option<u64>,
    ) -> Self {
        Self {
            subject_key: subject_key.into(),
            issuer_key: issuer_key.into(),
            is_ca,
            pathlength,
        }
    }

    /// Decodes a fake certificate from a tagged blob.
    pub fn create(certificate: &Certificate) -> Result<Self> {
        bincode::deserialize(&certificate.data)
            .map_err(|e| Error::invalid_argument(format!("Could not parse fake certificate: {e}")))
    }

    /// Encodes this certificate into a blob tagged with `format`.
    pub fn to_certificate(&self, format: CertificateFormat) -> Result<Certificate> {
        Ok(Certificate::new(format, bincode::serialize(self)?))
    }
}

impl CertificateInterface for FakeCertificate {
    fn verify_signature(&self, issuer: &dyn CertificateInterface) -> Result<()> {
        if issuer.subject_key_der()? != self.issuer_key {
            return Err(Error::unauthenticated(
                "Issuer's subject key does not match the subject's issuer key",
            ));
        }
        Ok(())
    }

    fn subject_key_der(&self) -> Result<Vec<u8>> {
        Ok(self.subject_key.clone())
    }

    fn is_ca(&self) -> Option<bool> {
        self.is_ca
    }

    fn cert_path_length(&self) -> Option<u64> {
        self.pathlength
    }

    fn key_usage(&self) -> Option<KeyUsageInformation> {
        None
    }
}
