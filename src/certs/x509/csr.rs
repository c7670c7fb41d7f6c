// SPDX-License-Identifier: Apache-2.0

use crate::{
    certs::{CertificateSigningRequest, CsrFormat},
    error::{Error, Result},
    util::pem,
};

use x509_cert::{
    der::{pem::LineEnding, Decode, Encode, EncodePem},
    request::CertReq,
};

/// A parsed PKCS #10 certificate signing request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pkcs10Request {
    inner: CertReq,
}

impl Pkcs10Request {
    /// Parses a tagged CSR blob.
    pub fn create(csr: &CertificateSigningRequest) -> Result<Self> {
        let der = match csr.format {
            CsrFormat::Pkcs10Der => csr.data.clone(),
            CsrFormat::Pkcs10Pem => {
                pem::decode_labeled(&csr.data, pem::CERTIFICATE_REQUEST_LABEL)?
            }
            CsrFormat::Unknown => {
                return Err(Error::invalid_argument(
                    "CSR format is not a PKCS #10 format",
                ))
            }
        };

        let inner = CertReq::from_der(&der)?;
        Ok(Self { inner })
    }

    /// The DER-encoded SubjectPublicKeyInfo being certified.
    pub fn subject_key_der(&self) -> Result<Vec<u8>> {
        Ok(self.inner.info.public_key.to_der()?)
    }

    /// Re-encodes this request as DER.
    pub fn to_der_request(&self) -> Result<CertificateSigningRequest> {
        Ok(CertificateSigningRequest::new(
            CsrFormat::Pkcs10Der,
            self.inner.to_der()?,
        ))
    }

    /// Re-encodes this request as PEM.
    pub fn to_pem_request(&self) -> Result<CertificateSigningRequest> {
        let pem = self.inner.to_pem(LineEnding::LF)?;
        Ok(CertificateSigningRequest::new(CsrFormat::Pkcs10Pem, pem))
    }
}

/// Pulls the subject public key out of a CSR without keeping the parse.
pub fn extract_pkcs10_subject_key_der(csr: &CertificateSigningRequest) -> Result<Vec<u8>> {
    Pkcs10Request::create(csr)?.subject_key_der()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_unknown_format() {
        let csr = CertificateSigningRequest::new(CsrFormat::Unknown, vec![0x30, 0x00]);
        let err = Pkcs10Request::create(&csr).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[test]
    fn test_garbage_der() {
        let csr = CertificateSigningRequest::new(CsrFormat::Pkcs10Der, vec![0xc0, 0xff, 0x33]);
        let err = extract_pkcs10_subject_key_der(&csr).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[test]
    fn test_garbage_pem() {
        let csr = CertificateSigningRequest::new(CsrFormat::Pkcs10Pem, b"not a pem".to_vec());
        let err = extract_pkcs10_subject_key_der(&csr).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Internal);
    }
}
