// SPDX-License-Identifier: Apache-2.0

use super::{SigningKey, ECDSA_WITH_SHA256, ECDSA_WITH_SHA384};
use crate::error::{Error, Result};

use p256::pkcs8::EncodePublicKey;
use x509_cert::spki::AlgorithmIdentifierOwned;

/// ECDSA over NIST P-256 with SHA-256 digests.
pub struct EcdsaP256Sha256SigningKey {
    inner: p256::ecdsa::SigningKey,
}

impl EcdsaP256Sha256SigningKey {
    /// Loads a key from a DER-encoded SEC1 `ECPrivateKey`.
    pub fn from_sec1_der(der: &[u8]) -> Result<Self> {
        let secret = p256::SecretKey::from_sec1_der(der)
            .map_err(|e| Error::invalid_argument(format!("invalid P-256 private key: {e}")))?;
        Ok(Self {
            inner: p256::ecdsa::SigningKey::from(secret),
        })
    }

    /// Loads a key from raw 32-byte scalar bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let inner = p256::ecdsa::SigningKey::from_slice(bytes)
            .map_err(|e| Error::invalid_argument(format!("invalid P-256 private key: {e}")))?;
        Ok(Self { inner })
    }
}

impl SigningKey for EcdsaP256Sha256SigningKey {
    fn signature_algorithm(&self) -> AlgorithmIdentifierOwned {
        AlgorithmIdentifierOwned {
            oid: ECDSA_WITH_SHA256,
            parameters: None,
        }
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        use p256::ecdsa::{signature::Signer, Signature};

        let signature: Signature = self
            .inner
            .try_sign(message)
            .map_err(|e| Error::internal(format!("P-256 signing failed: {e}")))?;
        Ok(signature.to_der().as_bytes().to_vec())
    }

    fn public_key_der(&self) -> Result<Vec<u8>> {
        let document = self
            .inner
            .verifying_key()
            .to_public_key_der()
            .map_err(|e| Error::internal(format!("cannot encode P-256 public key: {e}")))?;
        Ok(document.as_bytes().to_vec())
    }
}

/// ECDSA over NIST P-384 with SHA-384 digests.
pub struct EcdsaP384Sha384SigningKey {
    inner: p384::ecdsa::SigningKey,
}

impl EcdsaP384Sha384SigningKey {
    /// Loads a key from a DER-encoded SEC1 `ECPrivateKey`.
    pub fn from_sec1_der(der: &[u8]) -> Result<Self> {
        let secret = p384::SecretKey::from_sec1_der(der)
            .map_err(|e| Error::invalid_argument(format!("invalid P-384 private key: {e}")))?;
        Ok(Self {
            inner: p384::ecdsa::SigningKey::from(secret),
        })
    }

    /// Loads a key from raw 48-byte scalar bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let inner = p384::ecdsa::SigningKey::from_slice(bytes)
            .map_err(|e| Error::invalid_argument(format!("invalid P-384 private key: {e}")))?;
        Ok(Self { inner })
    }
}

impl SigningKey for EcdsaP384Sha384SigningKey {
    fn signature_algorithm(&self) -> AlgorithmIdentifierOwned {
        AlgorithmIdentifierOwned {
            oid: ECDSA_WITH_SHA384,
            parameters: None,
        }
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        use p384::ecdsa::{signature::Signer, Signature};

        let signature: Signature = self
            .inner
            .try_sign(message)
            .map_err(|e| Error::internal(format!("P-384 signing failed: {e}")))?;
        Ok(signature.to_der().as_bytes().to_vec())
    }

    fn public_key_der(&self) -> Result<Vec<u8>> {
        let document = self
            .inner
            .verifying_key()
            .to_public_key_der()
            .map_err(|e| Error::internal(format!("cannot encode P-384 public key: {e}")))?;
        Ok(document.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_p256_sign_verifies_with_public_key() {
        use p256::{
            ecdsa::{signature::Verifier, DerSignature, VerifyingKey},
            pkcs8::DecodePublicKey,
        };

        let key = EcdsaP256Sha256SigningKey::from_bytes(&[0x42; 32]).unwrap();
        let sig = key.sign(b"tbs bytes").unwrap();
        let vk = VerifyingKey::from_public_key_der(&key.public_key_der().unwrap()).unwrap();
        let sig = DerSignature::from_bytes(&sig).unwrap();

        assert!(vk.verify(b"tbs bytes", &sig).is_ok());
        assert!(vk.verify(b"other bytes", &sig).is_err());
        assert_eq!(key.signature_algorithm().oid, ECDSA_WITH_SHA256);
    }

    #[test]
    fn test_p384_sign_verifies_with_public_key() {
        use p384::{
            ecdsa::{signature::Verifier, DerSignature, VerifyingKey},
            pkcs8::DecodePublicKey,
        };

        let key = EcdsaP384Sha384SigningKey::from_bytes(&[0x17; 48]).unwrap();
        let sig = key.sign(b"tbs bytes").unwrap();
        let vk = VerifyingKey::from_public_key_der(&key.public_key_der().unwrap()).unwrap();
        let sig = DerSignature::from_bytes(&sig).unwrap();

        assert!(vk.verify(b"tbs bytes", &sig).is_ok());
        assert_eq!(key.signature_algorithm().oid, ECDSA_WITH_SHA384);
    }

    #[test]
    fn test_truncated_sec1_rejected() {
        let der = [0x30, 0x03, 0x02, 0x01, 0x01];
        let err = EcdsaP256Sha256SigningKey::from_sec1_der(&der).err().unwrap();
        assert_eq!(err.code(), crate::error::ErrorCode::InvalidArgument);
    }

    #[test]
    fn test_zero_scalar_rejected() {
        assert!(EcdsaP256Sha256SigningKey::from_bytes(&[0u8; 32]).is_err());
    }
}
