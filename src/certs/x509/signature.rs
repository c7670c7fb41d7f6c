// SPDX-License-Identifier: Apache-2.0

use crate::{
    crypto::{
        ECDSA_WITH_SHA256, ECDSA_WITH_SHA384, EC_PUBLIC_KEY, ID_SHA384, RSASSA_PSS,
        RSA_ENCRYPTION, SECP256R1, SECP384R1, SHA256_WITH_RSA_ENCRYPTION,
        SHA384_WITH_RSA_ENCRYPTION,
    },
    error::{Error, Result},
};

use ecdsa::signature::{hazmat::PrehashVerifier, Verifier};
use rsa::pkcs1::RsaPssParams;
use sha2::{Digest, Sha256, Sha384};
use x509_cert::{
    der::{Decode, Encode},
    spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoRef},
};
use std::convert::TryFrom;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Scheme {
    EcdsaSha256,
    EcdsaSha384,
    RsaPkcs1Sha256,
    RsaPkcs1Sha384,
    RsaPssSha384 { salt_len: usize },
}

impl Scheme {
    fn from_algorithm(algorithm: &AlgorithmIdentifierOwned) -> Result<Self> {
        let oid = algorithm.oid;
        if oid == ECDSA_WITH_SHA256 {
            Ok(Self::EcdsaSha256)
        } else if oid == ECDSA_WITH_SHA384 {
            Ok(Self::EcdsaSha384)
        } else if oid == SHA256_WITH_RSA_ENCRYPTION {
            Ok(Self::RsaPkcs1Sha256)
        } else if oid == SHA384_WITH_RSA_ENCRYPTION {
            Ok(Self::RsaPkcs1Sha384)
        } else if oid == RSASSA_PSS {
            Self::rsa_pss(algorithm)
        } else {
            Err(Error::unimplemented(format!(
                "Signature algorithm {oid} is not supported"
            )))
        }
    }

    /// Absent parameters mean the SHA-1 defaults, which are not accepted.
    fn rsa_pss(algorithm: &AlgorithmIdentifierOwned) -> Result<Self> {
        let encoded = match &algorithm.parameters {
            Some(parameters) => parameters.to_der()?,
            None => {
                return Err(Error::unimplemented(
                    "RSASSA-PSS with default SHA-1 parameters is not supported",
                ))
            }
        };
        let params = RsaPssParams::from_der(&encoded)?;

        let mgf_digest = params.mask_gen.parameters.as_ref().map(|hash| hash.oid);
        if params.hash.oid != ID_SHA384 || mgf_digest != Some(ID_SHA384) {
            return Err(Error::unimplemented(format!(
                "RSASSA-PSS with digest {} is not supported",
                params.hash.oid
            )));
        }

        Ok(Self::RsaPssSha384 {
            salt_len: usize::from(params.salt_len),
        })
    }

    fn digest(self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::EcdsaSha256 | Self::RsaPkcs1Sha256 => Sha256::digest(message).to_vec(),
            Self::EcdsaSha384 | Self::RsaPkcs1Sha384 | Self::RsaPssSha384 { .. } => {
                Sha384::digest(message).to_vec()
            }
        }
    }
}

/// Checks `signature` over `message` with the key in `issuer_spki_der`,
/// using the algorithm described by `algorithm`.
pub(crate) fn verify_signed_data(
    algorithm: &AlgorithmIdentifierOwned,
    message: &[u8],
    signature: &[u8],
    issuer_spki_der: &[u8],
) -> Result<()> {
    let scheme = Scheme::from_algorithm(algorithm)?;

    let spki = SubjectPublicKeyInfoRef::from_der(issuer_spki_der)?;

    match scheme {
        Scheme::EcdsaSha256 | Scheme::EcdsaSha384 => {
            if spki.algorithm.oid != EC_PUBLIC_KEY {
                return Err(Error::internal(
                    "ECDSA signature but issuer key is not an EC key",
                ));
            }
            let curve = spki.algorithm.parameters_oid().map_err(|e| {
                Error::internal(format!("EC key has no named curve: {e}"))
            })?;
            let point = spki.subject_public_key.raw_bytes();
            let prehash = scheme.digest(message);

            if curve == SECP256R1 {
                verify_p256(point, &prehash, signature)
            } else if curve == SECP384R1 {
                verify_p384(point, &prehash, signature)
            } else {
                Err(Error::unimplemented(format!("EC curve {curve} is not supported")))
            }
        }
        Scheme::RsaPkcs1Sha256 | Scheme::RsaPkcs1Sha384 | Scheme::RsaPssSha384 { .. } => {
            if spki.algorithm.oid != RSA_ENCRYPTION {
                return Err(Error::internal(
                    "RSA signature but issuer key is not an RSA key",
                ));
            }
            verify_rsa(scheme, spki, message, signature)
        }
    }
}

fn verify_p256(point: &[u8], prehash: &[u8], signature: &[u8]) -> Result<()> {
    let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(point)
        .map_err(|e| Error::internal(format!("invalid P-256 issuer key: {e}")))?;
    let signature = p256::ecdsa::Signature::from_der(signature)
        .map_err(|e| Error::internal(format!("malformed ECDSA signature: {e}")))?;
    key.verify_prehash(prehash, &signature)
        .map_err(|_| Error::internal("Certificate signature verification failed"))
}

fn verify_p384(point: &[u8], prehash: &[u8], signature: &[u8]) -> Result<()> {
    let key = p384::ecdsa::VerifyingKey::from_sec1_bytes(point)
        .map_err(|e| Error::internal(format!("invalid P-384 issuer key: {e}")))?;
    let signature = p384::ecdsa::Signature::from_der(signature)
        .map_err(|e| Error::internal(format!("malformed ECDSA signature: {e}")))?;
    key.verify_prehash(prehash, &signature)
        .map_err(|_| Error::internal("Certificate signature verification failed"))
}

fn verify_rsa(
    scheme: Scheme,
    spki: SubjectPublicKeyInfoRef<'_>,
    message: &[u8],
    signature: &[u8],
) -> Result<()> {
    let key = rsa::RsaPublicKey::try_from(spki)
        .map_err(|e| Error::internal(format!("invalid RSA issuer key: {e}")))?;
    let failed = |_| Error::internal("Certificate signature verification failed");

    match scheme {
        Scheme::RsaPkcs1Sha256 => {
            let verifier = rsa::pkcs1v15::VerifyingKey::<Sha256>::new(key);
            let signature = rsa::pkcs1v15::Signature::try_from(signature).map_err(failed)?;
            verifier.verify(message, &signature).map_err(failed)
        }
        Scheme::RsaPkcs1Sha384 => {
            let verifier = rsa::pkcs1v15::VerifyingKey::<Sha384>::new(key);
            let signature = rsa::pkcs1v15::Signature::try_from(signature).map_err(failed)?;
            verifier.verify(message, &signature).map_err(failed)
        }
        Scheme::RsaPssSha384 { salt_len } => {
            let verifier = rsa::pss::VerifyingKey::<Sha384>::new_with_salt_len(key, salt_len);
            let signature = rsa::pss::Signature::try_from(signature).map_err(failed)?;
            verifier.verify(message, &signature).map_err(failed)
        }
        Scheme::EcdsaSha256 | Scheme::EcdsaSha384 => Err(Error::internal(
            "ECDSA scheme routed to RSA verification",
        )),
    }
}
