// SPDX-License-Identifier: Apache-2.0

//! Signing capability consumed by the certificate builder, and the signature
//! algorithm identifiers understood by the verifier.

mod ec;

pub use self::ec::{EcdsaP256Sha256SigningKey, EcdsaP384Sha384SigningKey};

use crate::error::Result;

use x509_cert::{der::oid::ObjectIdentifier, spki::AlgorithmIdentifierOwned};

/// ecdsa-with-SHA256 (RFC 5758).
pub const ECDSA_WITH_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");
/// ecdsa-with-SHA384 (RFC 5758).
pub const ECDSA_WITH_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.3");
/// ecdsa-with-SHA512 (RFC 5758). Recognized, but not accepted for verification.
pub const ECDSA_WITH_SHA512: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.4");
/// sha256WithRSAEncryption (RFC 4055).
pub const SHA256_WITH_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
/// sha384WithRSAEncryption (RFC 4055).
pub const SHA384_WITH_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12");
/// RSASSA-PSS (RFC 4055). Only SHA-384 parameters are accepted.
pub const RSASSA_PSS: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.10");

/// id-sha384 (RFC 5754).
pub const ID_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.2");

/// id-ecPublicKey (RFC 5480).
pub const EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
/// secp256r1 named curve.
pub const SECP256R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
/// secp384r1 named curve.
pub const SECP384R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
/// rsaEncryption (RFC 8017).
pub const RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// A private key able to sign certificate bodies.
///
/// Implementations own their key material; the builder only ever sees the
/// algorithm identifier, the signature bytes and the public half.
pub trait SigningKey {
    /// The AlgorithmIdentifier to place in the certificate's `signature` and
    /// `signatureAlgorithm` fields.
    fn signature_algorithm(&self) -> AlgorithmIdentifierOwned;

    /// Signs `message`, returning the encoded signature value that goes into
    /// the certificate's BIT STRING.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;

    /// DER-encoded SubjectPublicKeyInfo of the matching public key.
    fn public_key_der(&self) -> Result<Vec<u8>>;
}
