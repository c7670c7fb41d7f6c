// SPDX-License-Identifier: Apache-2.0

//! The `enclave_trust` crate decides whether a peer is trusted. It does this
//! in two ways: by checking certificate chains, and by matching SGX enclave
//! identities against an expectation.
//!
//! ## Certificates
//!
//! Certificates arrive as tagged blobs ([`certs::Certificate`]) and are parsed
//! through [`certs::create_certificate`] into a
//! [`certs::CertificateInterface`]. A subject is checked against its issuer
//! with [`certs::CertificateInterface::verify`]. The optional policy checks
//! are selected by a [`certs::VerificationConfig`]:
//!
//! 1. the issuer is a CA,
//! 2. the issuer's path length constraint is respected,
//! 3. the issuer's key usage allows certificate signing.
//!
//! The signature check is always performed. Whole chains are verified with
//! [`certs::verify_certificate_chain`].
//!
//! New X.509 certificates can be issued with
//! [`certs::x509::X509CertificateBuilder`] and any [`crypto::SigningKey`].
//!
//! ## SGX identities
//!
//! With the `sgx` feature (enabled by default), the [`sgx`] module models
//! enclave identities, match specs and expectations. It also authenticates
//! hardware REPORT structures through a caller-supplied
//! [`sgx::HardwareInterface`].
//!
//! The library logs through the [`log`] facade and never installs a logger.

#![deny(clippy::all)]
#![deny(missing_docs)]
#![allow(unknown_lints)]
#![allow(clippy::identity_op)]

/// Certificate containers, parsers and the verification policy.
pub mod certs;

/// Signing keys used to issue certificates.
pub mod crypto;

/// Error module.
pub mod error;

#[cfg(feature = "sgx")]
pub mod sgx;

/// Shared helpers.
pub mod util;
