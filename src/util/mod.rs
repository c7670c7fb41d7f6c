// SPDX-License-Identifier: Apache-2.0

//! Helpful primitives shared by the certificate and SGX modules.

pub mod array;
pub(crate) mod hexline;
pub mod pem;

#[cfg(feature = "sgx")]
pub(crate) mod parser;

/// Renders `bytes` as a contiguous lowercase hex string.
#[cfg(feature = "sgx")]
pub(crate) fn hex_string(bytes: &[u8]) -> String {
    hex::encode(bytes)
}
