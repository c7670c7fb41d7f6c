// SPDX-License-Identifier: Apache-2.0

//! Lenient PEM armor for certificates and signing requests.
//!
//! Decoding tolerates arbitrary whitespace inside the base64 body and around
//! the armor lines, so single-line bodies, over-long lines and CRLF files
//! are all accepted. Encoding goes through `der::EncodePem`.

use crate::error::{Error, Result};

use base64::{engine::general_purpose::STANDARD, Engine};

const PEM_HEADER: &str = "-----BEGIN ";
const PEM_FOOTER: &str = "-----END ";
const PEM_ENDING: &str = "-----";

/// PEM label of an X.509 certificate.
pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// PEM label of a PKCS#10 certificate signing request.
pub const CERTIFICATE_REQUEST_LABEL: &str = "CERTIFICATE REQUEST";

/// Decodes the first PEM block of `data`, returning its label and payload.
pub fn decode(data: &[u8]) -> Result<(String, Vec<u8>)> {
    let text = std::str::from_utf8(data)
        .map_err(|_| Error::internal("PEM data is not valid UTF-8"))?
        .trim_start();

    let rest = text
        .strip_prefix(PEM_HEADER)
        .ok_or_else(|| Error::internal("missing PEM header"))?;
    let label_end = rest
        .find(PEM_ENDING)
        .ok_or_else(|| Error::internal("malformed PEM header"))?;
    let label = &rest[..label_end];
    if label.is_empty() || label.contains('\n') {
        return Err(Error::internal("malformed PEM header"));
    }

    let body_and_footer = &rest[label_end + PEM_ENDING.len()..];
    let footer = format!("{PEM_FOOTER}{label}{PEM_ENDING}");
    let footer_start = body_and_footer
        .find(&footer)
        .ok_or_else(|| Error::internal(format!("missing PEM footer for {label}")))?;

    let b64: String = body_and_footer[..footer_start]
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if b64.is_empty() {
        return Err(Error::internal("empty PEM body"));
    }

    let decoded = STANDARD
        .decode(b64.as_bytes())
        .map_err(|e| Error::internal(format!("invalid PEM body: {e}")))?;

    Ok((label.to_string(), decoded))
}

/// Decodes a PEM block and checks that it carries `expected_label`.
pub fn decode_labeled(data: &[u8], expected_label: &str) -> Result<Vec<u8>> {
    let (label, der) = decode(data)?;
    if label != expected_label {
        return Err(Error::internal(format!(
            "unexpected PEM label {label}, wanted {expected_label}"
        )));
    }
    Ok(der)
}
