// SPDX-License-Identifier: Apache-2.0

use super::{CertificateInterface, VerificationConfig};
use crate::error::{Error, Result};

use log::{debug, trace};

/// Signature first, then the enabled policy checks in a fixed order.
pub(crate) fn verify_issued_by<S>(
    subject: &S,
    issuer: &dyn CertificateInterface,
    config: &VerificationConfig,
) -> Result<()>
where
    S: CertificateInterface + ?Sized,
{
    subject.verify_signature(issuer)?;

    if config.issuer_ca {
        check_issuer_ca(issuer)?;
    }

    if config.max_pathlen {
        // Only an explicit non-CA subject sits at distance zero.
        let distance = u64::from(subject.is_ca() != Some(false));
        check_path_length(issuer, distance)?;
    }

    if config.issuer_key_usage {
        check_issuer_key_usage(issuer)?;
    }

    Ok(())
}

fn check_issuer_ca(issuer: &dyn CertificateInterface) -> Result<()> {
    if issuer.is_ca() == Some(false) {
        debug!("issuer certificate asserts it is not a CA");
        return Err(Error::unauthenticated("Issuer had a false CA value"));
    }
    Ok(())
}

fn check_path_length(issuer: &dyn CertificateInterface, distance: u64) -> Result<()> {
    match issuer.cert_path_length() {
        Some(max) if distance > max => {
            debug!("path length {distance} exceeds issuer constraint {max}");
            Err(Error::unauthenticated(format!(
                "Path length {distance} exceeds the issuer's maximum path length {max}"
            )))
        }
        _ => Ok(()),
    }
}

fn check_issuer_key_usage(issuer: &dyn CertificateInterface) -> Result<()> {
    match issuer.key_usage() {
        Some(usage) if !usage.certificate_signing => {
            debug!("issuer key usage does not allow certificate signing");
            Err(Error::unauthenticated(
                "Issuer's key usage does not include certificate signing",
            ))
        }
        _ => Ok(()),
    }
}

/// Verifies `chain`, ordered leaf first and root last.
///
/// Every certificate is checked against its successor. The root itself is
/// trusted as given and is not checked against anything. Path length
/// constraints are enforced against the number of intermediate CA
/// certificates (or intermediates of unknown CA status) below each issuer, so
/// a constraint on the root limits the whole chain. The leaf never counts.
pub fn verify_certificate_chain(
    chain: &[Box<dyn CertificateInterface>],
    config: &VerificationConfig,
) -> Result<()> {
    if chain.is_empty() {
        return Err(Error::invalid_argument("Certificate chain is empty"));
    }

    let pair_config = VerificationConfig {
        max_pathlen: false,
        ..*config
    };

    // CA-or-unknown intermediates below the current issuer.
    let mut distance = 0u64;

    for (index, pair) in chain.windows(2).enumerate() {
        let (subject, issuer) = (pair[0].as_ref(), pair[1].as_ref());
        trace!("verifying certificate {index} against its issuer");

        verify_issued_by(subject, issuer, &pair_config)?;

        // The leaf is the user certificate and sits at distance zero.
        if index > 0 && subject.is_ca() != Some(false) {
            distance += 1;
        }

        if config.max_pathlen {
            check_path_length(issuer, distance)?;
        }
    }

    Ok(())
}
