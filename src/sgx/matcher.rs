// SPDX-License-Identifier: Apache-2.0

use super::{
    identity::{is_identity_compatible, is_valid_expectation, is_valid_sgx_identity},
    CodeIdentity, CodeIdentityMatchSpec, SgxIdentity, SgxIdentityExpectation,
    SignerAssignedIdentity,
};
use crate::{
    error::{Error, Result},
    util::hex_string,
};

use log::{debug, trace};

/// Result of comparing an identity against an expectation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Every evaluated comparison succeeded.
    pub matched: bool,

    /// Every failed comparison, joined with " and ". Empty on a match.
    pub explanation: String,
}

/// Compares `identity` against `expectation`.
///
/// Malformed inputs, or an identity lacking a field the match spec compares, are
/// an invalid-argument error rather than a mismatch. `is_legacy_expectation`
/// only governs how the expectation is validated, so a versioned identity can
/// still be matched against a legacy expectation.
pub fn match_identity_to_expectation(
    identity: &SgxIdentity,
    expectation: &SgxIdentityExpectation,
    is_legacy_expectation: bool,
) -> Result<MatchOutcome> {
    if !is_valid_expectation(expectation, is_legacy_expectation) {
        return Err(Error::invalid_argument("Expectation parameter is invalid"));
    }
    if !is_valid_sgx_identity(identity, false) {
        return Err(Error::invalid_argument("Identity parameter is invalid"));
    }
    if !is_identity_compatible(identity, &expectation.match_spec, is_legacy_expectation) {
        return Err(Error::invalid_argument(
            "Identity is not compatible with specified match spec",
        ));
    }

    let mut explanations = machine_configuration_mismatches(identity, expectation);
    explanations.extend(code_identity_mismatches(
        &identity.code_identity,
        &expectation.reference_identity.code_identity,
        &expectation.match_spec.code_identity_match_spec,
    ));

    let outcome = MatchOutcome {
        matched: explanations.is_empty(),
        explanation: explanations.join(" and "),
    };

    if outcome.matched {
        trace!("identity matches expectation");
    } else {
        debug!("identity does not match expectation: {}", outcome.explanation);
    }

    Ok(outcome)
}

fn machine_configuration_mismatches(
    identity: &SgxIdentity,
    expectation: &SgxIdentityExpectation,
) -> Vec<String> {
    let actual = &identity.machine_configuration;
    let expected = &expectation.reference_identity.machine_configuration;
    let spec = &expectation.match_spec.machine_configuration_match_spec;

    let mut explanations = Vec::new();

    if spec.is_cpu_svn_match_required == Some(true) {
        let actual_svn = actual.cpu_svn.as_ref().map(|svn| svn.value.as_slice());
        let expected_svn = expected.cpu_svn.as_ref().map(|svn| svn.value.as_slice());
        if actual_svn != expected_svn {
            explanations.push(format!(
                "CPUSVN value {} does not match expected CPUSVN value {}",
                hex_string(actual_svn.unwrap_or_default()),
                hex_string(expected_svn.unwrap_or_default()),
            ));
        }
    }

    if spec.is_sgx_type_match_required == Some(true) && actual.sgx_type != expected.sgx_type {
        explanations.push(format!(
            "SGX Type {} does not match expected SGX Type {}",
            actual.sgx_type.unwrap_or_default(),
            expected.sgx_type.unwrap_or_default(),
        ));
    }

    explanations
}

fn code_identity_mismatches(
    identity: &CodeIdentity,
    expected: &CodeIdentity,
    spec: &CodeIdentityMatchSpec,
) -> Vec<String> {
    let mut explanations = Vec::new();

    if spec.is_mrenclave_match_required == Some(true) && identity.mrenclave != expected.mrenclave {
        explanations.push(format!(
            "MRENCLAVE value {} does not match expected MRENCLAVE value {}",
            hash_hex(&identity.mrenclave),
            hash_hex(&expected.mrenclave),
        ));
    }

    let unset = SignerAssignedIdentity::default();
    let given_id = identity.signer_assigned_identity.as_ref().unwrap_or(&unset);
    let expected_id = expected.signer_assigned_identity.as_ref().unwrap_or(&unset);

    if spec.is_mrsigner_match_required == Some(true) && given_id.mrsigner != expected_id.mrsigner {
        explanations.push(format!(
            "MRSIGNER value {} does not match expected MRSIGNER value {}",
            hash_hex(&given_id.mrsigner),
            hash_hex(&expected_id.mrsigner),
        ));
    }

    // Product ID and SVN are compared whatever the match spec says.
    let given_prodid = given_id.isvprodid.unwrap_or_default();
    let expected_prodid = expected_id.isvprodid.unwrap_or_default();
    if given_prodid != expected_prodid {
        explanations.push(format!(
            "ISVPRODID value {given_prodid} does not match expected ISVPRODID value {expected_prodid}"
        ));
    }

    let given_svn = given_id.isvsvn.unwrap_or_default();
    let expected_svn = expected_id.isvsvn.unwrap_or_default();
    if given_svn < expected_svn {
        explanations.push(format!(
            "ISVSVN value {given_svn} is lower than expected ISVSVN value {expected_svn}"
        ));
    }

    let misc_mask = spec.miscselect_match_mask.unwrap_or_default();
    let given_misc = identity.miscselect.unwrap_or_default();
    let expected_misc = expected.miscselect.unwrap_or_default();
    if misc_mask & given_misc != misc_mask & expected_misc {
        explanations.push(format!(
            "MISCSELECT value {given_misc:#08x} does not match expected MISCSELECT value \
             {expected_misc:#08x} masked with {misc_mask:#08x}"
        ));
    }

    let attr_mask = spec.attributes_match_mask.unwrap_or_default();
    let given_attr = identity.attributes.unwrap_or_default();
    let expected_attr = expected.attributes.unwrap_or_default();
    if attr_mask & given_attr != attr_mask & expected_attr {
        explanations.push(format!(
            "ATTRIBUTES value {{{given_attr}}} does not match expected ATTRIBUTES value \
             {{{expected_attr}}} masked with {{{attr_mask}}}"
        ));
    }

    explanations
}

fn hash_hex(hash: &Option<super::Sha256Hash>) -> String {
    hash.as_ref()
        .map(|hash| hex_string(hash.as_ref()))
        .unwrap_or_default()
}
