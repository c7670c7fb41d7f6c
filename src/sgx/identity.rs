// SPDX-License-Identifier: Apache-2.0

use super::{
    code_identity::{
        is_code_identity_compatible, is_valid_code_identity, is_valid_code_identity_match_spec,
    },
    machine_config::validate_cpu_svn,
    CodeIdentity, CodeIdentityMatchSpec, MachineConfiguration, MachineConfigurationMatchSpec,
};
use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};

/// Full identity of an SGX enclave: its code identity plus the machine it
/// runs on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SgxIdentity {
    /// Code-level identity.
    pub code_identity: CodeIdentity,

    /// Platform properties. Empty for identities parsed from the legacy
    /// schema.
    pub machine_configuration: MachineConfiguration,
}

/// Which parts of an [`SgxIdentity`] must match a reference identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SgxIdentityMatchSpec {
    /// Code identity requirements.
    pub code_identity_match_spec: CodeIdentityMatchSpec,

    /// Platform requirements. Ignored for legacy specs.
    pub machine_configuration_match_spec: MachineConfigurationMatchSpec,
}

/// A reference identity together with the match spec used to compare against it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SgxIdentityExpectation {
    /// How to compare.
    pub match_spec: SgxIdentityMatchSpec,

    /// What to compare against.
    pub reference_identity: SgxIdentity,
}

/// Checks that `identity` is internally consistent.
///
/// A non-legacy identity may leave CPUSVN unset, since reference identities
/// need not pin it, but a present CPUSVN must be well formed.
pub fn is_valid_sgx_identity(identity: &SgxIdentity, is_legacy: bool) -> bool {
    if !is_legacy {
        if let Some(cpu_svn) = &identity.machine_configuration.cpu_svn {
            if validate_cpu_svn(cpu_svn).is_err() {
                return false;
            }
        }
    }

    is_valid_code_identity(&identity.code_identity)
}

/// Checks that every field of `spec` is set. Legacy specs have no machine
/// configuration requirements.
pub fn is_valid_match_spec(spec: &SgxIdentityMatchSpec, is_legacy: bool) -> bool {
    if !is_legacy {
        let machine = &spec.machine_configuration_match_spec;
        if machine.is_cpu_svn_match_required.is_none()
            || machine.is_sgx_type_match_required.is_none()
        {
            return false;
        }
    }

    is_valid_code_identity_match_spec(&spec.code_identity_match_spec)
}

/// Checks that the match spec and the reference identity of `expectation` are each
/// valid and that the identity carries everything the match spec compares.
pub fn is_valid_expectation(expectation: &SgxIdentityExpectation, is_legacy: bool) -> bool {
    is_valid_match_spec(&expectation.match_spec, is_legacy)
        && is_valid_sgx_identity(&expectation.reference_identity, is_legacy)
        && is_identity_compatible(
            &expectation.reference_identity,
            &expectation.match_spec,
            is_legacy,
        )
}

/// Whether `identity` has every field that `spec` requires a match on.
pub(crate) fn is_identity_compatible(
    identity: &SgxIdentity,
    spec: &SgxIdentityMatchSpec,
    is_legacy: bool,
) -> bool {
    if !is_legacy {
        let machine = &identity.machine_configuration;
        let machine_spec = &spec.machine_configuration_match_spec;

        if machine_spec.is_cpu_svn_match_required == Some(true) && machine.cpu_svn.is_none() {
            return false;
        }
        if machine_spec.is_sgx_type_match_required == Some(true) && machine.sgx_type.is_none() {
            return false;
        }
    }

    is_code_identity_compatible(&identity.code_identity, &spec.code_identity_match_spec)
}

/// Pairs `spec` with `identity` after validating both.
pub fn set_expectation(
    spec: &SgxIdentityMatchSpec,
    identity: &SgxIdentity,
    is_legacy: bool,
) -> Result<SgxIdentityExpectation> {
    if !is_valid_match_spec(spec, is_legacy) {
        return Err(Error::invalid_argument("Match spec is invalid"));
    }
    if !is_valid_sgx_identity(identity, is_legacy) {
        return Err(Error::invalid_argument("Identity is invalid"));
    }

    Ok(SgxIdentityExpectation {
        match_spec: spec.clone(),
        reference_identity: identity.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorCode,
        sgx::{CpuSvn, SecsAttributeSet, SgxType, SignerAssignedIdentity},
    };

    fn identity() -> SgxIdentity {
        SgxIdentity {
            code_identity: CodeIdentity {
                mrenclave: None,
                signer_assigned_identity: Some(SignerAssignedIdentity {
                    mrsigner: None,
                    isvprodid: Some(0),
                    isvsvn: Some(0),
                }),
                miscselect: Some(0),
                attributes: Some(SecsAttributeSet::default()),
            },
            machine_configuration: MachineConfiguration::default(),
        }
    }

    fn spec(cpu_svn: Option<bool>) -> SgxIdentityMatchSpec {
        SgxIdentityMatchSpec {
            code_identity_match_spec: CodeIdentityMatchSpec {
                is_mrenclave_match_required: Some(false),
                is_mrsigner_match_required: Some(false),
                miscselect_match_mask: Some(0),
                attributes_match_mask: Some(SecsAttributeSet::default()),
            },
            machine_configuration_match_spec: MachineConfigurationMatchSpec {
                is_cpu_svn_match_required: cpu_svn,
                is_sgx_type_match_required: Some(false),
            },
        }
    }

    #[test]
    fn test_malformed_cpu_svn_only_matters_for_versioned() {
        let mut id = identity();
        id.machine_configuration.cpu_svn = Some(CpuSvn { value: vec![1, 2, 3] });

        assert!(!is_valid_sgx_identity(&id, false));
        assert!(is_valid_sgx_identity(&id, true));
    }

    #[test]
    fn test_legacy_spec_ignores_machine_fields() {
        let spec = spec(None);
        assert!(!is_valid_match_spec(&spec, false));
        assert!(is_valid_match_spec(&spec, true));
    }

    #[test]
    fn test_expectation_requires_compatible_identity() {
        let expectation = SgxIdentityExpectation {
            match_spec: spec(Some(true)),
            reference_identity: identity(),
        };
        assert!(!is_valid_expectation(&expectation, false));
        assert!(is_valid_expectation(&expectation, true));

        let mut with_svn = expectation.clone();
        with_svn.reference_identity.machine_configuration.cpu_svn = Some([0u8; 16].into());
        assert!(is_valid_expectation(&with_svn, false));
    }

    #[test]
    fn test_sgx_type_compatibility() {
        let mut spec = spec(Some(false));
        spec.machine_configuration_match_spec.is_sgx_type_match_required = Some(true);

        let mut id = identity();
        assert!(!is_identity_compatible(&id, &spec, false));

        id.machine_configuration.sgx_type = Some(SgxType::Standard);
        assert!(is_identity_compatible(&id, &spec, false));
    }

    #[test]
    fn test_set_expectation() {
        let expectation = set_expectation(&spec(Some(false)), &identity(), false).unwrap();
        assert_eq!(expectation.reference_identity, identity());

        let err = set_expectation(&spec(None), &identity(), false).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);

        let mut bad = identity();
        bad.code_identity.attributes = None;
        let err = set_expectation(&spec(Some(false)), &bad, false).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }
}
