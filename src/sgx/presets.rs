// SPDX-License-Identifier: Apache-2.0

//! Ready-made match specs and expectations.
//!
//! The expectation helpers take the caller's own identity explicitly. How that
//! identity is obtained is up to the platform layer.

use super::{
    identity::set_expectation, CodeIdentityMatchSpec, MachineConfigurationMatchSpec,
    SecsAttributeSet, SgxIdentity, SgxIdentityExpectation, SgxIdentityMatchSpec,
};
use crate::error::Result;

/// Requires MRSIGNER, every MISCSELECT bit and every attribute outside the
/// default "do not care" set. MRENCLAVE changes between enclave versions, so
/// it is not compared.
pub fn default_code_identity_match_spec() -> CodeIdentityMatchSpec {
    CodeIdentityMatchSpec {
        is_mrenclave_match_required: Some(false),
        is_mrsigner_match_required: Some(true),
        miscselect_match_mask: Some(u32::MAX),
        attributes_match_mask: Some(SecsAttributeSet::default_mask()),
    }
}

/// Requires every code identity field to match exactly.
pub fn strict_code_identity_match_spec() -> CodeIdentityMatchSpec {
    CodeIdentityMatchSpec {
        is_mrenclave_match_required: Some(true),
        is_mrsigner_match_required: Some(true),
        miscselect_match_mask: Some(u32::MAX),
        attributes_match_mask: Some(SecsAttributeSet::strict_mask()),
    }
}

/// Default spec for local attestation. No machine configuration checks.
pub fn default_local_sgx_match_spec() -> SgxIdentityMatchSpec {
    SgxIdentityMatchSpec {
        code_identity_match_spec: default_code_identity_match_spec(),
        machine_configuration_match_spec: MachineConfigurationMatchSpec {
            is_cpu_svn_match_required: Some(false),
            is_sgx_type_match_required: Some(false),
        },
    }
}

/// Strict spec for local attestation.
///
/// Locally attested identities only carry CPUSVN, so the platform type is not
/// compared even here.
pub fn strict_local_sgx_match_spec() -> SgxIdentityMatchSpec {
    SgxIdentityMatchSpec {
        code_identity_match_spec: strict_code_identity_match_spec(),
        machine_configuration_match_spec: MachineConfigurationMatchSpec {
            is_cpu_svn_match_required: Some(true),
            is_sgx_type_match_required: Some(false),
        },
    }
}

/// Default spec for remote attestation. Same as the local default.
pub fn default_remote_sgx_match_spec() -> SgxIdentityMatchSpec {
    default_local_sgx_match_spec()
}

/// Strict spec for remote attestation.
pub fn strict_remote_sgx_match_spec() -> SgxIdentityMatchSpec {
    SgxIdentityMatchSpec {
        code_identity_match_spec: strict_code_identity_match_spec(),
        machine_configuration_match_spec: MachineConfigurationMatchSpec {
            is_cpu_svn_match_required: Some(true),
            is_sgx_type_match_required: Some(true),
        },
    }
}

/// Expects peers to match `self_identity` under [`default_local_sgx_match_spec`].
pub fn default_local_self_expectation(
    self_identity: &SgxIdentity,
) -> Result<SgxIdentityExpectation> {
    set_expectation(&default_local_sgx_match_spec(), self_identity, false)
}

/// Expects peers to match `self_identity` under [`strict_local_sgx_match_spec`].
pub fn strict_local_self_expectation(
    self_identity: &SgxIdentity,
) -> Result<SgxIdentityExpectation> {
    set_expectation(&strict_local_sgx_match_spec(), self_identity, false)
}

/// Expects peers to match `self_identity` under [`default_remote_sgx_match_spec`].
pub fn default_remote_self_expectation(
    self_identity: &SgxIdentity,
) -> Result<SgxIdentityExpectation> {
    set_expectation(&default_remote_sgx_match_spec(), self_identity, false)
}

/// Expects peers to match `self_identity` under [`strict_remote_sgx_match_spec`].
pub fn strict_remote_self_expectation(
    self_identity: &SgxIdentity,
) -> Result<SgxIdentityExpectation> {
    set_expectation(&strict_remote_sgx_match_spec(), self_identity, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgx::identity::is_valid_match_spec;

    #[test]
    fn test_presets_are_valid() {
        for spec in [
            default_local_sgx_match_spec(),
            strict_local_sgx_match_spec(),
            default_remote_sgx_match_spec(),
            strict_remote_sgx_match_spec(),
        ] {
            assert!(is_valid_match_spec(&spec, false));
        }
    }

    #[test]
    fn test_default_ignores_mrenclave() {
        let spec = default_local_sgx_match_spec();
        assert_eq!(
            spec.code_identity_match_spec.is_mrenclave_match_required,
            Some(false)
        );
        assert_eq!(
            spec.code_identity_match_spec.attributes_match_mask,
            Some(!SecsAttributeSet::default_do_not_care())
        );
        assert_eq!(default_remote_sgx_match_spec(), spec);
    }

    #[test]
    fn test_strict_remote_adds_sgx_type() {
        let local = strict_local_sgx_match_spec();
        let remote = strict_remote_sgx_match_spec();
        assert_eq!(
            local.machine_configuration_match_spec.is_sgx_type_match_required,
            Some(false)
        );
        assert_eq!(
            remote.machine_configuration_match_spec.is_sgx_type_match_required,
            Some(true)
        );
        assert_eq!(local.code_identity_match_spec, remote.code_identity_match_spec);
    }
}
