// SPDX-License-Identifier: Apache-2.0

use super::SecsAttributeSet;
use crate::util::array::Array;

use serde::{Deserialize, Serialize};

/// A SHA-256 measurement such as MRENCLAVE or MRSIGNER.
pub type Sha256Hash = Array<u8, 32>;

/// The part of an enclave identity chosen by whoever signed the enclave.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerAssignedIdentity {
    /// Hash of the enclave signer's public key. Optional.
    pub mrsigner: Option<Sha256Hash>,

    /// Product ID. Required.
    pub isvprodid: Option<u16>,

    /// Security version number. Required.
    pub isvsvn: Option<u16>,
}

impl SignerAssignedIdentity {
    /// Product ID and SVN are present.
    pub fn is_valid(&self) -> bool {
        self.isvprodid.is_some() && self.isvsvn.is_some()
    }
}

/// The code-level identity of an enclave.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeIdentity {
    /// Hash of the enclave's initial code and data. Optional.
    pub mrenclave: Option<Sha256Hash>,

    /// Signer-assigned part of the identity. Required.
    pub signer_assigned_identity: Option<SignerAssignedIdentity>,

    /// MISCSELECT value. Required.
    pub miscselect: Option<u32>,

    /// ATTRIBUTES value. Required.
    pub attributes: Option<SecsAttributeSet>,
}

/// Which parts of a [`CodeIdentity`] must match a reference identity.
///
/// All four fields must be set for the match spec to be usable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeIdentityMatchSpec {
    /// Compare MRENCLAVE.
    pub is_mrenclave_match_required: Option<bool>,

    /// Compare MRSIGNER.
    pub is_mrsigner_match_required: Option<bool>,

    /// Bits of MISCSELECT that must be equal.
    pub miscselect_match_mask: Option<u32>,

    /// Bits of ATTRIBUTES that must be equal.
    pub attributes_match_mask: Option<SecsAttributeSet>,
}

/// Checks that every required field of `identity` is present.
///
/// MRENCLAVE and MRSIGNER are optional here; whether they are needed depends
/// on the match spec they are used with.
pub fn is_valid_code_identity(identity: &CodeIdentity) -> bool {
    match &identity.signer_assigned_identity {
        Some(signer) if signer.is_valid() => {}
        _ => return false,
    }

    identity.miscselect.is_some() && identity.attributes.is_some()
}

/// Checks that every field of `spec` is set.
pub fn is_valid_code_identity_match_spec(spec: &CodeIdentityMatchSpec) -> bool {
    spec.is_mrenclave_match_required.is_some()
        && spec.is_mrsigner_match_required.is_some()
        && spec.miscselect_match_mask.is_some()
        && spec.attributes_match_mask.is_some()
}

/// Whether `identity` carries every measurement `spec` wants to compare.
pub(crate) fn is_code_identity_compatible(
    identity: &CodeIdentity,
    spec: &CodeIdentityMatchSpec,
) -> bool {
    if spec.is_mrenclave_match_required == Some(true) && identity.mrenclave.is_none() {
        return false;
    }

    let has_mrsigner = identity
        .signer_assigned_identity
        .as_ref()
        .map_or(false, |signer| signer.mrsigner.is_some());
    !(spec.is_mrsigner_match_required == Some(true) && !has_mrsigner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> CodeIdentity {
        CodeIdentity {
            mrenclave: None,
            signer_assigned_identity: Some(SignerAssignedIdentity {
                mrsigner: None,
                isvprodid: Some(1),
                isvsvn: Some(2),
            }),
            miscselect: Some(0),
            attributes: Some(SecsAttributeSet::new(0, 0)),
        }
    }

    #[test]
    fn test_mrsigner_and_mrenclave_optional() {
        assert!(is_valid_code_identity(&identity()));
    }

    #[test]
    fn test_missing_required_fields() {
        let mut id = identity();
        id.miscselect = None;
        assert!(!is_valid_code_identity(&id));

        let mut id = identity();
        id.signer_assigned_identity.as_mut().unwrap().isvsvn = None;
        assert!(!is_valid_code_identity(&id));

        let mut id = identity();
        id.signer_assigned_identity = None;
        assert!(!is_valid_code_identity(&id));
    }

    #[test]
    fn test_match_spec_requires_all_fields() {
        let mut spec = CodeIdentityMatchSpec {
            is_mrenclave_match_required: Some(false),
            is_mrsigner_match_required: Some(true),
            miscselect_match_mask: Some(u32::MAX),
            attributes_match_mask: Some(SecsAttributeSet::all()),
        };
        assert!(is_valid_code_identity_match_spec(&spec));

        spec.attributes_match_mask = None;
        assert!(!is_valid_code_identity_match_spec(&spec));
    }

    #[test]
    fn test_compatibility() {
        let spec = CodeIdentityMatchSpec {
            is_mrenclave_match_required: Some(false),
            is_mrsigner_match_required: Some(true),
            miscselect_match_mask: Some(0),
            attributes_match_mask: Some(SecsAttributeSet::new(0, 0)),
        };

        let mut id = identity();
        assert!(!is_code_identity_compatible(&id, &spec));

        id.signer_assigned_identity.as_mut().unwrap().mrsigner = Some(Array([7; 32]));
        assert!(is_code_identity_compatible(&id, &spec));
    }
}
