// SPDX-License-Identifier: Apache-2.0

//! Conversion between SGX identities and the authority-neutral identity
//! containers exchanged with peers.
//!
//! Two schemas share the container. A container without a version carries a
//! bare [`CodeIdentity`]; one with [`SGX_IDENTITY_VERSION`] carries a full
//! [`SgxIdentity`]. Match specs carry no version, so the caller says which
//! schema to expect.

use super::{
    code_identity::{is_valid_code_identity, is_valid_code_identity_match_spec},
    identity::{is_identity_compatible, is_valid_match_spec, is_valid_sgx_identity},
    CodeIdentity, CodeIdentityMatchSpec, SgxIdentity, SgxIdentityExpectation,
    SgxIdentityMatchSpec,
};
use crate::error::{Error, Result};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::Display;

/// Authority type of SGX identities.
pub const SGX_AUTHORIZATION_AUTHORITY: &str = "SGX";

/// Version of containers holding a full [`SgxIdentity`].
pub const SGX_IDENTITY_VERSION: &str = "SGX_IDENTITY_VERSION_1";

/// Kind of enclave identity held by a container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnclaveIdentityType {
    /// Not set.
    #[default]
    Unknown,

    /// No identity.
    Null,

    /// Identity derived from enclave code.
    Code,

    /// Identity derived from a certificate.
    Cert,
}

impl Display for EnclaveIdentityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EnclaveIdentityType::Unknown => "UNKNOWN_IDENTITY",
            EnclaveIdentityType::Null => "NULL_IDENTITY",
            EnclaveIdentityType::Code => "CODE_IDENTITY",
            EnclaveIdentityType::Cert => "CERT_IDENTITY",
        };
        write!(f, "{name}")
    }
}

/// Names the kind and issuing authority of an identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnclaveIdentityDescription {
    /// Kind of identity.
    pub identity_type: EnclaveIdentityType,

    /// Authority that vouches for the identity, such as `"SGX"`.
    pub authority_type: String,
}

impl EnclaveIdentityDescription {
    /// The description of every SGX identity.
    pub fn sgx() -> Self {
        Self {
            identity_type: EnclaveIdentityType::Code,
            authority_type: SGX_AUTHORIZATION_AUTHORITY.to_string(),
        }
    }
}

/// An identity in serialized form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnclaveIdentity {
    /// What the payload is.
    pub description: EnclaveIdentityDescription,

    /// Payload schema version. Absent for legacy payloads.
    pub version: Option<String>,

    /// Serialized identity.
    #[serde(with = "serde_bytes")]
    pub identity: Vec<u8>,
}

/// An expectation in serialized form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnclaveIdentityExpectation {
    /// Reference identity.
    pub reference_identity: EnclaveIdentity,

    /// Serialized match spec.
    #[serde(with = "serde_bytes")]
    pub match_spec: Vec<u8>,
}

/// The payload schema of an [`EnclaveIdentity`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SgxIdentitySchema {
    /// Bare [`CodeIdentity`].
    Legacy,

    /// Full [`SgxIdentity`].
    Versioned,
}

impl SgxIdentitySchema {
    /// Selects the schema from a container's version field.
    pub fn from_version(version: Option<&str>) -> Result<Self> {
        match version {
            None => Ok(Self::Legacy),
            Some(SGX_IDENTITY_VERSION) => Ok(Self::Versioned),
            Some(_) => Err(Error::invalid_argument(
                "Unknown identity version in EnclaveIdentity",
            )),
        }
    }

    /// Whether this is the legacy schema.
    pub fn is_legacy(self) -> bool {
        self == Self::Legacy
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T> {
    bincode::deserialize(bytes).map_err(|e| {
        Error::invalid_argument(format!("Could not parse SGX {what} from the {what} string: {e}"))
    })
}

fn check_description(description: &EnclaveIdentityDescription) -> Result<()> {
    if description.identity_type != EnclaveIdentityType::Code {
        return Err(Error::invalid_argument(format!(
            "Invalid identity_type: Expected = {}, Actual = {}",
            EnclaveIdentityType::Code,
            description.identity_type
        )));
    }
    if description.authority_type != SGX_AUTHORIZATION_AUTHORITY {
        return Err(Error::invalid_argument(format!(
            "Invalid authority_type: Expected = {SGX_AUTHORIZATION_AUTHORITY}, Actual = {}",
            description.authority_type
        )));
    }
    Ok(())
}

/// Decodes an SGX identity from either schema.
///
/// A legacy payload yields an identity with an empty machine configuration.
pub fn parse_sgx_identity(generic: &EnclaveIdentity) -> Result<SgxIdentity> {
    let schema = SgxIdentitySchema::from_version(generic.version.as_deref())?;
    check_description(&generic.description)?;

    let identity = match schema {
        SgxIdentitySchema::Legacy => {
            let code_identity: CodeIdentity = decode(&generic.identity, "identity")?;
            if !is_valid_code_identity(&code_identity) {
                return Err(Error::invalid_argument("Parsed SGX identity is invalid"));
            }
            SgxIdentity {
                code_identity,
                ..Default::default()
            }
        }
        SgxIdentitySchema::Versioned => {
            let identity: SgxIdentity = decode(&generic.identity, "identity")?;
            if !is_valid_sgx_identity(&identity, false) {
                return Err(Error::invalid_argument("Parsed SGX identity is invalid"));
            }
            identity
        }
    };

    Ok(identity)
}

/// Decodes a match spec. A legacy spec is a bare [`CodeIdentityMatchSpec`].
pub fn parse_sgx_match_spec(bytes: &[u8], is_legacy: bool) -> Result<SgxIdentityMatchSpec> {
    if is_legacy {
        let code_identity_match_spec: CodeIdentityMatchSpec = decode(bytes, "match spec")?;
        if !is_valid_code_identity_match_spec(&code_identity_match_spec) {
            return Err(Error::invalid_argument("Parsed SGX match spec is invalid"));
        }
        return Ok(SgxIdentityMatchSpec {
            code_identity_match_spec,
            ..Default::default()
        });
    }

    let spec: SgxIdentityMatchSpec = decode(bytes, "match spec")?;
    if !is_valid_match_spec(&spec, false) {
        return Err(Error::invalid_argument("Parsed SGX match spec is invalid"));
    }
    Ok(spec)
}

/// Decodes an expectation. The identity schema follows the container's
/// version; the match spec schema follows `is_legacy`.
pub fn parse_sgx_expectation(
    generic: &EnclaveIdentityExpectation,
    is_legacy: bool,
) -> Result<SgxIdentityExpectation> {
    let reference_identity = parse_sgx_identity(&generic.reference_identity)?;
    let match_spec = parse_sgx_match_spec(&generic.match_spec, is_legacy)?;

    if !is_identity_compatible(&reference_identity, &match_spec, is_legacy) {
        return Err(Error::invalid_argument("Parsed SGX expectation is invalid"));
    }

    Ok(SgxIdentityExpectation {
        match_spec,
        reference_identity,
    })
}

/// Encodes a full identity in the versioned schema.
pub fn serialize_sgx_identity(identity: &SgxIdentity) -> Result<EnclaveIdentity> {
    if !is_valid_sgx_identity(identity, false) {
        return Err(Error::invalid_argument("Invalid SgxIdentity"));
    }

    Ok(EnclaveIdentity {
        description: EnclaveIdentityDescription::sgx(),
        version: Some(SGX_IDENTITY_VERSION.to_string()),
        identity: bincode::serialize(identity)?,
    })
}

/// Encodes a code identity in the legacy schema.
pub fn serialize_code_identity(identity: &CodeIdentity) -> Result<EnclaveIdentity> {
    if !is_valid_code_identity(identity) {
        return Err(Error::invalid_argument("Invalid sgx_identity parameter"));
    }

    Ok(EnclaveIdentity {
        description: EnclaveIdentityDescription::sgx(),
        version: None,
        identity: bincode::serialize(identity)?,
    })
}

/// Encodes a full match spec.
pub fn serialize_sgx_match_spec(spec: &SgxIdentityMatchSpec) -> Result<Vec<u8>> {
    if !is_valid_match_spec(spec, false) {
        return Err(Error::invalid_argument("Invalid SgxIdentityMatchSpec"));
    }
    Ok(bincode::serialize(spec)?)
}

/// Encodes a code identity match spec in the legacy schema.
pub fn serialize_code_identity_match_spec(spec: &CodeIdentityMatchSpec) -> Result<Vec<u8>> {
    if !is_valid_code_identity_match_spec(spec) {
        return Err(Error::invalid_argument("Invalid sgx_match_spec parameter"));
    }
    Ok(bincode::serialize(spec)?)
}

/// Encodes an expectation in the versioned schema.
pub fn serialize_sgx_expectation(
    expectation: &SgxIdentityExpectation,
) -> Result<EnclaveIdentityExpectation> {
    Ok(EnclaveIdentityExpectation {
        reference_identity: serialize_sgx_identity(&expectation.reference_identity)?,
        match_spec: serialize_sgx_match_spec(&expectation.match_spec)?,
    })
}
