// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Size of a CPUSVN value in bytes.
pub const CPUSVN_SIZE: usize = 16;

/// The platform security version number.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CpuSvn {
    /// Raw value. Valid values are exactly [`CPUSVN_SIZE`] bytes.
    #[serde(with = "serde_bytes")]
    pub value: Vec<u8>,
}

impl From<[u8; CPUSVN_SIZE]> for CpuSvn {
    fn from(value: [u8; CPUSVN_SIZE]) -> Self {
        Self {
            value: value.to_vec(),
        }
    }
}

/// Rejects CPUSVN values of the wrong size.
pub fn validate_cpu_svn(cpu_svn: &CpuSvn) -> Result<()> {
    if cpu_svn.value.len() != CPUSVN_SIZE {
        return Err(Error::invalid_argument(format!(
            "CPUSVN must be {CPUSVN_SIZE} bytes, got {}",
            cpu_svn.value.len()
        )));
    }
    Ok(())
}

/// Kind of SGX platform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SgxType {
    /// Not known.
    #[default]
    Unknown,

    /// Standard SGX.
    Standard,
}

impl Display for SgxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SgxType::Unknown => "SGX_TYPE_UNKNOWN",
            SgxType::Standard => "STANDARD",
        };
        write!(f, "{name}")
    }
}

/// Platform properties that are part of an SGX identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfiguration {
    /// CPUSVN of the platform.
    pub cpu_svn: Option<CpuSvn>,

    /// Platform type.
    pub sgx_type: Option<SgxType>,
}

/// Which parts of a [`MachineConfiguration`] must match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfigurationMatchSpec {
    /// Compare CPUSVN.
    pub is_cpu_svn_match_required: Option<bool>,

    /// Compare the platform type.
    pub is_sgx_type_match_required: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_cpu_svn_size() {
        assert!(validate_cpu_svn(&CpuSvn::from([0u8; CPUSVN_SIZE])).is_ok());

        let short = CpuSvn { value: vec![0; 15] };
        assert_eq!(
            validate_cpu_svn(&short).unwrap_err().code(),
            ErrorCode::InvalidArgument
        );
    }

    #[test]
    fn test_sgx_type_names() {
        assert_eq!(SgxType::Standard.to_string(), "STANDARD");
        assert_eq!(SgxType::default().to_string(), "SGX_TYPE_UNKNOWN");
    }
}
