// SPDX-License-Identifier: Apache-2.0

//! SGX enclave identities and hardware reports.
//!
//! An [`SgxIdentity`] is compared against an [`SgxIdentityExpectation`] with
//! [`match_identity_to_expectation`]. Identities taken from a hardware
//! [`Report`] are only meaningful after [`verify_hardware_report`] accepted
//! that report.

mod attributes;
mod code_identity;
mod generic;
mod hardware;
mod identity;
mod machine_config;
mod matcher;
pub mod presets;
mod report;

pub use attributes::{AttributeFlags, SecsAttributeSet, XfrmFlags};
pub use code_identity::{
    is_valid_code_identity, is_valid_code_identity_match_spec, CodeIdentity,
    CodeIdentityMatchSpec, Sha256Hash, SignerAssignedIdentity,
};
pub use generic::{
    parse_sgx_expectation, parse_sgx_identity, parse_sgx_match_spec, serialize_code_identity,
    serialize_code_identity_match_spec, serialize_sgx_expectation, serialize_sgx_identity,
    serialize_sgx_match_spec, EnclaveIdentity, EnclaveIdentityDescription,
    EnclaveIdentityExpectation, EnclaveIdentityType, SgxIdentitySchema,
    SGX_AUTHORIZATION_AUTHORITY, SGX_IDENTITY_VERSION,
};
pub use hardware::{
    parse_identity_from_hardware_report, verify_hardware_report, HardwareInterface, HardwareKey,
};
pub use identity::{
    is_valid_expectation, is_valid_match_spec, is_valid_sgx_identity, set_expectation,
    SgxIdentity, SgxIdentityExpectation, SgxIdentityMatchSpec,
};
pub use machine_config::{
    validate_cpu_svn, CpuSvn, MachineConfiguration, MachineConfigurationMatchSpec, SgxType,
    CPUSVN_SIZE,
};
pub use matcher::{match_identity_to_expectation, MatchOutcome};
pub use report::{
    KeyName, KeyPolicy, KeyRequest, Report, ReportBody, KEY_REQUEST_SIZE, REPORT_BODY_SIZE,
    REPORT_SIZE,
};
