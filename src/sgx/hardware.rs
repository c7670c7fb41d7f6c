// SPDX-License-Identifier: Apache-2.0

use super::{
    report::{KeyName, KeyPolicy, KeyRequest, Report},
    CodeIdentity, CpuSvn, MachineConfiguration, SgxIdentity, SignerAssignedIdentity,
};
use crate::error::{Error, Result};

use aes::Aes128;
use cmac::{Cmac, Mac};
use log::{error, trace};

/// A 128-bit key produced by hardware key derivation.
pub type HardwareKey = [u8; 16];

/// Access to the hardware key derivation instruction of the current enclave.
pub trait HardwareInterface {
    /// Derives the key described by `request`.
    fn get_hardware_key(&self, request: &KeyRequest) -> Result<HardwareKey>;
}

fn report_key_request(report: &Report) -> KeyRequest {
    // Only KEYNAME and KEYID select the report key. The rest is zero apart
    // from a nominal policy.
    let mut keypolicy = KeyPolicy(0);
    keypolicy.set_mrenclave(true);

    KeyRequest {
        keyname: KeyName::Report,
        keypolicy,
        keyid: report.keyid,
        ..Default::default()
    }
}

/// Checks the MAC of a report targeted at the current enclave.
///
/// Must succeed before anything read from `report` is trusted.
pub fn verify_hardware_report(hardware: &dyn HardwareInterface, report: &Report) -> Result<()> {
    let key = hardware.get_hardware_key(&report_key_request(report))?;

    let body = report.body.to_bytes()?;
    let mut mac = <Cmac<Aes128> as Mac>::new_from_slice(&key)
        .map_err(|e| Error::internal(format!("CMAC computation failed: {e}")))?;
    mac.update(&body);

    // Constant-time comparison.
    mac.verify_slice(&report.mac).map_err(|_| {
        error!("report MAC verification failed");
        Error::internal("MAC verification failed")
    })?;

    trace!("report MAC verified");
    Ok(())
}

/// Extracts the reporting enclave's identity from `report`.
///
/// The result has CPUSVN set and no platform type, since reports do not carry
/// one.
pub fn parse_identity_from_hardware_report(report: &Report) -> Result<SgxIdentity> {
    let body = &report.body;

    Ok(SgxIdentity {
        code_identity: CodeIdentity {
            mrenclave: Some(body.mrenclave),
            signer_assigned_identity: Some(SignerAssignedIdentity {
                mrsigner: Some(body.mrsigner),
                isvprodid: Some(body.isvprodid),
                isvsvn: Some(body.isvsvn),
            }),
            miscselect: Some(body.miscselect),
            attributes: Some(body.attributes),
        },
        machine_configuration: MachineConfiguration {
            cpu_svn: Some(CpuSvn::from(body.cpusvn)),
            sgx_type: None,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, sgx::SecsAttributeSet, util::array::Array};
    use std::cell::RefCell;

    struct FixedKey {
        key: HardwareKey,
        requests: RefCell<Vec<KeyRequest>>,
    }

    impl HardwareInterface for FixedKey {
        fn get_hardware_key(&self, request: &KeyRequest) -> Result<HardwareKey> {
            self.requests.borrow_mut().push(*request);
            Ok(self.key)
        }
    }

    struct NoKey;

    impl HardwareInterface for NoKey {
        fn get_hardware_key(&self, _: &KeyRequest) -> Result<HardwareKey> {
            Err(Error::internal("EGETKEY failed"))
        }
    }

    fn signed_report(key: &HardwareKey) -> Report {
        let mut report = Report::default();
        report.body.isvprodid = 9;
        report.body.attributes = SecsAttributeSet::new(0x7, 0x3);
        report.keyid = Array([0x5a; 32]);

        let mut mac = <Cmac<Aes128> as Mac>::new_from_slice(key).unwrap();
        mac.update(&report.body.to_bytes().unwrap());
        report.mac.copy_from_slice(&mac.finalize().into_bytes());
        report
    }

    #[test]
    fn test_valid_mac() {
        let hw = FixedKey {
            key: [0x42; 16],
            requests: RefCell::new(Vec::new()),
        };
        let report = signed_report(&hw.key);
        assert!(verify_hardware_report(&hw, &report).is_ok());

        let requests = hw.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].keyname, KeyName::Report);
        assert_eq!(requests[0].keyid, report.keyid);
        assert!(requests[0].keypolicy.mrenclave());
    }

    #[test]
    fn test_wrong_key() {
        let hw = FixedKey {
            key: [0x42; 16],
            requests: RefCell::new(Vec::new()),
        };
        let report = signed_report(&[0x43; 16]);
        let err = verify_hardware_report(&hw, &report).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Internal);
        assert_eq!(err.message(), "MAC verification failed");
    }

    #[test]
    fn test_key_derivation_failure_propagates() {
        let report = signed_report(&[0; 16]);
        let err = verify_hardware_report(&NoKey, &report).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[test]
    fn test_parse_identity() {
        let mut report = Report::default();
        report.body.mrenclave = Array([1; 32]);
        report.body.mrsigner = Array([2; 32]);
        report.body.isvprodid = 3;
        report.body.isvsvn = 4;
        report.body.miscselect = 5;
        report.body.cpusvn = [6; 16];

        let identity = parse_identity_from_hardware_report(&report).unwrap();
        let signer = identity.code_identity.signer_assigned_identity.unwrap();
        assert_eq!(identity.code_identity.mrenclave, Some(Array([1; 32])));
        assert_eq!(signer.mrsigner, Some(Array([2; 32])));
        assert_eq!(signer.isvprodid, Some(3));
        assert_eq!(signer.isvsvn, Some(4));
        assert_eq!(identity.code_identity.miscselect, Some(5));
        assert_eq!(
            identity.machine_configuration.cpu_svn,
            Some(CpuSvn::from([6; 16]))
        );
        assert_eq!(identity.machine_configuration.sgx_type, None);
    }
}
