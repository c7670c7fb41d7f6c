// SPDX-License-Identifier: Apache-2.0

#![cfg(feature = "sgx")]

use enclave_trust::{
    error::{Error, ErrorCode, Result},
    sgx::{presets, *},
    util::array::Array,
};

use aes::Aes128;
use cmac::{Cmac, Mac};
use std::io::ErrorKind;

fn to_block(bytes: &[u8]) -> [u8; 16] {
    let mut block = [0u8; 16];
    block.copy_from_slice(bytes);
    block
}

/// Derives report keys from a fixed platform secret and the request's KEYID.
struct SoftwareHardware {
    secret: [u8; 16],
}

impl SoftwareHardware {
    fn report_key(&self, keyid: &[u8]) -> HardwareKey {
        let mut mac = <Cmac<Aes128> as Mac>::new_from_slice(&self.secret).unwrap();
        mac.update(keyid);
        to_block(&mac.finalize().into_bytes())
    }

    fn sign(&self, body: ReportBody, keyid: [u8; 32]) -> Report {
        let key = self.report_key(&keyid);
        let mut mac = <Cmac<Aes128> as Mac>::new_from_slice(&key).unwrap();
        mac.update(&body.to_bytes().unwrap());

        Report {
            body,
            keyid: Array(keyid),
            mac: to_block(&mac.finalize().into_bytes()),
        }
    }
}

impl HardwareInterface for SoftwareHardware {
    fn get_hardware_key(&self, request: &KeyRequest) -> Result<HardwareKey> {
        if request.keyname != KeyName::Report {
            return Err(Error::internal("only report keys are supported"));
        }
        Ok(self.report_key(request.keyid.as_ref()))
    }
}

const HARDWARE: SoftwareHardware = SoftwareHardware {
    secret: [0xa5; 16],
};

fn body() -> ReportBody {
    ReportBody {
        cpusvn: [0x02; 16],
        miscselect: 0,
        attributes: SecsAttributeSet::from_named(
            AttributeFlags::INIT | AttributeFlags::MODE64BIT,
            XfrmFlags::FPU | XfrmFlags::SSE,
        ),
        mrenclave: Array([0x77; 32]),
        mrsigner: Array([0x88; 32]),
        isvprodid: 12,
        isvsvn: 3,
        reportdata: Array([0x42; 64]),
        ..Default::default()
    }
}

fn report_bytes(report: &Report) -> Vec<u8> {
    let mut bytes = Vec::new();
    report.write_bytes(&mut bytes).unwrap();
    bytes
}

#[test]
fn verify_parsed_report() {
    let _ = env_logger::builder().is_test(true).try_init();

    let bytes = report_bytes(&HARDWARE.sign(body(), [0x31; 32]));
    assert_eq!(bytes.len(), REPORT_SIZE);

    let report = Report::from_bytes(&bytes).unwrap();
    assert!(verify_hardware_report(&HARDWARE, &report).is_ok());
}

/// Flips every bit in `range`, one at a time, and expects each tampered
/// report to be refused either by the parser or by the MAC check.
fn assert_every_bit_flip_rejected(range: std::ops::Range<usize>) {
    let bytes = report_bytes(&HARDWARE.sign(body(), [0x31; 32]));

    for offset in range {
        for bit in 0..8 {
            let mut tampered = bytes.clone();
            tampered[offset] ^= 1 << bit;

            // Reserved ranges are refused at parse time.
            let report = match Report::from_bytes(&tampered) {
                Ok(report) => report,
                Err(_) => continue,
            };
            let err = verify_hardware_report(&HARDWARE, &report).unwrap_err();
            assert_eq!(err.code(), ErrorCode::Internal, "byte {offset} bit {bit}");
        }
    }
}

#[test]
fn mac_bit_flips_rejected() {
    assert_every_bit_flip_rejected(REPORT_BODY_SIZE + 32..REPORT_SIZE);
}

#[test]
fn body_bit_flips_rejected() {
    assert_every_bit_flip_rejected(0..REPORT_BODY_SIZE);
}

#[test]
fn reserved_bytes_must_be_zero() {
    let mut bytes = report_bytes(&HARDWARE.sign(body(), [0x31; 32]));
    bytes[96] = 0xff;

    let err = Report::from_bytes(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[test]
fn foreign_keyid_rejected() {
    let mut report = HARDWARE.sign(body(), [0x31; 32]);
    report.keyid = Array([0x32; 32]);

    assert!(verify_hardware_report(&HARDWARE, &report).is_err());
}

#[test]
fn other_platform_rejected() {
    let report = HARDWARE.sign(body(), [0x31; 32]);
    let other = SoftwareHardware { secret: [0x5a; 16] };

    assert!(verify_hardware_report(&other, &report).is_err());
}

#[test]
fn verified_report_matches_self_expectation() {
    let report = Report::from_bytes(&report_bytes(&HARDWARE.sign(body(), [0x31; 32]))).unwrap();
    verify_hardware_report(&HARDWARE, &report).unwrap();

    let peer = parse_identity_from_hardware_report(&report).unwrap();

    let mut me = peer.clone();
    me.machine_configuration.sgx_type = Some(SgxType::Standard);

    let outcome = match_identity_to_expectation(
        &peer,
        &presets::strict_local_self_expectation(&me).unwrap(),
        false,
    )
    .unwrap();
    assert!(outcome.matched, "{}", outcome.explanation);

    // A report never names the platform type.
    assert!(match_identity_to_expectation(
        &peer,
        &presets::strict_remote_self_expectation(&me).unwrap(),
        false,
    )
    .is_err());
}

#[test]
fn key_request_layout() {
    let request = KeyRequest {
        keyname: KeyName::Report,
        keyid: Array([0x31; 32]),
        ..Default::default()
    };

    let mut bytes = Vec::new();
    request.write_bytes(&mut bytes).unwrap();
    assert_eq!(bytes.len(), KEY_REQUEST_SIZE);
    assert_eq!(KeyRequest::from_bytes(&bytes).unwrap(), request);
}

#[test]
fn report_display() {
    let report = HARDWARE.sign(body(), [0x31; 32]);
    let text = report.to_string();

    assert!(text.starts_with("SGX Report:"));
    assert!(text.contains("ISVPRODID:                    12"));
}
