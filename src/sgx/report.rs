// SPDX-License-Identifier: Apache-2.0

//! Hardware REPORT and KEYREQUEST structures.
//!
//! Layouts follow the SGX architecture. Reserved ranges are written as zero
//! and must be zero when read.

use super::{SecsAttributeSet, Sha256Hash};
use crate::util::{
    array::Array,
    hexline::HexLine,
    parser::{ByteParser, ReadExt, WriteExt},
};

use bitfield::bitfield;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;
use std::{
    convert::TryFrom,
    fmt::Display,
    io::{Read, Write},
};

/// Size of [`ReportBody`] on the wire.
pub const REPORT_BODY_SIZE: usize = 384;

/// Size of [`Report`] on the wire.
pub const REPORT_SIZE: usize = 432;

/// Size of [`KeyRequest`] on the wire.
pub const KEY_REQUEST_SIZE: usize = 512;

// Sums of field and reserved widths, in layout order.
const_assert!(
    16 + 4 + 12 + 16 + 16 + 32 + 32 + 32 + 32 + 64 + 2 + 2 + 2 + 42 + 16 + 64 == REPORT_BODY_SIZE
);
const_assert!(REPORT_BODY_SIZE + 32 + 16 == REPORT_SIZE);
const_assert!(2 + 2 + 2 + 2 + 16 + 16 + 32 + 4 + 2 + 434 == KEY_REQUEST_SIZE);

/// The MACed part of a REPORT.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportBody {
    /// Platform security version.
    pub cpusvn: [u8; 16],

    /// MISCSELECT of the reporting enclave.
    pub miscselect: u32,

    /// Extended product ID.
    pub isvextprodid: [u8; 16],

    /// ATTRIBUTES of the reporting enclave.
    pub attributes: SecsAttributeSet,

    /// MRENCLAVE of the reporting enclave.
    pub mrenclave: Sha256Hash,

    /// MRSIGNER of the reporting enclave.
    pub mrsigner: Sha256Hash,

    /// CONFIGID of the reporting enclave.
    pub configid: Array<u8, 64>,

    /// Product ID.
    pub isvprodid: u16,

    /// Security version.
    pub isvsvn: u16,

    /// Config security version.
    pub configsvn: u16,

    /// Family ID.
    pub isvfamilyid: [u8; 16],

    /// Data supplied by the reporting enclave.
    pub reportdata: Array<u8, 64>,
}

impl ReportBody {
    /// Parses a body from its hardware layout.
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self, std::io::Error> {
        Self::read_from(&mut bytes)
    }

    fn read_from(stepper: &mut impl Read) -> Result<Self, std::io::Error> {
        Ok(Self {
            cpusvn: stepper.parse_bytes::<_, 0>()?,
            miscselect: stepper.parse_bytes::<_, 0>()?,
            isvextprodid: stepper.parse_bytes::<_, 12>()?,
            attributes: stepper.parse_bytes::<_, 0>()?,
            mrenclave: stepper.parse_bytes::<_, 0>()?,
            mrsigner: stepper.parse_bytes::<_, 32>()?,
            configid: stepper.parse_bytes::<_, 32>()?,
            isvprodid: stepper.parse_bytes::<_, 0>()?,
            isvsvn: stepper.parse_bytes::<_, 0>()?,
            configsvn: stepper.parse_bytes::<_, 0>()?,
            isvfamilyid: stepper.parse_bytes::<_, 42>()?,
            reportdata: stepper.parse_bytes::<_, 0>()?,
        })
    }

    /// Writes the body in its hardware layout.
    pub fn write_bytes(&self, mut handle: impl Write) -> Result<(), std::io::Error> {
        handle.write_bytes::<_, 0>(self.cpusvn)?;
        handle.write_bytes::<_, 0>(self.miscselect)?;
        handle.write_bytes::<_, 12>(self.isvextprodid)?;
        handle.write_bytes::<_, 0>(self.attributes)?;
        handle.write_bytes::<_, 0>(self.mrenclave)?;
        handle.write_bytes::<_, 32>(self.mrsigner)?;
        handle.write_bytes::<_, 32>(self.configid)?;
        handle.write_bytes::<_, 0>(self.isvprodid)?;
        handle.write_bytes::<_, 0>(self.isvsvn)?;
        handle.write_bytes::<_, 0>(self.configsvn)?;
        handle.write_bytes::<_, 42>(self.isvfamilyid)?;
        handle.write_bytes::<_, 0>(self.reportdata)?;
        Ok(())
    }

    /// The body in its hardware layout.
    pub fn to_bytes(&self) -> Result<Vec<u8>, std::io::Error> {
        let mut bytes = Vec::with_capacity(REPORT_BODY_SIZE);
        self.write_bytes(&mut bytes)?;
        Ok(bytes)
    }
}

/// A hardware REPORT: a body, the KEYID used to derive the MAC key, and the
/// MAC over the body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// The MACed body.
    pub body: ReportBody,

    /// Key derivation diversifier.
    pub keyid: Array<u8, 32>,

    /// AES-128-CMAC over `body`.
    pub mac: [u8; 16],
}

impl Report {
    /// Parses a report from its hardware layout.
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self, std::io::Error> {
        let body = ReportBody::read_from(&mut bytes)?;
        Ok(Self {
            body,
            keyid: bytes.parse_bytes::<_, 0>()?,
            mac: bytes.parse_bytes::<_, 0>()?,
        })
    }

    /// Writes the report in its hardware layout.
    pub fn write_bytes(&self, mut handle: impl Write) -> Result<(), std::io::Error> {
        self.body.write_bytes(&mut handle)?;
        handle.write_bytes::<_, 0>(self.keyid)?;
        handle.write_bytes::<_, 0>(self.mac)?;
        Ok(())
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let body = &self.body;
        write!(
            f,
            r#"SGX Report:

CPUSVN:
{}

MISCSELECT:                   {:#010x}

ATTRIBUTES:                   {}

MRENCLAVE:
{}

MRSIGNER:
{}

ISVPRODID:                    {}

ISVSVN:                       {}

CONFIGSVN:                    {}

REPORTDATA:
{}

KEYID:
{}

MAC:
{}"#,
            HexLine(&body.cpusvn),
            body.miscselect,
            body.attributes,
            body.mrenclave,
            body.mrsigner,
            body.isvprodid,
            body.isvsvn,
            body.configsvn,
            body.reportdata,
            self.keyid,
            HexLine(&self.mac),
        )
    }
}

/// Which key EGETKEY derives.
#[repr(u16)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyName {
    /// Launch enclave token key.
    EinitToken = 0,

    /// Provisioning key.
    Provision = 1,

    /// Provisioning seal key.
    ProvisionSeal = 2,

    /// Report key.
    #[default]
    Report = 3,

    /// Seal key.
    Seal = 4,
}

impl TryFrom<u16> for KeyName {
    type Error = std::io::Error;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::EinitToken,
            1 => Self::Provision,
            2 => Self::ProvisionSeal,
            3 => Self::Report,
            4 => Self::Seal,
            _ => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("unknown KEYNAME {value}"),
                ))
            }
        })
    }
}

bitfield! {
    /// Identity components mixed into a derived key.
    ///
    /// | Bit(s) | Name |
    /// |--------|------|
    /// |0|MRENCLAVE|
    /// |1|MRSIGNER|
    /// |2|NOISVPRODID|
    /// |3|CONFIGID|
    /// |4|ISVFAMILYID|
    /// |5|ISVEXTPRODID|
    /// |15:6|Reserved|
    #[repr(C)]
    #[derive(Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct KeyPolicy(u16);
    impl Debug;
    /// Check/Set MRENCLAVE inclusion.
    pub mrenclave, set_mrenclave: 0;
    /// Check/Set MRSIGNER inclusion.
    pub mrsigner, set_mrsigner: 1;
    /// Check/Set omission of ISVPRODID.
    pub noisvprodid, set_noisvprodid: 2;
    /// Check/Set CONFIGID inclusion.
    pub configid, set_configid: 3;
    /// Check/Set ISVFAMILYID inclusion.
    pub isvfamilyid, set_isvfamilyid: 4;
    /// Check/Set ISVEXTPRODID inclusion.
    pub isvextprodid, set_isvextprodid: 5;
}

impl ByteParser for KeyPolicy {
    type Bytes = [u8; 2];

    fn from_bytes(bytes: Self::Bytes) -> Self {
        Self(u16::from_le_bytes(bytes))
    }

    fn to_bytes(&self) -> Self::Bytes {
        self.0.to_le_bytes()
    }

    fn default() -> Self {
        Self(0)
    }
}

/// Input to the hardware key derivation instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRequest {
    /// Which key to derive.
    pub keyname: KeyName,

    /// Identity components mixed into the key.
    pub keypolicy: KeyPolicy,

    /// Security version to derive for.
    pub isvsvn: u16,

    /// Platform security version to derive for.
    pub cpusvn: [u8; 16],

    /// Attributes mixed into the key.
    pub attributemask: SecsAttributeSet,

    /// Diversifier.
    pub keyid: Array<u8, 32>,

    /// MISCSELECT bits mixed into the key.
    pub miscmask: u32,

    /// Config security version to derive for.
    pub configsvn: u16,
}

impl KeyRequest {
    /// Parses a request from its hardware layout.
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self, std::io::Error> {
        let keyname = KeyName::try_from(bytes.parse_bytes::<u16, 0>()?)?;
        let request = Self {
            keyname,
            keypolicy: bytes.parse_bytes::<_, 0>()?,
            isvsvn: bytes.parse_bytes::<_, 0>()?,
            cpusvn: bytes.parse_bytes::<_, 2>()?,
            attributemask: bytes.parse_bytes::<_, 0>()?,
            keyid: bytes.parse_bytes::<_, 0>()?,
            miscmask: bytes.parse_bytes::<_, 0>()?,
            configsvn: bytes.parse_bytes::<_, 0>()?,
        };

        // Trailing reserved range.
        bytes.parse_bytes::<[u8; 0], 434>()?;
        Ok(request)
    }

    /// Writes the request in its hardware layout.
    pub fn write_bytes(&self, mut handle: impl Write) -> Result<(), std::io::Error> {
        handle.write_bytes::<_, 0>(self.keyname as u16)?;
        handle.write_bytes::<_, 0>(self.keypolicy)?;
        handle.write_bytes::<_, 0>(self.isvsvn)?;
        handle.write_bytes::<_, 2>(self.cpusvn)?;
        handle.write_bytes::<_, 0>(self.attributemask)?;
        handle.write_bytes::<_, 0>(self.keyid)?;
        handle.write_bytes::<_, 0>(self.miscmask)?;
        handle.write_bytes::<_, 0>(self.configsvn)?;
        handle.write_bytes::<_, 434>([0u8; 0])?;
        Ok(())
    }
}
