// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};

use std::{
    fmt,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use x509_cert::{
    der::asn1::{GeneralizedTime, UtcTime},
    time::Time,
};

/// First instant that no longer fits in a two-digit UTCTime year (2050-01-01).
const UTC_TIME_LIMIT_SECS: u64 = 2_524_608_000;

/// X.509 certificate version.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum X509Version {
    /// Version 1.
    V1,

    /// Version 2.
    V2,

    /// Version 3. The only version allowed to carry extensions.
    #[default]
    V3,
}

impl From<x509_cert::Version> for X509Version {
    fn from(value: x509_cert::Version) -> Self {
        match value {
            x509_cert::Version::V1 => Self::V1,
            x509_cert::Version::V2 => Self::V2,
            x509_cert::Version::V3 => Self::V3,
        }
    }
}

impl From<X509Version> for x509_cert::Version {
    fn from(value: X509Version) -> Self {
        match value {
            X509Version::V1 => Self::V1,
            X509Version::V2 => Self::V2,
            X509Version::V3 => Self::V3,
        }
    }
}

/// An arbitrary-precision integer held as minimal big-endian two's complement.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SerialNumber {
    bytes: Vec<u8>,
}

impl SerialNumber {
    /// Interprets `bytes` as big-endian two's complement.
    pub fn from_twos_complement(bytes: impl Into<Vec<u8>>) -> Self {
        let mut bytes = bytes.into();
        if bytes.is_empty() {
            bytes.push(0);
        }

        // Drop redundant sign-extension bytes.
        let mut start = 0;
        while start + 1 < bytes.len() {
            let (head, next) = (bytes[start], bytes[start + 1]);
            let redundant =
                (head == 0x00 && (next & 0x80) == 0) || (head == 0xff && (next & 0x80) != 0);
            if !redundant {
                break;
            }
            start += 1;
        }
        bytes.drain(..start);

        Self { bytes }
    }

    /// Interprets `bytes` as a big-endian unsigned magnitude.
    pub fn from_unsigned_bytes(bytes: &[u8]) -> Self {
        let mut twos = Vec::with_capacity(bytes.len() + 1);
        twos.push(0);
        twos.extend_from_slice(bytes);
        Self::from_twos_complement(twos)
    }

    /// The minimal two's complement encoding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether the value is below zero.
    pub fn is_negative(&self) -> bool {
        self.bytes[0] & 0x80 != 0
    }

    /// The value as an `i64`, if it fits.
    pub fn to_i64(&self) -> Result<i64> {
        if self.bytes.len() > 8 {
            return Err(Error::new(
                crate::error::ErrorCode::OutOfRange,
                "serial number does not fit in 64 bits",
            ));
        }
        let fill = if self.is_negative() { 0xff } else { 0x00 };
        let mut buf = [fill; 8];
        buf[8 - self.bytes.len()..].copy_from_slice(&self.bytes);
        Ok(i64::from_be_bytes(buf))
    }
}

impl From<i64> for SerialNumber {
    fn from(value: i64) -> Self {
        Self::from_twos_complement(value.to_be_bytes().to_vec())
    }
}

impl From<u64> for SerialNumber {
    fn from(value: u64) -> Self {
        Self::from_unsigned_bytes(&value.to_be_bytes())
    }
}

impl fmt::LowerHex for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.bytes {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Validity window of a certificate, at one-second resolution.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct X509Validity {
    /// Start of the window.
    pub not_before: SystemTime,

    /// End of the window.
    pub not_after: SystemTime,
}

impl X509Validity {
    /// Builds a window, truncating both ends to whole seconds.
    pub fn new(not_before: SystemTime, not_after: SystemTime) -> Self {
        Self {
            not_before: truncate_to_seconds(not_before),
            not_after: truncate_to_seconds(not_after),
        }
    }

    pub(crate) fn to_asn1(self) -> Result<x509_cert::time::Validity> {
        Ok(x509_cert::time::Validity {
            not_before: encode_time(self.not_before)?,
            not_after: encode_time(self.not_after)?,
        })
    }

    pub(crate) fn from_asn1(validity: &x509_cert::time::Validity) -> Self {
        Self {
            not_before: UNIX_EPOCH + validity.not_before.to_unix_duration(),
            not_after: UNIX_EPOCH + validity.not_after.to_unix_duration(),
        }
    }
}

fn truncate_to_seconds(time: SystemTime) -> SystemTime {
    match time.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => UNIX_EPOCH + Duration::from_secs(elapsed.as_secs()),
        Err(_) => time,
    }
}

fn encode_time(time: SystemTime) -> Result<Time> {
    let elapsed = time
        .duration_since(UNIX_EPOCH)
        .map_err(|_| Error::invalid_argument("certificate times before 1970 are not supported"))?;
    let elapsed = Duration::from_secs(elapsed.as_secs());

    if elapsed.as_secs() < UTC_TIME_LIMIT_SECS {
        Ok(Time::UtcTime(UtcTime::from_unix_duration(elapsed)?))
    } else {
        Ok(Time::GeneralTime(GeneralizedTime::from_unix_duration(
            elapsed,
        )?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_number_from_i64() {
        let serial = SerialNumber::from(8675309i64);
        assert_eq!(serial.as_bytes(), &[0x00, 0x84, 0x5f, 0xed]);
        assert!(!serial.is_negative());
        assert_eq!(serial.to_i64().unwrap(), 8675309);
    }

    #[test]
    fn test_serial_number_negative() {
        let serial = SerialNumber::from(-1i64);
        assert_eq!(serial.as_bytes(), &[0xff]);
        assert!(serial.is_negative());
        assert_eq!(serial.to_i64().unwrap(), -1);

        let serial = SerialNumber::from(-129i64);
        assert_eq!(serial.as_bytes(), &[0xff, 0x7f]);
        assert_eq!(serial.to_i64().unwrap(), -129);
    }

    #[test]
    fn test_serial_number_unsigned_high_bit() {
        let serial = SerialNumber::from(u64::MAX);
        assert_eq!(serial.as_bytes().len(), 9);
        assert!(!serial.is_negative());
        assert!(serial.to_i64().is_err());

        assert_eq!(SerialNumber::from(0u64).as_bytes(), &[0x00]);
        assert_eq!(format!("{:x}", SerialNumber::from(0x80u64)), "0080");
    }

    #[test]
    fn test_validity_truncates_to_seconds() {
        let t = UNIX_EPOCH + Duration::from_millis(1_557_000_000_123);
        let validity = X509Validity::new(t, t);
        assert_eq!(
            validity.not_before,
            UNIX_EPOCH + Duration::from_secs(1_557_000_000)
        );
    }

    #[test]
    fn test_validity_uses_generalized_time_after_2049() {
        let before = UNIX_EPOCH + Duration::from_secs(1_557_000_000);
        let after = UNIX_EPOCH + Duration::from_secs(UTC_TIME_LIMIT_SECS + 10);
        let asn1 = X509Validity::new(before, after).to_asn1().unwrap();

        assert!(matches!(asn1.not_before, Time::UtcTime(_)));
        assert!(matches!(asn1.not_after, Time::GeneralTime(_)));
        assert_eq!(X509Validity::from_asn1(&asn1), X509Validity::new(before, after));
    }
}
