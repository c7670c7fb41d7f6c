// SPDX-License-Identifier: Apache-2.0

use crate::util::parser::ByteParser;

use serde::{Deserialize, Serialize};
use std::{
    fmt::Display,
    ops::{BitAnd, Not},
};

bitflags::bitflags! {
    /// Named bits of the FLAGS half of the SECS ATTRIBUTES field.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AttributeFlags: u64 {
        /// The enclave has been initialized by EINIT.
        const INIT          = 1 << 0;

        /// The enclave runs in debug mode.
        const DEBUG         = 1 << 1;

        /// The enclave runs in 64-bit mode.
        const MODE64BIT     = 1 << 2;

        /// The enclave may request the provisioning key.
        const PROVISIONKEY  = 1 << 4;

        /// The enclave may request the EINIT token key.
        const INITTOKENKEY  = 1 << 5;

        /// Key separation and sharing is enabled.
        const KSS           = 1 << 7;
    }
}

bitflags::bitflags! {
    /// Named bits of the XFRM half of the SECS ATTRIBUTES field.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct XfrmFlags: u64 {
        /// x87 FPU state.
        const FPU       = 1 << 0;

        /// SSE state.
        const SSE       = 1 << 1;

        /// AVX state.
        const AVX       = 1 << 2;

        /// MPX bound registers.
        const BNDREG    = 1 << 3;

        /// MPX bound configuration and status.
        const BNDCSR    = 1 << 4;

        /// AVX-512 opmask registers.
        const OPMASK    = 1 << 5;

        /// Upper halves of ZMM0-ZMM15.
        const ZMM_HI256 = 1 << 6;

        /// ZMM16-ZMM31.
        const HI16_ZMM  = 1 << 7;

        /// Protection key rights register.
        const PKRU      = 1 << 9;
    }
}

/// The 128-bit SECS ATTRIBUTES value, as two raw 64-bit words.
///
/// Bits without a name in [`AttributeFlags`] or [`XfrmFlags`] are kept so
/// that masks can cover bits defined by future hardware.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecsAttributeSet {
    /// FLAGS word.
    pub flags: u64,

    /// XFRM word.
    pub xfrm: u64,
}

impl SecsAttributeSet {
    /// Builds a set from raw words.
    pub const fn new(flags: u64, xfrm: u64) -> Self {
        Self { flags, xfrm }
    }

    /// Builds a set from named bits only.
    pub fn from_named(flags: AttributeFlags, xfrm: XfrmFlags) -> Self {
        Self::new(flags.bits(), xfrm.bits())
    }

    /// Every bit set.
    pub const fn all() -> Self {
        Self::new(u64::MAX, u64::MAX)
    }

    /// Attributes that by default do not affect the identity of an enclave.
    pub fn default_do_not_care() -> Self {
        Self::from_named(
            AttributeFlags::PROVISIONKEY | AttributeFlags::INITTOKENKEY | AttributeFlags::KSS,
            XfrmFlags::all(),
        )
    }

    /// Match mask used by the default match specs: every bit except the
    /// default "do not care" ones.
    pub fn default_mask() -> Self {
        !Self::default_do_not_care()
    }

    /// Match mask used by the strict match specs.
    pub const fn strict_mask() -> Self {
        Self::all()
    }

    /// The named FLAGS bits that are set.
    pub fn named_flags(&self) -> AttributeFlags {
        AttributeFlags::from_bits_truncate(self.flags)
    }

    /// The named XFRM bits that are set.
    pub fn named_xfrm(&self) -> XfrmFlags {
        XfrmFlags::from_bits_truncate(self.xfrm)
    }
}

impl BitAnd for SecsAttributeSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self::new(self.flags & rhs.flags, self.xfrm & rhs.xfrm)
    }
}

impl Not for SecsAttributeSet {
    type Output = Self;

    fn not(self) -> Self {
        Self::new(!self.flags, !self.xfrm)
    }
}

impl Display for SecsAttributeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "flags: {:#x} xfrm: {:#x}", self.flags, self.xfrm)
    }
}

impl ByteParser for SecsAttributeSet {
    type Bytes = [u8; 16];

    fn from_bytes(bytes: Self::Bytes) -> Self {
        let mut flags = [0u8; 8];
        let mut xfrm = [0u8; 8];
        flags.copy_from_slice(&bytes[..8]);
        xfrm.copy_from_slice(&bytes[8..]);
        Self::new(u64::from_le_bytes(flags), u64::from_le_bytes(xfrm))
    }

    fn to_bytes(&self) -> Self::Bytes {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.flags.to_le_bytes());
        bytes[8..].copy_from_slice(&self.xfrm.to_le_bytes());
        bytes
    }

    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mask_excludes_do_not_care() {
        let mask = SecsAttributeSet::default_mask();
        assert_eq!(mask.flags & (1 << 4), 0);
        assert_eq!(mask.flags & (1 << 5), 0);
        assert_eq!(mask.flags & (1 << 7), 0);
        assert_ne!(mask.flags & AttributeFlags::DEBUG.bits(), 0);
        assert_eq!(mask.xfrm & XfrmFlags::all().bits(), 0);

        // Unnamed bits stay security relevant.
        assert_ne!(mask.flags & (1 << 3), 0);
        assert_ne!(mask.xfrm & (1 << 8), 0);
    }

    #[test]
    fn test_bitand() {
        let a = SecsAttributeSet::new(0b1100, 0b1010);
        let b = SecsAttributeSet::new(0b0110, 0b0011);
        assert_eq!(a & b, SecsAttributeSet::new(0b0100, 0b0010));
    }

    #[test]
    fn test_byte_layout() {
        let set = SecsAttributeSet::from_named(
            AttributeFlags::INIT | AttributeFlags::MODE64BIT,
            XfrmFlags::FPU | XfrmFlags::SSE,
        );
        let bytes = set.to_bytes();
        assert_eq!(bytes[0], 0x05);
        assert_eq!(bytes[8], 0x03);
        assert_eq!(<SecsAttributeSet as ByteParser>::from_bytes(bytes), set);
    }

    #[test]
    fn test_named_views() {
        let set = SecsAttributeSet::new(AttributeFlags::DEBUG.bits() | (1 << 3), 0);
        assert_eq!(set.named_flags(), AttributeFlags::DEBUG);
        assert!(set.named_xfrm().is_empty());
    }
}
