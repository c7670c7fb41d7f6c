// SPDX-License-Identifier: Apache-2.0

/// Fixed-width little-endian conversion used by the hardware structure codecs.
pub trait ByteParser {
    type Bytes: AsRef<[u8]>;

    fn from_bytes(bytes: Self::Bytes) -> Self;

    fn to_bytes(&self) -> Self::Bytes;

    fn default() -> Self;
}

impl<const N: usize> ByteParser for [u8; N] {
    type Bytes = [u8; N];

    #[inline(always)]
    fn from_bytes(bytes: Self::Bytes) -> Self {
        bytes
    }
    #[inline(always)]
    fn to_bytes(&self) -> Self::Bytes {
        *self
    }
    #[inline(always)]
    fn default() -> Self {
        [0u8; N]
    }
}

macro_rules! impl_byte_parser
{
    ($($t:ty), *) => {
        $(
            impl ByteParser for $t {
                type Bytes = [u8; std::mem::size_of::<$t>()];
                #[inline(always)]
                fn from_bytes(bytes: Self::Bytes) -> Self {
                    <$t>::from_le_bytes(bytes)
                }
                #[inline(always)]
                fn to_bytes(&self) -> Self::Bytes {
                    <$t>::to_le_bytes(*self)
                }
                #[inline(always)]
                fn default() -> Self {
                    0
                }
            }
        )*
    };
}

impl_byte_parser!(u8, u16, u32, u64);
