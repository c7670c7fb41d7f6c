// SPDX-License-Identifier: Apache-2.0

//! Fixed-size array wrapper for fields wider than serde's 32-element limit,
//! such as the 64-byte REPORTDATA and CONFIGID fields of an SGX report.

use crate::error::ArrayError;

#[cfg(feature = "sgx")]
use crate::util::parser::ByteParser;

use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;
use std::{
    convert::{TryFrom, TryInto},
    fmt::{LowerHex, UpperHex},
    ops::{Deref, DerefMut},
};

/// A `[T; N]` that serializes for any `N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Array<T, const N: usize>(#[serde(with = "BigArray")] pub [T; N])
where
    T: Serialize + for<'a> Deserialize<'a>;

impl<T, const N: usize> Array<T, N>
where
    T: Copy + Serialize + for<'a> Deserialize<'a>,
{
    /// Returns the wrapped array.
    pub fn into_inner(self) -> [T; N] {
        self.0
    }
}

impl<const N: usize> LowerHex for Array<u8, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl<const N: usize> UpperHex for Array<u8, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl<const N: usize> std::fmt::Display for Array<u8, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", crate::util::hexline::HexLine(&self.0))
    }
}

#[cfg(feature = "sgx")]
impl<const N: usize> ByteParser for Array<u8, N> {
    type Bytes = [u8; N];

    #[inline]
    fn from_bytes(bytes: Self::Bytes) -> Self {
        Self(bytes)
    }

    #[inline]
    fn to_bytes(&self) -> Self::Bytes {
        self.0
    }

    #[inline]
    fn default() -> Self {
        Self([0; N])
    }
}

impl<T, const N: usize> Default for Array<T, N>
where
    T: Copy + Default + Serialize + for<'a> Deserialize<'a>,
{
    fn default() -> Self {
        Self([T::default(); N])
    }
}

impl<T, const N: usize> From<[T; N]> for Array<T, N>
where
    T: Serialize + for<'a> Deserialize<'a>,
{
    fn from(array: [T; N]) -> Self {
        Array(array)
    }
}

impl<T, const N: usize> TryFrom<Vec<T>> for Array<T, N>
where
    T: Serialize + for<'a> Deserialize<'a>,
{
    type Error = ArrayError;

    fn try_from(vec: Vec<T>) -> Result<Self, Self::Error> {
        let len = vec.len();
        Ok(Array(vec.try_into().map_err(|_| {
            ArrayError::VectorError(format!("expected {N} elements, got {len}"))
        })?))
    }
}

impl<T, const N: usize> TryFrom<&[T]> for Array<T, N>
where
    T: Copy + Serialize + for<'a> Deserialize<'a>,
{
    type Error = ArrayError;

    fn try_from(slice: &[T]) -> Result<Self, Self::Error> {
        Ok(Array(slice.try_into()?))
    }
}

impl<T, const N: usize> AsRef<[T]> for Array<T, N>
where
    T: Serialize + for<'a> Deserialize<'a>,
{
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.0.as_ref()
    }
}

impl<T, const N: usize> Deref for Array<T, N>
where
    T: Serialize + for<'a> Deserialize<'a>,
{
    type Target = [T; N];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T, const N: usize> DerefMut for Array<T, N>
where
    T: Serialize + for<'a> Deserialize<'a>,
{
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
