// SPDX-License-Identifier: Apache-2.0
use super::ByteParser;
use std::io::Write;

pub(crate) trait WriteExt {
    /// Writes `SKIP` zero bytes followed by `value`.
    fn write_bytes<T: ByteParser, const SKIP: usize>(
        &mut self,
        value: T,
    ) -> Result<(), std::io::Error>;
}

impl<W> WriteExt for W
where
    W: Write,
{
    #[inline(always)]
    fn write_bytes<T: ByteParser, const SKIP: usize>(
        &mut self,
        value: T,
    ) -> Result<(), std::io::Error> {
        if SKIP != 0 {
            self.write_all(&[0; SKIP])?;
        }

        self.write_all(value.to_bytes().as_ref())
    }
}
