// SPDX-License-Identifier: Apache-2.0
use super::byte_parser::ByteParser;
use std::io::Read;

pub(crate) trait ReadExt {
    /// Reads `SKIP` reserved bytes, which must be zero, followed by a `T`.
    fn parse_bytes<T, const SKIP: usize>(&mut self) -> Result<T, std::io::Error>
    where
        T: ByteParser<Bytes: AsMut<[u8]>>;
}

impl<R> ReadExt for R
where
    R: Read,
{
    #[inline(always)]
    fn parse_bytes<T, const SKIP: usize>(&mut self) -> Result<T, std::io::Error>
    where
        T: ByteParser<Bytes: AsMut<[u8]>>,
    {
        if SKIP != 0 {
            let mut skipped_bytes = [0; SKIP];
            self.read_exact(&mut skipped_bytes)?;

            if skipped_bytes != [0; SKIP] {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "Skipped bytes were expected to be zeroed.",
                ));
            }
        }

        let mut bytes = T::default().to_bytes();
        self.read_exact(bytes.as_mut())?;
        Ok(T::from_bytes(bytes))
    }
}
