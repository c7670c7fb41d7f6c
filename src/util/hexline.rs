// SPDX-License-Identifier: Apache-2.0

use std::fmt::{self, Display, Formatter};

/// Multi-line uppercase hex dump, 16 bytes per row, used by `Display` impls of
/// hardware structures.
pub(crate) struct HexLine<'a>(pub &'a [u8]);

impl Display for HexLine<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, row) in self.0.chunks(16).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let mut first = true;
            for byte in row {
                if !first {
                    write!(f, " ")?;
                }
                write!(f, "{byte:02X}")?;
                first = false;
            }
        }
        Ok(())
    }
}
