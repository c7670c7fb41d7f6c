// SPDX-License-Identifier: Apache-2.0

mod byte_parser;

mod read_ext;

mod write_ext;

pub(crate) use self::{byte_parser::ByteParser, read_ext::ReadExt, write_ext::WriteExt};
