// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! `QualifiedName`, a browse-name qualified by a namespace index.

use std::io::Write;

use crate::encoding::{BinaryDecodable, BinaryEncodable, EncodingResult};
use crate::string::UAString;
use crate::{read_u16, write_u16, Context, UaNullable};

/// A name qualified by a namespace index, e.g. `(0, "Default Binary")`.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
pub struct QualifiedName {
    /// Index into the server's namespace table.
    pub namespace_index: u16,
    /// The unqualified name.
    pub name: UAString,
}

impl UaNullable for QualifiedName {
    fn is_ua_null(&self) -> bool {
        self.namespace_index == 0 && self.name.is_null()
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        QualifiedName {
            namespace_index: 0,
            name: name.into(),
        }
    }
}

impl QualifiedName {
    /// Construct a qualified name in the given namespace.
    pub fn new(namespace_index: u16, name: impl Into<UAString>) -> Self {
        QualifiedName {
            namespace_index,
            name: name.into(),
        }
    }

    /// The null qualified name.
    pub fn null() -> QualifiedName {
        QualifiedName::default()
    }
}

impl BinaryEncodable for QualifiedName {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        2 + self.name.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        write_u16(stream, self.namespace_index)?;
        self.name.encode(stream, ctx)
    }
}

impl BinaryDecodable for QualifiedName {
    fn decode<S: std::io::Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        let namespace_index = read_u16(stream)?;
        let name = UAString::decode(stream, ctx)?;
        Ok(QualifiedName {
            namespace_index,
            name,
        })
    }
}
