// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! `ExpandedNodeId`, a `NodeId` that can additionally carry a namespace URI
//! and server index. Service request/response bodies are tagged with one of
//! these to identify their binary encoding id.

use std::{fmt, io::Write};

use crate::byte_string::ByteString;
use crate::encoding::{BinaryDecodable, BinaryEncodable, EncodingResult};
use crate::guid::Guid;
use crate::node_id::{Identifier, NodeId};
use crate::string::UAString;
use crate::{read_u16, read_u32, read_u8, write_u16, write_u32, write_u8, Context, Error};

/// A `NodeId` that allows the namespace to be given as a URI rather than an
/// index, and that may refer to a node on another server.
#[derive(PartialEq, Debug, Clone, Eq, Hash, Default)]
pub struct ExpandedNodeId {
    /// The inner node id.
    pub node_id: NodeId,
    /// Full namespace URI. When set, `node_id.namespace` may be zero.
    pub namespace_uri: UAString,
    /// Index of the server this id refers to. 0 means the current server.
    pub server_index: u32,
}

impl From<NodeId> for ExpandedNodeId {
    fn from(node_id: NodeId) -> Self {
        ExpandedNodeId {
            node_id,
            namespace_uri: UAString::null(),
            server_index: 0,
        }
    }
}

impl fmt::Display for ExpandedNodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "svr={};{}", self.server_index, self.node_id)
    }
}

impl ExpandedNodeId {
    /// Construct an expanded node id from anything convertible to one.
    pub fn new<T>(value: T) -> ExpandedNodeId
    where
        T: Into<ExpandedNodeId>,
    {
        value.into()
    }

    /// The null expanded node id.
    pub fn null() -> ExpandedNodeId {
        Self::new(NodeId::null())
    }

    /// Returns `true` if the inner node id is null.
    pub fn is_null(&self) -> bool {
        self.node_id.is_null()
    }
}

impl BinaryEncodable for ExpandedNodeId {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        let mut size = self.node_id.byte_len(ctx);
        if !matches!(self.namespace_uri.value(), None) {
            size += self.namespace_uri.byte_len(ctx);
        }
        if self.server_index != 0 {
            size += self.server_index.byte_len(ctx);
        }
        size
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        let mut data_encoding = 0u8;
        let has_namespace_uri = self.namespace_uri.value().is_some();
        if has_namespace_uri {
            data_encoding |= 0x80;
        }
        if self.server_index != 0 {
            data_encoding |= 0x40;
        }

        match &self.node_id.identifier {
            Identifier::Numeric(value) => {
                if self.node_id.namespace == 0 && *value <= 255 {
                    write_u8(stream, data_encoding)?;
                    write_u8(stream, *value as u8)?;
                } else if self.node_id.namespace <= 255 && *value <= 65535 {
                    write_u8(stream, data_encoding | 0x1)?;
                    write_u8(stream, self.node_id.namespace as u8)?;
                    write_u16(stream, *value as u16)?;
                } else {
                    write_u8(stream, data_encoding | 0x2)?;
                    write_u16(stream, self.node_id.namespace)?;
                    write_u32(stream, *value)?;
                }
            }
            Identifier::String(value) => {
                write_u8(stream, data_encoding | 0x3)?;
                write_u16(stream, self.node_id.namespace)?;
                value.encode(stream, ctx)?;
            }
            Identifier::Guid(value) => {
                write_u8(stream, data_encoding | 0x4)?;
                write_u16(stream, self.node_id.namespace)?;
                value.encode(stream, ctx)?;
            }
            Identifier::ByteString(value) => {
                write_u8(stream, data_encoding | 0x5)?;
                write_u16(stream, self.node_id.namespace)?;
                value.encode(stream, ctx)?;
            }
        }
        if has_namespace_uri {
            self.namespace_uri.encode(stream, ctx)?;
        }
        if self.server_index != 0 {
            self.server_index.encode(stream, ctx)?;
        }
        Ok(())
    }
}

impl BinaryDecodable for ExpandedNodeId {
    fn decode<S: std::io::Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        let data_encoding = read_u8(stream)?;
        let identifier = data_encoding & 0x0f;
        let node_id = match identifier {
            0x0 => {
                let value = read_u8(stream)?;
                NodeId::new(0, u32::from(value))
            }
            0x1 => {
                let namespace = read_u8(stream)?;
                let value = read_u16(stream)?;
                NodeId::new(u16::from(namespace), u32::from(value))
            }
            0x2 => {
                let namespace = read_u16(stream)?;
                let value = read_u32(stream)?;
                NodeId::new(namespace, value)
            }
            0x3 => {
                let namespace = read_u16(stream)?;
                let value = UAString::decode(stream, ctx)?;
                NodeId::new(namespace, value)
            }
            0x4 => {
                let namespace = read_u16(stream)?;
                let value = Guid::decode(stream, ctx)?;
                NodeId::new(namespace, value)
            }
            0x5 => {
                let namespace = read_u16(stream)?;
                let value = ByteString::decode(stream, ctx)?;
                NodeId::new(namespace, value)
            }
            _ => {
                return Err(Error::decoding(format!(
                    "unrecognized expanded node id identifier type {identifier}"
                )))
            }
        };

        let namespace_uri = if data_encoding & 0x80 != 0 {
            UAString::decode(stream, ctx)?
        } else {
            UAString::null()
        };
        let server_index = if data_encoding & 0x40 != 0 {
            u32::decode(stream, ctx)?
        } else {
            0
        };

        Ok(ExpandedNodeId {
            node_id,
            namespace_uri,
            server_index,
        })
    }
}
