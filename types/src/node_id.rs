// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! `NodeId`, the identifier of a node or structure type within a namespace.

use std::{fmt, io::Write, str::FromStr};

use crate::byte_string::ByteString;
use crate::encoding::{BinaryDecodable, BinaryEncodable, EncodingResult};
use crate::guid::Guid;
use crate::status_code::StatusCode;
use crate::string::UAString;
use crate::{read_u16, read_u32, read_u8, write_u16, write_u32, write_u8, Context, Error, UaNullable};

/// The kind of identifier carried by a `NodeId`.
#[derive(Eq, PartialEq, Clone, Debug, Hash)]
pub enum Identifier {
    /// A numeric identifier, `i=123`.
    Numeric(u32),
    /// A string identifier, `s=...`.
    String(UAString),
    /// A GUID identifier, `g=...`.
    Guid(Guid),
    /// An opaque byte string identifier, `b=...`.
    ByteString(ByteString),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Identifier::Numeric(v) => write!(f, "i={v}"),
            Identifier::String(v) => write!(f, "s={v}"),
            Identifier::Guid(v) => write!(f, "g={v:?}"),
            Identifier::ByteString(v) => write!(f, "b={}", v.as_base64()),
        }
    }
}

impl From<u32> for Identifier {
    fn from(v: u32) -> Self {
        Identifier::Numeric(v)
    }
}

impl From<&str> for Identifier {
    fn from(v: &str) -> Self {
        Identifier::String(UAString::from(v))
    }
}

impl From<String> for Identifier {
    fn from(v: String) -> Self {
        Identifier::String(UAString::from(v))
    }
}

impl From<UAString> for Identifier {
    fn from(v: UAString) -> Self {
        Identifier::String(v)
    }
}

impl From<Guid> for Identifier {
    fn from(v: Guid) -> Self {
        Identifier::Guid(v)
    }
}

impl From<ByteString> for Identifier {
    fn from(v: ByteString) -> Self {
        Identifier::ByteString(v)
    }
}

/// Identifies a node (or, in this client core, a message/structure type)
/// within a namespace.
#[derive(Eq, PartialEq, Clone, Debug, Hash, Default)]
pub struct NodeId {
    /// Index into the server's namespace table.
    pub namespace: u16,
    /// The identifier within that namespace.
    pub identifier: Identifier,
}

impl Default for Identifier {
    fn default() -> Self {
        Identifier::Numeric(0)
    }
}

impl UaNullable for NodeId {
    fn is_ua_null(&self) -> bool {
        self.is_null()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ns={};{}", self.namespace, self.identifier)
    }
}

impl FromStr for NodeId {
    type Err = StatusCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ns=<namespace>;<type>=<value>, with ns= defaulting to 0.
        let (namespace, rest) = if let Some(rest) = s.strip_prefix("ns=") {
            let (ns, rest) = rest.split_once(';').ok_or(StatusCode::BadNodeIdInvalid)?;
            (
                ns.parse::<u16>().map_err(|_| StatusCode::BadNodeIdInvalid)?,
                rest,
            )
        } else {
            (0, s)
        };
        let identifier = identifier_from_str(rest).ok_or(StatusCode::BadNodeIdInvalid)?;
        Ok(NodeId {
            namespace,
            identifier,
        })
    }
}

fn identifier_from_str(s: &str) -> Option<Identifier> {
    if s.len() < 2 {
        return None;
    }
    let (k, v) = s.split_at(2);
    match k {
        "i=" => v.parse::<u32>().ok().map(Identifier::Numeric),
        "s=" => Some(Identifier::String(UAString::from(v))),
        "g=" => Guid::from_str(v).ok().map(Identifier::Guid),
        "b=" => ByteString::from_base64(v).map(Identifier::ByteString),
        _ => None,
    }
}

impl NodeId {
    /// Construct a `NodeId` from a namespace index and any identifier kind.
    pub fn new<T>(namespace: u16, value: T) -> NodeId
    where
        T: Into<Identifier>,
    {
        NodeId {
            namespace,
            identifier: value.into(),
        }
    }

    /// The null node id: namespace 0, numeric identifier 0.
    pub fn null() -> NodeId {
        NodeId {
            namespace: 0,
            identifier: Identifier::Numeric(0),
        }
    }

    /// Returns `true` if this is the null node id.
    pub fn is_null(&self) -> bool {
        self.namespace == 0 && matches!(self.identifier, Identifier::Numeric(0))
    }
}

impl BinaryEncodable for NodeId {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        match &self.identifier {
            Identifier::Numeric(value) => {
                if self.namespace == 0 && *value <= 255 {
                    2
                } else if self.namespace <= 255 && *value <= 65535 {
                    4
                } else {
                    7
                }
            }
            Identifier::String(value) => 3 + value.byte_len(ctx),
            Identifier::Guid(value) => 3 + value.byte_len(ctx),
            Identifier::ByteString(value) => 3 + value.byte_len(ctx),
        }
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        match &self.identifier {
            Identifier::Numeric(value) => {
                if self.namespace == 0 && *value <= 255 {
                    write_u8(stream, 0x00u8)?;
                    write_u8(stream, *value as u8)?;
                } else if self.namespace <= 255 && *value <= 65535 {
                    write_u8(stream, 0x01u8)?;
                    write_u8(stream, self.namespace as u8)?;
                    write_u16(stream, *value as u16)?;
                } else {
                    write_u8(stream, 0x02u8)?;
                    write_u16(stream, self.namespace)?;
                    write_u32(stream, *value)?;
                }
            }
            Identifier::String(value) => {
                write_u8(stream, 0x03u8)?;
                write_u16(stream, self.namespace)?;
                value.encode(stream, ctx)?;
            }
            Identifier::Guid(value) => {
                write_u8(stream, 0x04u8)?;
                write_u16(stream, self.namespace)?;
                value.encode(stream, ctx)?;
            }
            Identifier::ByteString(value) => {
                write_u8(stream, 0x05u8)?;
                write_u16(stream, self.namespace)?;
                value.encode(stream, ctx)?;
            }
        }
        Ok(())
    }
}

impl BinaryDecodable for NodeId {
    fn decode<S: std::io::Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        let identifier_type = read_u8(stream)?;
        Ok(match identifier_type {
            0x00 => {
                let value = read_u8(stream)?;
                NodeId::new(0, u32::from(value))
            }
            0x01 => {
                let namespace = read_u8(stream)?;
                let value = read_u16(stream)?;
                NodeId::new(u16::from(namespace), u32::from(value))
            }
            0x02 => {
                let namespace = read_u16(stream)?;
                let value = read_u32(stream)?;
                NodeId::new(namespace, value)
            }
            0x03 => {
                let namespace = read_u16(stream)?;
                let value = UAString::decode(stream, ctx)?;
                NodeId::new(namespace, value)
            }
            0x04 => {
                let namespace = read_u16(stream)?;
                let value = Guid::decode(stream, ctx)?;
                NodeId::new(namespace, value)
            }
            0x05 => {
                let namespace = read_u16(stream)?;
                let value = ByteString::decode(stream, ctx)?;
                NodeId::new(namespace, value)
            }
            _ => {
                return Err(Error::decoding(format!(
                    "unrecognized node id identifier type {identifier_type}"
                )))
            }
        })
    }
}
