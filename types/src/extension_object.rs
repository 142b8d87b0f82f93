// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! `ExtensionObject`, a type-tagged opaque payload used to carry
//! server-defined or less common structures inline in a message.

use std::io::Write;

use crate::byte_string::ByteString;
use crate::encoding::{BinaryDecodable, BinaryEncodable, EncodingResult};
use crate::expanded_node_id::ExpandedNodeId;
use crate::{read_u8, write_u8, Context, Error, UaNullable};

/// How the body of an `ExtensionObject` is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionObjectEncoding {
    /// No body.
    None,
    /// Binary-encoded body (the only encoding this client core produces).
    Binary,
    /// XML-encoded body. Bodies of this kind are passed through opaquely.
    Xml,
}

impl From<ExtensionObjectEncoding> for u8 {
    fn from(value: ExtensionObjectEncoding) -> Self {
        match value {
            ExtensionObjectEncoding::None => 0x00,
            ExtensionObjectEncoding::Binary => 0x01,
            ExtensionObjectEncoding::Xml => 0x02,
        }
    }
}

/// A type-tagged payload: an `ExpandedNodeId` identifying the structure's
/// binary encoding id, plus the raw encoded bytes. This client core treats
/// `ExtensionObject` bodies opaquely except where a specific structure
/// (such as `ReadRawModifiedDetails`) is known to wrap one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtensionObject {
    /// The binary encoding id of the wrapped structure, or null if empty.
    pub type_id: ExpandedNodeId,
    /// The encoding used for `body`.
    pub body: Option<(ExtensionObjectEncoding, ByteString)>,
}

impl UaNullable for ExtensionObject {
    fn is_ua_null(&self) -> bool {
        self.type_id.is_null() && self.body.is_none()
    }
}

impl ExtensionObject {
    /// The null (empty) extension object.
    pub fn null() -> ExtensionObject {
        ExtensionObject::default()
    }

    /// Returns `true` if this extension object carries no body.
    pub fn is_empty(&self) -> bool {
        self.body.is_none()
    }

    /// Wrap an already-encoded binary body under the given type id.
    pub fn from_binary(type_id: ExpandedNodeId, body: ByteString) -> ExtensionObject {
        ExtensionObject {
            type_id,
            body: Some((ExtensionObjectEncoding::Binary, body)),
        }
    }

    /// Encode `value` and wrap it as a binary-encoded extension object
    /// under `type_id`.
    pub fn from_message<T: BinaryEncodable>(
        type_id: ExpandedNodeId,
        value: &T,
        ctx: &Context<'_>,
    ) -> ExtensionObject {
        let bytes = value.encode_to_vec(ctx);
        ExtensionObject::from_binary(type_id, ByteString::from(bytes))
    }

    /// Decode the body as `T`, assuming it is binary-encoded. Fails if the
    /// extension object is empty or XML-encoded.
    pub fn decode_inner<T: BinaryDecodable>(&self, ctx: &Context<'_>) -> EncodingResult<T> {
        match &self.body {
            Some((ExtensionObjectEncoding::Binary, bytes)) => {
                let _lock = ctx.options().depth_lock()?;
                let mut slice: &[u8] = bytes.as_ref();
                T::decode(&mut slice, ctx)
            }
            Some((ExtensionObjectEncoding::Xml, _)) => {
                Err(Error::decoding("cannot decode XML-encoded extension object body"))
            }
            _ => Err(Error::decoding("extension object has no body to decode")),
        }
    }
}

impl BinaryEncodable for ExtensionObject {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        let mut size = self.type_id.byte_len(ctx);
        size += 1;
        if let Some((_, body)) = &self.body {
            size += body.byte_len(ctx);
        }
        size
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.type_id.encode(stream, ctx)?;
        match &self.body {
            None => write_u8(stream, u8::from(ExtensionObjectEncoding::None))?,
            Some((encoding, body)) => {
                write_u8(stream, u8::from(*encoding))?;
                body.encode(stream, ctx)?;
            }
        }
        Ok(())
    }
}

impl BinaryDecodable for ExtensionObject {
    fn decode<S: std::io::Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        let type_id = ExpandedNodeId::decode(stream, ctx)?;
        let encoding = read_u8(stream)?;
        let body = match encoding {
            0x00 => None,
            0x01 => Some((
                ExtensionObjectEncoding::Binary,
                ByteString::decode(stream, ctx)?,
            )),
            0x02 => Some((
                ExtensionObjectEncoding::Xml,
                ByteString::decode(stream, ctx)?,
            )),
            _ => {
                return Err(Error::decoding(format!(
                    "unrecognized extension object encoding byte {encoding}"
                )))
            }
        };
        Ok(ExtensionObject { type_id, body })
    }
}
