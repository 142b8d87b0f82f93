// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! `Variant`, a tagged union carrying any of the OPC UA built-in scalar
//! types plus arrays of them.
//!
//! The full specification allows a `Variant` to carry any of 25 built-in
//! types, nested arrays, and matrices with dimensions. This client core
//! carries the scalar subset needed to exercise attribute read/write and to
//! decode simple monitored item values. [`Variant::Unsupported`] exists so
//! callers can construct a placeholder value for types this crate doesn't
//! decode; since an unrecognized element type's length can't be known,
//! decoding one is still a hard error rather than a silent skip.

use std::io::Write;

use crate::byte_string::ByteString;
use crate::date_time::UtcTime;
use crate::encoding::{BinaryDecodable, BinaryEncodable, EncodingResult};
use crate::guid::Guid;
use crate::localized_text::LocalizedText;
use crate::node_id::NodeId;
use crate::status_code::StatusCode;
use crate::string::UAString;
use crate::{read_u8, write_u8, Context, Error, UaNullable};

const MASK_ARRAY: u8 = 0x80;
const MASK_TYPE_ID: u8 = 0x3F;

/// A dynamically-typed value as carried in `DataValue`, `ReadValueId`
/// results, and write requests.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    /// No value (the wire encoding id `0`).
    Empty,
    Boolean(bool),
    SByte(i8),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(UAString),
    DateTime(Box<UtcTime>),
    Guid(Box<Guid>),
    ByteString(ByteString),
    NodeId(Box<NodeId>),
    StatusCode(StatusCode),
    LocalizedText(Box<LocalizedText>),
    /// An array of same-typed scalars, recorded with its element type id so
    /// it can be re-encoded.
    Array(u8, Vec<Variant>),
    /// Any recognized-but-unimplemented encoding id, retained as raw bytes
    /// so the caller at least knows a value arrived.
    Unsupported(u8, Vec<u8>),
}

impl Default for Variant {
    fn default() -> Self {
        Variant::Empty
    }
}

impl UaNullable for Variant {
    fn is_ua_null(&self) -> bool {
        matches!(self, Variant::Empty)
    }
}

impl From<bool> for Variant {
    fn from(v: bool) -> Self {
        Variant::Boolean(v)
    }
}
impl From<i32> for Variant {
    fn from(v: i32) -> Self {
        Variant::Int32(v)
    }
}
impl From<u32> for Variant {
    fn from(v: u32) -> Self {
        Variant::UInt32(v)
    }
}
impl From<f64> for Variant {
    fn from(v: f64) -> Self {
        Variant::Double(v)
    }
}
impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Variant::String(v.into())
    }
}

fn type_id(v: &Variant) -> u8 {
    match v {
        Variant::Empty => 0,
        Variant::Boolean(_) => 1,
        Variant::SByte(_) => 2,
        Variant::Byte(_) => 3,
        Variant::Int16(_) => 4,
        Variant::UInt16(_) => 5,
        Variant::Int32(_) => 6,
        Variant::UInt32(_) => 7,
        Variant::Int64(_) => 8,
        Variant::UInt64(_) => 9,
        Variant::Float(_) => 10,
        Variant::Double(_) => 11,
        Variant::String(_) => 12,
        Variant::DateTime(_) => 13,
        Variant::Guid(_) => 14,
        Variant::ByteString(_) => 15,
        Variant::NodeId(_) => 17,
        Variant::StatusCode(_) => 19,
        Variant::LocalizedText(_) => 21,
        Variant::Array(t, _) => *t,
        Variant::Unsupported(t, _) => *t,
    }
}

impl BinaryEncodable for Variant {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        1 + match self {
            Variant::Empty => 0,
            Variant::Boolean(v) => v.byte_len(ctx),
            Variant::SByte(v) => v.byte_len(ctx),
            Variant::Byte(v) => v.byte_len(ctx),
            Variant::Int16(v) => v.byte_len(ctx),
            Variant::UInt16(v) => v.byte_len(ctx),
            Variant::Int32(v) => v.byte_len(ctx),
            Variant::UInt32(v) => v.byte_len(ctx),
            Variant::Int64(v) => v.byte_len(ctx),
            Variant::UInt64(v) => v.byte_len(ctx),
            Variant::Float(v) => v.byte_len(ctx),
            Variant::Double(v) => v.byte_len(ctx),
            Variant::String(v) => v.byte_len(ctx),
            Variant::DateTime(v) => v.byte_len(ctx),
            Variant::Guid(v) => v.byte_len(ctx),
            Variant::ByteString(v) => v.byte_len(ctx),
            Variant::NodeId(v) => v.byte_len(ctx),
            Variant::StatusCode(v) => v.bits().byte_len(ctx),
            Variant::LocalizedText(v) => v.byte_len(ctx),
            Variant::Array(_, items) => 4 + items.iter().map(|i| i.element_byte_len(ctx)).sum::<usize>(),
            Variant::Unsupported(_, bytes) => bytes.len(),
        }
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        match self {
            Variant::Array(elem_type, items) => {
                write_u8(stream, elem_type | MASK_ARRAY)?;
                crate::write_i32(stream, items.len() as i32)?;
                for item in items {
                    item.encode_element(stream, ctx)?;
                }
            }
            _ => {
                write_u8(stream, type_id(self))?;
                self.encode_element(stream, ctx)?;
            }
        }
        Ok(())
    }
}

impl Variant {
    fn element_byte_len(&self, ctx: &Context<'_>) -> usize {
        self.byte_len(ctx) - 1
    }

    fn encode_element<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        match self {
            Variant::Empty => Ok(()),
            Variant::Boolean(v) => v.encode(stream, ctx),
            Variant::SByte(v) => v.encode(stream, ctx),
            Variant::Byte(v) => v.encode(stream, ctx),
            Variant::Int16(v) => v.encode(stream, ctx),
            Variant::UInt16(v) => v.encode(stream, ctx),
            Variant::Int32(v) => v.encode(stream, ctx),
            Variant::UInt32(v) => v.encode(stream, ctx),
            Variant::Int64(v) => v.encode(stream, ctx),
            Variant::UInt64(v) => v.encode(stream, ctx),
            Variant::Float(v) => v.encode(stream, ctx),
            Variant::Double(v) => v.encode(stream, ctx),
            Variant::String(v) => v.encode(stream, ctx),
            Variant::DateTime(v) => v.encode(stream, ctx),
            Variant::Guid(v) => v.encode(stream, ctx),
            Variant::ByteString(v) => v.encode(stream, ctx),
            Variant::NodeId(v) => v.encode(stream, ctx),
            Variant::StatusCode(v) => v.bits().encode(stream, ctx),
            Variant::LocalizedText(v) => v.encode(stream, ctx),
            Variant::Array(..) => Err(Error::encoding("nested arrays are not supported")),
            Variant::Unsupported(_, bytes) => {
                crate::encoding::process_encode_io_result(stream.write_all(bytes))
            }
        }
    }
}

impl BinaryDecodable for Variant {
    fn decode<S: std::io::Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        let encoding_byte = read_u8(stream)?;
        let is_array = encoding_byte & MASK_ARRAY != 0;
        let elem_type = encoding_byte & MASK_TYPE_ID;

        if is_array {
            let len = crate::read_i32(stream)?;
            if len < -1 {
                return Err(Error::decoding("variant array length is negative and invalid"));
            }
            if len == -1 {
                return Ok(Variant::Array(elem_type, Vec::new()));
            }
            if len as usize > ctx.options().max_array_length {
                return Err(Error::decoding("variant array length exceeds decoding limit"));
            }
            let mut items = Vec::with_capacity(len as usize);
            for _ in 0..len {
                items.push(decode_scalar(elem_type, stream, ctx)?);
            }
            Ok(Variant::Array(elem_type, items))
        } else {
            decode_scalar(elem_type, stream, ctx)
        }
    }
}

fn decode_scalar<S: std::io::Read + ?Sized>(
    elem_type: u8,
    stream: &mut S,
    ctx: &Context<'_>,
) -> EncodingResult<Variant> {
    Ok(match elem_type {
        0 => Variant::Empty,
        1 => Variant::Boolean(bool::decode(stream, ctx)?),
        2 => Variant::SByte(i8::decode(stream, ctx)?),
        3 => Variant::Byte(u8::decode(stream, ctx)?),
        4 => Variant::Int16(i16::decode(stream, ctx)?),
        5 => Variant::UInt16(u16::decode(stream, ctx)?),
        6 => Variant::Int32(i32::decode(stream, ctx)?),
        7 => Variant::UInt32(u32::decode(stream, ctx)?),
        8 => Variant::Int64(i64::decode(stream, ctx)?),
        9 => Variant::UInt64(u64::decode(stream, ctx)?),
        10 => Variant::Float(f32::decode(stream, ctx)?),
        11 => Variant::Double(f64::decode(stream, ctx)?),
        12 => Variant::String(UAString::decode(stream, ctx)?),
        13 => Variant::DateTime(Box::new(UtcTime::decode(stream, ctx)?)),
        14 => Variant::Guid(Box::new(Guid::decode(stream, ctx)?)),
        15 => Variant::ByteString(ByteString::decode(stream, ctx)?),
        17 => Variant::NodeId(Box::new(NodeId::decode(stream, ctx)?)),
        19 => Variant::StatusCode(StatusCode::from_bits(u32::decode(stream, ctx)?)),
        21 => Variant::LocalizedText(Box::new(LocalizedText::decode(stream, ctx)?)),
        other => {
            // Unknown element type: we cannot know its length, so this is
            // only reachable for scalars at the top of a structure that
            // happens to be the last field. Treat it as a hard decode
            // error rather than silently misaligning the stream.
            return Err(Error::decoding(format!(
                "unsupported variant element type {other}"
            )));
        }
    })
}
