// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! The `BinaryEncodable`/`BinaryDecodable` traits and helpers for reading and
//! writing scalar values and other primitives in the UA binary encoding
//! (little-endian, per IEC 62541-6).

use std::{
    error::Error as StdError,
    fmt::{Debug, Display},
    io::{Cursor, Read, Result, Write},
    sync::atomic::{AtomicU64, Ordering},
};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use log::error;

use crate::{constants, status_code::StatusCode};

/// Result of an encoding or decoding operation.
pub type EncodingResult<T> = std::result::Result<T, Error>;

/// General OPC UA error.
///
/// Carries a status code plus context about the request this error occurred
/// as part of, when that is available, and the underlying cause.
#[derive(Debug)]
pub struct Error {
    status: StatusCode,
    request_id: Option<u32>,
    request_handle: Option<u32>,
    context: Box<dyn StdError + Send + Sync>,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.context)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.context)
    }
}

impl Error {
    /// Create a new error with the given `status` code and `context` as a
    /// dynamic error source.
    pub fn new(status: StatusCode, context: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            status,
            request_id: None,
            request_handle: None,
            context: context.into(),
        }
    }

    /// Create a new error with status code `BadDecodingError`.
    pub fn decoding(context: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::new(StatusCode::BadDecodingError, context)
    }

    /// Create a new error with status code `BadEncodingError`.
    pub fn encoding(context: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::new(StatusCode::BadEncodingError, context)
    }

    /// Attach request id and request handle context.
    pub fn with_context(mut self, request_id: Option<u32>, request_handle: Option<u32>) -> Self {
        self.request_id = request_id;
        self.request_handle = request_handle;
        self
    }

    /// Attach a request id.
    pub fn with_request_id(mut self, id: u32) -> Self {
        self.request_id = Some(id);
        self
    }

    /// Attach a request handle.
    pub fn with_request_handle(mut self, handle: u32) -> Self {
        self.request_handle = Some(handle);
        self
    }

    /// Attach a request handle if one is known.
    pub fn maybe_with_request_handle(mut self, handle: Option<u32>) -> Self {
        if let Some(handle) = handle {
            self.request_handle = Some(handle);
        }
        self
    }

    /// The status code carried by this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The request id and handle, if both are known.
    pub fn full_context(&self) -> Option<(u32, u32)> {
        match (self.request_id, self.request_handle) {
            (Some(id), Some(handle)) => Some((id, handle)),
            _ => None,
        }
    }
}

impl From<Error> for StatusCode {
    fn from(value: Error) -> Self {
        error!("{}", value);
        value.status()
    }
}

impl From<Error> for std::io::Error {
    fn from(value: Error) -> Self {
        value.status().into()
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::decoding(value)
    }
}

/// A guard held on a `DepthGauge` while decoding a potentially recursive
/// structure. Decrements the gauge on drop so a panic unwind cannot leave it
/// stuck at the recursion limit.
#[derive(Debug)]
pub struct DepthLock<'a> {
    depth_gauge: &'a DepthGauge,
}

impl Drop for DepthLock<'_> {
    fn drop(&mut self) {
        self.depth_gauge
            .current_depth
            .fetch_sub(1, Ordering::Release);
    }
}

impl<'a> DepthLock<'a> {
    fn new(depth_gauge: &'a DepthGauge) -> (Self, u64) {
        let current = depth_gauge.current_depth.fetch_add(1, Ordering::Acquire);
        (Self { depth_gauge }, current)
    }

    /// Take a lease on the depth gauge. Fails once `max_depth` outstanding
    /// leases are held.
    pub fn obtain(depth_gauge: &'a DepthGauge) -> EncodingResult<DepthLock<'a>> {
        let max_depth = depth_gauge.max_depth;
        let (gauge, val) = Self::new(depth_gauge);
        if val >= max_depth {
            Err(Error::decoding(
                "decoding aborted, maximum recursion depth reached",
            ))
        } else {
            Ok(gauge)
        }
    }
}

/// Tracks current recursion depth while decoding nested structures such as
/// `ExtensionObject`.
#[derive(Debug)]
pub struct DepthGauge {
    max_depth: u64,
    current_depth: AtomicU64,
}

impl Clone for DepthGauge {
    fn clone(&self) -> Self {
        Self {
            max_depth: self.max_depth,
            current_depth: AtomicU64::new(0),
        }
    }
}

impl Default for DepthGauge {
    fn default() -> Self {
        Self::new(constants::MAX_DECODING_DEPTH)
    }
}

impl DepthGauge {
    /// Create a new gauge with the given maximum depth.
    pub fn new(max_depth: u64) -> Self {
        Self {
            max_depth,
            current_depth: AtomicU64::new(0),
        }
    }

    /// A gauge with max depth of 1, useful when decoding a value that must
    /// not itself contain nested recursive structures.
    pub fn minimal() -> Self {
        Self {
            max_depth: 1,
            ..Default::default()
        }
    }

    /// The configured maximum depth.
    pub fn max_depth(&self) -> u64 {
        self.max_depth
    }
}

/// Limits applied while decoding: maximum message/array/string sizes and
/// recursion depth. Negotiated (downward) against the server's own limits
/// during the Hello/Acknowledge exchange.
#[derive(Clone, Debug)]
pub struct DecodingOptions {
    /// Maximum size of a single message in bytes. 0 means unlimited.
    pub max_message_size: usize,
    /// Maximum number of chunks making up a message. 0 means unlimited.
    pub max_chunk_count: usize,
    /// Maximum length in bytes of a decoded string.
    pub max_string_length: usize,
    /// Maximum length in bytes of a decoded byte string.
    pub max_byte_string_length: usize,
    /// Maximum number of elements in a decoded array.
    pub max_array_length: usize,
    /// Guards against unbounded recursion in nested structures.
    pub decoding_depth_gauge: DepthGauge,
}

impl Default for DecodingOptions {
    fn default() -> Self {
        DecodingOptions {
            max_message_size: constants::MAX_MESSAGE_SIZE,
            max_chunk_count: constants::MAX_CHUNK_COUNT,
            max_string_length: constants::MAX_STRING_LENGTH,
            max_byte_string_length: constants::MAX_BYTE_STRING_LENGTH,
            max_array_length: constants::MAX_ARRAY_LENGTH,
            decoding_depth_gauge: DepthGauge::default(),
        }
    }
}

impl DecodingOptions {
    /// Tight limits, useful for decoding a payload that is not expected to
    /// be large, such as the body of an `ExtensionObject`.
    pub fn minimal() -> Self {
        DecodingOptions {
            max_string_length: 8192,
            max_byte_string_length: 8192,
            max_array_length: 8192,
            decoding_depth_gauge: DepthGauge::minimal(),
            ..Default::default()
        }
    }

    /// For test use only.
    pub fn test() -> Self {
        Self::default()
    }

    /// Take a lease on the recursion-depth gauge.
    pub fn depth_lock(&self) -> EncodingResult<DepthLock<'_>> {
        DepthLock::obtain(&self.decoding_depth_gauge)
    }
}

/// Decoding/encoding context. In the full reference implementation this
/// carries a namespace table and a dynamic type-loader registry for
/// server-defined structures; this client core only ever decodes the fixed
/// catalog of built-in service types, so it is reduced to the decoding
/// limits alone.
#[derive(Clone, Debug, Default)]
pub struct Context<'a> {
    options: DecodingOptions,
    _marker: std::marker::PhantomData<&'a ()>,
}

impl<'a> Context<'a> {
    /// Create a context from a set of decoding options.
    pub fn new(options: DecodingOptions) -> Self {
        Self {
            options,
            _marker: std::marker::PhantomData,
        }
    }

    /// The decoding options carried by this context.
    pub fn options(&self) -> &DecodingOptions {
        &self.options
    }
}

impl<'a> From<DecodingOptions> for Context<'a> {
    fn from(options: DecodingOptions) -> Self {
        Self::new(options)
    }
}

/// Trait implemented by OPC UA types that can be null, distinct from their
/// default value (e.g. an empty string vs. a null string).
pub trait UaNullable {
    /// Returns `true` if this value is the UA null representation.
    fn is_ua_null(&self) -> bool {
        false
    }
}

impl<T> UaNullable for Option<T>
where
    T: UaNullable,
{
    fn is_ua_null(&self) -> bool {
        match self {
            Some(s) => s.is_ua_null(),
            None => true,
        }
    }
}

impl<T> UaNullable for Vec<T> where T: UaNullable {}
impl<T> UaNullable for Box<T>
where
    T: UaNullable,
{
    fn is_ua_null(&self) -> bool {
        self.as_ref().is_ua_null()
    }
}

macro_rules! is_null_const {
    ($t:ty, $c:expr) => {
        impl UaNullable for $t {
            fn is_ua_null(&self) -> bool {
                *self == $c
            }
        }
    };
}

is_null_const!(bool, false);
is_null_const!(u8, 0);
is_null_const!(u16, 0);
is_null_const!(u32, 0);
is_null_const!(u64, 0);
is_null_const!(i8, 0);
is_null_const!(i16, 0);
is_null_const!(i32, 0);
is_null_const!(i64, 0);
is_null_const!(f32, 0.0);
is_null_const!(f64, 0.0);

impl UaNullable for String {}
impl UaNullable for str {}

/// Binary encoding for a type, context-aware (the context carries decoding
/// limits; a full implementation would also carry a namespace table here).
///
/// `byte_len` must return exactly the number of bytes `encode` will write.
pub trait BinaryEncodable {
    /// The exact length in bytes this value will occupy once encoded.
    fn byte_len(&self, ctx: &Context<'_>) -> usize;

    /// Encode this value to the stream.
    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()>;

    /// Convenience for encoding straight to a `Vec<u8>`. Prefer reusing a
    /// buffer over calling this outside of tests.
    fn encode_to_vec(&self, ctx: &Context<'_>) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::with_capacity(self.byte_len(ctx)));
        let _ = self.encode(&mut buffer, ctx);
        buffer.into_inner()
    }
}

/// Context-aware binary decoding for a type.
pub trait BinaryDecodable: Sized {
    /// Decode an instance from the stream, honoring the limits in `ctx`.
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self>;
}

/// Binary encoding for a type that cannot contain any server-defined
/// structures. Used for the core handshake and header types, which only
/// ever need the decoding limits, not a namespace table.
pub trait SimpleBinaryEncodable {
    /// The exact length in bytes this value will occupy once encoded.
    fn byte_len(&self) -> usize;

    /// Encode this value to the stream.
    fn encode<S: Write + ?Sized>(&self, stream: &mut S) -> EncodingResult<()>;

    /// Convenience for encoding straight to a `Vec<u8>`.
    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::with_capacity(self.byte_len()));
        let _ = self.encode(&mut buffer);
        buffer.into_inner()
    }
}

impl<T> BinaryEncodable for T
where
    T: SimpleBinaryEncodable,
{
    fn byte_len(&self, _ctx: &Context<'_>) -> usize {
        SimpleBinaryEncodable::byte_len(self)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, _ctx: &Context<'_>) -> EncodingResult<()> {
        SimpleBinaryEncodable::encode(self, stream)
    }
}

/// Binary decoding for a type that cannot contain any server-defined
/// structures; needs only the decoding limits, not the full context.
pub trait SimpleBinaryDecodable: Sized {
    /// Decode an instance from the stream, honoring `decoding_options`.
    fn decode<S: Read + ?Sized>(
        stream: &mut S,
        decoding_options: &DecodingOptions,
    ) -> EncodingResult<Self>;
}

impl<T> BinaryDecodable for T
where
    T: SimpleBinaryDecodable,
{
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        SimpleBinaryDecodable::decode(stream, ctx.options())
    }
}

/// Turn an I/O encoding error into an `EncodingResult`.
pub fn process_encode_io_result(result: Result<()>) -> EncodingResult<()> {
    result.map_err(Error::encoding)
}

/// Turn an I/O decoding error into an `EncodingResult`.
pub fn process_decode_io_result<T>(result: Result<T>) -> EncodingResult<T>
where
    T: Debug,
{
    result.map_err(Error::decoding)
}

impl<T> BinaryEncodable for Option<Vec<T>>
where
    T: BinaryEncodable,
{
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        let mut size = 4;
        if let Some(values) = self {
            size += values.iter().map(|v| v.byte_len(ctx)).sum::<usize>();
        }
        size
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        if let Some(values) = self {
            write_i32(stream, values.len() as i32)?;
            for value in values.iter() {
                value.encode(stream, ctx)?;
            }
        } else {
            write_i32(stream, -1)?;
        }
        Ok(())
    }
}

impl<T> BinaryDecodable for Option<Vec<T>>
where
    T: BinaryDecodable,
{
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        let len = read_i32(stream)?;
        if len == -1 {
            Ok(None)
        } else if len < -1 {
            Err(Error::decoding("array length is negative and invalid"))
        } else if len as usize > ctx.options().max_array_length {
            Err(Error::decoding(format!(
                "array length {} exceeds decoding limit {}",
                len,
                ctx.options().max_array_length
            )))
        } else {
            let mut values = Vec::with_capacity(len as usize);
            for _ in 0..len {
                values.push(T::decode(stream, ctx)?);
            }
            Ok(Some(values))
        }
    }
}

/// Byte length of an optional array of encodable values, including its
/// 4-byte length prefix.
pub fn byte_len_array<T: BinaryEncodable>(values: &Option<Vec<T>>, ctx: &Context<'_>) -> usize {
    let mut size = 4;
    if let Some(values) = values {
        size += values.iter().map(|v| v.byte_len(ctx)).sum::<usize>();
    }
    size
}

/// Write `value` as a single unsigned byte.
pub fn write_u8<T, W: Write + ?Sized>(stream: &mut W, value: T) -> EncodingResult<()>
where
    T: Into<u8>,
{
    process_encode_io_result(stream.write_all(&[value.into()]))
}

/// Write `value` as a little-endian signed 16-bit integer.
pub fn write_i16<T, W: Write + ?Sized>(stream: &mut W, value: T) -> EncodingResult<()>
where
    T: Into<i16>,
{
    let mut buf = [0u8; 2];
    LittleEndian::write_i16(&mut buf, value.into());
    process_encode_io_result(stream.write_all(&buf))
}

/// Write `value` as a little-endian unsigned 16-bit integer.
pub fn write_u16<T, W: Write + ?Sized>(stream: &mut W, value: T) -> EncodingResult<()>
where
    T: Into<u16>,
{
    let mut buf = [0u8; 2];
    LittleEndian::write_u16(&mut buf, value.into());
    process_encode_io_result(stream.write_all(&buf))
}

/// Write `value` as a little-endian signed 32-bit integer.
pub fn write_i32<T, W: Write + ?Sized>(stream: &mut W, value: T) -> EncodingResult<()>
where
    T: Into<i32>,
{
    let mut buf = [0u8; 4];
    LittleEndian::write_i32(&mut buf, value.into());
    process_encode_io_result(stream.write_all(&buf))
}

/// Write `value` as a little-endian unsigned 32-bit integer.
pub fn write_u32<T, W: Write + ?Sized>(stream: &mut W, value: T) -> EncodingResult<()>
where
    T: Into<u32>,
{
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, value.into());
    process_encode_io_result(stream.write_all(&buf))
}

/// Write `value` as a little-endian signed 64-bit integer.
pub fn write_i64<T, W: Write + ?Sized>(stream: &mut W, value: T) -> EncodingResult<()>
where
    T: Into<i64>,
{
    let mut buf = [0u8; 8];
    LittleEndian::write_i64(&mut buf, value.into());
    process_encode_io_result(stream.write_all(&buf))
}

/// Write `value` as a little-endian unsigned 64-bit integer.
pub fn write_u64<T, W: Write + ?Sized>(stream: &mut W, value: T) -> EncodingResult<()>
where
    T: Into<u64>,
{
    let mut buf = [0u8; 8];
    LittleEndian::write_u64(&mut buf, value.into());
    process_encode_io_result(stream.write_all(&buf))
}

/// Write `value` as a little-endian IEEE-754 single-precision float.
pub fn write_f32<T, W: Write + ?Sized>(stream: &mut W, value: T) -> EncodingResult<()>
where
    T: Into<f32>,
{
    let mut buf = [0u8; 4];
    LittleEndian::write_f32(&mut buf, value.into());
    process_encode_io_result(stream.write_all(&buf))
}

/// Write `value` as a little-endian IEEE-754 double-precision float.
pub fn write_f64<T, W: Write + ?Sized>(stream: &mut W, value: T) -> EncodingResult<()>
where
    T: Into<f64>,
{
    let mut buf = [0u8; 8];
    LittleEndian::write_f64(&mut buf, value.into());
    process_encode_io_result(stream.write_all(&buf))
}

/// Read a single unsigned byte.
pub fn read_u8<R: Read + ?Sized>(stream: &mut R) -> EncodingResult<u8> {
    let mut buf = [0u8];
    process_decode_io_result(stream.read_exact(&mut buf))?;
    Ok(buf[0])
}

/// Read a little-endian signed 16-bit integer.
pub fn read_i16<R: Read + ?Sized>(stream: &mut R) -> EncodingResult<i16> {
    let mut buf = [0u8; 2];
    process_decode_io_result(stream.read_exact(&mut buf))?;
    Ok(LittleEndian::read_i16(&buf))
}

/// Read a little-endian unsigned 16-bit integer.
pub fn read_u16<R: Read + ?Sized>(stream: &mut R) -> EncodingResult<u16> {
    let mut buf = [0u8; 2];
    process_decode_io_result(stream.read_exact(&mut buf))?;
    Ok(LittleEndian::read_u16(&buf))
}

/// Read a little-endian signed 32-bit integer.
pub fn read_i32<R: Read + ?Sized>(stream: &mut R) -> EncodingResult<i32> {
    let mut buf = [0u8; 4];
    process_decode_io_result(stream.read_exact(&mut buf))?;
    Ok(LittleEndian::read_i32(&buf))
}

/// Read a little-endian unsigned 32-bit integer.
pub fn read_u32<R: Read + ?Sized>(stream: &mut R) -> EncodingResult<u32> {
    let mut buf = [0u8; 4];
    process_decode_io_result(stream.read_exact(&mut buf))?;
    Ok(LittleEndian::read_u32(&buf))
}

/// Read a little-endian signed 64-bit integer.
pub fn read_i64<R: Read + ?Sized>(stream: &mut R) -> EncodingResult<i64> {
    let mut buf = [0u8; 8];
    process_decode_io_result(stream.read_exact(&mut buf))?;
    Ok(LittleEndian::read_i64(&buf))
}

/// Read a little-endian unsigned 64-bit integer.
pub fn read_u64<R: Read + ?Sized>(stream: &mut R) -> EncodingResult<u64> {
    let mut buf = [0u8; 8];
    process_decode_io_result(stream.read_exact(&mut buf))?;
    Ok(LittleEndian::read_u64(&buf))
}

/// Read a little-endian IEEE-754 single-precision float.
pub fn read_f32<R: Read + ?Sized>(stream: &mut R) -> EncodingResult<f32> {
    let mut buf = [0u8; 4];
    process_decode_io_result(stream.read_exact(&mut buf))?;
    Ok(LittleEndian::read_f32(&buf))
}

/// Read a little-endian IEEE-754 double-precision float.
pub fn read_f64<R: Read + ?Sized>(stream: &mut R) -> EncodingResult<f64> {
    let mut buf = [0u8; 8];
    process_decode_io_result(stream.read_exact(&mut buf))?;
    Ok(LittleEndian::read_f64(&buf))
}

/// Skip `count` bytes in the stream without retaining them.
pub fn skip_bytes<R: Read + ?Sized>(stream: &mut R, count: u64) -> EncodingResult<()> {
    std::io::copy(&mut stream.take(count), &mut std::io::sink())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{constants, DepthGauge, DepthLock};
    use crate::StatusCode;

    #[test]
    fn depth_gauge() {
        let dg = Arc::new(DepthGauge::default());
        let max_depth = dg.max_depth();
        assert_eq!(max_depth, constants::MAX_DECODING_DEPTH);

        {
            let mut v = Vec::new();
            for _ in 0..max_depth {
                v.push(DepthLock::obtain(&dg).unwrap());
            }
            assert_eq!(
                DepthLock::obtain(&dg).unwrap_err().status(),
                StatusCode::BadDecodingError
            );
        }

        assert_eq!(
            dg.current_depth.load(std::sync::atomic::Ordering::Relaxed),
            0
        );
    }
}
