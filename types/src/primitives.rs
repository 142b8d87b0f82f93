// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! `SimpleBinaryEncodable`/`SimpleBinaryDecodable` impls for built-in
//! scalar types.

use crate::encoding::{
    process_decode_io_result, process_encode_io_result, read_f32, read_f64, read_i16, read_i32,
    read_i64, read_u16, read_u32, read_u64, read_u8, write_f32, write_f64, write_i16, write_i32,
    write_i64, write_u16, write_u32, write_u64, write_u8, DecodingOptions, EncodingResult,
};
use crate::{SimpleBinaryDecodable, SimpleBinaryEncodable};

macro_rules! impl_scalar {
    ($t:ty, $size:expr, $write:ident, $read:ident) => {
        impl SimpleBinaryEncodable for $t {
            fn byte_len(&self) -> usize {
                $size
            }

            fn encode<S: std::io::Write + ?Sized>(&self, stream: &mut S) -> EncodingResult<()> {
                $write(stream, *self)
            }
        }

        impl SimpleBinaryDecodable for $t {
            fn decode<S: std::io::Read + ?Sized>(
                stream: &mut S,
                _decoding_options: &DecodingOptions,
            ) -> EncodingResult<Self> {
                $read(stream)
            }
        }
    };
}

impl_scalar!(i16, 2, write_i16, read_i16);
impl_scalar!(u16, 2, write_u16, read_u16);
impl_scalar!(i32, 4, write_i32, read_i32);
impl_scalar!(u32, 4, write_u32, read_u32);
impl_scalar!(i64, 8, write_i64, read_i64);
impl_scalar!(u64, 8, write_u64, read_u64);
impl_scalar!(f32, 4, write_f32, read_f32);
impl_scalar!(f64, 8, write_f64, read_f64);

impl SimpleBinaryEncodable for bool {
    fn byte_len(&self) -> usize {
        1
    }

    fn encode<S: std::io::Write + ?Sized>(&self, stream: &mut S) -> EncodingResult<()> {
        write_u8(stream, if *self { 1u8 } else { 0u8 })
    }
}

impl SimpleBinaryDecodable for bool {
    fn decode<S: std::io::Read + ?Sized>(
        stream: &mut S,
        _decoding_options: &DecodingOptions,
    ) -> EncodingResult<Self> {
        Ok(read_u8(stream)? != 0)
    }
}

impl SimpleBinaryEncodable for u8 {
    fn byte_len(&self) -> usize {
        1
    }

    fn encode<S: std::io::Write + ?Sized>(&self, stream: &mut S) -> EncodingResult<()> {
        write_u8(stream, *self)
    }
}

impl SimpleBinaryDecodable for u8 {
    fn decode<S: std::io::Read + ?Sized>(
        stream: &mut S,
        _decoding_options: &DecodingOptions,
    ) -> EncodingResult<Self> {
        read_u8(stream)
    }
}

impl SimpleBinaryEncodable for i8 {
    fn byte_len(&self) -> usize {
        1
    }

    fn encode<S: std::io::Write + ?Sized>(&self, stream: &mut S) -> EncodingResult<()> {
        process_encode_io_result(stream.write_all(&[*self as u8]))
    }
}

impl SimpleBinaryDecodable for i8 {
    fn decode<S: std::io::Read + ?Sized>(
        stream: &mut S,
        _decoding_options: &DecodingOptions,
    ) -> EncodingResult<Self> {
        let mut buf = [0u8; 1];
        process_decode_io_result(stream.read_exact(&mut buf))?;
        Ok(buf[0] as i8)
    }
}
