// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! `ByteString`, an opaque sequence of octets.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::encoding::{
    process_decode_io_result, process_encode_io_result, write_i32, DecodingOptions, EncodingResult,
};
use crate::{read_i32, Error, SimpleBinaryDecodable, SimpleBinaryEncodable, UaNullable};

/// A sequence of octets, distinguishing null from empty the same way
/// `UAString` does.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
pub struct ByteString {
    /// The raw bytes, or `None` if null.
    pub value: Option<Vec<u8>>,
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        self.value.as_deref().unwrap_or(&[])
    }
}

impl UaNullable for ByteString {
    fn is_ua_null(&self) -> bool {
        self.is_null()
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(value: Vec<u8>) -> Self {
        ByteString { value: Some(value) }
    }
}

impl From<&[u8]> for ByteString {
    fn from(value: &[u8]) -> Self {
        ByteString {
            value: Some(value.to_vec()),
        }
    }
}

impl ByteString {
    /// A null byte string.
    pub fn null() -> ByteString {
        ByteString { value: None }
    }

    /// Returns `true` if this byte string is null.
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    /// The length in bytes, or -1 if null, matching the wire length prefix.
    pub fn len(&self) -> isize {
        match &self.value {
            None => -1,
            Some(v) => v.len() as isize,
        }
    }

    /// Returns `true` if this byte string is null or empty.
    pub fn is_empty(&self) -> bool {
        match &self.value {
            None => true,
            Some(v) => v.is_empty(),
        }
    }

    /// Render this byte string as base64, or an empty string if null.
    pub fn as_base64(&self) -> String {
        match &self.value {
            None => String::new(),
            Some(v) => STANDARD.encode(v),
        }
    }

    /// Parse a byte string from its base64 representation.
    pub fn from_base64(s: &str) -> Option<ByteString> {
        STANDARD.decode(s).ok().map(|value| ByteString {
            value: Some(value),
        })
    }

    /// A byte string of `n` zero bytes, used for placeholder / null
    /// signature and certificate fields.
    pub fn zeroes(n: usize) -> ByteString {
        ByteString {
            value: Some(vec![0u8; n]),
        }
    }
}

impl SimpleBinaryEncodable for ByteString {
    fn byte_len(&self) -> usize {
        4 + match &self.value {
            None => 0,
            Some(v) => v.len(),
        }
    }

    fn encode<S: std::io::Write + ?Sized>(&self, stream: &mut S) -> EncodingResult<()> {
        match &self.value {
            None => write_i32(stream, -1),
            Some(v) => {
                write_i32(stream, v.len() as i32)?;
                process_encode_io_result(stream.write_all(v))
            }
        }
    }
}

impl SimpleBinaryDecodable for ByteString {
    fn decode<S: std::io::Read + ?Sized>(
        stream: &mut S,
        decoding_options: &DecodingOptions,
    ) -> EncodingResult<Self> {
        let len = read_i32(stream)?;
        if len == -1 {
            Ok(ByteString::null())
        } else if len < -1 {
            Err(Error::decoding(
                "byte string length is negative and invalid",
            ))
        } else if len as usize > decoding_options.max_byte_string_length {
            Err(Error::decoding(format!(
                "byte string length {} exceeds decoding limit {}",
                len, decoding_options.max_byte_string_length
            )))
        } else {
            let mut buf = vec![0u8; len as usize];
            process_decode_io_result(stream.read_exact(&mut buf))?;
            Ok(ByteString { value: Some(buf) })
        }
    }
}
