// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! `UAString`, the OPC UA string type.

use std::fmt;

use crate::encoding::{
    process_decode_io_result, process_encode_io_result, write_i32, DecodingOptions, EncodingResult,
};
use crate::{read_i32, Error, SimpleBinaryDecodable, SimpleBinaryEncodable, UaNullable};

/// Named `UAString` to avoid colliding with `std::string::String`. An OPC UA
/// string distinguishes a null string from an empty one, so the value is
/// held as `Option<String>`.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
pub struct UAString {
    value: Option<String>,
}

impl fmt::Display for UAString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{v}"),
            None => write!(f, "[null]"),
        }
    }
}

impl UaNullable for UAString {
    fn is_ua_null(&self) -> bool {
        self.is_null()
    }
}

impl AsRef<str> for UAString {
    fn as_ref(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

impl From<&str> for UAString {
    fn from(v: &str) -> Self {
        UAString {
            value: Some(v.to_string()),
        }
    }
}

impl From<String> for UAString {
    fn from(v: String) -> Self {
        UAString { value: Some(v) }
    }
}

impl From<Option<String>> for UAString {
    fn from(value: Option<String>) -> Self {
        UAString { value }
    }
}

impl From<&String> for UAString {
    fn from(v: &String) -> Self {
        UAString {
            value: Some(v.clone()),
        }
    }
}

impl From<UAString> for String {
    fn from(value: UAString) -> Self {
        value.value.unwrap_or_default()
    }
}

impl UAString {
    /// A null string (distinct from an empty one).
    pub fn null() -> UAString {
        UAString { value: None }
    }

    /// Returns `true` if this string is null.
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    /// Returns `true` if this string is null or has zero length.
    pub fn is_empty(&self) -> bool {
        match &self.value {
            None => true,
            Some(v) => v.is_empty(),
        }
    }

    /// The string's length in bytes, or -1 if null, matching the wire
    /// length prefix.
    pub fn len(&self) -> isize {
        match &self.value {
            None => -1,
            Some(v) => v.len() as isize,
        }
    }

    /// Borrow the inner value, if not null.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl SimpleBinaryEncodable for UAString {
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
                process_encode_io_result(stream.write_all(v.as_bytes()))
            }
        }
    }
}

impl SimpleBinaryDecodable for UAString {
    fn decode<S: std::io::Read + ?Sized>(
        stream: &mut S,
        decoding_options: &DecodingOptions,
    ) -> EncodingResult<Self> {
        let len = read_i32(stream)?;
        if len == -1 {
            Ok(UAString::null())
        } else if len < -1 {
            Err(Error::decoding("string length is negative and invalid"))
        } else if len as usize > decoding_options.max_string_length {
            Err(Error::decoding(format!(
                "string length {} exceeds decoding limit {}",
                len, decoding_options.max_string_length
            )))
        } else {
            let mut buf = vec![0u8; len as usize];
            process_decode_io_result(stream.read_exact(&mut buf))?;
            let s = String::from_utf8(buf).map_err(Error::decoding)?;
            Ok(UAString::from(s))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Context;

    #[test]
    fn round_trip() {
        use crate::BinaryEncodable;
        let ctx = Context::new(crate::DecodingOptions::test());
        let s = UAString::from("hello world");
        let bytes = s.encode_to_vec(&ctx);
        let decoded = UAString::decode(&mut bytes.as_slice(), &ctx).unwrap();
        assert_eq!(s, decoded);
    }

    #[test]
    fn null_string() {
        let s = UAString::null();
        assert!(s.is_null());
        assert_eq!(s.len(), -1);
    }
}
