// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! `Guid`, a 16-byte globally unique identifier.

use std::{fmt, str::FromStr};

use uuid::Uuid;

use crate::encoding::{process_decode_io_result, process_encode_io_result, EncodingResult};
use crate::{DecodingOptions, SimpleBinaryDecodable, SimpleBinaryEncodable, UaNullable};

/// A 16-byte globally unique identifier.
#[derive(Eq, PartialEq, Clone, Hash)]
pub struct Guid {
    uuid: Uuid,
}

impl UaNullable for Guid {
    fn is_ua_null(&self) -> bool {
        self.uuid.is_nil()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.uuid)
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uuid.hyphenated())
    }
}

impl Default for Guid {
    fn default() -> Self {
        Guid::null()
    }
}

impl From<Uuid> for Guid {
    fn from(uuid: Uuid) -> Self {
        Self { uuid }
    }
}

impl FromStr for Guid {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::from_str(s).map(|uuid| Guid { uuid })
    }
}

impl Guid {
    /// The nil guid, `00000000-0000-0000-0000-000000000000`.
    pub fn null() -> Guid {
        Guid { uuid: Uuid::nil() }
    }

    /// A randomly generated guid.
    pub fn new() -> Guid {
        Guid {
            uuid: Uuid::new_v4(),
        }
    }

    /// The raw 16 bytes of the guid.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.uuid.as_bytes()
    }

    /// Construct a guid from its raw bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Guid {
        Guid {
            uuid: Uuid::from_bytes(bytes),
        }
    }
}

impl SimpleBinaryEncodable for Guid {
    fn byte_len(&self) -> usize {
        16
    }

    fn encode<S: std::io::Write + ?Sized>(&self, stream: &mut S) -> EncodingResult<()> {
        process_encode_io_result(stream.write_all(self.uuid.as_bytes()))
    }
}

impl SimpleBinaryDecodable for Guid {
    fn decode<S: std::io::Read + ?Sized>(
        stream: &mut S,
        _decoding_options: &DecodingOptions,
    ) -> EncodingResult<Self> {
        let mut bytes = [0u8; 16];
        process_decode_io_result(stream.read_exact(&mut bytes))?;
        Ok(Guid {
            uuid: Uuid::from_bytes(bytes),
        })
    }
}
