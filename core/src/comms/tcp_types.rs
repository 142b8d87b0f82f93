// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! The UACP transport handshake: `Hello`/`Acknowledge`/`Error` messages and
//! the raw chunk-type byte markers every message (handshake or secure
//! channel) is framed with.

use std::io::{Read, Write};

use opcua_types::{
    read_u32, write_u32, DecodingOptions, EncodingResult, SimpleBinaryDecodable,
    SimpleBinaryEncodable, StatusCode, UAString,
};

/// First three bytes of a `Hello` message.
pub const HELLO_MESSAGE: &[u8] = b"HEL";
/// First three bytes of an `Acknowledge` message.
pub const ACKNOWLEDGE_MESSAGE: &[u8] = b"ACK";
/// First three bytes of an `Error` message.
pub const ERROR_MESSAGE: &[u8] = b"ERR";
/// First three bytes of a regular secure channel message chunk.
pub const CHUNK_MESSAGE: &[u8] = b"MSG";
/// First three bytes of an `OpenSecureChannel` chunk.
pub const OPEN_SECURE_CHANNEL_MESSAGE: &[u8] = b"OPN";
/// First three bytes of a `CloseSecureChannel` chunk.
pub const CLOSE_SECURE_CHANNEL_MESSAGE: &[u8] = b"CLO";

/// Fourth byte of a chunk marking it as an intermediate chunk in a
/// multi-chunk message.
pub const CHUNK_INTERMEDIATE: u8 = b'C';
/// Fourth byte of a chunk marking it as the final chunk of a message.
pub const CHUNK_FINAL: u8 = b'F';
/// Fourth byte of a chunk marking an aborted message.
pub const CHUNK_FINAL_ERROR: u8 = b'A';

/// Smallest chunk size the transport permits negotiating down to.
pub const MIN_CHUNK_SIZE: usize = opcua_types::constants::MIN_CHUNK_SIZE;

/// The `Hello` message a client sends immediately after connecting,
/// proposing buffer and chunk limits and naming the endpoint it wants.
#[derive(Debug, Clone, PartialEq)]
pub struct HelloMessage {
    /// Requested protocol version, always 0 for the current revision.
    pub protocol_version: u32,
    /// Buffer size the client is prepared to receive into.
    pub receive_buffer_size: u32,
    /// Buffer size the client is prepared to send from.
    pub send_buffer_size: u32,
    /// Largest complete message the client will assemble, 0 for no limit.
    pub max_message_size: u32,
    /// Largest number of chunks the client will assemble a message from, 0
    /// for no limit.
    pub max_chunk_count: u32,
    /// The endpoint URL the client is connecting to.
    pub endpoint_url: UAString,
}

impl SimpleBinaryEncodable for HelloMessage {
    fn byte_len(&self) -> usize {
        4 + 4 + 4 + 4 + 4 + self.endpoint_url.byte_len()
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S) -> EncodingResult<()> {
        write_u32(stream, self.protocol_version)?;
        write_u32(stream, self.receive_buffer_size)?;
        write_u32(stream, self.send_buffer_size)?;
        write_u32(stream, self.max_message_size)?;
        write_u32(stream, self.max_chunk_count)?;
        self.endpoint_url.encode(stream)
    }
}

impl SimpleBinaryDecodable for HelloMessage {
    fn decode<S: Read + ?Sized>(
        stream: &mut S,
        decoding_options: &DecodingOptions,
    ) -> EncodingResult<Self> {
        Ok(HelloMessage {
            protocol_version: read_u32(stream)?,
            receive_buffer_size: read_u32(stream)?,
            send_buffer_size: read_u32(stream)?,
            max_message_size: read_u32(stream)?,
            max_chunk_count: read_u32(stream)?,
            endpoint_url: UAString::decode(stream, decoding_options)?,
        })
    }
}

/// The `Acknowledge` message the server replies with, settling on the
/// buffer and chunk limits both ends will honor for this connection.
#[derive(Debug, Clone, PartialEq)]
pub struct AcknowledgeMessage {
    /// Protocol version the server supports.
    pub protocol_version: u32,
    /// Buffer size the server will receive into.
    pub receive_buffer_size: u32,
    /// Buffer size the server will send from.
    pub send_buffer_size: u32,
    /// Largest complete message the server will assemble, 0 for no limit.
    pub max_message_size: u32,
    /// Largest number of chunks the server will assemble a message from, 0
    /// for no limit.
    pub max_chunk_count: u32,
}

impl SimpleBinaryEncodable for AcknowledgeMessage {
    fn byte_len(&self) -> usize {
        4 + 4 + 4 + 4 + 4
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S) -> EncodingResult<()> {
        write_u32(stream, self.protocol_version)?;
        write_u32(stream, self.receive_buffer_size)?;
        write_u32(stream, self.send_buffer_size)?;
        write_u32(stream, self.max_message_size)?;
        write_u32(stream, self.max_chunk_count)
    }
}

impl SimpleBinaryDecodable for AcknowledgeMessage {
    fn decode<S: Read + ?Sized>(stream: &mut S, _: &DecodingOptions) -> EncodingResult<Self> {
        Ok(AcknowledgeMessage {
            protocol_version: read_u32(stream)?,
            receive_buffer_size: read_u32(stream)?,
            send_buffer_size: read_u32(stream)?,
            max_message_size: read_u32(stream)?,
            max_chunk_count: read_u32(stream)?,
        })
    }
}

/// The `Error` message either end may send to reject the handshake, e.g.
/// when the endpoint URL is unknown or the proposed limits are
/// unacceptable.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorMessage {
    /// The status code describing the failure.
    pub error: StatusCode,
    /// A human-readable explanation, not guaranteed to be present.
    pub reason: UAString,
}

impl SimpleBinaryEncodable for ErrorMessage {
    fn byte_len(&self) -> usize {
        4 + self.reason.byte_len()
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S) -> EncodingResult<()> {
        write_u32(stream, self.error.bits())?;
        self.reason.encode(stream)
    }
}

impl SimpleBinaryDecodable for ErrorMessage {
    fn decode<S: Read + ?Sized>(
        stream: &mut S,
        decoding_options: &DecodingOptions,
    ) -> EncodingResult<Self> {
        let error = StatusCode::from_bits(read_u32(stream)?);
        let reason = UAString::decode(stream, decoding_options)?;
        Ok(ErrorMessage { error, reason })
    }
}

impl ErrorMessage {
    /// Builds an error message from a status code and a plain-text reason.
    pub fn from_status(status: StatusCode, reason: &str) -> ErrorMessage {
        ErrorMessage {
            error: status,
            reason: UAString::from(reason),
        }
    }
}
