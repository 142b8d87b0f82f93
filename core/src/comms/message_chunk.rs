// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! A message chunk: a message, or part of one, framed with a header,
//! security header, sequence header, and (once secured) padding and a
//! signature. Building and decoding chunks is the lowest level of the
//! secure channel; see [`super::chunker`] for splitting/reassembling whole
//! messages.

use std::io::{Cursor, Read, Write};

use log::{error, trace};
use opcua_types::{
    read_u32, read_u8, write_u32, write_u8, DecodingOptions, EncodingResult, Error,
    SimpleBinaryDecodable, SimpleBinaryEncodable, StatusCode,
};

use super::{
    secure_channel::SecureChannel,
    security_header::{SecurityHeader, SequenceHeader},
    tcp_types::{
        CHUNK_FINAL, CHUNK_FINAL_ERROR, CHUNK_INTERMEDIATE, CHUNK_MESSAGE,
        CLOSE_SECURE_CHANNEL_MESSAGE, MIN_CHUNK_SIZE, OPEN_SECURE_CHANNEL_MESSAGE,
    },
};

/// Size in bytes of a chunk header: 3-byte message type + 1-byte final flag
/// + 4-byte message size + 4-byte secure channel id.
pub const MESSAGE_CHUNK_HEADER_SIZE: usize = 3 + 1 + 4 + 4;
/// Byte offset of the message size field within a chunk header.
pub const MESSAGE_SIZE_OFFSET: usize = 3 + 1;

/// Which kind of secure channel message a chunk belongs to, which in turn
/// decides whether it carries an asymmetric or symmetric security header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageChunkType {
    /// A regular service request/response chunk.
    Message,
    /// An `OpenSecureChannel` request/response chunk.
    OpenSecureChannel,
    /// A `CloseSecureChannel` request chunk.
    CloseSecureChannel,
}

impl MessageChunkType {
    /// `true` for `OpenSecureChannel`.
    pub fn is_open_secure_channel(&self) -> bool {
        *self == MessageChunkType::OpenSecureChannel
    }
}

/// Whether a chunk is the last one making up its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageIsFinalType {
    /// More chunks follow.
    Intermediate,
    /// This is the last chunk.
    Final,
    /// This is the last chunk of an aborted message; the body is an error,
    /// not message content.
    FinalError,
}

/// The fixed-size header at the start of every chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageChunkHeader {
    /// Which message kind this chunk belongs to.
    pub message_type: MessageChunkType,
    /// Whether more chunks follow.
    pub is_final: MessageIsFinalType,
    /// Total size of the chunk, including this header.
    pub message_size: u32,
    /// The secure channel this chunk belongs to.
    pub secure_channel_id: u32,
}

impl SimpleBinaryEncodable for MessageChunkHeader {
    fn byte_len(&self) -> usize {
        MESSAGE_CHUNK_HEADER_SIZE
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S) -> EncodingResult<()> {
        let message_type = match self.message_type {
            MessageChunkType::Message => CHUNK_MESSAGE,
            MessageChunkType::OpenSecureChannel => OPEN_SECURE_CHANNEL_MESSAGE,
            MessageChunkType::CloseSecureChannel => CLOSE_SECURE_CHANNEL_MESSAGE,
        };
        let is_final = match self.is_final {
            MessageIsFinalType::Intermediate => CHUNK_INTERMEDIATE,
            MessageIsFinalType::Final => CHUNK_FINAL,
            MessageIsFinalType::FinalError => CHUNK_FINAL_ERROR,
        };
        stream
            .write_all(message_type)
            .map_err(|e| Error::encoding(e.to_string()))?;
        write_u8(stream, is_final)?;
        write_u32(stream, self.message_size)?;
        write_u32(stream, self.secure_channel_id)
    }
}

impl SimpleBinaryDecodable for MessageChunkHeader {
    fn decode<S: Read + ?Sized>(stream: &mut S, _: &DecodingOptions) -> EncodingResult<Self> {
        let mut message_type_code = [0u8; 3];
        stream
            .read_exact(&mut message_type_code)
            .map_err(|e| Error::decoding(e.to_string()))?;
        let message_type = match &message_type_code as &[u8] {
            CHUNK_MESSAGE => MessageChunkType::Message,
            OPEN_SECURE_CHANNEL_MESSAGE => MessageChunkType::OpenSecureChannel,
            CLOSE_SECURE_CHANNEL_MESSAGE => MessageChunkType::CloseSecureChannel,
            r => return Err(Error::decoding(format!("invalid chunk message type: {r:?}"))),
        };

        let is_final = match read_u8(stream)? {
            CHUNK_FINAL => MessageIsFinalType::Final,
            CHUNK_INTERMEDIATE => MessageIsFinalType::Intermediate,
            CHUNK_FINAL_ERROR => MessageIsFinalType::FinalError,
            r => return Err(Error::decoding(format!("invalid chunk final type: {r}"))),
        };

        let message_size = read_u32(stream)?;
        let secure_channel_id = read_u32(stream)?;

        Ok(MessageChunkHeader {
            message_type,
            is_final,
            message_size,
            secure_channel_id,
        })
    }
}

/// A single chunk of a message: headers, payload, and (once secured)
/// padding and a signature, as a flat byte buffer ready to write to the
/// wire.
#[derive(Debug, Clone)]
pub struct MessageChunk {
    /// The complete encoded chunk.
    pub data: Vec<u8>,
}

impl SimpleBinaryEncodable for MessageChunk {
    fn byte_len(&self) -> usize {
        self.data.len()
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S) -> EncodingResult<()> {
        stream
            .write_all(&self.data)
            .map_err(|e| Error::encoding(format!("error writing message chunk: {e}")))
    }
}

impl SimpleBinaryDecodable for MessageChunk {
    fn decode<S: Read + ?Sized>(
        in_stream: &mut S,
        decoding_options: &DecodingOptions,
    ) -> EncodingResult<Self> {
        let chunk_header = MessageChunkHeader::decode(in_stream, decoding_options).map_err(|e| {
            Error::new(
                StatusCode::BadCommunicationError,
                format!("cannot decode chunk header: {e:?}"),
            )
        })?;

        let message_size = chunk_header.message_size as usize;
        if decoding_options.max_message_size > 0 && message_size > decoding_options.max_message_size
        {
            return Err(Error::new(
                StatusCode::BadTcpMessageTooLarge,
                format!(
                    "message size {message_size} exceeds the maximum of {}",
                    decoding_options.max_message_size
                ),
            ));
        }

        let mut data = vec![0u8; message_size];
        let mut header_stream = Cursor::new(&mut data[..]);
        let chunk_header_size = chunk_header.byte_len();
        chunk_header.encode(&mut header_stream)?;
        in_stream
            .read_exact(&mut data[chunk_header_size..])
            .map_err(|e| Error::decoding(e.to_string()))?;

        Ok(MessageChunk { data })
    }
}

/// The configured chunk size is too small to fit even the headers and
/// minimum padding.
#[derive(Debug)]
pub struct MessageChunkTooSmall;

impl MessageChunk {
    /// Builds a chunk from an already-encoded message body. `secure_channel`
    /// provides the security header and, later, the signing/encryption
    /// applied by [`SecureChannel::apply_security`].
    pub fn new(
        sequence_number: u32,
        request_id: u32,
        message_type: MessageChunkType,
        is_final: MessageIsFinalType,
        secure_channel: &SecureChannel,
        data: &[u8],
    ) -> EncodingResult<MessageChunk> {
        let security_header = secure_channel.make_security_header(message_type);
        let sequence_header = SequenceHeader {
            sequence_number,
            request_id,
        };

        let mut message_size = MESSAGE_CHUNK_HEADER_SIZE;
        message_size += security_header.byte_len();
        message_size += sequence_header.byte_len();
        message_size += data.len();

        trace!(
            "creating a {}-byte chunk, excluding padding/signature",
            message_size
        );

        let chunk_header = MessageChunkHeader {
            message_type,
            is_final,
            message_size: message_size as u32,
            secure_channel_id: secure_channel.secure_channel_id(),
        };

        let mut buf = vec![0u8; message_size];
        let mut stream = Cursor::new(&mut buf[..]);
        chunk_header.encode(&mut stream)?;
        security_header.encode(&mut stream)?;
        sequence_header.encode(&mut stream)?;
        stream.write_all(data)?;

        Ok(MessageChunk { data: buf })
    }

    /// The largest message body that fits in a single chunk of
    /// `max_chunk_size`, once headers, signature, and minimum padding are
    /// accounted for.
    pub fn body_size_from_message_size(
        message_type: MessageChunkType,
        secure_channel: &SecureChannel,
        max_chunk_size: usize,
    ) -> Result<usize, MessageChunkTooSmall> {
        if max_chunk_size < MIN_CHUNK_SIZE {
            error!(
                "chunk size {max_chunk_size} is below the minimum the spec allows ({MIN_CHUNK_SIZE})"
            );
            return Err(MessageChunkTooSmall);
        }

        let security_header = secure_channel.make_security_header(message_type);
        let mut header_size = MESSAGE_CHUNK_HEADER_SIZE;
        header_size += security_header.byte_len();
        header_size += SequenceHeader {
            sequence_number: 0,
            request_id: 0,
        }
        .byte_len();

        let signature_size = secure_channel.signature_size(&security_header);
        let (plain_text_block_size, minimum_padding) =
            secure_channel.get_padding_block_sizes(&security_header, signature_size, message_type);

        let aligned_max_chunk_size = if plain_text_block_size > 0 {
            max_chunk_size - (max_chunk_size % plain_text_block_size)
        } else {
            max_chunk_size
        };

        Ok(aligned_max_chunk_size - header_size - signature_size - minimum_padding)
    }

    /// Decodes just the fixed-size chunk header.
    pub fn message_header(
        &self,
        decoding_options: &DecodingOptions,
    ) -> EncodingResult<MessageChunkHeader> {
        let mut stream = Cursor::new(&self.data);
        MessageChunkHeader::decode(&mut stream, decoding_options)
    }

    /// `true` if this chunk's header marks it as `OpenSecureChannel`.
    pub fn is_open_secure_channel(&self, decoding_options: &DecodingOptions) -> bool {
        self.message_header(decoding_options)
            .map(|h| h.message_type.is_open_secure_channel())
            .unwrap_or(false)
    }

    /// Decodes the headers preceding the chunk body, returning their
    /// offsets within `data`. Must be called only after the chunk has been
    /// decrypted, or the offsets (and sequence header) will be garbage.
    pub fn chunk_info(&self, secure_channel: &SecureChannel) -> EncodingResult<ChunkInfo> {
        ChunkInfo::new(self, secure_channel)
    }
}

/// The headers preceding a chunk's body, and the byte offsets they were
/// read from, gathered in one pass so callers don't re-decode them
/// repeatedly.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkInfo {
    /// The fixed-size chunk header.
    pub message_header: MessageChunkHeader,
    /// The asymmetric or symmetric security header.
    pub security_header: SecurityHeader,
    /// The sequence/request-id header.
    pub sequence_header: SequenceHeader,
    /// Byte offset of the security header.
    pub security_header_offset: usize,
    /// Byte offset of the sequence header.
    pub sequence_header_offset: usize,
    /// Byte offset of the message body.
    pub body_offset: usize,
    /// Length in bytes of the message body.
    pub body_length: usize,
}

impl ChunkInfo {
    /// Reads the chunk's headers, in order, recording their offsets.
    pub fn new(chunk: &MessageChunk, secure_channel: &SecureChannel) -> EncodingResult<ChunkInfo> {
        let mut stream = Cursor::new(&chunk.data);
        let decoding_options = secure_channel.decoding_options();

        let message_header = MessageChunkHeader::decode(&mut stream, &decoding_options)?;

        let security_header_offset = stream.position() as usize;
        let security_header = SecurityHeader::decode_from_stream(
            &mut stream,
            message_header.message_type.is_open_secure_channel(),
            &decoding_options,
        )?;

        let sequence_header_offset = stream.position() as usize;
        let sequence_header = SequenceHeader::decode(&mut stream, &decoding_options)?;

        let body_offset = stream.position() as usize;
        let body_length = chunk.data.len() - body_offset;

        Ok(ChunkInfo {
            message_header,
            security_header,
            sequence_header,
            security_header_offset,
            sequence_header_offset,
            body_offset,
            body_length,
        })
    }
}
