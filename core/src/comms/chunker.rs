// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Splits an encoded message into one or more wire-ready [`MessageChunk`]s
//! and reassembles a received run of chunks back into a typed message.

use std::io::{Read, Write};

use log::{debug, error, trace};
use opcua_types::{
    BinaryDecodable, BinaryEncodable, Context, EncodingResult, Error, NodeId, ObjectId, StatusCode,
};

use super::message_chunk::{MessageChunk, MessageChunkType, MessageIsFinalType};
use super::secure_channel::SecureChannel;
use crate::Message;

/// Reads sequentially through a run of already-decrypted chunks as if they
/// were one contiguous stream, stepping to the next chunk once the current
/// one is exhausted.
struct ReceiveStream<'a, T> {
    buffer: &'a [u8],
    channel: &'a SecureChannel,
    items: T,
    num_items: usize,
    pos: usize,
    index: usize,
}

impl<'a, T: Iterator<Item = &'a MessageChunk>> ReceiveStream<'a, T> {
    fn new(channel: &'a SecureChannel, mut items: T, num_items: usize) -> Result<Self, Error> {
        let Some(chunk) = items.next() else {
            return Err(Error::new(StatusCode::BadUnexpectedError, "no chunks to decode"));
        };

        let chunk_info = chunk.chunk_info(channel)?;
        let expected_is_final = if num_items == 1 {
            MessageIsFinalType::Final
        } else {
            MessageIsFinalType::Intermediate
        };
        if chunk_info.message_header.is_final != expected_is_final {
            return Err(Error::new(
                StatusCode::BadDecodingError,
                "last chunk not marked as final",
            ));
        }

        let body_start = chunk_info.body_offset;
        let body_end = body_start + chunk_info.body_length;
        Ok(Self {
            buffer: &chunk.data[body_start..body_end],
            channel,
            items,
            pos: 0,
            num_items,
            index: 0,
        })
    }
}

impl<'a, T: Iterator<Item = &'a MessageChunk>> Read for ReceiveStream<'a, T> {
    fn read(&mut self, mut buf: &mut [u8]) -> std::io::Result<usize> {
        if self.buffer.len() == self.pos {
            let Some(chunk) = self.items.next() else {
                return Ok(0);
            };
            self.index += 1;
            let chunk_info = chunk.chunk_info(self.channel)?;
            let expected_is_final = if self.index == self.num_items - 1 {
                MessageIsFinalType::Final
            } else {
                MessageIsFinalType::Intermediate
            };
            if chunk_info.message_header.is_final != expected_is_final {
                return Err(StatusCode::BadDecodingError.into());
            }

            let body_start = chunk_info.body_offset;
            let body_end = body_start + chunk_info.body_length;
            self.buffer = &chunk.data[body_start..body_end];
            self.pos = 0;
        }
        let written = buf.write(&self.buffer[self.pos..])?;
        self.pos += written;
        Ok(written)
    }
}

/// Accumulates written bytes into fixed-size chunk bodies, flushing a
/// [`MessageChunk`] every time one fills.
struct ChunkingStream<'a> {
    secure_channel: &'a SecureChannel,
    chunks: Vec<MessageChunk>,
    expected_chunk_count: usize,
    max_body_per_chunk: usize,
    next_buf: Vec<u8>,
    buf_position: usize,
    is_closed: bool,
    sequence_number: u32,
    request_id: u32,
    message_size: usize,
    message_type: MessageChunkType,
}

impl<'a> ChunkingStream<'a> {
    fn new(
        message_type: MessageChunkType,
        secure_channel: &'a SecureChannel,
        max_chunk_size: usize,
        message_size: usize,
        request_id: u32,
        request_handle: u32,
        sequence_number: u32,
    ) -> Result<Self, Error> {
        let (expected_chunk_count, max_body_per_chunk, next_buf_size) = if max_chunk_size > 0 {
            let max_body_per_chunk =
                MessageChunk::body_size_from_message_size(message_type, secure_channel, max_chunk_size)
                    .map_err(|_| {
                        Error::new(
                            StatusCode::BadTcpInternalError,
                            format!("body_size_from_message_size error for max_chunk_size {max_chunk_size}"),
                        )
                        .with_context(
                            Some(request_id),
                            if request_handle > 0 { Some(request_handle) } else { None },
                        )
                    })?;
            let expected_chunk_count = message_size / max_body_per_chunk + 1;
            let next_buf_size = if expected_chunk_count == 1 {
                message_size
            } else {
                max_body_per_chunk
            };
            (expected_chunk_count, max_body_per_chunk, next_buf_size)
        } else {
            (1, 0, message_size)
        };

        Ok(Self {
            secure_channel,
            chunks: Vec::with_capacity(expected_chunk_count),
            expected_chunk_count,
            max_body_per_chunk,
            next_buf: vec![0; next_buf_size],
            buf_position: 0,
            is_closed: false,
            sequence_number,
            request_id,
            message_type,
            message_size,
        })
    }

    fn flush_chunk(&mut self) -> EncodingResult<()> {
        if self.is_closed {
            return Ok(());
        }

        let buf = std::mem::take(&mut self.next_buf);
        let is_final = if self.chunks.len() == self.expected_chunk_count - 1 {
            self.is_closed = true;
            MessageIsFinalType::Final
        } else {
            MessageIsFinalType::Intermediate
        };

        let chunk = MessageChunk::new(
            self.sequence_number + self.chunks.len() as u32,
            self.request_id,
            self.message_type,
            is_final,
            self.secure_channel,
            &buf,
        )?;
        self.chunks.push(chunk);

        if !self.is_closed {
            let next_buf_size = if self.chunks.len() == self.expected_chunk_count - 1 {
                self.message_size % self.max_body_per_chunk
            } else {
                self.max_body_per_chunk
            };
            self.next_buf = vec![0; next_buf_size];
            self.buf_position = 0;
        }

        Ok(())
    }

    fn finish(self) -> EncodingResult<Vec<MessageChunk>> {
        if !self.is_closed {
            return Err(Error::encoding("message did not encode to the expected size"));
        }
        Ok(self.chunks)
    }
}

impl Write for ChunkingStream<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.is_closed {
            return Ok(0);
        }

        let to_read = buf.len().min(self.next_buf.len() - self.buf_position);
        self.next_buf[self.buf_position..(self.buf_position + to_read)]
            .copy_from_slice(&buf[..to_read]);
        self.buf_position += to_read;
        if self.buf_position == self.next_buf.len() {
            self.flush_chunk()?;
        }

        Ok(to_read)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_chunk()?;
        Ok(())
    }
}

/// Turns messages into chunks for sending, and chunks back into messages
/// on receipt.
pub struct Chunker;

impl Chunker {
    /// Checks that `chunks` form a valid run: channel id consistent,
    /// sequence numbers strictly incrementing from `starting_sequence_number`,
    /// and all chunks sharing one request id. Returns the last sequence
    /// number in the run.
    pub fn validate_chunks(
        starting_sequence_number: u32,
        secure_channel: &SecureChannel,
        chunks: &[MessageChunk],
    ) -> Result<u32, Error> {
        let first_sequence_number = chunks[0].chunk_info(secure_channel)?.sequence_header.sequence_number;
        trace!("received chunk with sequence number {first_sequence_number}");
        if first_sequence_number < starting_sequence_number {
            return Err(Error::new(
                StatusCode::BadSequenceNumberInvalid,
                format!(
                    "first sequence number of {first_sequence_number} is less than last value {starting_sequence_number}"
                ),
            ));
        }

        let secure_channel_id = secure_channel.secure_channel_id();
        let mut expected_request_id: u32 = 0;
        for (i, chunk) in chunks.iter().enumerate() {
            let chunk_info = chunk.chunk_info(secure_channel)?;

            if secure_channel_id != 0 && chunk_info.message_header.secure_channel_id != secure_channel_id {
                return Err(Error::new(
                    StatusCode::BadSecureChannelIdInvalid,
                    format!(
                        "secure channel id {} does not match expected id {secure_channel_id}",
                        chunk_info.message_header.secure_channel_id
                    ),
                ));
            }

            let sequence_number = chunk_info.sequence_header.sequence_number;
            let expected_sequence_number = first_sequence_number + i as u32;
            if sequence_number != expected_sequence_number {
                return Err(Error::new(
                    StatusCode::BadSequenceNumberInvalid,
                    format!(
                        "chunk sequence number {sequence_number} is not the expected value of {expected_sequence_number}, idx {i}"
                    ),
                ));
            }

            if i == 0 {
                expected_request_id = chunk_info.sequence_header.request_id;
            } else if chunk_info.sequence_header.request_id != expected_request_id {
                return Err(Error::new(
                    StatusCode::BadSequenceNumberInvalid,
                    format!(
                        "chunk with sequence number {sequence_number} has request id {} which is not the expected value of {expected_request_id}, idx {i}",
                        chunk_info.sequence_header.request_id
                    ),
                ));
            }
        }
        Ok(first_sequence_number + chunks.len() as u32 - 1)
    }

    /// Encodes `message` and splits it into chunks no larger than
    /// `max_chunk_size` (0 for unlimited), rejecting it outright if it
    /// exceeds `max_message_size` (0 for unlimited).
    pub fn encode(
        sequence_number: u32,
        request_id: u32,
        max_message_size: usize,
        max_chunk_size: usize,
        secure_channel: &SecureChannel,
        message: &impl Message,
    ) -> Result<Vec<MessageChunk>, Error> {
        let ctx_id = Some(request_id);
        let handle = message.request_handle();
        let ctx_handle = if handle > 0 { Some(handle) } else { None };

        let ctx = Context::new(secure_channel.decoding_options());
        let mut message_size = message.byte_len(&ctx);
        if max_message_size > 0 && message_size > max_message_size {
            error!("max message size is {max_message_size} and message {message_size} exceeds that");
            return Err(Error::new(
                StatusCode::BadRequestTooLarge,
                format!("max message size is {max_message_size} and message {message_size} exceeds that"),
            )
            .with_context(ctx_id, ctx_handle));
        }

        let node_id = message.type_id();
        message_size += node_id.byte_len(&ctx);

        let message_type = message.message_type();

        let mut stream = ChunkingStream::new(
            message_type,
            secure_channel,
            max_chunk_size,
            message_size,
            request_id,
            handle,
            sequence_number,
        )?;

        node_id.encode(&mut stream, &ctx)?;
        message
            .encode(&mut stream, &ctx)
            .map_err(|e| e.with_context(ctx_id, ctx_handle))?;

        stream.flush()?;
        stream.finish()
    }

    /// Reassembles `chunks` (already validated and decrypted) into a typed
    /// message, checking its node id against `expected_node_id` if given.
    pub fn decode<T: Message>(
        chunks: &[MessageChunk],
        secure_channel: &SecureChannel,
        expected_node_id: Option<NodeId>,
    ) -> Result<T, Error> {
        for (i, chunk) in chunks.iter().enumerate() {
            let chunk_info = chunk.chunk_info(secure_channel)?;
            let expected_is_final = if i == chunks.len() - 1 {
                MessageIsFinalType::Final
            } else {
                MessageIsFinalType::Intermediate
            };
            if chunk_info.message_header.is_final != expected_is_final {
                return Err(Error::decoding("last message in sequence is not marked as final"));
            }
        }

        let mut stream = ReceiveStream::new(secure_channel, chunks.iter(), chunks.len())?;

        let ctx = Context::new(secure_channel.decoding_options());

        let node_id = NodeId::decode(&mut stream, &ctx)?;
        let object_id = Self::object_id_from_node_id(node_id, expected_node_id)?;

        match T::decode_by_object_id(&mut stream, object_id, &ctx) {
            Ok(decoded) => Ok(decoded),
            Err(err) => {
                debug!("cannot decode message {object_id:?}, err = {err:?}");
                Err(err)
            }
        }
    }

    fn object_id_from_node_id(node_id: NodeId, expected_node_id: Option<NodeId>) -> Result<ObjectId, Error> {
        if let Some(id) = expected_node_id {
            if node_id != id {
                return Err(Error::decoding(format!(
                    "the message id {node_id} is not the expected value {id}"
                )));
            }
        }
        ObjectId::try_from(&node_id)
            .map_err(|_| Error::decoding(format!("the message id {node_id} is not an object id")))
    }
}
