// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! The raw byte-level transport: the UACP `Hello`/`Acknowledge` handshake,
//! and reading/writing secured message chunks over a TCP stream.
//!
//! This layer knows nothing about sequence numbers, request/response
//! correlation, or the secure channel state machine — see
//! [`crate::secure_channel`] for that. It only frames and unframes bytes.

use std::io;

use log::{debug, error, trace};
use opcua_core::comms::{
    message_chunk::{MessageChunkHeader, MESSAGE_CHUNK_HEADER_SIZE, MESSAGE_SIZE_OFFSET},
    tcp_types::{AcknowledgeMessage, ErrorMessage, HelloMessage},
    url::hostname_port_from_url,
};
use opcua_types::{
    constants::DEFAULT_OPC_UA_SERVER_PORT, DecodingOptions, SimpleBinaryDecodable,
    SimpleBinaryEncodable, StatusCode,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt, BufReader, BufWriter},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
};

/// Buffer sizes and limits advertised in the `Hello` handshake.
#[derive(Debug, Clone)]
pub struct TransportConfiguration {
    /// Size of this client's send buffer, advertised to the server.
    pub send_buffer_size: u32,
    /// Size of this client's receive buffer, advertised to the server.
    pub receive_buffer_size: u32,
    /// Largest complete message this client will assemble.
    pub max_message_size: u32,
    /// Largest number of chunks making up a single message.
    pub max_chunk_count: u32,
}

impl Default for TransportConfiguration {
    fn default() -> Self {
        Self {
            send_buffer_size: 65_535,
            receive_buffer_size: 65_535,
            max_message_size: 2_097_152,
            max_chunk_count: 64,
        }
    }
}

/// An established, unsecured TCP connection to an OPC UA server: the
/// `Hello`/`Acknowledge` exchange has completed, and the stream is ready to
/// carry secure channel chunks.
pub struct TcpTransport {
    read: BufReader<OwnedReadHalf>,
    write: BufWriter<OwnedWriteHalf>,
    /// Limits the server told us to respect, from its `Acknowledge`.
    pub server_limits: AcknowledgeMessage,
}

impl TcpTransport {
    /// Connects to `endpoint_url` and performs the `Hello`/`Acknowledge`
    /// handshake.
    pub async fn connect(
        endpoint_url: &str,
        config: &TransportConfiguration,
    ) -> Result<Self, StatusCode> {
        let (host, port) =
            hostname_port_from_url(endpoint_url, DEFAULT_OPC_UA_SERVER_PORT)?;
        let addr = format!("{host}:{port}");
        debug!("connecting to {addr} ({endpoint_url})");
        let stream = TcpStream::connect(&addr).await.map_err(|e| {
            error!("could not connect to {addr}: {e}");
            StatusCode::BadCommunicationError
        })?;
        stream.set_nodelay(true).ok();
        let (read_half, write_half) = stream.into_split();
        let mut read = BufReader::new(read_half);
        let mut write = BufWriter::new(write_half);

        let hello = HelloMessage {
            protocol_version: 0,
            receive_buffer_size: config.receive_buffer_size,
            send_buffer_size: config.send_buffer_size,
            max_message_size: config.max_message_size,
            max_chunk_count: config.max_chunk_count,
            endpoint_url: endpoint_url.into(),
        };
        write_hello_frame(&mut write, &hello).await.map_err(|e| {
            error!("failed to send hello: {e}");
            StatusCode::BadCommunicationError
        })?;

        let server_limits = read_acknowledge_frame(&mut read).await?;
        trace!("received acknowledge: {server_limits:?}");

        Ok(Self {
            read,
            write,
            server_limits,
        })
    }

    /// Writes one already-secured chunk (header, security header, sequence
    /// header, body, padding, and signature) to the wire.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), StatusCode> {
        self.write.write_all(chunk).await.map_err(|e| {
            error!("write failed: {e}");
            StatusCode::BadCommunicationError
        })?;
        self.write.flush().await.map_err(|e| {
            error!("flush failed: {e}");
            StatusCode::BadCommunicationError
        })?;
        Ok(())
    }

    /// Reads one raw, still-secured chunk from the wire: a full
    /// `MessageChunkHeader`-prefixed frame, whatever its message type.
    pub async fn read_chunk(&mut self, decoding_options: &DecodingOptions) -> Result<Vec<u8>, StatusCode> {
        let mut header_bytes = [0u8; MESSAGE_CHUNK_HEADER_SIZE];
        self.read.read_exact(&mut header_bytes).await.map_err(|e| {
            error!("read failed: {e}");
            StatusCode::BadConnectionClosed
        })?;
        let header = MessageChunkHeader::decode(&mut &header_bytes[..], decoding_options)
            .map_err(|e| {
                error!("invalid chunk header: {e}");
                StatusCode::BadTcpMessageTypeInvalid
            })?;
        let message_size = header.message_size as usize;
        if decoding_options.max_message_size > 0 && message_size > decoding_options.max_message_size {
            return Err(StatusCode::BadTcpMessageTooLarge);
        }
        let mut data = vec![0u8; message_size];
        data[..MESSAGE_CHUNK_HEADER_SIZE].copy_from_slice(&header_bytes);
        self.read
            .read_exact(&mut data[MESSAGE_CHUNK_HEADER_SIZE..])
            .await
            .map_err(|e| {
                error!("read failed: {e}");
                StatusCode::BadConnectionClosed
            })?;
        Ok(data)
    }

    /// Sends a `CloseSecureChannel` chunk and shuts the write half down.
    pub async fn shutdown(&mut self) {
        self.write.shutdown().await.ok();
    }

    /// Splits the transport into independently owned read and write halves,
    /// so a reader task can run concurrently with writers.
    pub fn into_split(self) -> (TcpTransportReader, TcpTransportWriter) {
        (
            TcpTransportReader { read: self.read },
            TcpTransportWriter { write: self.write },
        )
    }
}

/// The read half of a [`TcpTransport`], after splitting.
pub struct TcpTransportReader {
    read: BufReader<OwnedReadHalf>,
}

impl TcpTransportReader {
    /// Reads one raw, still-secured chunk from the wire.
    pub async fn read_chunk(&mut self, decoding_options: &DecodingOptions) -> Result<Vec<u8>, StatusCode> {
        let mut header_bytes = [0u8; MESSAGE_CHUNK_HEADER_SIZE];
        self.read.read_exact(&mut header_bytes).await.map_err(|e| {
            error!("read failed: {e}");
            StatusCode::BadConnectionClosed
        })?;
        let header = MessageChunkHeader::decode(&mut &header_bytes[..], decoding_options).map_err(|e| {
            error!("invalid chunk header: {e}");
            StatusCode::BadTcpMessageTypeInvalid
        })?;
        let message_size = header.message_size as usize;
        if decoding_options.max_message_size > 0 && message_size > decoding_options.max_message_size {
            return Err(StatusCode::BadTcpMessageTooLarge);
        }
        let mut data = vec![0u8; message_size];
        data[..MESSAGE_CHUNK_HEADER_SIZE].copy_from_slice(&header_bytes);
        self.read
            .read_exact(&mut data[MESSAGE_CHUNK_HEADER_SIZE..])
            .await
            .map_err(|e| {
                error!("read failed: {e}");
                StatusCode::BadConnectionClosed
            })?;
        Ok(data)
    }
}

/// The write half of a [`TcpTransport`], after splitting.
pub struct TcpTransportWriter {
    write: BufWriter<OwnedWriteHalf>,
}

impl TcpTransportWriter {
    /// Writes one already-secured chunk to the wire.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), StatusCode> {
        self.write.write_all(chunk).await.map_err(|e| {
            error!("write failed: {e}");
            StatusCode::BadCommunicationError
        })?;
        self.write.flush().await.map_err(|e| {
            error!("flush failed: {e}");
            StatusCode::BadCommunicationError
        })?;
        Ok(())
    }

    /// Shuts the write half down after the final `CloseSecureChannel` chunk.
    pub async fn shutdown(&mut self) {
        self.write.shutdown().await.ok();
    }
}

async fn write_hello_frame(
    write: &mut (impl tokio::io::AsyncWrite + Unpin),
    hello: &HelloMessage,
) -> io::Result<()> {
    let body = hello.encode_to_vec();
    write_uacp_frame(write, opcua_core::comms::tcp_types::HELLO_MESSAGE, &body).await
}

async fn read_acknowledge_frame(
    read: &mut (impl tokio::io::AsyncRead + Unpin),
) -> Result<AcknowledgeMessage, StatusCode> {
    let (kind, body) = read_uacp_frame(read).await.map_err(|e| {
        error!("failed to read acknowledge: {e}");
        StatusCode::BadConnectionClosed
    })?;
    if kind == opcua_core::comms::tcp_types::ERROR_MESSAGE {
        let decoding_options = DecodingOptions::default();
        let err = ErrorMessage::decode(&mut &body[..], &decoding_options)
            .map_err(|_| StatusCode::BadConnectionClosed)?;
        error!("server rejected hello: {} ({:?})", err.error, err.reason);
        return Err(err.error);
    }
    if kind != opcua_core::comms::tcp_types::ACKNOWLEDGE_MESSAGE {
        error!("expected ACK, got message type {kind:?}");
        return Err(StatusCode::BadConnectionClosed);
    }
    let decoding_options = DecodingOptions::default();
    AcknowledgeMessage::decode(&mut &body[..], &decoding_options)
        .map_err(|_| StatusCode::BadConnectionClosed)
}

/// Writes a `Hello`/`Acknowledge`/`Error` frame: an 8-byte header (3-byte
/// message type, 1-byte `'F'`, 4-byte total size) followed by the body.
/// These three message types have no secure channel id, unlike the 12-byte
/// header used once a secure channel is open.
async fn write_uacp_frame(
    write: &mut (impl tokio::io::AsyncWrite + Unpin),
    kind: &[u8; 3],
    body: &[u8],
) -> io::Result<()> {
    let mut frame = Vec::with_capacity(8 + body.len());
    frame.extend_from_slice(kind);
    frame.push(opcua_core::comms::tcp_types::CHUNK_FINAL);
    let total_size = (8 + body.len()) as u32;
    frame.extend_from_slice(&total_size.to_le_bytes());
    frame.extend_from_slice(body);
    write.write_all(&frame).await?;
    write.flush().await
}

async fn read_uacp_frame(
    read: &mut (impl tokio::io::AsyncRead + Unpin),
) -> io::Result<([u8; 3], Vec<u8>)> {
    let mut header = [0u8; 8];
    read.read_exact(&mut header).await?;
    let mut kind = [0u8; 3];
    kind.copy_from_slice(&header[..3]);
    let total_size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
    let mut body = vec![0u8; total_size.saturating_sub(8)];
    read.read_exact(&mut body).await?;
    Ok((kind, body))
}

/// Reads the 4-byte little-endian `message_size` patched in at
/// [`MESSAGE_SIZE_OFFSET`] after security has been applied to a chunk, used
/// by the secure channel layer to fix up a chunk once its final length
/// (including padding and signature) is known.
pub fn patch_message_size(chunk: &mut [u8], message_size: u32) {
    chunk[MESSAGE_SIZE_OFFSET..MESSAGE_SIZE_OFFSET + 4].copy_from_slice(&message_size.to_le_bytes());
}
