// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! The async secure channel: owns the TCP transport and the
//! request/sequence-number bookkeeping, and turns `apply_security`/
//! `verify_and_remove_security` plus the chunker into a simple
//! request/response API.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU32, Ordering},
        Arc,
    },
    time::Duration,
};

use opcua_core::{
    comms::{
        chunker::Chunker,
        message_chunk::{MessageChunk, MessageChunkType, MessageIsFinalType},
        secure_channel::SecureChannel,
    },
    handle::Handle,
    sync::{Mutex, RwLock},
    RequestMessage, ResponseMessage,
};
use opcua_crypto::{PrivateKey, SecurityPolicy, X509};
use opcua_types::{
    service_types::{
        ChannelSecurityToken, CloseSecureChannelRequest, OpenSecureChannelRequest,
        OpenSecureChannelResponse,
    },
    ByteString, MessageSecurityMode, RequestHeader, SecurityTokenRequestType, StatusCode,
};
use tokio::sync::oneshot;

use crate::{
    channel_debug, channel_trace, channel_warn,
    transport::{patch_message_size, TcpTransport, TcpTransportReader, TcpTransportWriter, TransportConfiguration},
};

type PendingTable = Arc<Mutex<HashMap<u32, oneshot::Sender<Result<ResponseMessage, StatusCode>>>>>;

/// Lifecycle state of an [`AsyncSecureChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Not connected.
    Closed,
    /// TCP connected, `OpenSecureChannel` in flight.
    Opening,
    /// Channel established and usable.
    Open,
    /// A fresh security token is being negotiated; the old one is still
    /// valid until it arrives.
    Renewing,
    /// `CloseSecureChannel` in flight or TCP shutting down.
    Closing,
}

/// An open, securable connection to one OPC UA server endpoint: the async
/// counterpart to [`opcua_core::comms::secure_channel::SecureChannel`],
/// adding the transport, request correlation, and sequence numbering that
/// the synchronous core type leaves to its caller.
pub struct AsyncSecureChannel {
    channel: Arc<RwLock<SecureChannel>>,
    writer: Mutex<TcpTransportWriter>,
    pending: PendingTable,
    sequence_number: AtomicU32,
    request_handle: Handle,
    max_chunk_size: usize,
    max_message_size: usize,
    state: Mutex<ChannelState>,
    closed: AtomicBool,
    /// The `requestedLifetime` last sent with `Issue`/`Renew`, reused by
    /// the renewal loop so a renewed token keeps asking for the same
    /// lifetime the caller originally requested.
    requested_lifetime: AtomicU32,
}

impl AsyncSecureChannel {
    /// Connects to `endpoint_url`, performs the UACP handshake, and returns
    /// a channel ready to have `open` called on it. Spawns the background
    /// reader task that demultiplexes incoming responses to pending
    /// requests, and the background task that renews the security token
    /// once it nears expiry.
    ///
    /// `client_identity` is this client's own application instance
    /// certificate and private key, required to sign/encrypt the
    /// asymmetric `OpenSecureChannel` exchange for any policy other than
    /// `None`. `server_certificate` is the chosen endpoint's certificate,
    /// used to encrypt to the server and verify its responses.
    pub async fn connect(
        endpoint_url: &str,
        security_policy: SecurityPolicy,
        security_mode: MessageSecurityMode,
        decoding_options: opcua_types::DecodingOptions,
        client_identity: Option<(X509, PrivateKey)>,
        server_certificate: Option<X509>,
    ) -> Result<Arc<Self>, StatusCode> {
        let transport_config = TransportConfiguration::default();
        let transport = TcpTransport::connect(endpoint_url, &transport_config).await?;
        let max_chunk_size = transport.server_limits.send_buffer_size as usize;
        let max_message_size = transport.server_limits.max_message_size as usize;
        let (reader, writer) = transport.into_split();

        let mut inner = SecureChannel::new(decoding_options);
        inner.set_security_policy(security_policy);
        inner.set_security_mode(security_mode);
        if let Some((cert, key)) = client_identity {
            inner.set_cert(Some(cert));
            inner.set_private_key(Some(key));
        }
        if let Some(server_certificate) = server_certificate {
            inner.set_remote_cert(Some(server_certificate));
        }
        let channel = Arc::new(RwLock::new(inner));

        let pending: PendingTable = Arc::new(Mutex::new(HashMap::new()));

        let this = Arc::new(Self {
            channel: channel.clone(),
            writer: Mutex::new(writer),
            pending: pending.clone(),
            sequence_number: AtomicU32::new(1),
            request_handle: Handle::new(1),
            max_chunk_size,
            max_message_size,
            state: Mutex::new(ChannelState::Closed),
            closed: AtomicBool::new(false),
            requested_lifetime: AtomicU32::new(0),
        });

        spawn_reader(reader, channel, pending, this.clone());
        spawn_renewal(this.clone());

        Ok(this)
    }

    /// The current secure channel id, for log tagging.
    pub fn channel_id(&self) -> u32 {
        self.channel.read().secure_channel_id()
    }

    /// True once `close` has been called or the connection was lost.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Opens the secure channel: sends `OpenSecureChannelRequest` with
    /// `Issue`, derives symmetric keys from the returned nonces if a
    /// security policy other than `None` is in use.
    pub async fn open(&self, requested_lifetime: u32) -> Result<(), StatusCode> {
        self.requested_lifetime.store(requested_lifetime, Ordering::SeqCst);
        *self.state.lock() = ChannelState::Opening;
        let local_nonce = {
            let mut channel = self.channel.write();
            if channel.security_policy().is_none() {
                ByteString::null()
            } else {
                channel.create_random_nonce()
            }
        };

        let request = OpenSecureChannelRequest {
            request_header: RequestHeader::new(
                &opcua_types::NodeId::null(),
                self.request_handle.next(),
                10_000,
            ),
            client_protocol_version: 0,
            request_type: SecurityTokenRequestType::Issue,
            security_mode: self.channel.read().security_mode(),
            client_nonce: local_nonce,
            requested_lifetime,
        };

        let response = self.send_request(request.into(), MessageChunkType::OpenSecureChannel).await?;
        let ResponseMessage::OpenSecureChannel(response) = response else {
            return Err(StatusCode::BadUnexpectedError);
        };
        self.apply_open_response(*response)?;
        *self.state.lock() = ChannelState::Open;
        channel_debug!(self, "secure channel opened");
        Ok(())
    }

    /// Renews the channel's security token before it expires, keeping the
    /// channel id but issuing a new token id and deriving fresh keys.
    pub async fn renew(&self) -> Result<(), StatusCode> {
        *self.state.lock() = ChannelState::Renewing;
        let local_nonce = {
            let mut channel = self.channel.write();
            if channel.security_policy().is_none() {
                ByteString::null()
            } else {
                channel.create_random_nonce()
            }
        };
        let request = OpenSecureChannelRequest {
            request_header: RequestHeader::new(
                &opcua_types::NodeId::null(),
                self.request_handle.next(),
                10_000,
            ),
            client_protocol_version: 0,
            request_type: SecurityTokenRequestType::Renew,
            security_mode: self.channel.read().security_mode(),
            client_nonce: local_nonce,
            requested_lifetime: self.requested_lifetime.load(Ordering::SeqCst),
        };
        let response = self.send_request(request.into(), MessageChunkType::OpenSecureChannel).await?;
        let ResponseMessage::OpenSecureChannel(response) = response else {
            return Err(StatusCode::BadUnexpectedError);
        };
        self.apply_open_response(*response)?;
        *self.state.lock() = ChannelState::Open;
        channel_debug!(self, "secure channel renewed");
        Ok(())
    }

    fn apply_open_response(&self, response: OpenSecureChannelResponse) -> Result<(), StatusCode> {
        response.response_header.service_result.check_good()?;
        let token = response.security_token;
        let mut channel = self.channel.write();
        channel.set_secure_channel_id(token.channel_id);
        channel.set_security_token(&ChannelSecurityToken {
            channel_id: token.channel_id,
            token_id: token.token_id,
            created_at: token.created_at,
            revised_lifetime: token.revised_lifetime,
        });
        channel.set_remote_nonce_from_byte_string(&response.server_nonce)
            .map_err(|_| StatusCode::BadNonceInvalid)?;
        if !channel.security_policy().is_none() {
            channel.derive_keys().map_err(|_| StatusCode::BadSecurityChecksFailed)?;
        }
        Ok(())
    }

    /// True if the server-reported token is within 25% of its lifetime, the
    /// point at which it should be proactively renewed.
    pub fn should_renew_security_token(&self) -> bool {
        self.channel.read().should_renew_security_token()
    }

    /// Sends `CloseSecureChannelRequest` and shuts the underlying TCP
    /// connection down. Idempotent.
    pub async fn close(&self) -> Result<(), StatusCode> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        *self.state.lock() = ChannelState::Closing;
        let request = CloseSecureChannelRequest {
            request_header: RequestHeader::new(&opcua_types::NodeId::null(), self.request_handle.next(), 10_000),
        };
        // The server doesn't respond to CloseSecureChannel; fire and forget.
        let _ = self.encode_and_send(request.into(), MessageChunkType::CloseSecureChannel, None).await;
        self.writer.lock().shutdown().await;
        *self.state.lock() = ChannelState::Closed;
        channel_debug!(self, "secure channel closed");
        Ok(())
    }

    /// Sends a request and awaits its matching response.
    pub async fn send_request(
        &self,
        request: RequestMessage,
        message_type: MessageChunkType,
    ) -> Result<ResponseMessage, StatusCode> {
        let (tx, rx) = oneshot::channel();
        self.encode_and_send(request, message_type, Some(tx)).await?;
        rx.await.map_err(|_| StatusCode::BadConnectionClosed)?
    }

    async fn encode_and_send(
        &self,
        request: RequestMessage,
        message_type: MessageChunkType,
        reply_to: Option<oneshot::Sender<Result<ResponseMessage, StatusCode>>>,
    ) -> Result<(), StatusCode> {
        let request_id = self.request_handle.next();

        if let Some(tx) = reply_to {
            self.pending.lock().insert(request_id, tx);
        }

        // The sequence number must be assigned in the same critical section
        // that writes to the wire, or two concurrent callers can race and
        // emit a higher sequence number before a lower one.
        let mut writer = self.writer.lock();
        let sequence_number = self.sequence_number.fetch_add(1, Ordering::SeqCst);

        let chunks = {
            let channel = self.channel.read();
            Chunker::encode(
                sequence_number,
                request_id,
                self.max_message_size,
                self.max_chunk_size,
                &channel,
                &request,
            )
            .map_err(|e| {
                channel_warn!(self, "failed to encode request: {}", e);
                self.pending.lock().remove(&request_id);
                e.status()
            })?
        };

        for chunk in chunks {
            let secured = {
                let channel = self.channel.read();
                channel
                    .apply_security(message_type, &chunk.data)
                    .map_err(|e| {
                        channel_warn!(self, "failed to secure chunk: {}", e);
                        e.status()
                    })?
            };
            let mut secured = secured;
            patch_message_size(&mut secured, secured.len() as u32);
            channel_trace!(self, "writing {} byte chunk for request {}", secured.len(), request_id);
            writer.write_chunk(&secured).await?;
        }
        Ok(())
    }
}

fn spawn_reader(
    mut reader: TcpTransportReader,
    channel: Arc<RwLock<SecureChannel>>,
    pending: PendingTable,
    owner: Arc<AsyncSecureChannel>,
) {
    tokio::spawn(async move {
        let mut partial: HashMap<u32, Vec<MessageChunk>> = HashMap::new();
        loop {
            let decoding_options = channel.read().decoding_options();
            let secured = match reader.read_chunk(&decoding_options).await {
                Ok(data) => data,
                Err(status) => {
                    fail_all_pending(&pending, status);
                    owner.closed.store(true, Ordering::Release);
                    break;
                }
            };

            let message_type = match opcua_core::comms::message_chunk::MessageChunkHeader::decode(
                &mut &secured[..12],
                &decoding_options,
            ) {
                Ok(header) => header.message_type,
                Err(_) => {
                    fail_all_pending(&pending, StatusCode::BadTcpMessageTypeInvalid);
                    break;
                }
            };

            let plain = {
                let channel = channel.read();
                match channel.verify_and_remove_security(message_type, &secured) {
                    Ok(plain) => plain,
                    Err(e) => {
                        log::warn!("failed to verify chunk: {e}");
                        fail_all_pending(&pending, e.status());
                        break;
                    }
                }
            };

            let chunk = MessageChunk { data: plain };
            let (request_id, is_final) = {
                let channel = channel.read();
                match chunk.chunk_info(&channel) {
                    Ok(info) => (
                        info.sequence_header.request_id,
                        info.message_header.is_final,
                    ),
                    Err(_) => {
                        fail_all_pending(&pending, StatusCode::BadDecodingError);
                        break;
                    }
                }
            };

            let chunks = partial.entry(request_id).or_default();
            chunks.push(chunk);
            if is_final != MessageIsFinalType::Final {
                continue;
            }
            let chunks = partial.remove(&request_id).unwrap_or_default();

            let decoded = {
                let channel = channel.read();
                Chunker::decode::<ResponseMessage>(&chunks, &channel, None)
            };

            let Some(tx) = pending.lock().remove(&request_id) else {
                log::trace!("no pending request for request id {request_id}");
                continue;
            };
            let result = decoded.map_err(|e| e.status());
            let _ = tx.send(result);
        }
    });
}

/// Polls the channel's security token and renews it once it nears expiry,
/// for the lifetime of the channel.
fn spawn_renewal(owner: Arc<AsyncSecureChannel>) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
            if owner.is_closed() {
                break;
            }
            if !owner.should_renew_security_token() {
                continue;
            }
            channel_debug!(owner, "security token nearing expiry, renewing");
            if let Err(e) = owner.renew().await {
                channel_warn!(owner, "failed to renew security token: {}", e);
                break;
            }
        }
    });
}

fn fail_all_pending(pending: &PendingTable, status: StatusCode) {
    let mut pending = pending.lock();
    for (_, tx) in pending.drain() {
        let _ = tx.send(Err(status));
    }
}

trait ServiceResultExt {
    fn check_good(&self) -> Result<(), StatusCode>;
}

impl ServiceResultExt for StatusCode {
    fn check_good(&self) -> Result<(), StatusCode> {
        if self.is_good() {
            Ok(())
        } else {
            Err(*self)
        }
    }
}
