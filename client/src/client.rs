// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! The top-level client facade: connects, authenticates, and exposes typed
//! service helpers over whatever session happens to be active.

use std::{sync::Arc, time::Duration};

use log::{error, info, warn};
use opcua_core::{comms::message_chunk::MessageChunkType, sync::Mutex};
use opcua_crypto::{CertificateStore, PrivateKey, SecurityPolicy, X509};
use opcua_types::{
    service_types::{
        BrowseDescription, BrowseRequest, BrowseResponse, BrowseResult,
        EndpointDescription, GetEndpointsRequest, GetEndpointsResponse, HistoryReadRequest,
        HistoryReadResponse, HistoryReadResult, HistoryReadValueId, MonitoredItemCreateRequest,
        MonitoredItemCreateResult, MonitoringParameters, ReadRawModifiedDetails, ReadRequest,
        ReadResponse, ReadValueId, ViewDescription, WriteRequest, WriteResponse, WriteValue,
    },
    Context, DataValue, ExpandedNodeId, ExtensionObject, MessageSecurityMode, NodeId, ObjectId,
    QualifiedName, StatusCode, UtcTime,
};

use crate::{
    config::ClientConfig,
    identity_token::IdentityToken,
    retry::SessionRetryPolicy,
    secure_channel::AsyncSecureChannel,
    session_manager::{Session, SessionManager, SignatureVerificationPolicy},
    subscriptions::{Subscription, SubscriptionParams, SubscriptionRegistry},
};

/// The attribute id for the `Value` attribute (OPC UA Part 6, Table 3), used
/// as the default when a caller leaves `attribute_id` unset.
const VALUE_ATTRIBUTE_ID: u32 = 13;

struct Connection {
    channel: Arc<AsyncSecureChannel>,
    session: Arc<Session>,
    registry: Arc<SubscriptionRegistry>,
}

/// An OPC UA client bound to one configuration. Holds at most one active
/// session; reconnecting replaces it wholesale.
pub struct Client {
    config: ClientConfig,
    identity_token: IdentityToken,
    retry_policy: SessionRetryPolicy,
    connection: Mutex<Option<Connection>>,
}

impl Client {
    /// Creates a disconnected client for the given configuration and
    /// identity.
    pub fn new(config: ClientConfig, identity_token: IdentityToken) -> Self {
        let retry_policy = config.session_retry_policy();
        Self {
            config,
            identity_token,
            retry_policy,
            connection: Mutex::new(None),
        }
    }

    /// Queries the endpoints a server offers, without creating a session.
    /// Opens a throwaway `SecurityPolicy::None` channel, asks, and closes it.
    pub async fn get_endpoints(endpoint_url: &str) -> Result<Vec<EndpointDescription>, StatusCode> {
        let channel = AsyncSecureChannel::connect(
            endpoint_url,
            SecurityPolicy::None,
            MessageSecurityMode::None,
            opcua_types::DecodingOptions::default(),
            None,
            None,
        )
        .await?;
        channel.open(60_000).await?;

        let request = GetEndpointsRequest {
            request_header: opcua_types::RequestHeader::new(&NodeId::null(), 1, 10_000),
            endpoint_url: endpoint_url.into(),
            locale_ids: None,
            profile_uris: None,
        };
        let response = channel
            .send_request(request.into(), MessageChunkType::Message)
            .await;
        channel.close().await.ok();

        let opcua_core::ResponseMessage::GetEndpoints(response) = response? else {
            return Err(StatusCode::BadUnexpectedError);
        };
        let response: GetEndpointsResponse = *response;
        response.response_header.service_result.into_result()?;
        Ok(response.endpoints.unwrap_or_default())
    }

    /// Connects to the endpoint named `endpoint_id` in the configuration,
    /// retrying according to the configured [`SessionRetryPolicy`] until it
    /// succeeds or the retry limit is exhausted.
    pub async fn connect(&self, endpoint_id: &str) -> Result<(), StatusCode> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.connect_once(endpoint_id).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    let Some(delay) = self.retry_policy.delay_for_attempt(attempt) else {
                        return Err(err);
                    };
                    if !self.retry_policy.should_retry(err) {
                        return Err(err);
                    }
                    warn!("connection attempt {attempt} failed ({err}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn connect_once(&self, endpoint_id: &str) -> Result<(), StatusCode> {
        let client_endpoint = self
            .config
            .endpoints
            .get(endpoint_id)
            .ok_or(StatusCode::BadConfigurationError)?;

        let offered = Self::get_endpoints(&client_endpoint.url).await?;
        let endpoint = self
            .config
            .endpoint_description_for_client_endpoint(client_endpoint, &offered)
            .map_err(|_| StatusCode::BadConfigurationError)?;

        let client_identity = self.load_client_identity()?;
        if client_identity.is_none() && client_endpoint.security_mode() != MessageSecurityMode::None {
            return Err(StatusCode::BadConfigurationError);
        }
        let server_certificate = endpoint
            .server_certificate
            .value
            .as_deref()
            .and_then(|der| X509::from_der(der).ok());

        let decoding_options = self.config.decoding_options.as_comms_decoding_options();
        let channel = AsyncSecureChannel::connect(
            client_endpoint.url.as_str(),
            client_endpoint.security_policy(),
            client_endpoint.security_mode(),
            decoding_options,
            client_identity.clone(),
            server_certificate,
        )
        .await?;
        channel.open(self.config.channel_lifetime).await?;

        let identity_token = self
            .config
            .client_identity_token(&client_endpoint.user_token_id)
            .unwrap_or(IdentityToken::Anonymous);

        let session = SessionManager::create_and_activate(
            channel.clone(),
            opcua_core::config::Config::application_description(&self.config),
            &endpoint,
            &self.config.session_name,
            self.config.session_timeout as f64,
            &identity_token,
            &self.config.preferred_locales,
            SignatureVerificationPolicy::Strict,
            client_identity.as_ref(),
        )
        .await?;
        let session = Arc::new(session);
        let registry = SubscriptionRegistry::new(session.clone());

        *self.connection.lock() = Some(Connection {
            channel,
            session,
            registry,
        });

        self.spawn_keep_alive_watchdog();
        info!("connected to {}", client_endpoint.url);
        Ok(())
    }

    /// Loads this client's own application instance certificate and private
    /// key, needed to sign/encrypt anything but a `SecurityPolicy::None`
    /// secure channel. Prefers explicit `certificate_path`/`private_key_path`
    /// configuration; falls back to the PKI store at `pki_dir`. Returns
    /// `None` if neither source has a usable identity, which is only an
    /// error if the chosen endpoint actually requires one.
    fn load_client_identity(&self) -> Result<Option<(X509, PrivateKey)>, StatusCode> {
        if let (Some(cert_path), Some(key_path)) =
            (&self.config.certificate_path, &self.config.private_key_path)
        {
            let der = std::fs::read(cert_path).map_err(|e| {
                warn!("failed to read client certificate {cert_path}: {e}");
                StatusCode::BadConfigurationError
            })?;
            let cert = X509::from_der(&der).map_err(|e| {
                warn!("invalid client certificate {cert_path}: {e}");
                StatusCode::BadConfigurationError
            })?;
            let pem = std::fs::read_to_string(key_path).map_err(|e| {
                warn!("failed to read client private key {key_path}: {e}");
                StatusCode::BadConfigurationError
            })?;
            let key = PrivateKey::from_pem(&pem).map_err(|e| {
                warn!("invalid client private key {key_path}: {e}");
                StatusCode::BadConfigurationError
            })?;
            return Ok(Some((cert, key)));
        }

        let store = CertificateStore::new(self.config.pki_dir.clone());
        store
            .read_own_cert_and_key()
            .map_err(|e| {
                warn!("failed to read own certificate from pki store: {e}");
                StatusCode::BadConfigurationError
            })
    }

    /// Watches the publish loop's liveness; if no `Publish` response has
    /// been seen within `keep_alive_interval * max_failed_keep_alive_count`,
    /// logs the fact so callers polling [`Client::is_healthy`] notice.
    /// This is the mechanism the reconnect loop above is built around.
    fn spawn_keep_alive_watchdog(&self) {
        let Some(connection) = self.connection.lock().as_ref().map(|c| Arc::clone(&c.registry))
        else {
            return;
        };
        let interval = self.config.keep_alive_interval;
        let max_failed = self.config.max_failed_keep_alive_count.max(1);
        tokio::spawn(async move {
            let ceiling = interval * max_failed;
            loop {
                tokio::time::sleep(interval).await;
                if connection.last_publish_at().elapsed() > ceiling {
                    error!("no publish activity for {ceiling:?}, session considered dead");
                    return;
                }
            }
        });
    }

    /// True if a session is currently established.
    pub fn is_connected(&self) -> bool {
        self.connection.lock().is_some()
    }

    fn session(&self) -> Result<Arc<Session>, StatusCode> {
        self.connection
            .lock()
            .as_ref()
            .map(|c| c.session.clone())
            .ok_or(StatusCode::BadNotConnected)
    }

    fn registry(&self) -> Result<Arc<SubscriptionRegistry>, StatusCode> {
        self.connection
            .lock()
            .as_ref()
            .map(|c| c.registry.clone())
            .ok_or(StatusCode::BadNotConnected)
    }

    /// Closes the active session (deleting its subscriptions) and the
    /// secure channel underneath it.
    pub async fn close_session(&self) -> Result<(), StatusCode> {
        let connection = self.connection.lock().take();
        let Some(connection) = connection else {
            return Ok(());
        };
        let result = connection.session.close(true).await;
        connection.channel.close().await.ok();
        result
    }

    /// Reads a batch of attributes. Each `ReadValueId` is defensively
    /// copied with `attribute_id` defaulted to `Value` when left at zero and
    /// `data_encoding` defaulted to an empty qualified name; the caller's
    /// input is never mutated.
    pub async fn read(&self, nodes_to_read: &[ReadValueId]) -> Result<Vec<DataValue>, StatusCode> {
        let session = self.session()?;
        let nodes_to_read: Vec<ReadValueId> = nodes_to_read
            .iter()
            .map(|item| ReadValueId {
                node_id: item.node_id.clone(),
                attribute_id: if item.attribute_id == 0 {
                    VALUE_ATTRIBUTE_ID
                } else {
                    item.attribute_id
                },
                index_range: item.index_range.clone(),
                data_encoding: if item.data_encoding.name.is_null() {
                    QualifiedName::null()
                } else {
                    item.data_encoding.clone()
                },
            })
            .collect();

        let request = ReadRequest {
            request_header: session.request_header(self.request_timeout_hint()),
            max_age: 0.0,
            timestamps_to_return: opcua_types::TimestampsToReturn::Both,
            nodes_to_read: Some(nodes_to_read),
        };
        let response = session
            .channel()
            .send_request(request.into(), MessageChunkType::Message)
            .await?;
        let opcua_core::ResponseMessage::Read(response) = response else {
            return Err(StatusCode::BadUnexpectedError);
        };
        let response: ReadResponse = *response;
        response.response_header.service_result.into_result()?;
        Ok(response.results.unwrap_or_default())
    }

    /// Writes a batch of attribute values.
    pub async fn write(&self, nodes_to_write: &[WriteValue]) -> Result<Vec<StatusCode>, StatusCode> {
        let session = self.session()?;
        let request = WriteRequest {
            request_header: session.request_header(self.request_timeout_hint()),
            nodes_to_write: Some(nodes_to_write.to_vec()),
        };
        let response = session
            .channel()
            .send_request(request.into(), MessageChunkType::Message)
            .await?;
        let opcua_core::ResponseMessage::Write(response) = response else {
            return Err(StatusCode::BadUnexpectedError);
        };
        let response: WriteResponse = *response;
        response.response_header.service_result.into_result()?;
        Ok(response.results.unwrap_or_default())
    }

    /// Browses the references of a batch of nodes.
    pub async fn browse(&self, nodes_to_browse: &[BrowseDescription]) -> Result<Vec<BrowseResult>, StatusCode> {
        let session = self.session()?;
        let request = BrowseRequest {
            request_header: session.request_header(self.request_timeout_hint()),
            view: ViewDescription {
                view_id: NodeId::null(),
                timestamp: UtcTime::default(),
                view_version: 0,
            },
            requested_max_references_per_node: 0,
            nodes_to_browse: Some(nodes_to_browse.to_vec()),
        };
        let response = session
            .channel()
            .send_request(request.into(), MessageChunkType::Message)
            .await?;
        let opcua_core::ResponseMessage::Browse(response) = response else {
            return Err(StatusCode::BadUnexpectedError);
        };
        let response: BrowseResponse = *response;
        response.response_header.service_result.into_result()?;
        Ok(response.results.unwrap_or_default())
    }

    /// Reads raw (optionally modified) history for a batch of nodes.
    /// `ReadRawModifiedDetails` is wrapped in an `ExtensionObject` the way
    /// every history-read variant is, since `HistoryReadRequest` carries its
    /// details polymorphically.
    pub async fn history_read_raw_modified(
        &self,
        details: ReadRawModifiedDetails,
        nodes_to_read: &[HistoryReadValueId],
    ) -> Result<Vec<HistoryReadResult>, StatusCode> {
        let session = self.session()?;
        let ctx = Context::new(opcua_types::DecodingOptions::default());
        let details = ExtensionObject::from_message(
            ExpandedNodeId::from(NodeId::from(
                ObjectId::ReadRawModifiedDetails_Encoding_DefaultBinary,
            )),
            &details,
            &ctx,
        );
        let request = HistoryReadRequest {
            request_header: session.request_header(self.request_timeout_hint()),
            history_read_details: details,
            timestamps_to_return: opcua_types::TimestampsToReturn::Both,
            release_continuation_points: false,
            nodes_to_read: Some(nodes_to_read.to_vec()),
        };
        let response = session
            .channel()
            .send_request(request.into(), MessageChunkType::Message)
            .await?;
        let opcua_core::ResponseMessage::HistoryRead(response) = response else {
            return Err(StatusCode::BadUnexpectedError);
        };
        let response: HistoryReadResponse = *response;
        response.response_header.service_result.into_result()?;
        Ok(response.results.unwrap_or_default())
    }

    /// Creates a subscription and starts (or joins) the background publish
    /// loop that feeds it.
    pub async fn subscribe(&self, params: SubscriptionParams) -> Result<Subscription, StatusCode> {
        self.registry()?.subscribe(params).await
    }

    /// Creates monitored items on an existing subscription. Fails fast with
    /// `BadSubscriptionIdInvalid` for `subscription_id == 0` without a
    /// round-trip, since 0 is never a server-assigned subscription id.
    pub async fn create_monitored_items(
        &self,
        subscription_id: u32,
        items_to_create: Vec<MonitoredItemCreateRequest>,
    ) -> Result<Vec<MonitoredItemCreateResult>, StatusCode> {
        if subscription_id == 0 {
            return Err(StatusCode::BadSubscriptionIdInvalid);
        }
        let session = self.session()?;
        let request = opcua_types::service_types::CreateMonitoredItemsRequest {
            request_header: session.request_header(self.request_timeout_hint()),
            subscription_id,
            timestamps_to_return: opcua_types::TimestampsToReturn::Both,
            items_to_create: Some(items_to_create),
        };
        let response = session
            .channel()
            .send_request(request.into(), MessageChunkType::Message)
            .await?;
        let opcua_core::ResponseMessage::CreateMonitoredItems(response) = response else {
            return Err(StatusCode::BadUnexpectedError);
        };
        response.response_header.service_result.into_result()?;
        Ok(response.results.unwrap_or_default())
    }

    /// Builds a default `MonitoringParameters` for a monitored item: report
    /// every change, one-deep queue, discarding the oldest value on
    /// overflow.
    pub fn default_monitoring_parameters(client_handle: u32) -> MonitoringParameters {
        MonitoringParameters {
            client_handle,
            sampling_interval: -1.0,
            filter: ExtensionObject::null(),
            queue_size: 1,
            discard_oldest: true,
        }
    }

    fn request_timeout_hint(&self) -> u32 {
        self.config.request_timeout.as_millis().min(u32::MAX as u128) as u32
    }
}

trait ServiceResultExt {
    fn into_result(self) -> Result<(), StatusCode>;
}

impl ServiceResultExt for StatusCode {
    fn into_result(self) -> Result<(), StatusCode> {
        if self.is_good() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_attribute_id_defaults_to_value() {
        let item = ReadValueId {
            node_id: NodeId::null(),
            attribute_id: 0,
            index_range: Default::default(),
            data_encoding: QualifiedName::null(),
        };
        assert_eq!(item.attribute_id, 0);
        assert_eq!(VALUE_ATTRIBUTE_ID, 13);
    }

    #[test]
    fn default_monitoring_parameters_use_discard_oldest() {
        let params = Client::default_monitoring_parameters(1);
        assert!(params.discard_oldest);
        assert_eq!(params.queue_size, 1);
    }
}
