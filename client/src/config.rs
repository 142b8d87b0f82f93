// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Client configuration: endpoints, user tokens, and the decoding limits
//! applied to the wire codec.

use std::{collections::BTreeMap, path::PathBuf, time::Duration};

use opcua_core::config::Config;
use opcua_crypto::SecurityPolicy;
use opcua_types::{
    service_types::EndpointDescription, ApplicationType, MessageSecurityMode, UAString,
};
use serde::{Deserialize, Serialize};

use crate::{identity_token::IdentityToken, retry::SessionRetryPolicy};

/// The reserved user token id meaning "connect anonymously".
pub const ANONYMOUS_USER_TOKEN_ID: &str = "ANONYMOUS";

/// Parses a security mode name the way the server's `GetEndpoints` response
/// and the client's own configuration spell it. Unlike `opcua_types::enums`,
/// which only round-trips the wire byte, this matches human-readable names
/// since that's what appears in a YAML config file.
pub fn security_mode_from_str(s: &str) -> MessageSecurityMode {
    match s {
        "None" => MessageSecurityMode::None,
        "Sign" => MessageSecurityMode::Sign,
        "SignAndEncrypt" => MessageSecurityMode::SignAndEncrypt,
        _ => MessageSecurityMode::Invalid,
    }
}

/// Parses a security policy the way a config file spells it: either the
/// short name (`Basic256Sha256`) or the full namespace URI. Returns
/// `SecurityPolicy::Unknown` if neither matches, mirroring `from_uri`'s
/// fallback behavior.
pub fn security_policy_from_str(s: &str) -> SecurityPolicy {
    let candidate = if s.starts_with("http://") {
        s.to_string()
    } else if s.is_empty() || s == "None" {
        "http://opcfoundation.org/UA/SecurityPolicy#None".to_string()
    } else {
        format!("http://opcfoundation.org/UA/SecurityPolicy#{s}")
    };
    SecurityPolicy::from_uri(&candidate)
}

/// A user identity a client may authenticate with, keyed by an id referenced
/// from a [`ClientEndpoint`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientUserToken {
    /// User name, for username/password identity tokens.
    pub user: String,
    /// Password, for username/password identity tokens.
    pub password: Option<String>,
    /// Path to a DER/PEM certificate, for X509 identity tokens.
    pub cert_path: Option<String>,
    /// Path to the matching private key, for X509 identity tokens.
    pub private_key_path: Option<String>,
}

impl ClientUserToken {
    /// Creates a username/password identity.
    pub fn user_pass(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: Some(password.into()),
            cert_path: None,
            private_key_path: None,
        }
    }

    /// Creates an X509 identity from a certificate and private key path.
    pub fn x509(
        user: impl Into<String>,
        cert_path: impl Into<PathBuf>,
        private_key_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            user: user.into(),
            password: None,
            cert_path: Some(cert_path.into().to_string_lossy().into_owned()),
            private_key_path: Some(private_key_path.into().to_string_lossy().into_owned()),
        }
    }

    /// True if the fields present form a valid identity (exactly one kind).
    pub fn validate(&self) -> bool {
        self.password.is_some() != (self.cert_path.is_some() && self.private_key_path.is_some())
            || (self.password.is_none() && self.cert_path.is_none())
    }
}

/// A server endpoint a client may connect to, identified by URL plus the
/// security policy/mode the caller wants to use against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientEndpoint {
    /// `opc.tcp://...` endpoint URL.
    pub url: String,
    /// Security policy, either a short name or a full URI.
    pub security_policy: String,
    /// Security mode name: `None`, `Sign`, or `SignAndEncrypt`.
    pub security_mode: String,
    /// Id of the [`ClientUserToken`] to authenticate with, or
    /// [`ANONYMOUS_USER_TOKEN_ID`].
    pub user_token_id: String,
}

impl ClientEndpoint {
    /// Creates an endpoint that will authenticate anonymously.
    pub fn new(url: impl Into<String>, security_policy: impl Into<String>, security_mode: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            security_policy: security_policy.into(),
            security_mode: security_mode.into(),
            user_token_id: ANONYMOUS_USER_TOKEN_ID.to_string(),
        }
    }

    /// The resolved security policy.
    pub fn security_policy(&self) -> SecurityPolicy {
        security_policy_from_str(&self.security_policy)
    }

    /// The resolved security mode.
    pub fn security_mode(&self) -> MessageSecurityMode {
        security_mode_from_str(&self.security_mode)
    }
}

/// Decoding limits applied to every chunk this client decodes. Mirrors
/// `opcua_types::DecodingOptions` but as a plain, serializable config shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodingOptions {
    /// Largest complete message this client will assemble, in bytes.
    pub max_message_size: usize,
    /// Largest number of chunks making up a single message.
    pub max_chunk_count: usize,
    /// Largest individual chunk this client will send, in bytes.
    pub max_chunk_size: usize,
    /// Largest individual chunk this client will accept, in bytes.
    pub max_incoming_chunk_size: usize,
    /// Largest string this client will decode.
    pub max_string_length: usize,
    /// Largest byte string this client will decode.
    pub max_byte_string_length: usize,
    /// Largest array this client will decode.
    pub max_array_length: usize,
}

impl Default for DecodingOptions {
    fn default() -> Self {
        Self {
            max_message_size: 2_097_152,
            max_chunk_count: 64,
            max_chunk_size: 65_535,
            max_incoming_chunk_size: 65_535,
            max_string_length: 65_535,
            max_byte_string_length: 1_048_576,
            max_array_length: 100_000,
        }
    }
}

impl DecodingOptions {
    /// Converts this into the decoding limits used by the chunker/codec.
    /// Unlike the teacher's equivalent, there is no `client_offset` field to
    /// carry over: this workspace's `opcua_types::DecodingOptions` doesn't
    /// track a clock offset.
    pub fn as_comms_decoding_options(&self) -> opcua_types::DecodingOptions {
        opcua_types::DecodingOptions {
            max_message_size: self.max_message_size,
            max_chunk_count: self.max_chunk_count,
            max_string_length: self.max_string_length,
            max_byte_string_length: self.max_byte_string_length,
            max_array_length: self.max_array_length,
            ..Default::default()
        }
    }
}

/// Tuning knobs that trade correctness against throughput; safe to leave at
/// their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Performance {
    /// If true, don't treat a server clock running ahead/behind as an error.
    pub ignore_clock_skew: bool,
    /// Number of monitored items to (re-)create per chunk when resuming a
    /// subscription after a reconnect.
    pub recreate_monitored_items_chunk: usize,
}

/// Full client configuration: identity, endpoints, and connection tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Application name presented to the server.
    pub application_name: String,
    /// Application URI presented to the server.
    pub application_uri: String,
    /// Product URI presented to the server.
    pub product_uri: String,
    /// Directory holding trusted/rejected certificates.
    pub pki_dir: PathBuf,
    /// Path to this client's own certificate.
    pub certificate_path: Option<String>,
    /// Path to this client's own private key.
    pub private_key_path: Option<String>,
    /// Trust any server certificate without verification.
    pub trust_server_certs: bool,
    /// Verify server certificate validity (time, trust chain).
    pub verify_server_certs: bool,
    /// Preferred locales, most preferred first.
    pub preferred_locales: Vec<String>,
    /// Id of the endpoint in `endpoints` to connect to by default.
    pub default_endpoint: String,
    /// Known endpoints, keyed by an arbitrary id.
    pub endpoints: BTreeMap<String, ClientEndpoint>,
    /// Known user identities, keyed by an arbitrary id.
    pub user_tokens: BTreeMap<String, ClientUserToken>,
    /// Requested secure channel lifetime, in milliseconds.
    pub channel_lifetime: u32,
    /// Decoding limits applied to the wire codec.
    pub decoding_options: DecodingOptions,
    /// Maximum number of session creation retries, or `None` for unlimited.
    pub session_retry_limit: i32,
    /// Initial delay before the first retry.
    pub session_retry_initial: Duration,
    /// Maximum delay between retries.
    pub session_retry_max: Duration,
    /// Interval between keep-alive publish/read requests.
    pub keep_alive_interval: Duration,
    /// Number of consecutive keep-alive failures before the session is
    /// considered dead.
    pub max_failed_keep_alive_count: u32,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Timeout applied specifically to `Publish` requests.
    pub publish_timeout: Duration,
    /// Floor under which a subscription's publishing interval is not
    /// allowed to fall.
    pub min_publish_interval: Duration,
    /// Performance tuning knobs.
    pub performance: Performance,
    /// Recreate subscriptions and their monitored items after a reconnect.
    pub recreate_subscriptions: bool,
    /// Session name presented to the server.
    pub session_name: String,
    /// Requested session timeout, in milliseconds.
    pub session_timeout: u32,
}

impl ClientConfig {
    /// Creates a config with sensible defaults and the given identity.
    pub fn new(application_name: impl Into<String>, application_uri: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            application_uri: application_uri.into(),
            product_uri: "urn:opcua-client".to_string(),
            pki_dir: PathBuf::from("./pki"),
            certificate_path: None,
            private_key_path: None,
            trust_server_certs: false,
            verify_server_certs: true,
            preferred_locales: Vec::new(),
            default_endpoint: String::new(),
            endpoints: BTreeMap::new(),
            user_tokens: BTreeMap::new(),
            channel_lifetime: 60_000,
            decoding_options: DecodingOptions::default(),
            session_retry_limit: SessionRetryPolicy::DEFAULT_RETRY_LIMIT as i32,
            session_retry_initial: Duration::from_secs(1),
            session_retry_max: Duration::from_secs(30),
            keep_alive_interval: Duration::from_secs(10),
            max_failed_keep_alive_count: 3,
            request_timeout: Duration::from_secs(10),
            publish_timeout: Duration::from_secs(60),
            min_publish_interval: Duration::from_millis(100),
            performance: Performance::default(),
            recreate_subscriptions: true,
            session_name: "Rust OPC UA client".to_string(),
            session_timeout: 60_000,
        }
    }

    /// The configured session retry policy.
    pub fn session_retry_policy(&self) -> SessionRetryPolicy {
        SessionRetryPolicy::new(
            self.session_retry_max,
            if self.session_retry_limit < 0 {
                None
            } else {
                Some(self.session_retry_limit as u32)
            },
            self.session_retry_initial,
        )
    }

    /// The identity token for a configured user token id, or `None` if the
    /// id is unknown or not fully specified.
    pub fn client_identity_token(&self, user_token_id: impl Into<String>) -> Option<IdentityToken> {
        let user_token_id = user_token_id.into();
        if user_token_id == ANONYMOUS_USER_TOKEN_ID {
            return Some(IdentityToken::Anonymous);
        }
        let token = self.user_tokens.get(&user_token_id)?;
        if let Some(password) = &token.password {
            Some(IdentityToken::UserName(token.user.clone(), password.clone()))
        } else if let (Some(cert_path), Some(private_key_path)) =
            (&token.cert_path, &token.private_key_path)
        {
            Some(IdentityToken::X509(
                PathBuf::from(cert_path),
                PathBuf::from(private_key_path),
            ))
        } else {
            None
        }
    }

    /// Picks the server endpoint description matching a configured client
    /// endpoint's URL, policy, and mode.
    pub fn endpoint_description_for_client_endpoint(
        &self,
        client_endpoint: &ClientEndpoint,
        endpoints: &[EndpointDescription],
    ) -> Result<EndpointDescription, String> {
        let security_policy = client_endpoint.security_policy();
        if matches!(security_policy, SecurityPolicy::Unknown) {
            return Err(format!(
                "endpoint {} security policy {} is invalid",
                client_endpoint.url, client_endpoint.security_policy
            ));
        }
        let security_mode = client_endpoint.security_mode();
        if security_mode == MessageSecurityMode::Invalid {
            return Err(format!(
                "endpoint {} security mode {} is invalid",
                client_endpoint.url, client_endpoint.security_mode
            ));
        }
        endpoints
            .iter()
            .find(|e| {
                e.security_policy_uri.as_ref() == security_policy.uri()
                    && e.security_mode == security_mode
            })
            .cloned()
            .ok_or_else(|| {
                format!(
                    "endpoint {}, {:?}/{:?} does not match any offered by the server",
                    client_endpoint.url, security_policy, security_mode
                )
            })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl Config for ClientConfig {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.application_name.is_empty() {
            errors.push("application_name is empty".to_string());
        }
        if self.application_uri.is_empty() {
            errors.push("application_uri is empty".to_string());
        }
        if self.user_tokens.contains_key(ANONYMOUS_USER_TOKEN_ID) {
            errors.push(format!(
                "user token id {ANONYMOUS_USER_TOKEN_ID} is reserved for anonymous identities"
            ));
        }
        for (id, endpoint) in &self.endpoints {
            if id.is_empty() {
                errors.push("endpoint id is empty".to_string());
            }
            if matches!(endpoint.security_policy(), SecurityPolicy::Unknown) {
                errors.push(format!(
                    "endpoint {id} has invalid security policy {}",
                    endpoint.security_policy
                ));
            }
            if endpoint.security_mode() == MessageSecurityMode::Invalid {
                errors.push(format!(
                    "endpoint {id} has invalid security mode {}",
                    endpoint.security_mode
                ));
            }
            if endpoint.user_token_id != ANONYMOUS_USER_TOKEN_ID
                && !self.user_tokens.contains_key(&endpoint.user_token_id)
            {
                errors.push(format!(
                    "endpoint {id} references unknown user token {}",
                    endpoint.user_token_id
                ));
            }
        }
        for (id, token) in &self.user_tokens {
            if !token.validate() {
                errors.push(format!("user token {id} must set either password or cert/key paths"));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn application_name(&self) -> UAString {
        UAString::from(&self.application_name)
    }

    fn application_uri(&self) -> UAString {
        UAString::from(&self.application_uri)
    }

    fn product_uri(&self) -> UAString {
        UAString::from(&self.product_uri)
    }

    fn application_type(&self) -> ApplicationType {
        ApplicationType::Client
    }
}

/// Builds a [`ClientConfig`] fluently.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Starts a builder with the given application identity.
    pub fn new(application_name: impl Into<String>, application_uri: impl Into<String>) -> Self {
        Self {
            config: ClientConfig::new(application_name, application_uri),
        }
    }

    /// Registers an endpoint under `id`, replacing any prior entry.
    pub fn endpoint(mut self, id: impl Into<String>, endpoint: ClientEndpoint) -> Self {
        self.config.endpoints.insert(id.into(), endpoint);
        self
    }

    /// Sets the endpoint used by default when none is specified at connect
    /// time.
    pub fn default_endpoint(mut self, id: impl Into<String>) -> Self {
        self.config.default_endpoint = id.into();
        self
    }

    /// Registers a user identity under `id`.
    pub fn user_token(mut self, id: impl Into<String>, token: ClientUserToken) -> Self {
        self.config.user_tokens.insert(id.into(), token);
        self
    }

    /// Sets the PKI directory holding trusted/rejected certificates.
    pub fn pki_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.pki_dir = dir.into();
        self
    }

    /// Finishes the config, validating it.
    pub fn build(self) -> Result<ClientConfig, Vec<String>> {
        self.config.validate()?;
        Ok(self.config)
    }
}
