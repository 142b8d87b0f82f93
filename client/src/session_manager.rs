// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Session creation and activation on top of an [`AsyncSecureChannel`].

use std::sync::Arc;

use opcua_core::{comms::message_chunk::MessageChunkType, handle::Handle};
use opcua_crypto::{PrivateKey, SecurityPolicy, X509};
use opcua_types::{
    service_types::{
        ActivateSessionRequest, ActivateSessionResponse, ApplicationDescription,
        CloseSessionRequest, CreateSessionRequest, CreateSessionResponse, EndpointDescription,
        SignatureData, SignedSoftwareCertificate,
    },
    ByteString, Context, DecodingOptions, NodeId, RequestHeader, StatusCode, UAString,
};

use crate::{
    identity_token::{signature_algorithm, IdentityToken},
    secure_channel::AsyncSecureChannel,
};

/// How strictly a session validates the server's signature over the
/// client's certificate and nonce in `CreateSessionResponse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureVerificationPolicy {
    /// Reject the session if the server signature doesn't verify.
    #[default]
    Strict,
    /// Log a warning but proceed anyway. Only useful against servers with
    /// known-broken signature generation; never the right default.
    Lenient,
}

/// A created and activated session against one server.
pub struct Session {
    channel: Arc<AsyncSecureChannel>,
    session_id: NodeId,
    authentication_token: NodeId,
    request_handle: Handle,
}

impl Session {
    /// The session id assigned by the server.
    pub fn session_id(&self) -> &NodeId {
        &self.session_id
    }

    /// The authentication token used to associate subsequent requests with
    /// this session.
    pub fn authentication_token(&self) -> &NodeId {
        &self.authentication_token
    }

    /// Allocates the next request handle for a service call on this
    /// session.
    pub fn next_request_handle(&self) -> u32 {
        self.request_handle.next()
    }

    /// Builds a `RequestHeader` stamped with this session's authentication
    /// token.
    pub fn request_header(&self, timeout_hint: u32) -> RequestHeader {
        RequestHeader::new(&self.authentication_token, self.next_request_handle(), timeout_hint)
    }

    /// The secure channel this session is bound to.
    pub fn channel(&self) -> &Arc<AsyncSecureChannel> {
        &self.channel
    }

    /// Closes the session, optionally deleting its subscriptions on the
    /// server.
    pub async fn close(&self, delete_subscriptions: bool) -> Result<(), StatusCode> {
        let request = CloseSessionRequest {
            request_header: self.request_header(10_000),
            delete_subscriptions,
        };
        let response = self
            .channel
            .send_request(request.into(), MessageChunkType::Message)
            .await?;
        let opcua_core::ResponseMessage::CloseSession(response) = response else {
            return Err(StatusCode::BadUnexpectedError);
        };
        response.response_header.service_result.to_result()
    }
}

/// Creates and activates sessions over a secure channel.
pub struct SessionManager;

impl SessionManager {
    /// Sends `CreateSessionRequest` then `ActivateSessionRequest`, returning
    /// a usable [`Session`].
    #[allow(clippy::too_many_arguments)]
    pub async fn create_and_activate(
        channel: Arc<AsyncSecureChannel>,
        application_description: ApplicationDescription,
        endpoint: &EndpointDescription,
        session_name: &str,
        session_timeout: f64,
        identity_token: &IdentityToken,
        locale_ids: &[String],
        verification_policy: SignatureVerificationPolicy,
        client_identity: Option<&(X509, PrivateKey)>,
    ) -> Result<Session, StatusCode> {
        let security_policy = SecurityPolicy::from_uri(endpoint.security_policy_uri.as_ref());
        let client_nonce = if security_policy.is_none() {
            ByteString::null()
        } else {
            ByteString::from(opcua_crypto::random::byte_string(security_policy.secure_channel_nonce_length()))
        };

        let create_request = CreateSessionRequest {
            request_header: RequestHeader::new(&NodeId::null(), 1, 10_000),
            client_description: application_description.clone(),
            server_uri: endpoint.server.application_uri.clone(),
            endpoint_url: endpoint.endpoint_url.clone(),
            session_name: UAString::from(session_name),
            client_nonce: client_nonce.clone(),
            client_certificate: client_identity
                .map(|(cert, _)| cert.as_byte_string())
                .unwrap_or_else(ByteString::null),
            requested_session_timeout: session_timeout,
            max_response_message_size: 0,
        };

        let response = channel
            .send_request(create_request.into(), MessageChunkType::Message)
            .await?;
        let opcua_core::ResponseMessage::CreateSession(create_response) = response else {
            return Err(StatusCode::BadUnexpectedError);
        };
        let create_response: CreateSessionResponse = *create_response;
        create_response.response_header.service_result.to_result()?;

        let server_cert = create_response
            .server_certificate
            .value
            .as_deref()
            .and_then(|der| X509::from_der(der).ok());

        if verification_policy == SignatureVerificationPolicy::Strict {
            if let Some(server_cert) = &server_cert {
                if let Ok(public_key) = server_cert.public_key() {
                    let mut signed = Vec::new();
                    signed.extend_from_slice(create_response.server_certificate.as_ref());
                    signed.extend_from_slice(client_nonce.as_ref());
                    if security_policy
                        .asymmetric_verify(
                            &public_key,
                            &signed,
                            create_response.server_signature.signature.as_ref(),
                        )
                        .is_err()
                    {
                        return Err(StatusCode::BadApplicationSignatureInvalid);
                    }
                }
            }
        }

        let request_handle = Handle::new(2);
        let authentication_token = create_response.authentication_token.clone();
        let session_id = create_response.session_id.clone();
        let server_nonce_bytes = create_response.server_nonce.as_ref().to_vec();

        let ctx = Context::new(DecodingOptions::default());
        let identity = identity_token
            .to_extension_object(&ctx, security_policy, server_cert.as_ref(), &server_nonce_bytes)
            .map_err(|_| StatusCode::BadIdentityTokenInvalid)?;

        let user_token_signature = identity_token
            .sign(security_policy, create_response.server_certificate.as_ref(), &server_nonce_bytes)
            .unwrap_or(SignatureData {
                algorithm: UAString::null(),
                signature: ByteString::null(),
            });

        let client_signature = client_identity
            .and_then(|(_, key)| {
                sign_client_certificate(
                    security_policy,
                    key,
                    create_response.server_certificate.as_ref(),
                    &server_nonce_bytes,
                )
                .ok()
            })
            .unwrap_or(SignatureData {
                algorithm: UAString::null(),
                signature: ByteString::null(),
            });

        let activate_request = ActivateSessionRequest {
            request_header: RequestHeader::new(&authentication_token, request_handle.next(), 10_000),
            client_signature,
            client_software_certificates: None::<Vec<SignedSoftwareCertificate>>,
            locale_ids: Some(locale_ids.iter().map(UAString::from).collect()),
            user_identity_token: identity,
            user_token_signature,
        };

        let response = channel
            .send_request(activate_request.into(), MessageChunkType::Message)
            .await?;
        let opcua_core::ResponseMessage::ActivateSession(response) = response else {
            return Err(StatusCode::BadUnexpectedError);
        };
        let response: ActivateSessionResponse = *response;
        response.response_header.service_result.to_result()?;

        Ok(Session {
            channel,
            session_id,
            authentication_token,
            request_handle,
        })
    }
}

/// Signs the server's certificate and nonce with the client's own private
/// key, for `ActivateSessionRequest.clientSignature`. Proves possession of
/// the private key matching the certificate sent in `CreateSessionRequest`.
fn sign_client_certificate(
    security_policy: SecurityPolicy,
    private_key: &PrivateKey,
    server_cert: &[u8],
    server_nonce: &[u8],
) -> Result<SignatureData, opcua_types::Error> {
    let mut data = Vec::with_capacity(server_cert.len() + server_nonce.len());
    data.extend_from_slice(server_cert);
    data.extend_from_slice(server_nonce);
    let signature = security_policy
        .asymmetric_sign(private_key, &data)
        .map_err(|e| opcua_types::Error::encoding(format!("failed to sign: {e}")))?;
    Ok(SignatureData {
        algorithm: UAString::from(signature_algorithm(security_policy)),
        signature: ByteString::from(signature),
    })
}

trait ServiceResultExt {
    fn to_result(self) -> Result<(), StatusCode>;
}

impl ServiceResultExt for StatusCode {
    fn to_result(self) -> Result<(), StatusCode> {
        if self.is_good() {
            Ok(())
        } else {
            Err(self)
        }
    }
}
