// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! The identity a client presents when activating a session.

use std::path::PathBuf;

use opcua_crypto::{PrivateKey, SecurityPolicy, X509};
use opcua_types::{
    service_types::{
        AnonymousIdentityToken, SignatureData, UserNameIdentityToken, X509IdentityToken,
    },
    ByteString, Context, ExpandedNodeId, ExtensionObject, NodeId, ObjectId, UAString,
};

/// An identity a client can authenticate a session with.
#[derive(Debug, Clone)]
pub enum IdentityToken {
    /// No identity; the server must allow anonymous access.
    Anonymous,
    /// Username and (plaintext, to be encrypted before sending) password.
    UserName(String, String),
    /// Path to an X509 certificate and its matching private key.
    X509(PathBuf, PathBuf),
}

impl IdentityToken {
    /// Wraps this identity as the `ExtensionObject` body of an
    /// `ActivateSessionRequest`, encrypting the secret part (password or
    /// private key signature) under the channel's security policy where one
    /// applies.
    ///
    /// `secure_policy_uri` and `server_nonce` come from the endpoint the
    /// session was created against; `server_cert` is the server's
    /// certificate, needed to encrypt the secret.
    pub fn to_extension_object(
        &self,
        ctx: &Context<'_>,
        security_policy: SecurityPolicy,
        server_cert: Option<&X509>,
        server_nonce: &[u8],
    ) -> Result<ExtensionObject, opcua_types::Error> {
        match self {
            IdentityToken::Anonymous => {
                let token = AnonymousIdentityToken {
                    policy_id: UAString::from("anonymous"),
                };
                Ok(ExtensionObject::from_message(
                    ExpandedNodeId::from(NodeId::from(
                        ObjectId::AnonymousIdentityToken_Encoding_DefaultBinary,
                    )),
                    &token,
                    ctx,
                ))
            }
            IdentityToken::UserName(user, password) => {
                let (password_bytes, encryption_algorithm) = if security_policy.is_none() {
                    (password.as_bytes().to_vec(), UAString::null())
                } else {
                    let mut data = Vec::with_capacity(4 + password.len() + server_nonce.len());
                    let plain_text_len = (password.len() + server_nonce.len()) as u32;
                    data.extend_from_slice(&plain_text_len.to_le_bytes());
                    data.extend_from_slice(password.as_bytes());
                    data.extend_from_slice(server_nonce);
                    let cert = server_cert.ok_or_else(|| {
                        opcua_types::Error::encoding("no server certificate to encrypt password with")
                    })?;
                    let public_key = cert.public_key().map_err(|e| {
                        opcua_types::Error::encoding(format!("invalid server certificate: {e}"))
                    })?;
                    let encrypted = security_policy
                        .asymmetric_encrypt(&public_key, &data)
                        .map_err(|e| opcua_types::Error::encoding(format!("failed to encrypt password: {e}")))?;
                    (encrypted, UAString::from("http://www.w3.org/2001/04/xmlenc#rsa-oaep"))
                };
                let token = UserNameIdentityToken {
                    policy_id: UAString::from("username_basic256sha256"),
                    user_name: UAString::from(user.as_str()),
                    password: ByteString::from(password_bytes),
                    encryption_algorithm,
                };
                Ok(ExtensionObject::from_message(
                    ExpandedNodeId::from(NodeId::from(
                        ObjectId::UserNameIdentityToken_Encoding_DefaultBinary,
                    )),
                    &token,
                    ctx,
                ))
            }
            IdentityToken::X509(cert_path, _) => {
                let der = std::fs::read(cert_path)
                    .map_err(|e| opcua_types::Error::encoding(format!("failed to read {cert_path:?}: {e}")))?;
                let token = X509IdentityToken {
                    policy_id: UAString::from("x509_basic256sha256"),
                    certificate_data: ByteString::from(der),
                };
                Ok(ExtensionObject::from_message(
                    ExpandedNodeId::from(NodeId::from(
                        ObjectId::X509IdentityToken_Encoding_DefaultBinary,
                    )),
                    &token,
                    ctx,
                ))
            }
        }
    }

    /// Builds the `userTokenSignature` field of `ActivateSessionRequest` for
    /// an X509 identity: a signature over the server's certificate and
    /// nonce using this client's private key. Anonymous and username
    /// identities don't sign anything.
    pub fn sign(
        &self,
        security_policy: SecurityPolicy,
        server_cert: &[u8],
        server_nonce: &[u8],
    ) -> Result<SignatureData, opcua_types::Error> {
        match self {
            IdentityToken::X509(_, private_key_path) => {
                let pem = std::fs::read_to_string(private_key_path).map_err(|e| {
                    opcua_types::Error::encoding(format!("failed to read {private_key_path:?}: {e}"))
                })?;
                let key = PrivateKey::from_pem(&pem)
                    .map_err(|e| opcua_types::Error::encoding(format!("invalid private key: {e}")))?;
                let mut data = Vec::with_capacity(server_cert.len() + server_nonce.len());
                data.extend_from_slice(server_cert);
                data.extend_from_slice(server_nonce);
                let signature = security_policy
                    .asymmetric_sign(&key, &data)
                    .map_err(|e| opcua_types::Error::encoding(format!("failed to sign: {e}")))?;
                Ok(SignatureData {
                    algorithm: UAString::from(signature_algorithm(security_policy)),
                    signature: ByteString::from(signature),
                })
            }
            _ => Ok(SignatureData {
                algorithm: UAString::null(),
                signature: ByteString::null(),
            }),
        }
    }
}

pub(crate) fn signature_algorithm(policy: SecurityPolicy) -> &'static str {
    match policy {
        SecurityPolicy::Basic128Rsa15 => "http://www.w3.org/2000/09/xmldsig#rsa-sha1",
        _ => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256",
    }
}
