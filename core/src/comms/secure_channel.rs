// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! The secure channel: the negotiated security policy, mode, keys, and
//! nonces used to sign/encrypt outgoing chunks and verify/decrypt incoming
//! ones. One instance is shared between the transport's read and write
//! halves for the lifetime of a connection.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;

use opcua_crypto::{AesKey, PrivateKey, SecurityPolicy, X509};
use opcua_types::{
    constants, service_types::ChannelSecurityToken, ByteString, DecodingOptions, Error,
    MessageSecurityMode, StatusCode,
};

use super::message_chunk::MessageChunkType;
use super::security_header::{AsymmetricSecurityHeader, SecurityHeader, SymmetricSecurityHeader};

/// Signing/encrypting key material derived for one direction of traffic:
/// a signing key, a symmetric cipher key, and an initialization vector.
#[derive(Clone)]
struct DerivedKeys {
    signing_key: Vec<u8>,
    encrypting_key: AesKey,
    iv: Vec<u8>,
}

/// The state of one end of a secure channel: the agreed security policy
/// and mode, the certificates and nonces exchanged during the handshake,
/// and the keys derived from them.
pub struct SecureChannel {
    security_policy: SecurityPolicy,
    security_mode: MessageSecurityMode,
    secure_channel_id: u32,
    token_id: u32,
    token_created_at: chrono::DateTime<Utc>,
    token_lifetime: u32,
    local_nonce: Vec<u8>,
    remote_nonce: Vec<u8>,
    local_keys: Option<DerivedKeys>,
    remote_keys: Option<DerivedKeys>,
    cert: Option<X509>,
    private_key: Option<PrivateKey>,
    remote_cert: Option<X509>,
    decoding_options: Arc<RwLock<DecodingOptions>>,
}

impl SecureChannel {
    /// A new, unsecured channel. Call [`Self::set_security_policy`] and
    /// friends once the handshake has negotiated them.
    pub fn new(decoding_options: DecodingOptions) -> SecureChannel {
        SecureChannel {
            security_policy: SecurityPolicy::None,
            security_mode: MessageSecurityMode::None,
            secure_channel_id: 0,
            token_id: 0,
            token_created_at: Utc::now(),
            token_lifetime: 0,
            local_nonce: Vec::new(),
            remote_nonce: Vec::new(),
            local_keys: None,
            remote_keys: None,
            cert: None,
            private_key: None,
            remote_cert: None,
            decoding_options: Arc::new(RwLock::new(decoding_options)),
        }
    }

    pub fn decoding_options(&self) -> DecodingOptions {
        self.decoding_options.read().clone()
    }

    pub fn set_decoding_options(&self, decoding_options: DecodingOptions) {
        *self.decoding_options.write() = decoding_options;
    }

    pub fn security_policy(&self) -> SecurityPolicy {
        self.security_policy
    }

    pub fn set_security_policy(&mut self, security_policy: SecurityPolicy) {
        self.security_policy = security_policy;
    }

    pub fn security_mode(&self) -> MessageSecurityMode {
        self.security_mode
    }

    pub fn set_security_mode(&mut self, security_mode: MessageSecurityMode) {
        self.security_mode = security_mode;
    }

    pub fn secure_channel_id(&self) -> u32 {
        self.secure_channel_id
    }

    pub fn set_secure_channel_id(&mut self, secure_channel_id: u32) {
        self.secure_channel_id = secure_channel_id;
    }

    pub fn token_id(&self) -> u32 {
        self.token_id
    }

    pub fn set_cert(&mut self, cert: Option<X509>) {
        self.cert = cert;
    }

    pub fn set_private_key(&mut self, private_key: Option<PrivateKey>) {
        self.private_key = private_key;
    }

    pub fn remote_cert(&self) -> Option<&X509> {
        self.remote_cert.as_ref()
    }

    pub fn set_remote_cert(&mut self, remote_cert: Option<X509>) {
        self.remote_cert = remote_cert;
    }

    /// Applies a freshly-issued security token, recording when it was
    /// minted so [`Self::should_renew_security_token`] can judge its age.
    pub fn set_security_token(&mut self, token: &ChannelSecurityToken) {
        self.secure_channel_id = token.channel_id;
        self.token_id = token.token_id;
        self.token_created_at = token.created_at.0;
        self.token_lifetime = token.revised_lifetime;
    }

    /// `true` once the current token has lived past the renewal ratio of
    /// its lifetime and a fresh `OpenSecureChannel` renew should be sent.
    pub fn should_renew_security_token(&self) -> bool {
        if self.token_lifetime == 0 {
            return false;
        }
        let token = ChannelSecurityToken {
            channel_id: self.secure_channel_id,
            token_id: self.token_id,
            created_at: self.token_created_at.into(),
            revised_lifetime: self.token_lifetime,
        };
        token.renewal_due_in(constants::TOKEN_RENEWAL_RATIO) == std::time::Duration::ZERO
    }

    /// Generates a fresh local nonce of the length the security policy
    /// requires, returning it so the caller can place it in the request.
    pub fn create_random_nonce(&mut self) -> ByteString {
        let length = self.security_policy.secure_channel_nonce_length();
        if length == 0 {
            self.local_nonce = Vec::new();
            return ByteString::null();
        }
        let nonce = opcua_crypto::random::byte_string(length);
        self.local_nonce = nonce.as_ref().to_vec();
        nonce
    }

    pub fn set_local_nonce(&mut self, nonce: &[u8]) {
        self.local_nonce = nonce.to_vec();
    }

    pub fn local_nonce_as_byte_string(&self) -> ByteString {
        ByteString::from(self.local_nonce.clone())
    }

    pub fn set_remote_nonce_from_byte_string(&mut self, nonce: &ByteString) -> Result<(), Error> {
        let expected = self.security_policy.secure_channel_nonce_length();
        let bytes = nonce.value.clone().unwrap_or_default();
        if expected > 0 && bytes.len() != expected {
            return Err(Error::new(
                StatusCode::BadSecurityChecksFailed,
                format!(
                    "remote nonce is {} bytes, security policy requires {}",
                    bytes.len(),
                    expected
                ),
            ));
        }
        self.remote_nonce = bytes;
        Ok(())
    }

    /// Derives fresh signing/encrypting keys for both directions from the
    /// local and remote nonces, per the negotiated security policy. A
    /// no-op when the policy is `None`.
    pub fn derive_keys(&mut self) -> Result<(), Error> {
        if self.security_policy == SecurityPolicy::None {
            self.local_keys = None;
            self.remote_keys = None;
            return Ok(());
        }

        let (local_signing, local_encrypting, local_iv) = self
            .security_policy
            .derive_keys(&self.remote_nonce, &self.local_nonce)?;
        self.local_keys = Some(DerivedKeys {
            signing_key: local_signing,
            encrypting_key: local_encrypting,
            iv: local_iv,
        });

        let (remote_signing, remote_encrypting, remote_iv) = self
            .security_policy
            .derive_keys(&self.local_nonce, &self.remote_nonce)?;
        self.remote_keys = Some(DerivedKeys {
            signing_key: remote_signing,
            encrypting_key: remote_encrypting,
            iv: remote_iv,
        });

        Ok(())
    }

    /// Builds the security header to attach to a chunk of `message_type`:
    /// asymmetric for `OpenSecureChannel`, symmetric otherwise.
    pub fn make_security_header(&self, message_type: MessageChunkType) -> SecurityHeader {
        if message_type.is_open_secure_channel() {
            if self.security_policy == SecurityPolicy::None {
                SecurityHeader::Asymmetric(AsymmetricSecurityHeader::none())
            } else {
                let thumbprint = self
                    .remote_cert
                    .as_ref()
                    .map(|c| c.thumbprint().as_byte_string())
                    .unwrap_or_else(ByteString::null);
                let sender_certificate = self
                    .cert
                    .as_ref()
                    .expect("asymmetric security requires a local certificate");
                SecurityHeader::Asymmetric(AsymmetricSecurityHeader::new(
                    self.security_policy,
                    sender_certificate,
                    thumbprint,
                ))
            }
        } else {
            SecurityHeader::Symmetric(SymmetricSecurityHeader {
                token_id: self.token_id,
            })
        }
    }

    /// Size in bytes of the signature appended to a secured chunk, zero
    /// when the mode doesn't sign.
    pub fn signature_size(&self, security_header: &SecurityHeader) -> usize {
        if self.security_mode == MessageSecurityMode::None {
            return 0;
        }
        match security_header {
            SecurityHeader::Asymmetric(_) => self
                .private_key
                .as_ref()
                .map(|k| k.byte_length())
                .unwrap_or(0),
            SecurityHeader::Symmetric(_) => self.security_policy.symmetric_signature_size(),
        }
    }

    /// `(plain_text_block_size, minimum_padding)` for a chunk carrying
    /// `security_header`, used to size the message body and the padding
    /// appended after it.
    pub fn get_padding_block_sizes(
        &self,
        security_header: &SecurityHeader,
        signature_size: usize,
        message_type: MessageChunkType,
    ) -> (usize, usize) {
        if self.security_mode != MessageSecurityMode::SignAndEncrypt
            && !message_type.is_open_secure_channel()
        {
            return (0, 0);
        }
        match security_header {
            SecurityHeader::Asymmetric(_) => {
                let remote_key_byte_length = self
                    .remote_cert
                    .as_ref()
                    .and_then(|c| c.public_key().ok())
                    .map(|k| k.byte_length())
                    .unwrap_or(0);
                if remote_key_byte_length == 0 {
                    (0, 0)
                } else {
                    let plain_text_block_size = self
                        .security_policy
                        .asymmetric_plain_text_block_size(remote_key_byte_length);
                    (plain_text_block_size, 1 + signature_size)
                }
            }
            SecurityHeader::Symmetric(_) => {
                let block_size = self.security_policy.plain_block_size();
                if block_size == 0 {
                    (0, 0)
                } else {
                    (block_size, 1)
                }
            }
        }
    }

    /// Signs (and, in `SignAndEncrypt` mode, encrypts) a chunk body already
    /// padded to a cipher block boundary, returning the final on-wire
    /// bytes including the appended signature.
    pub fn apply_security(&self, message_type: MessageChunkType, chunk_body: &[u8]) -> Result<Vec<u8>, Error> {
        if self.security_mode == MessageSecurityMode::None && !message_type.is_open_secure_channel() {
            return Ok(chunk_body.to_vec());
        }

        if message_type.is_open_secure_channel() {
            let mut signed = chunk_body.to_vec();
            if self.security_mode != MessageSecurityMode::None {
                let private_key = self
                    .private_key
                    .as_ref()
                    .ok_or_else(|| Error::new(StatusCode::BadSecurityChecksFailed, "no private key"))?;
                let signature = self.security_policy.asymmetric_sign(private_key, &signed)?;
                signed.extend_from_slice(&signature);
            }
            if self.security_mode == MessageSecurityMode::SignAndEncrypt {
                let remote_cert = self.remote_cert.as_ref().ok_or_else(|| {
                    Error::new(StatusCode::BadSecurityChecksFailed, "no remote certificate")
                })?;
                let public_key = remote_cert.public_key()?;
                return self.security_policy.asymmetric_encrypt(&public_key, &signed);
            }
            return Ok(signed);
        }

        let keys = self
            .local_keys
            .as_ref()
            .ok_or_else(|| Error::new(StatusCode::BadSecurityChecksFailed, "keys not derived"))?;

        if self.security_mode == MessageSecurityMode::SignAndEncrypt {
            let mut encrypted = vec![0u8; chunk_body.len()];
            keys.encrypting_key
                .encrypt(chunk_body, &keys.iv, &mut encrypted)
                .map_err(|_| Error::new(StatusCode::BadSecurityChecksFailed, "encryption failed"))?;
            let signature = self
                .security_policy
                .symmetric_sign(&keys.signing_key, &encrypted)?;
            encrypted.extend_from_slice(&signature);
            Ok(encrypted)
        } else {
            let signature = self
                .security_policy
                .symmetric_sign(&keys.signing_key, chunk_body)?;
            let mut signed = chunk_body.to_vec();
            signed.extend_from_slice(&signature);
            Ok(signed)
        }
    }

    /// Verifies the signature on (and decrypts, if needed) a chunk's body,
    /// returning the plaintext with padding and signature removed.
    pub fn verify_and_remove_security(
        &self,
        message_type: MessageChunkType,
        secured: &[u8],
    ) -> Result<Vec<u8>, Error> {
        if self.security_mode == MessageSecurityMode::None && !message_type.is_open_secure_channel() {
            return Ok(secured.to_vec());
        }

        if message_type.is_open_secure_channel() {
            let mut plain = if self.security_mode == MessageSecurityMode::SignAndEncrypt {
                let private_key = self
                    .private_key
                    .as_ref()
                    .ok_or_else(|| Error::new(StatusCode::BadSecurityChecksFailed, "no private key"))?;
                self.security_policy.asymmetric_decrypt(private_key, secured)?
            } else {
                secured.to_vec()
            };

            if self.security_mode != MessageSecurityMode::None {
                let remote_cert = self.remote_cert.as_ref().ok_or_else(|| {
                    Error::new(StatusCode::BadSecurityChecksFailed, "no remote certificate")
                })?;
                let public_key = remote_cert.public_key()?;
                let signature_size = public_key.byte_length();
                if plain.len() < signature_size {
                    return Err(Error::new(
                        StatusCode::BadSecurityChecksFailed,
                        "chunk shorter than its own signature",
                    ));
                }
                let split = plain.len() - signature_size;
                let signature = plain.split_off(split);
                self.security_policy
                    .asymmetric_verify(&public_key, &plain, &signature)?;
            }
            return Ok(strip_padding(plain, self.security_mode));
        }

        let keys = self
            .remote_keys
            .as_ref()
            .ok_or_else(|| Error::new(StatusCode::BadSecurityChecksFailed, "keys not derived"))?;

        let signature_size = self.security_policy.symmetric_signature_size();
        if secured.len() < signature_size {
            return Err(Error::new(
                StatusCode::BadSecurityChecksFailed,
                "chunk shorter than its own signature",
            ));
        }
        let split = secured.len() - signature_size;
        let (body, signature) = secured.split_at(split);

        let expected = self.security_policy.symmetric_sign(&keys.signing_key, body)?;
        if expected != signature {
            return Err(Error::new(
                StatusCode::BadSecurityChecksFailed,
                "chunk signature does not match",
            ));
        }

        let plain = if self.security_mode == MessageSecurityMode::SignAndEncrypt {
            let mut decrypted = vec![0u8; body.len()];
            keys.encrypting_key
                .decrypt(body, &keys.iv, &mut decrypted)
                .map_err(|_| Error::new(StatusCode::BadSecurityChecksFailed, "decryption failed"))?;
            decrypted
        } else {
            body.to_vec()
        };

        Ok(strip_padding(plain, self.security_mode))
    }
}

/// Removes the trailing padding-length byte and the padding it describes,
/// a no-op outside `SignAndEncrypt` mode where no padding was applied.
fn strip_padding(mut plain: Vec<u8>, mode: MessageSecurityMode) -> Vec<u8> {
    if mode != MessageSecurityMode::SignAndEncrypt || plain.is_empty() {
        return plain;
    }
    let padding_size = plain[plain.len() - 1] as usize;
    let new_len = plain.len().saturating_sub(padding_size + 1);
    plain.truncate(new_len);
    plain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsecured_round_trip_is_identity() {
        let channel = SecureChannel::new(DecodingOptions::default());
        let body = b"hello world".to_vec();
        let secured = channel.apply_security(MessageChunkType::Message, &body).unwrap();
        assert_eq!(secured, body);
        let plain = channel
            .verify_and_remove_security(MessageChunkType::Message, &secured)
            .unwrap();
        assert_eq!(plain, body);
    }

    #[test]
    fn none_policy_has_no_padding() {
        let channel = SecureChannel::new(DecodingOptions::default());
        let header = channel.make_security_header(MessageChunkType::Message);
        let sig = channel.signature_size(&header);
        assert_eq!(channel.get_padding_block_sizes(&header, sig, MessageChunkType::Message), (0, 0));
    }
}
