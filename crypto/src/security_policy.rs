// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! `SecurityPolicy`, the negotiated bundle of signing, encryption, and key
//! derivation algorithms for a secure channel.

use hmac::{Hmac, Mac};
use opcua_types::{Error, StatusCode};
use sha1::Sha1;
use sha2::Sha256;

use crate::aeskey::AesKey;
use crate::pkey::{PrivateKey, PublicKey};

/// A negotiated OPC UA security policy. Only the four policies named in
/// the client's security policy URI table are recognized; anything else
/// decodes to `Unknown` and is rejected during endpoint selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityPolicy {
    #[default]
    None,
    Basic128Rsa15,
    Basic256,
    Basic256Sha256,
    Aes128Sha256RsaOaep,
    Aes256Sha256RsaPss,
    Unknown,
}

const URI_NONE: &str = "http://opcfoundation.org/UA/SecurityPolicy#None";
const URI_BASIC128RSA15: &str = "http://opcfoundation.org/UA/SecurityPolicy#Basic128Rsa15";
const URI_BASIC256: &str = "http://opcfoundation.org/UA/SecurityPolicy#Basic256";
const URI_BASIC256SHA256: &str = "http://opcfoundation.org/UA/SecurityPolicy#Basic256Sha256";
const URI_AES128SHA256RSAOAEP: &str =
    "http://opcfoundation.org/UA/SecurityPolicy#Aes128_Sha256_RsaOaep";
const URI_AES256SHA256RSAPSS: &str =
    "http://opcfoundation.org/UA/SecurityPolicy#Aes256_Sha256_RsaPss";

impl SecurityPolicy {
    /// The policy's well-known URI, as carried in `ChannelConfig` and
    /// `EndpointDescription.security_policy_uri`.
    pub fn uri(self) -> &'static str {
        match self {
            SecurityPolicy::None => URI_NONE,
            SecurityPolicy::Basic128Rsa15 => URI_BASIC128RSA15,
            SecurityPolicy::Basic256 => URI_BASIC256,
            SecurityPolicy::Basic256Sha256 => URI_BASIC256SHA256,
            SecurityPolicy::Aes128Sha256RsaOaep => URI_AES128SHA256RSAOAEP,
            SecurityPolicy::Aes256Sha256RsaPss => URI_AES256SHA256RSAPSS,
            SecurityPolicy::Unknown => "",
        }
    }

    /// Parses a security policy URI, recognizing the subset this client
    /// implements. Anything else (including the empty string not meant as
    /// `None`) is `Unknown`.
    pub fn from_uri(uri: &str) -> SecurityPolicy {
        match uri {
            URI_NONE => SecurityPolicy::None,
            URI_BASIC128RSA15 => SecurityPolicy::Basic128Rsa15,
            URI_BASIC256 => SecurityPolicy::Basic256,
            URI_BASIC256SHA256 => SecurityPolicy::Basic256Sha256,
            URI_AES128SHA256RSAOAEP => SecurityPolicy::Aes128Sha256RsaOaep,
            URI_AES256SHA256RSAPSS => SecurityPolicy::Aes256Sha256RsaPss,
            _ => SecurityPolicy::Unknown,
        }
    }

    /// `true` for `None`, where no signing or encryption is performed.
    pub fn is_none(self) -> bool {
        matches!(self, SecurityPolicy::None)
    }

    /// Length, in bytes, of the symmetric keys (signing key, encrypting
    /// key, IV) this policy derives via `derive_keys`.
    pub fn symmetric_key_lengths(self) -> (usize, usize, usize) {
        match self {
            SecurityPolicy::Basic128Rsa15 => (16, 16, 16),
            SecurityPolicy::Basic256
            | SecurityPolicy::Basic256Sha256
            | SecurityPolicy::Aes128Sha256RsaOaep
            | SecurityPolicy::Aes256Sha256RsaPss => (24, 32, 16),
            SecurityPolicy::None | SecurityPolicy::Unknown => (0, 0, 0),
        }
    }

    /// Derives (signing_key, encrypting_key, iv) from a secret and seed
    /// using the policy's pseudo-random function (`P_SHA1` for
    /// `Basic128Rsa15`/`Basic256`, `P_SHA256` for the SHA-256 policies), as
    /// specified in OPC UA Part 6 §6.7.5. `secret` and `seed` are the two
    /// nonces exchanged for the channel, swapped between the client's and
    /// server's key sets.
    pub fn derive_keys(self, secret: &[u8], seed: &[u8]) -> Result<(Vec<u8>, AesKey, Vec<u8>), Error> {
        let (sign_len, encrypt_len, iv_len) = self.symmetric_key_lengths();
        let total = sign_len + encrypt_len + iv_len;
        let prf = match self {
            SecurityPolicy::Basic128Rsa15 | SecurityPolicy::Basic256 => p_sha1(secret, seed, total),
            SecurityPolicy::Basic256Sha256
            | SecurityPolicy::Aes128Sha256RsaOaep
            | SecurityPolicy::Aes256Sha256RsaPss => p_sha256(secret, seed, total),
            SecurityPolicy::None | SecurityPolicy::Unknown => {
                return Err(Error::new(
                    StatusCode::BadSecurityPolicyRejected,
                    "cannot derive symmetric keys for this security policy",
                ))
            }
        };
        let signing_key = prf[..sign_len].to_vec();
        let encrypting_key = AesKey::new(self, &prf[sign_len..sign_len + encrypt_len]);
        let iv = prf[sign_len + encrypt_len..total].to_vec();
        Ok((signing_key, encrypting_key, iv))
    }

    /// HMAC-signs `data` with the policy's symmetric signature algorithm,
    /// used to authenticate MSG chunks once a secure channel is
    /// established.
    pub fn symmetric_sign(self, key: &[u8], data: &[u8]) -> Result<Vec<u8>, Error> {
        match self {
            SecurityPolicy::Basic128Rsa15 | SecurityPolicy::Basic256 => {
                let mut mac = Hmac::<Sha1>::new_from_slice(key)
                    .map_err(|e| Error::new(StatusCode::BadUnexpectedError, e.to_string()))?;
                mac.update(data);
                Ok(mac.finalize().into_bytes().to_vec())
            }
            SecurityPolicy::Basic256Sha256
            | SecurityPolicy::Aes128Sha256RsaOaep
            | SecurityPolicy::Aes256Sha256RsaPss => {
                let mut mac = Hmac::<Sha256>::new_from_slice(key)
                    .map_err(|e| Error::new(StatusCode::BadUnexpectedError, e.to_string()))?;
                mac.update(data);
                Ok(mac.finalize().into_bytes().to_vec())
            }
            SecurityPolicy::None | SecurityPolicy::Unknown => Ok(Vec::new()),
        }
    }

    /// The length in bytes of a symmetric signature produced by this
    /// policy.
    pub fn symmetric_signature_size(self) -> usize {
        match self {
            SecurityPolicy::Basic128Rsa15 | SecurityPolicy::Basic256 => 20,
            SecurityPolicy::Basic256Sha256
            | SecurityPolicy::Aes128Sha256RsaOaep
            | SecurityPolicy::Aes256Sha256RsaPss => 32,
            SecurityPolicy::None | SecurityPolicy::Unknown => 0,
        }
    }

    /// Signs `data` asymmetrically with the local private key, used for
    /// `newSessionSignature`/`newUserTokenSignature`.
    pub fn asymmetric_sign(self, key: &PrivateKey, data: &[u8]) -> Result<Vec<u8>, Error> {
        match self {
            SecurityPolicy::Basic128Rsa15 | SecurityPolicy::Basic256 => key.sign_sha1(data),
            SecurityPolicy::Basic256Sha256
            | SecurityPolicy::Aes128Sha256RsaOaep
            | SecurityPolicy::Aes256Sha256RsaPss => key.sign_sha256(data),
            SecurityPolicy::None | SecurityPolicy::Unknown => Err(Error::new(
                StatusCode::BadSecurityPolicyRejected,
                "security policy has no asymmetric signature algorithm",
            )),
        }
    }

    /// Verifies an asymmetric signature against the peer's public key,
    /// used for `verifySessionSignature`.
    pub fn asymmetric_verify(
        self,
        key: &PublicKey,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), Error> {
        match self {
            SecurityPolicy::Basic128Rsa15 | SecurityPolicy::Basic256 => {
                key.verify_sha1(data, signature)
            }
            SecurityPolicy::Basic256Sha256
            | SecurityPolicy::Aes128Sha256RsaOaep
            | SecurityPolicy::Aes256Sha256RsaPss => key.verify_sha256(data, signature),
            SecurityPolicy::None | SecurityPolicy::Unknown => Err(Error::new(
                StatusCode::BadSecurityPolicyRejected,
                "security policy has no asymmetric signature algorithm",
            )),
        }
    }

    /// Cipher block size used when padding a symmetric chunk body, in
    /// bytes. Zero for policies with no symmetric cipher.
    pub fn plain_block_size(self) -> usize {
        match self {
            SecurityPolicy::None | SecurityPolicy::Unknown => 0,
            _ => 16,
        }
    }

    /// Length, in bytes, of the nonce each side generates for the channel
    /// handshake — equal to the symmetric encrypting key length.
    pub fn secure_channel_nonce_length(self) -> usize {
        self.symmetric_key_lengths().1
    }

    /// Overhead in bytes of this policy's asymmetric encryption padding
    /// scheme, used to compute how much plaintext fits in one RSA block.
    fn asymmetric_encryption_padding_overhead(self) -> usize {
        match self {
            SecurityPolicy::Basic128Rsa15 => 11,
            SecurityPolicy::Basic256
            | SecurityPolicy::Basic256Sha256
            | SecurityPolicy::Aes128Sha256RsaOaep => 2 * 20 + 2,
            SecurityPolicy::Aes256Sha256RsaPss => 2 * 32 + 2,
            SecurityPolicy::None | SecurityPolicy::Unknown => 0,
        }
    }

    /// The amount of plaintext that fits in one RSA block of
    /// `key_byte_length` bytes under this policy's padding scheme.
    pub fn asymmetric_plain_text_block_size(self, key_byte_length: usize) -> usize {
        key_byte_length.saturating_sub(self.asymmetric_encryption_padding_overhead())
    }

    /// Encrypts `data` asymmetrically with the peer's public key, choosing
    /// PKCS1v15 or OAEP (SHA-1/SHA-256) per policy.
    pub fn asymmetric_encrypt(self, key: &PublicKey, data: &[u8]) -> Result<Vec<u8>, Error> {
        match self {
            SecurityPolicy::Basic128Rsa15 => key.encrypt_pkcs1v15(data),
            SecurityPolicy::Basic256
            | SecurityPolicy::Basic256Sha256
            | SecurityPolicy::Aes128Sha256RsaOaep => key.encrypt_oaep_sha1(data),
            SecurityPolicy::Aes256Sha256RsaPss => key.encrypt_oaep_sha256(data),
            SecurityPolicy::None | SecurityPolicy::Unknown => Err(Error::new(
                StatusCode::BadSecurityPolicyRejected,
                "security policy has no asymmetric encryption algorithm",
            )),
        }
    }

    /// Decrypts `data` asymmetrically with our private key, mirroring
    /// [`Self::asymmetric_encrypt`]'s padding choice.
    pub fn asymmetric_decrypt(self, key: &PrivateKey, data: &[u8]) -> Result<Vec<u8>, Error> {
        match self {
            SecurityPolicy::Basic128Rsa15 => key.decrypt_pkcs1v15(data),
            SecurityPolicy::Basic256
            | SecurityPolicy::Basic256Sha256
            | SecurityPolicy::Aes128Sha256RsaOaep => key.decrypt_oaep_sha1(data),
            SecurityPolicy::Aes256Sha256RsaPss => key.decrypt_oaep_sha256(data),
            SecurityPolicy::None | SecurityPolicy::Unknown => Err(Error::new(
                StatusCode::BadSecurityPolicyRejected,
                "security policy has no asymmetric encryption algorithm",
            )),
        }
    }
}

/// `P_SHA1`, the TLS-1.0-style pseudo-random function OPC UA reuses for
/// key derivation with SHA-1-based security policies.
fn p_sha1(secret: &[u8], seed: &[u8], length: usize) -> Vec<u8> {
    let mut result = Vec::with_capacity(length);
    let mut a = hmac_sha1(secret, seed);
    while result.len() < length {
        let mut input = a.clone();
        input.extend_from_slice(seed);
        result.extend_from_slice(&hmac_sha1(secret, &input));
        a = hmac_sha1(secret, &a);
    }
    result.truncate(length);
    result
}

/// `P_SHA256`, the SHA-256 variant used by the newer security policies.
fn p_sha256(secret: &[u8], seed: &[u8], length: usize) -> Vec<u8> {
    let mut result = Vec::with_capacity(length);
    let mut a = hmac_sha256(secret, seed);
    while result.len() < length {
        let mut input = a.clone();
        input.extend_from_slice(seed);
        result.extend_from_slice(&hmac_sha256(secret, &input));
        a = hmac_sha256(secret, &a);
    }
    result.truncate(length);
    result
}

fn hmac_sha1(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = Hmac::<Sha1>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_roundtrip() {
        for policy in [
            SecurityPolicy::None,
            SecurityPolicy::Basic128Rsa15,
            SecurityPolicy::Basic256,
            SecurityPolicy::Basic256Sha256,
        ] {
            assert_eq!(SecurityPolicy::from_uri(policy.uri()), policy);
        }
    }

    #[test]
    fn unknown_uri_is_unknown() {
        assert_eq!(
            SecurityPolicy::from_uri("http://example.org/not-a-policy"),
            SecurityPolicy::Unknown
        );
    }

    #[test]
    fn derive_keys_produces_expected_lengths() {
        let secret = [1u8; 32];
        let seed = [2u8; 32];
        let (sign_key, enc_key, iv) = SecurityPolicy::Basic256Sha256
            .derive_keys(&secret, &seed)
            .unwrap();
        assert_eq!(sign_key.len(), 32);
        assert_eq!(enc_key.value().len(), 32);
        assert_eq!(iv.len(), 16);
    }

    #[test]
    fn p_sha1_is_deterministic() {
        let a = p_sha1(b"secret", b"seed", 40);
        let b = p_sha1(b"secret", b"seed", 40);
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
    }
}
