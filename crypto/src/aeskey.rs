// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Symmetric encryption / decryption wrapper for the secure channel's
//! per-message payload encryption.

use aes::cipher::{
    block_padding::NoPadding, generic_array::GenericArray, BlockDecryptMut, BlockEncryptMut,
    KeyIvInit,
};

use opcua_types::{Error, StatusCode};

use crate::security_policy::SecurityPolicy;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const AES_BLOCK_SIZE: usize = 16;
const AES128_KEY_SIZE: usize = 16;
const AES256_KEY_SIZE: usize = 32;

type AesArray128 = GenericArray<u8, <aes::Aes128 as aes::cipher::BlockSizeUser>::BlockSize>;
type AesArray256 = GenericArray<u8, <aes::Aes256 as aes::cipher::KeySizeUser>::KeySize>;

type EncryptResult = Result<usize, Error>;

/// Wraps a derived AES key, bound to the security policy that determines
/// its key length, block size, and cipher mode.
#[derive(Debug, Clone)]
pub struct AesKey {
    value: Vec<u8>,
    security_policy: SecurityPolicy,
}

impl AesKey {
    /// Creates a new AES key with the given security policy and raw key
    /// bytes, as produced by the policy's key derivation function.
    pub fn new(security_policy: SecurityPolicy, value: &[u8]) -> AesKey {
        AesKey {
            value: value.to_vec(),
            security_policy,
        }
    }

    /// The raw key bytes.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    fn validate_aes_args(&self, src: &[u8], iv: &[u8], dst: &mut [u8]) -> Result<(), Error> {
        if dst.len() < src.len() + self.block_size() {
            Err(Error::new(
                StatusCode::BadUnexpectedError,
                format!(
                    "dst buffer is too small, {} vs {} + {}",
                    src.len(),
                    dst.len(),
                    self.block_size()
                ),
            ))
        } else if iv.len() != self.iv_length() {
            Err(Error::new(
                StatusCode::BadUnexpectedError,
                format!("IV is not the expected size, len = {}", iv.len()),
            ))
        } else if src.len() % self.block_size() != 0 {
            Err(Error::new(
                StatusCode::BadUnexpectedError,
                format!("source length {} is not a multiple of the block size", src.len()),
            ))
        } else {
            Ok(())
        }
    }

    fn encrypt_aes128_cbc(&self, src: &[u8], iv: &[u8], dst: &mut [u8]) -> EncryptResult {
        self.validate_aes_args(src, iv, dst)?;
        Aes128CbcEnc::new(
            AesArray128::from_slice(&self.value),
            AesArray128::from_slice(iv),
        )
        .encrypt_padded_b2b_mut::<NoPadding>(src, dst)
        .map_err(|e| Error::new(StatusCode::BadUnexpectedError, e.to_string()))?;
        Ok(src.len())
    }

    fn encrypt_aes256_cbc(&self, src: &[u8], iv: &[u8], dst: &mut [u8]) -> EncryptResult {
        self.validate_aes_args(src, iv, dst)?;
        Aes256CbcEnc::new(
            AesArray256::from_slice(&self.value),
            AesArray128::from_slice(iv),
        )
        .encrypt_padded_b2b_mut::<NoPadding>(src, dst)
        .map_err(|e| Error::new(StatusCode::BadUnexpectedError, e.to_string()))?;
        Ok(src.len())
    }

    fn decrypt_aes128_cbc(&self, src: &[u8], iv: &[u8], dst: &mut [u8]) -> EncryptResult {
        self.validate_aes_args(src, iv, dst)?;
        Aes128CbcDec::new(
            AesArray128::from_slice(&self.value),
            AesArray128::from_slice(iv),
        )
        .decrypt_padded_b2b_mut::<NoPadding>(src, dst)
        .map_err(|e| Error::new(StatusCode::BadUnexpectedError, e.to_string()))?;
        Ok(src.len())
    }

    fn decrypt_aes256_cbc(&self, src: &[u8], iv: &[u8], dst: &mut [u8]) -> EncryptResult {
        self.validate_aes_args(src, iv, dst)?;
        Aes256CbcDec::new(
            AesArray256::from_slice(&self.value),
            AesArray128::from_slice(iv),
        )
        .decrypt_padded_b2b_mut::<NoPadding>(src, dst)
        .map_err(|e| Error::new(StatusCode::BadUnexpectedError, e.to_string()))?;
        Ok(src.len())
    }

    /// Cipher block size for this key's security policy, in bytes.
    pub fn block_size(&self) -> usize {
        match self.security_policy {
            SecurityPolicy::Basic128Rsa15
            | SecurityPolicy::Basic256
            | SecurityPolicy::Basic256Sha256
            | SecurityPolicy::Aes128Sha256RsaOaep
            | SecurityPolicy::Aes256Sha256RsaPss => AES_BLOCK_SIZE,
            _ => 0,
        }
    }

    /// IV length for this key's security policy, in bytes.
    pub fn iv_length(&self) -> usize {
        self.block_size()
    }

    /// Key length for this key's security policy, in bytes.
    pub fn key_length(&self) -> usize {
        match self.security_policy {
            SecurityPolicy::Basic128Rsa15 => AES128_KEY_SIZE,
            SecurityPolicy::Basic256
            | SecurityPolicy::Basic256Sha256
            | SecurityPolicy::Aes128Sha256RsaOaep
            | SecurityPolicy::Aes256Sha256RsaPss => AES256_KEY_SIZE,
            _ => 0,
        }
    }

    /// Encrypts `src` into `dst`, choosing AES-128 or AES-256 CBC per the
    /// key's security policy.
    pub fn encrypt(&self, src: &[u8], iv: &[u8], dst: &mut [u8]) -> EncryptResult {
        match self.security_policy {
            SecurityPolicy::Basic128Rsa15 => self.encrypt_aes128_cbc(src, iv, dst),
            SecurityPolicy::Basic256
            | SecurityPolicy::Basic256Sha256
            | SecurityPolicy::Aes128Sha256RsaOaep
            | SecurityPolicy::Aes256Sha256RsaPss => self.encrypt_aes256_cbc(src, iv, dst),
            _ => Err(Error::new(
                StatusCode::BadSecurityPolicyRejected,
                "security policy has no symmetric cipher",
            )),
        }
    }

    /// Decrypts `src` into `dst`. The IV is the nonce exchanged for the
    /// secure channel.
    pub fn decrypt(&self, src: &[u8], iv: &[u8], dst: &mut [u8]) -> EncryptResult {
        match self.security_policy {
            SecurityPolicy::Basic128Rsa15 => self.decrypt_aes128_cbc(src, iv, dst),
            SecurityPolicy::Basic256
            | SecurityPolicy::Basic256Sha256
            | SecurityPolicy::Aes128Sha256RsaOaep
            | SecurityPolicy::Aes256Sha256RsaPss => self.decrypt_aes256_cbc(src, iv, dst),
            _ => Err(Error::new(
                StatusCode::BadSecurityPolicyRejected,
                "security policy has no symmetric cipher",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_aes128() {
        let key = AesKey::new(SecurityPolicy::Basic128Rsa15, &[1u8; 16]);
        let iv = [0u8; 16];
        let src = [7u8; 32];
        let mut ciphertext = vec![0u8; src.len() + key.block_size()];
        let n = key.encrypt(&src, &iv, &mut ciphertext).unwrap();
        let mut plaintext = vec![0u8; n + key.block_size()];
        let m = key.decrypt(&ciphertext[..n], &iv, &mut plaintext).unwrap();
        assert_eq!(&plaintext[..m], &src[..]);
    }
}
