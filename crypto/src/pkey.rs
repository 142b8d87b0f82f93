// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! RSA private/public key wrappers used for asymmetric signing, signature
//! verification, and the encryption/decryption steps security policies
//! above `None` require during the secure channel handshake.

use opcua_types::{Error, StatusCode};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs1v15::{Signature as Pkcs1v15Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::Sha256;

fn crypto_err(context: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Error {
    Error::new(StatusCode::BadSecurityChecksFailed, context)
}

/// Wraps an RSA private key. Used to sign outgoing nonces/certificates and
/// to decrypt payloads the server encrypted with our public key.
#[derive(Clone)]
pub struct PrivateKey(RsaPrivateKey);

impl PrivateKey {
    /// Parses a PKCS#1 PEM-encoded RSA private key.
    pub fn from_pem(pem: &str) -> Result<PrivateKey, Error> {
        RsaPrivateKey::from_pkcs1_pem(pem)
            .map(PrivateKey)
            .map_err(crypto_err)
    }

    /// The key size in bits, used to size signature and encryption buffers.
    pub fn bit_length(&self) -> usize {
        rsa::traits::PublicKeyParts::size(&self.0) * 8
    }

    /// Size in bytes of a signature or encrypted block produced by this key.
    pub fn byte_length(&self) -> usize {
        rsa::traits::PublicKeyParts::size(&self.0)
    }

    /// The matching public key, used to hand the corresponding `X509`
    /// certificate's key back out for verification paths that only need
    /// the public half.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(RsaPublicKey::from(&self.0))
    }

    /// Signs `data` with RSA-PKCS1v15/SHA1 (used by `Basic128Rsa15`).
    pub fn sign_sha1(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let signing_key = SigningKey::<Sha1>::new(self.0.clone());
        Ok(signing_key.sign(data).to_vec())
    }

    /// Signs `data` with RSA-PKCS1v15/SHA256 (used by `Basic256Sha256` and
    /// `Aes128Sha256RsaOaep`).
    pub fn sign_sha256(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let signing_key = SigningKey::<Sha256>::new(self.0.clone());
        Ok(signing_key.sign(data).to_vec())
    }

    /// Decrypts an RSA-PKCS1v15-padded block.
    pub fn decrypt_pkcs1v15(&self, src: &[u8]) -> Result<Vec<u8>, Error> {
        self.0.decrypt(Pkcs1v15Encrypt, src).map_err(crypto_err)
    }

    /// Decrypts an RSA-OAEP/SHA1-padded block.
    pub fn decrypt_oaep_sha1(&self, src: &[u8]) -> Result<Vec<u8>, Error> {
        self.0.decrypt(Oaep::new::<Sha1>(), src).map_err(crypto_err)
    }

    /// Decrypts an RSA-OAEP/SHA256-padded block.
    pub fn decrypt_oaep_sha256(&self, src: &[u8]) -> Result<Vec<u8>, Error> {
        self.0
            .decrypt(Oaep::new::<Sha256>(), src)
            .map_err(crypto_err)
    }
}

/// Wraps an RSA public key, usually extracted from a peer's X.509
/// certificate. Used to verify signatures and encrypt data the peer will
/// decrypt with its private key.
#[derive(Clone)]
pub struct PublicKey(RsaPublicKey);

impl PublicKey {
    /// Parses a PKCS#1 DER-encoded RSA public key.
    pub fn from_der(der: &[u8]) -> Result<PublicKey, Error> {
        RsaPublicKey::from_pkcs1_der(der)
            .map(PublicKey)
            .map_err(crypto_err)
    }

    /// Size in bytes of a signature or encrypted block produced against
    /// this key.
    pub fn byte_length(&self) -> usize {
        rsa::traits::PublicKeyParts::size(&self.0)
    }

    /// Verifies an RSA-PKCS1v15/SHA1 signature.
    pub fn verify_sha1(&self, data: &[u8], signature: &[u8]) -> Result<(), Error> {
        let verifying_key = VerifyingKey::<Sha1>::new(self.0.clone());
        let sig = Pkcs1v15Signature::try_from(signature).map_err(crypto_err)?;
        verifying_key.verify(data, &sig).map_err(crypto_err)
    }

    /// Verifies an RSA-PKCS1v15/SHA256 signature.
    pub fn verify_sha256(&self, data: &[u8], signature: &[u8]) -> Result<(), Error> {
        let verifying_key = VerifyingKey::<Sha256>::new(self.0.clone());
        let sig = Pkcs1v15Signature::try_from(signature).map_err(crypto_err)?;
        verifying_key.verify(data, &sig).map_err(crypto_err)
    }

    /// Encrypts `src` with RSA-PKCS1v15 padding.
    pub fn encrypt_pkcs1v15(&self, src: &[u8]) -> Result<Vec<u8>, Error> {
        let mut rng = rand::thread_rng();
        self.0
            .encrypt(&mut rng, Pkcs1v15Encrypt, src)
            .map_err(crypto_err)
    }

    /// Encrypts `src` with RSA-OAEP/SHA1 padding.
    pub fn encrypt_oaep_sha1(&self, src: &[u8]) -> Result<Vec<u8>, Error> {
        let mut rng = rand::thread_rng();
        self.0
            .encrypt(&mut rng, Oaep::new::<Sha1>(), src)
            .map_err(crypto_err)
    }

    /// Encrypts `src` with RSA-OAEP/SHA256 padding.
    pub fn encrypt_oaep_sha256(&self, src: &[u8]) -> Result<Vec<u8>, Error> {
        let mut rng = rand::thread_rng();
        self.0
            .encrypt(&mut rng, Oaep::new::<Sha256>(), src)
            .map_err(crypto_err)
    }
}
