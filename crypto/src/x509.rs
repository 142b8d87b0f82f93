// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Wraps a DER-encoded X.509 certificate, as exchanged raw (not PEM) over
//! the wire in `CreateSessionRequest`/`CreateSessionResponse` and
//! `OpenSecureChannelRequest`.

use chrono::{DateTime, Utc};
use opcua_types::{ByteString, Error, StatusCode};
use x509_cert::der::Decode;
use x509_cert::Certificate;

use crate::pkey::PublicKey;

fn crypto_err(context: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Error {
    Error::new(StatusCode::BadCertificateInvalid, context)
}

fn to_chrono(dt: x509_cert::der::DateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(dt.unix_duration().as_secs() as i64, 0).unwrap_or(Utc::now())
}

/// A parsed X.509 certificate, holding on to the original DER bytes for
/// passthrough into wire fields that want the raw form back.
#[derive(Clone)]
pub struct X509 {
    der: Vec<u8>,
    cert: Certificate,
}

impl X509 {
    /// Parses a DER-encoded certificate, as found in a `ByteString` wire
    /// field.
    pub fn from_der(der: &[u8]) -> Result<X509, Error> {
        let cert = Certificate::from_der(der).map_err(crypto_err)?;
        Ok(X509 {
            der: der.to_vec(),
            cert,
        })
    }

    /// The original DER bytes, ready to embed back into a `ByteString`
    /// wire field.
    pub fn as_byte_string(&self) -> ByteString {
        ByteString::from(self.der.clone())
    }

    /// The certificate's RSA public key, used to verify signatures the
    /// holder of the matching private key produced, and to encrypt data
    /// only that holder can decrypt.
    pub fn public_key(&self) -> Result<PublicKey, Error> {
        let spki = &self.cert.tbs_certificate.subject_public_key_info;
        let der = spki
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| crypto_err("certificate public key is not byte-aligned"))?;
        PublicKey::from_der(der)
    }

    /// The certificate's validity window.
    pub fn validity(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let validity = &self.cert.tbs_certificate.validity;
        (
            to_chrono(validity.not_before.to_date_time()),
            to_chrono(validity.not_after.to_date_time()),
        )
    }

    /// Returns `true` if `now` falls within the certificate's validity
    /// window.
    pub fn is_time_valid(&self, now: DateTime<Utc>) -> bool {
        let (not_before, not_after) = self.validity();
        now >= not_before && now <= not_after
    }

    /// The certificate's SHA-1 thumbprint, sent in the asymmetric security
    /// header so the peer can tell us which of its certificates we
    /// encrypted to.
    pub fn thumbprint(&self) -> Thumbprint {
        Thumbprint::new(&self.der)
    }
}

/// A SHA-1 digest of a certificate's DER bytes, always
/// [`Thumbprint::THUMBPRINT_SIZE`] bytes long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbprint {
    value: [u8; Thumbprint::THUMBPRINT_SIZE],
}

impl Thumbprint {
    /// Length in bytes of a SHA-1 thumbprint.
    pub const THUMBPRINT_SIZE: usize = 20;

    /// Computes the thumbprint of a DER-encoded certificate.
    pub fn new(der: &[u8]) -> Thumbprint {
        use sha1::{Digest, Sha1};
        let digest = Sha1::digest(der);
        let mut value = [0u8; Thumbprint::THUMBPRINT_SIZE];
        value.copy_from_slice(&digest);
        Thumbprint { value }
    }

    /// The raw thumbprint bytes.
    pub fn as_byte_string(&self) -> ByteString {
        ByteString::from(self.value.to_vec())
    }

    /// Checks whether `bytes` (e.g. from a `receiver_certificate_thumbprint`
    /// wire field) matches this thumbprint.
    pub fn matches(&self, bytes: &[u8]) -> bool {
        self.value.as_slice() == bytes
    }
}
