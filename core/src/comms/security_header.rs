// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! The security header carried in every chunk, describing which key
//! material (if any) secures it. `OpenSecureChannel` chunks carry an
//! [`AsymmetricSecurityHeader`]; every other chunk carries a
//! [`SymmetricSecurityHeader`] naming the current token.

use std::io::{Read, Write};

use opcua_crypto::{SecurityPolicy, Thumbprint, X509};
use opcua_types::{
    constants, ByteString, DecodingOptions, EncodingResult, Error, SimpleBinaryDecodable,
    SimpleBinaryEncodable, StatusCode, UAString,
};

/// Either form of security header a chunk can carry. Which form is present
/// is determined by the chunk's message type, not by a tag on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum SecurityHeader {
    /// Carried by `OpenSecureChannel` chunks.
    Asymmetric(AsymmetricSecurityHeader),
    /// Carried by `Message`/`CloseSecureChannel` chunks.
    Symmetric(SymmetricSecurityHeader),
}

impl SimpleBinaryEncodable for SecurityHeader {
    fn byte_len(&self) -> usize {
        match self {
            SecurityHeader::Asymmetric(h) => h.byte_len(),
            SecurityHeader::Symmetric(h) => h.byte_len(),
        }
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S) -> EncodingResult<()> {
        match self {
            SecurityHeader::Asymmetric(h) => h.encode(stream),
            SecurityHeader::Symmetric(h) => h.encode(stream),
        }
    }
}

impl SecurityHeader {
    /// Decodes a security header. The chunk's message type (known from the
    /// already-decoded chunk header) picks which form to expect.
    pub fn decode_from_stream<S: Read + ?Sized>(
        stream: &mut S,
        is_open_secure_channel: bool,
        decoding_options: &DecodingOptions,
    ) -> EncodingResult<Self> {
        if is_open_secure_channel {
            let header = AsymmetricSecurityHeader::decode(stream, decoding_options)?;

            let policy = if header.security_policy_uri.is_null() {
                SecurityPolicy::None
            } else {
                SecurityPolicy::from_uri(header.security_policy_uri.as_ref())
            };
            if policy == SecurityPolicy::Unknown {
                return Err(Error::new(
                    StatusCode::BadSecurityPolicyRejected,
                    format!(
                        "security policy of chunk is unknown: {:?}",
                        header.security_policy_uri
                    ),
                ));
            }
            Ok(SecurityHeader::Asymmetric(header))
        } else {
            Ok(SecurityHeader::Symmetric(SymmetricSecurityHeader::decode(
                stream,
                decoding_options,
            )?))
        }
    }
}

/// Security header for symmetric (AES/HMAC) secured chunks, naming the
/// token whose derived keys were used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymmetricSecurityHeader {
    /// Id of the security token these keys were derived from.
    pub token_id: u32,
}

impl SimpleBinaryEncodable for SymmetricSecurityHeader {
    fn byte_len(&self) -> usize {
        4
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S) -> EncodingResult<()> {
        self.token_id.encode(stream)
    }
}

impl SimpleBinaryDecodable for SymmetricSecurityHeader {
    fn decode<S: Read + ?Sized>(
        stream: &mut S,
        decoding_options: &DecodingOptions,
    ) -> EncodingResult<Self> {
        Ok(SymmetricSecurityHeader {
            token_id: u32::decode(stream, decoding_options)?,
        })
    }
}

/// Security header for the asymmetric (RSA) secured `OpenSecureChannel`
/// request/response, naming the policy and certificates in play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsymmetricSecurityHeader {
    /// URI of the negotiated security policy.
    pub security_policy_uri: UAString,
    /// Sender's certificate, raw DER bytes, null if `SecurityPolicy::None`.
    pub sender_certificate: ByteString,
    /// SHA-1 thumbprint of the certificate the sender encrypted to.
    pub receiver_certificate_thumbprint: ByteString,
}

impl SimpleBinaryEncodable for AsymmetricSecurityHeader {
    fn byte_len(&self) -> usize {
        self.security_policy_uri.byte_len()
            + self.sender_certificate.byte_len()
            + self.receiver_certificate_thumbprint.byte_len()
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S) -> EncodingResult<()> {
        self.security_policy_uri.encode(stream)?;
        self.sender_certificate.encode(stream)?;
        self.receiver_certificate_thumbprint.encode(stream)
    }
}

impl SimpleBinaryDecodable for AsymmetricSecurityHeader {
    fn decode<S: Read + ?Sized>(
        stream: &mut S,
        decoding_options: &DecodingOptions,
    ) -> EncodingResult<Self> {
        let security_policy_uri = UAString::decode(stream, decoding_options)?;
        let sender_certificate = ByteString::decode(stream, decoding_options)?;
        let receiver_certificate_thumbprint = ByteString::decode(stream, decoding_options)?;

        if sender_certificate
            .value
            .as_ref()
            .is_some_and(|v| v.len() >= constants::MAX_CERTIFICATE_LENGTH)
        {
            return Err(Error::new(
                StatusCode::BadEncodingLimitsExceeded,
                "sender certificate exceeds the maximum certificate size",
            ));
        }
        let thumbprint_len = receiver_certificate_thumbprint
            .value
            .as_ref()
            .map(|v| v.len())
            .unwrap_or(0);
        if thumbprint_len > 0 && thumbprint_len != Thumbprint::THUMBPRINT_SIZE {
            return Err(Error::decoding(format!(
                "receiver certificate thumbprint is {} bytes, expected {}",
                thumbprint_len,
                Thumbprint::THUMBPRINT_SIZE
            )));
        }

        Ok(AsymmetricSecurityHeader {
            security_policy_uri,
            sender_certificate,
            receiver_certificate_thumbprint,
        })
    }
}

impl AsymmetricSecurityHeader {
    /// The header sent when no security is in effect: empty certificates,
    /// the `None` policy URI.
    pub fn none() -> AsymmetricSecurityHeader {
        AsymmetricSecurityHeader {
            security_policy_uri: UAString::from(SecurityPolicy::None.uri()),
            sender_certificate: ByteString::null(),
            receiver_certificate_thumbprint: ByteString::null(),
        }
    }

    /// Builds a header naming the sender's certificate and the thumbprint
    /// of the server certificate it encrypted to.
    pub fn new(
        security_policy: SecurityPolicy,
        sender_certificate: &X509,
        receiver_certificate_thumbprint: ByteString,
    ) -> AsymmetricSecurityHeader {
        AsymmetricSecurityHeader {
            security_policy_uri: UAString::from(security_policy.uri()),
            sender_certificate: sender_certificate.as_byte_string(),
            receiver_certificate_thumbprint,
        }
    }
}

/// Part of every chunk's header carrying the running sequence number and
/// the request id it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceHeader {
    /// Monotonically increasing per-channel sequence number.
    pub sequence_number: u32,
    /// Id correlating chunks and responses with the originating request.
    pub request_id: u32,
}

impl SimpleBinaryEncodable for SequenceHeader {
    fn byte_len(&self) -> usize {
        8
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S) -> EncodingResult<()> {
        self.sequence_number.encode(stream)?;
        self.request_id.encode(stream)
    }
}

impl SimpleBinaryDecodable for SequenceHeader {
    fn decode<S: Read + ?Sized>(
        stream: &mut S,
        decoding_options: &DecodingOptions,
    ) -> EncodingResult<Self> {
        Ok(SequenceHeader {
            sequence_number: u32::decode(stream, decoding_options)?,
            request_id: u32::decode(stream, decoding_options)?,
        })
    }
}
