// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Messages exchanged to create, activate, and close a session on top of
//! an open secure channel.

use std::io::{Read, Write};

use crate::byte_string::ByteString;
use crate::diagnostic_info::DiagnosticInfo;
use crate::encoding::{BinaryDecodable, BinaryEncodable, EncodingResult};
use crate::extension_object::ExtensionObject;
use crate::node_id::NodeId;
use crate::object_id::ObjectId;
use crate::request_header::RequestHeader;
use crate::response_header::ResponseHeader;
use crate::status_code::StatusCode;
use crate::string::UAString;
use crate::Context;

use super::endpoints::{ApplicationDescription, EndpointDescription};
use super::identity_tokens::SignatureData;
use super::MessageInfo;

/// A server-signed software certificate. The client neither validates nor
/// presents these; the field exists only to keep `CreateSessionResponse`'s
/// wire layout intact.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignedSoftwareCertificate {
    pub certificate_data: ByteString,
    pub signature: ByteString,
}

impl BinaryEncodable for SignedSoftwareCertificate {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.certificate_data.byte_len(ctx) + self.signature.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.certificate_data.encode(stream, ctx)?;
        self.signature.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for SignedSoftwareCertificate {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(SignedSoftwareCertificate {
            certificate_data: ByteString::decode(stream, ctx)?,
            signature: ByteString::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateSessionRequest {
    pub request_header: RequestHeader,
    pub client_description: ApplicationDescription,
    pub server_uri: UAString,
    pub endpoint_url: UAString,
    pub session_name: UAString,
    pub client_nonce: ByteString,
    pub client_certificate: ByteString,
    pub requested_session_timeout: f64,
    pub max_response_message_size: u32,
}

impl MessageInfo for CreateSessionRequest {
    fn type_id(&self) -> ObjectId {
        ObjectId::CreateSessionRequest_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for CreateSessionRequest {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.request_header.byte_len(ctx)
            + self.client_description.byte_len(ctx)
            + self.server_uri.byte_len(ctx)
            + self.endpoint_url.byte_len(ctx)
            + self.session_name.byte_len(ctx)
            + self.client_nonce.byte_len(ctx)
            + self.client_certificate.byte_len(ctx)
            + self.requested_session_timeout.byte_len(ctx)
            + 4
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.request_header.encode(stream, ctx)?;
        self.client_description.encode(stream, ctx)?;
        self.server_uri.encode(stream, ctx)?;
        self.endpoint_url.encode(stream, ctx)?;
        self.session_name.encode(stream, ctx)?;
        self.client_nonce.encode(stream, ctx)?;
        self.client_certificate.encode(stream, ctx)?;
        self.requested_session_timeout.encode(stream, ctx)?;
        crate::write_u32(stream, self.max_response_message_size)?;
        Ok(())
    }
}

impl BinaryDecodable for CreateSessionRequest {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(CreateSessionRequest {
            request_header: RequestHeader::decode(stream, ctx)?,
            client_description: ApplicationDescription::decode(stream, ctx)?,
            server_uri: UAString::decode(stream, ctx)?,
            endpoint_url: UAString::decode(stream, ctx)?,
            session_name: UAString::decode(stream, ctx)?,
            client_nonce: ByteString::decode(stream, ctx)?,
            client_certificate: ByteString::decode(stream, ctx)?,
            requested_session_timeout: f64::decode(stream, ctx)?,
            max_response_message_size: crate::read_u32(stream)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateSessionResponse {
    pub response_header: ResponseHeader,
    pub session_id: NodeId,
    pub authentication_token: NodeId,
    pub revised_session_timeout: f64,
    pub server_nonce: ByteString,
    pub server_certificate: ByteString,
    pub server_endpoints: Option<Vec<EndpointDescription>>,
    pub server_software_certificates: Option<Vec<SignedSoftwareCertificate>>,
    pub server_signature: SignatureData,
    pub max_request_message_size: u32,
}

impl MessageInfo for CreateSessionResponse {
    fn type_id(&self) -> ObjectId {
        ObjectId::CreateSessionResponse_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for CreateSessionResponse {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.response_header.byte_len(ctx)
            + self.session_id.byte_len(ctx)
            + self.authentication_token.byte_len(ctx)
            + self.revised_session_timeout.byte_len(ctx)
            + self.server_nonce.byte_len(ctx)
            + self.server_certificate.byte_len(ctx)
            + self.server_endpoints.byte_len(ctx)
            + self.server_software_certificates.byte_len(ctx)
            + self.server_signature.byte_len(ctx)
            + 4
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.response_header.encode(stream, ctx)?;
        self.session_id.encode(stream, ctx)?;
        self.authentication_token.encode(stream, ctx)?;
        self.revised_session_timeout.encode(stream, ctx)?;
        self.server_nonce.encode(stream, ctx)?;
        self.server_certificate.encode(stream, ctx)?;
        self.server_endpoints.encode(stream, ctx)?;
        self.server_software_certificates.encode(stream, ctx)?;
        self.server_signature.encode(stream, ctx)?;
        crate::write_u32(stream, self.max_request_message_size)?;
        Ok(())
    }
}

impl BinaryDecodable for CreateSessionResponse {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(CreateSessionResponse {
            response_header: ResponseHeader::decode(stream, ctx)?,
            session_id: NodeId::decode(stream, ctx)?,
            authentication_token: NodeId::decode(stream, ctx)?,
            revised_session_timeout: f64::decode(stream, ctx)?,
            server_nonce: ByteString::decode(stream, ctx)?,
            server_certificate: ByteString::decode(stream, ctx)?,
            server_endpoints: BinaryDecodable::decode(stream, ctx)?,
            server_software_certificates: BinaryDecodable::decode(stream, ctx)?,
            server_signature: SignatureData::decode(stream, ctx)?,
            max_request_message_size: crate::read_u32(stream)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActivateSessionRequest {
    pub request_header: RequestHeader,
    pub client_signature: SignatureData,
    pub client_software_certificates: Option<Vec<SignedSoftwareCertificate>>,
    pub locale_ids: Option<Vec<UAString>>,
    pub user_identity_token: ExtensionObject,
    pub user_token_signature: SignatureData,
}

impl MessageInfo for ActivateSessionRequest {
    fn type_id(&self) -> ObjectId {
        ObjectId::ActivateSessionRequest_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for ActivateSessionRequest {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.request_header.byte_len(ctx)
            + self.client_signature.byte_len(ctx)
            + self.client_software_certificates.byte_len(ctx)
            + self.locale_ids.byte_len(ctx)
            + self.user_identity_token.byte_len(ctx)
            + self.user_token_signature.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.request_header.encode(stream, ctx)?;
        self.client_signature.encode(stream, ctx)?;
        self.client_software_certificates.encode(stream, ctx)?;
        self.locale_ids.encode(stream, ctx)?;
        self.user_identity_token.encode(stream, ctx)?;
        self.user_token_signature.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for ActivateSessionRequest {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(ActivateSessionRequest {
            request_header: RequestHeader::decode(stream, ctx)?,
            client_signature: SignatureData::decode(stream, ctx)?,
            client_software_certificates: BinaryDecodable::decode(stream, ctx)?,
            locale_ids: BinaryDecodable::decode(stream, ctx)?,
            user_identity_token: ExtensionObject::decode(stream, ctx)?,
            user_token_signature: SignatureData::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActivateSessionResponse {
    pub response_header: ResponseHeader,
    pub server_nonce: ByteString,
    pub results: Option<Vec<StatusCode>>,
    pub diagnostic_infos: Option<Vec<DiagnosticInfo>>,
}

impl MessageInfo for ActivateSessionResponse {
    fn type_id(&self) -> ObjectId {
        ObjectId::ActivateSessionResponse_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for ActivateSessionResponse {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.response_header.byte_len(ctx)
            + self.server_nonce.byte_len(ctx)
            + self.results.byte_len(ctx)
            + self.diagnostic_infos.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.response_header.encode(stream, ctx)?;
        self.server_nonce.encode(stream, ctx)?;
        self.results.encode(stream, ctx)?;
        self.diagnostic_infos.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for ActivateSessionResponse {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(ActivateSessionResponse {
            response_header: ResponseHeader::decode(stream, ctx)?,
            server_nonce: ByteString::decode(stream, ctx)?,
            results: BinaryDecodable::decode(stream, ctx)?,
            diagnostic_infos: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CloseSessionRequest {
    pub request_header: RequestHeader,
    pub delete_subscriptions: bool,
}

impl MessageInfo for CloseSessionRequest {
    fn type_id(&self) -> ObjectId {
        ObjectId::CloseSessionRequest_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for CloseSessionRequest {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.request_header.byte_len(ctx) + self.delete_subscriptions.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.request_header.encode(stream, ctx)?;
        self.delete_subscriptions.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for CloseSessionRequest {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(CloseSessionRequest {
            request_header: RequestHeader::decode(stream, ctx)?,
            delete_subscriptions: bool::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CloseSessionResponse {
    pub response_header: ResponseHeader,
}

impl MessageInfo for CloseSessionResponse {
    fn type_id(&self) -> ObjectId {
        ObjectId::CloseSessionResponse_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for CloseSessionResponse {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.response_header.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.response_header.encode(stream, ctx)
    }
}

impl BinaryDecodable for CloseSessionResponse {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(CloseSessionResponse {
            response_header: ResponseHeader::decode(stream, ctx)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::DecodingOptions;

    fn ctx() -> Context<'static> {
        Context::new(DecodingOptions::default())
    }

    #[test]
    fn create_session_response_decodes_numeric_session_id() {
        let response = CreateSessionResponse {
            response_header: ResponseHeader::new_good(1),
            session_id: NodeId::new(1, 1u32),
            authentication_token: NodeId::new(0, ByteString::from(vec![1, 2, 3])),
            revised_session_timeout: 6_000_000.0,
            server_nonce: ByteString::null(),
            server_certificate: ByteString::null(),
            server_endpoints: None,
            server_software_certificates: None,
            server_signature: SignatureData::default(),
            max_request_message_size: 0,
        };

        let ctx = ctx();
        let len = response.byte_len(&ctx);
        let mut buf = Cursor::new(vec![0u8; len]);
        response.encode(&mut buf, &ctx).unwrap();
        buf.set_position(0);

        let decoded = CreateSessionResponse::decode(&mut buf, &ctx).unwrap();
        assert_eq!(decoded.session_id, NodeId::new(1, 1u32));
        assert!(matches!(
            decoded.authentication_token.identifier,
            crate::node_id::Identifier::ByteString(_)
        ));
        assert_eq!(decoded.revised_session_timeout, 6_000_000.0);
    }

    #[test]
    fn close_session_request_with_delete_subscriptions_serializes_final_byte_as_one() {
        let request = CloseSessionRequest {
            request_header: RequestHeader::new(&NodeId::null(), 1, 0),
            delete_subscriptions: true,
        };

        let ctx = ctx();
        let len = request.byte_len(&ctx);
        let mut buf = Vec::with_capacity(len);
        let mut cursor = Cursor::new(&mut buf);
        request.encode(&mut cursor, &ctx).unwrap();

        assert_eq!(buf.last().copied(), Some(0x01));

        let mut cursor = Cursor::new(buf);
        let decoded = CloseSessionRequest::decode(&mut cursor, &ctx).unwrap();
        assert_eq!(decoded, request);
    }
}
