// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Application and endpoint description structures used by discovery and
//! session creation.

use std::io::{Read, Write};

use crate::byte_string::ByteString;
use crate::encoding::{BinaryDecodable, BinaryEncodable, EncodingResult};
use crate::enums::{ApplicationType, MessageSecurityMode, UserTokenType};
use crate::localized_text::LocalizedText;
use crate::object_id::ObjectId;
use crate::request_header::RequestHeader;
use crate::response_header::ResponseHeader;
use crate::string::UAString;
use crate::Context;

use super::MessageInfo;

/// Identifies an application: a client, a server, or both.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApplicationDescription {
    pub application_uri: UAString,
    pub product_uri: UAString,
    pub application_name: LocalizedText,
    pub application_type: ApplicationType,
    pub gateway_server_uri: UAString,
    pub discovery_profile_uri: UAString,
    pub discovery_urls: Option<Vec<UAString>>,
}

impl BinaryEncodable for ApplicationDescription {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.application_uri.byte_len(ctx)
            + self.product_uri.byte_len(ctx)
            + self.application_name.byte_len(ctx)
            + self.application_type.byte_len(ctx)
            + self.gateway_server_uri.byte_len(ctx)
            + self.discovery_profile_uri.byte_len(ctx)
            + self.discovery_urls.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.application_uri.encode(stream, ctx)?;
        self.product_uri.encode(stream, ctx)?;
        self.application_name.encode(stream, ctx)?;
        self.application_type.encode(stream, ctx)?;
        self.gateway_server_uri.encode(stream, ctx)?;
        self.discovery_profile_uri.encode(stream, ctx)?;
        self.discovery_urls.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for ApplicationDescription {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(ApplicationDescription {
            application_uri: UAString::decode(stream, ctx)?,
            product_uri: UAString::decode(stream, ctx)?,
            application_name: LocalizedText::decode(stream, ctx)?,
            application_type: ApplicationType::decode(stream, ctx)?,
            gateway_server_uri: UAString::decode(stream, ctx)?,
            discovery_profile_uri: UAString::decode(stream, ctx)?,
            discovery_urls: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

/// Describes a form of identity a server will accept on `ActivateSession`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserTokenPolicy {
    pub policy_id: UAString,
    pub token_type: UserTokenType,
    pub issued_token_type: UAString,
    pub issuer_endpoint_url: UAString,
    pub security_policy_uri: UAString,
}

impl BinaryEncodable for UserTokenPolicy {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.policy_id.byte_len(ctx)
            + self.token_type.byte_len(ctx)
            + self.issued_token_type.byte_len(ctx)
            + self.issuer_endpoint_url.byte_len(ctx)
            + self.security_policy_uri.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.policy_id.encode(stream, ctx)?;
        self.token_type.encode(stream, ctx)?;
        self.issued_token_type.encode(stream, ctx)?;
        self.issuer_endpoint_url.encode(stream, ctx)?;
        self.security_policy_uri.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for UserTokenPolicy {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(UserTokenPolicy {
            policy_id: UAString::decode(stream, ctx)?,
            token_type: UserTokenType::decode(stream, ctx)?,
            issued_token_type: UAString::decode(stream, ctx)?,
            issuer_endpoint_url: UAString::decode(stream, ctx)?,
            security_policy_uri: UAString::decode(stream, ctx)?,
        })
    }
}

/// A single combination of transport, security, and identity options a
/// server is willing to accept at an endpoint url.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EndpointDescription {
    pub endpoint_url: UAString,
    pub server: ApplicationDescription,
    pub server_certificate: ByteString,
    pub security_mode: MessageSecurityMode,
    pub security_policy_uri: UAString,
    pub user_identity_tokens: Option<Vec<UserTokenPolicy>>,
    pub transport_profile_uri: UAString,
    pub security_level: u8,
}

impl BinaryEncodable for EndpointDescription {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.endpoint_url.byte_len(ctx)
            + self.server.byte_len(ctx)
            + self.server_certificate.byte_len(ctx)
            + self.security_mode.byte_len(ctx)
            + self.security_policy_uri.byte_len(ctx)
            + self.user_identity_tokens.byte_len(ctx)
            + self.transport_profile_uri.byte_len(ctx)
            + self.security_level.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.endpoint_url.encode(stream, ctx)?;
        self.server.encode(stream, ctx)?;
        self.server_certificate.encode(stream, ctx)?;
        self.security_mode.encode(stream, ctx)?;
        self.security_policy_uri.encode(stream, ctx)?;
        self.user_identity_tokens.encode(stream, ctx)?;
        self.transport_profile_uri.encode(stream, ctx)?;
        self.security_level.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for EndpointDescription {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(EndpointDescription {
            endpoint_url: UAString::decode(stream, ctx)?,
            server: ApplicationDescription::decode(stream, ctx)?,
            server_certificate: ByteString::decode(stream, ctx)?,
            security_mode: MessageSecurityMode::decode(stream, ctx)?,
            security_policy_uri: UAString::decode(stream, ctx)?,
            user_identity_tokens: BinaryDecodable::decode(stream, ctx)?,
            transport_profile_uri: UAString::decode(stream, ctx)?,
            security_level: u8::decode(stream, ctx)?,
        })
    }
}

/// Asks a server to list the endpoints it exposes, prior to opening a
/// secure channel to any one of them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GetEndpointsRequest {
    pub request_header: RequestHeader,
    pub endpoint_url: UAString,
    pub locale_ids: Option<Vec<UAString>>,
    pub profile_uris: Option<Vec<UAString>>,
}

impl MessageInfo for GetEndpointsRequest {
    fn type_id(&self) -> ObjectId {
        ObjectId::GetEndpointsRequest_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for GetEndpointsRequest {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.request_header.byte_len(ctx)
            + self.endpoint_url.byte_len(ctx)
            + self.locale_ids.byte_len(ctx)
            + self.profile_uris.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.request_header.encode(stream, ctx)?;
        self.endpoint_url.encode(stream, ctx)?;
        self.locale_ids.encode(stream, ctx)?;
        self.profile_uris.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for GetEndpointsRequest {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(GetEndpointsRequest {
            request_header: RequestHeader::decode(stream, ctx)?,
            endpoint_url: UAString::decode(stream, ctx)?,
            locale_ids: BinaryDecodable::decode(stream, ctx)?,
            profile_uris: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GetEndpointsResponse {
    pub response_header: ResponseHeader,
    pub endpoints: Option<Vec<EndpointDescription>>,
}

impl MessageInfo for GetEndpointsResponse {
    fn type_id(&self) -> ObjectId {
        ObjectId::GetEndpointsResponse_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for GetEndpointsResponse {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.response_header.byte_len(ctx) + self.endpoints.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.response_header.encode(stream, ctx)?;
        self.endpoints.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for GetEndpointsResponse {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(GetEndpointsResponse {
            response_header: ResponseHeader::decode(stream, ctx)?,
            endpoints: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::node_id::NodeId;
    use crate::DecodingOptions;

    fn ctx() -> Context<'static> {
        Context::new(DecodingOptions::default())
    }

    #[test]
    fn get_endpoints_request_without_filters_round_trips_with_empty_arrays() {
        let request = GetEndpointsRequest {
            request_header: RequestHeader::new(&NodeId::null(), 1, 0),
            endpoint_url: UAString::from("opc.tcp://wow.its.easy:11111/UA/Server"),
            locale_ids: Some(Vec::new()),
            profile_uris: Some(Vec::new()),
        };

        let ctx = ctx();
        let len = request.byte_len(&ctx);
        let mut buf = Cursor::new(vec![0u8; len]);
        request.encode(&mut buf, &ctx).unwrap();
        buf.set_position(0);

        let decoded = GetEndpointsRequest::decode(&mut buf, &ctx).unwrap();
        assert_eq!(decoded.locale_ids.as_ref().map(Vec::len), Some(0));
        assert_eq!(decoded.profile_uris.as_ref().map(Vec::len), Some(0));
        assert_eq!(decoded, request);
    }

    #[test]
    fn get_endpoints_request_null_arrays_round_trip_to_none() {
        let request = GetEndpointsRequest {
            request_header: RequestHeader::new(&NodeId::null(), 1, 0),
            endpoint_url: UAString::from("opc.tcp://wow.its.easy:11111/UA/Server"),
            locale_ids: None,
            profile_uris: None,
        };

        let ctx = ctx();
        let len = request.byte_len(&ctx);
        let mut buf = Cursor::new(vec![0u8; len]);
        request.encode(&mut buf, &ctx).unwrap();
        buf.set_position(0);

        let decoded = GetEndpointsRequest::decode(&mut buf, &ctx).unwrap();
        assert_eq!(decoded, request);
    }
}
