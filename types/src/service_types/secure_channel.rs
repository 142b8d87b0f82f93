// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Messages exchanged to open, renew, and close a secure channel.

use std::io::{Read, Write};

use crate::byte_string::ByteString;
use crate::date_time::UtcTime;
use crate::encoding::{BinaryDecodable, BinaryEncodable, EncodingResult};
use crate::enums::{MessageSecurityMode, SecurityTokenRequestType};
use crate::object_id::ObjectId;
use crate::request_header::RequestHeader;
use crate::response_header::ResponseHeader;
use crate::{write_u32, Context};

use super::MessageInfo;

/// Identifies a security token issued for a channel, and when it expires.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChannelSecurityToken {
    pub channel_id: u32,
    pub token_id: u32,
    pub created_at: UtcTime,
    pub revised_lifetime: u32,
}

impl ChannelSecurityToken {
    /// Seconds (approximately) remaining before this token should be
    /// renewed, measured against the renewal ratio rather than the full
    /// lifetime, so the channel has time to switch over before expiry.
    pub fn renewal_due_in(&self, ratio: f64) -> std::time::Duration {
        let lifetime_ms = self.revised_lifetime as f64 * ratio;
        let elapsed = chrono::Utc::now().signed_duration_since(self.created_at.0);
        let due_in_ms = lifetime_ms - elapsed.num_milliseconds() as f64;
        std::time::Duration::from_millis(due_in_ms.max(0.0) as u64)
    }
}

impl BinaryEncodable for ChannelSecurityToken {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        4 + 4 + self.created_at.byte_len(ctx) + 4
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        write_u32(stream, self.channel_id)?;
        write_u32(stream, self.token_id)?;
        self.created_at.encode(stream, ctx)?;
        write_u32(stream, self.revised_lifetime)?;
        Ok(())
    }
}

impl BinaryDecodable for ChannelSecurityToken {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(ChannelSecurityToken {
            channel_id: crate::read_u32(stream)?,
            token_id: crate::read_u32(stream)?,
            created_at: UtcTime::decode(stream, ctx)?,
            revised_lifetime: crate::read_u32(stream)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OpenSecureChannelRequest {
    pub request_header: RequestHeader,
    pub client_protocol_version: u32,
    pub request_type: SecurityTokenRequestType,
    pub security_mode: MessageSecurityMode,
    pub client_nonce: ByteString,
    pub requested_lifetime: u32,
}

impl MessageInfo for OpenSecureChannelRequest {
    fn type_id(&self) -> ObjectId {
        ObjectId::OpenSecureChannelRequest_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for OpenSecureChannelRequest {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.request_header.byte_len(ctx)
            + 4
            + self.request_type.byte_len(ctx)
            + self.security_mode.byte_len(ctx)
            + self.client_nonce.byte_len(ctx)
            + 4
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.request_header.encode(stream, ctx)?;
        write_u32(stream, self.client_protocol_version)?;
        self.request_type.encode(stream, ctx)?;
        self.security_mode.encode(stream, ctx)?;
        self.client_nonce.encode(stream, ctx)?;
        write_u32(stream, self.requested_lifetime)?;
        Ok(())
    }
}

impl BinaryDecodable for OpenSecureChannelRequest {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(OpenSecureChannelRequest {
            request_header: RequestHeader::decode(stream, ctx)?,
            client_protocol_version: crate::read_u32(stream)?,
            request_type: SecurityTokenRequestType::decode(stream, ctx)?,
            security_mode: MessageSecurityMode::decode(stream, ctx)?,
            client_nonce: ByteString::decode(stream, ctx)?,
            requested_lifetime: crate::read_u32(stream)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OpenSecureChannelResponse {
    pub response_header: ResponseHeader,
    pub server_protocol_version: u32,
    pub security_token: ChannelSecurityToken,
    pub server_nonce: ByteString,
}

impl MessageInfo for OpenSecureChannelResponse {
    fn type_id(&self) -> ObjectId {
        ObjectId::OpenSecureChannelResponse_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for OpenSecureChannelResponse {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.response_header.byte_len(ctx)
            + 4
            + self.security_token.byte_len(ctx)
            + self.server_nonce.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.response_header.encode(stream, ctx)?;
        write_u32(stream, self.server_protocol_version)?;
        self.security_token.encode(stream, ctx)?;
        self.server_nonce.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for OpenSecureChannelResponse {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(OpenSecureChannelResponse {
            response_header: ResponseHeader::decode(stream, ctx)?,
            server_protocol_version: crate::read_u32(stream)?,
            security_token: ChannelSecurityToken::decode(stream, ctx)?,
            server_nonce: ByteString::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CloseSecureChannelRequest {
    pub request_header: RequestHeader,
}

impl MessageInfo for CloseSecureChannelRequest {
    fn type_id(&self) -> ObjectId {
        ObjectId::CloseSecureChannelRequest_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for CloseSecureChannelRequest {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.request_header.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.request_header.encode(stream, ctx)
    }
}

impl BinaryDecodable for CloseSecureChannelRequest {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(CloseSecureChannelRequest {
            request_header: RequestHeader::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CloseSecureChannelResponse {
    pub response_header: ResponseHeader,
}

impl MessageInfo for CloseSecureChannelResponse {
    fn type_id(&self) -> ObjectId {
        ObjectId::CloseSecureChannelResponse_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for CloseSecureChannelResponse {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.response_header.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.response_header.encode(stream, ctx)
    }
}

impl BinaryDecodable for CloseSecureChannelResponse {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(CloseSecureChannelResponse {
            response_header: ResponseHeader::decode(stream, ctx)?,
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

    fn round_trip<T>(value: T)
    where
        T: BinaryEncodable + BinaryDecodable + PartialEq + std::fmt::Debug,
    {
        let ctx = ctx();
        let len = value.byte_len(&ctx);
        let mut buf = Cursor::new(vec![0u8; len]);
        value.encode(&mut buf, &ctx).unwrap();
        assert_eq!(buf.position() as usize, len);
        buf.set_position(0);
        let decoded = T::decode(&mut buf, &ctx).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn open_secure_channel_request_round_trips() {
        round_trip(OpenSecureChannelRequest {
            request_header: RequestHeader::new(&NodeId::null(), 1, 0),
            client_protocol_version: 0,
            request_type: SecurityTokenRequestType::Issue,
            security_mode: MessageSecurityMode::None,
            client_nonce: ByteString::null(),
            requested_lifetime: 6_000_000,
        });
    }

    #[test]
    fn open_secure_channel_response_round_trips() {
        round_trip(OpenSecureChannelResponse {
            response_header: ResponseHeader::new_good(1),
            server_protocol_version: 0,
            security_token: ChannelSecurityToken {
                channel_id: 1,
                token_id: 2,
                created_at: UtcTime::now(),
                revised_lifetime: 6_000_000,
            },
            server_nonce: ByteString::from(vec![0xFFu8]),
        });
    }

    #[test]
    fn close_secure_channel_request_round_trips() {
        round_trip(CloseSecureChannelRequest {
            request_header: RequestHeader::new(&NodeId::null(), 2, 0),
        });
    }
}
