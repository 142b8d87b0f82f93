// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! `RequestHeader`, common to every service request.

use std::io::Write;

use crate::date_time::UtcTime;
use crate::encoding::{BinaryDecodable, BinaryEncodable, EncodingResult};
use crate::extension_object::ExtensionObject;
use crate::node_id::NodeId;
use crate::string::UAString;
use crate::{write_u32, Context};

/// Bit flags requesting how much diagnostic detail a server should return
/// alongside a response.
pub type DiagnosticBits = u32;

/// Common header carried by every service request: the session's
/// authentication token, a client timestamp, a request handle the client
/// can use to match the response to the call, and a timeout hint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestHeader {
    /// The session's authentication token, or a null node id before a
    /// session has been activated.
    pub authentication_token: NodeId,
    /// Client-side timestamp at the moment the request was sent.
    pub timestamp: UtcTime,
    /// Client-assigned handle used to correlate this request with its
    /// response, independent of the channel's wire-level request id.
    pub request_handle: u32,
    /// Requested diagnostic detail level.
    pub return_diagnostics: DiagnosticBits,
    /// Optional audit trail identifier.
    pub audit_entry_id: UAString,
    /// Hint, in milliseconds, after which the server may abandon the
    /// request. Zero means no limit.
    pub timeout_hint: u32,
    /// Reserved for future protocol extensions.
    pub additional_header: ExtensionObject,
}

impl RequestHeader {
    /// Construct a request header for a given session and request handle.
    pub fn new(authentication_token: &NodeId, request_handle: u32, timeout_hint: u32) -> Self {
        RequestHeader {
            authentication_token: authentication_token.clone(),
            timestamp: UtcTime::now(),
            request_handle,
            return_diagnostics: 0,
            audit_entry_id: UAString::null(),
            timeout_hint,
            additional_header: ExtensionObject::null(),
        }
    }

    /// A header suitable for the stateless Hello/OpenSecureChannel
    /// handshake, where no authentication token exists yet.
    pub fn dummy() -> Self {
        RequestHeader::new(&NodeId::null(), 0, 0)
    }
}

impl BinaryEncodable for RequestHeader {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.authentication_token.byte_len(ctx)
            + self.timestamp.byte_len(ctx)
            + 4 // request_handle
            + self.return_diagnostics.byte_len(ctx)
            + self.audit_entry_id.byte_len(ctx)
            + 4 // timeout_hint
            + self.additional_header.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.authentication_token
            .encode(stream, ctx)
            .map_err(|e| e.with_request_handle(self.request_handle))?;
        self.timestamp.encode(stream, ctx)?;
        write_u32(stream, self.request_handle)?;
        self.return_diagnostics.encode(stream, ctx)?;
        self.audit_entry_id.encode(stream, ctx)?;
        write_u32(stream, self.timeout_hint)?;
        self.additional_header.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for RequestHeader {
    fn decode<S: std::io::Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        let authentication_token = NodeId::decode(stream, ctx)?;
        let timestamp = UtcTime::decode(stream, ctx)?;
        let request_handle = u32::decode(stream, ctx)?;
        let return_diagnostics = u32::decode(stream, ctx)?;
        let audit_entry_id = UAString::decode(stream, ctx)?;
        let timeout_hint = u32::decode(stream, ctx)?;
        let additional_header = ExtensionObject::decode(stream, ctx)
            .map_err(|e| e.with_request_handle(request_handle))?;
        Ok(RequestHeader {
            authentication_token,
            timestamp,
            request_handle,
            return_diagnostics,
            audit_entry_id,
            timeout_hint,
            additional_header,
        })
    }
}
