// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! `ResponseHeader`, common to every service response.

use std::io::Write;

use crate::date_time::UtcTime;
use crate::diagnostic_info::DiagnosticInfo;
use crate::encoding::{BinaryDecodable, BinaryEncodable, EncodingResult};
use crate::extension_object::ExtensionObject;
use crate::status_code::StatusCode;
use crate::string::UAString;
use crate::Context;

/// Common header carried by every service response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseHeader {
    /// Server-side timestamp at the moment the response was sent.
    pub timestamp: UtcTime,
    /// Echoes the request's `request_handle`.
    pub request_handle: u32,
    /// The overall result of the service call.
    pub service_result: StatusCode,
    /// Extended diagnostic detail for `service_result`, if requested.
    pub service_diagnostics: DiagnosticInfo,
    /// String table referenced by indices in `service_diagnostics` and any
    /// per-result `DiagnosticInfo` entries.
    pub string_table: Option<Vec<UAString>>,
    /// Reserved for future protocol extensions.
    pub additional_header: ExtensionObject,
}

/// Implemented by request/response headers so error-context plumbing can
/// stay generic over both.
pub trait AsRequestHandle {
    /// The request handle this header echoes or carries.
    fn as_request_handle(&self) -> u32;
}

impl AsRequestHandle for ResponseHeader {
    fn as_request_handle(&self) -> u32 {
        self.request_handle
    }
}

impl ResponseHeader {
    /// A response header reporting `Good` for the given request handle.
    pub fn new_good(request_handle: u32) -> Self {
        ResponseHeader {
            timestamp: UtcTime::now(),
            request_handle,
            service_result: StatusCode::Good,
            ..Default::default()
        }
    }

    /// A response header reporting the given service result.
    pub fn new_service_result(request_handle: u32, service_result: StatusCode) -> Self {
        ResponseHeader {
            timestamp: UtcTime::now(),
            request_handle,
            service_result,
            ..Default::default()
        }
    }

    /// A response header with an explicit timestamp and service result,
    /// for use in tests that assert on literal wire bytes.
    pub fn new_timestamped_service_result(
        timestamp: UtcTime,
        request_handle: u32,
        service_result: StatusCode,
    ) -> Self {
        ResponseHeader {
            timestamp,
            request_handle,
            service_result,
            ..Default::default()
        }
    }

    /// A null response header, request handle 0, `Good`.
    pub fn null() -> Self {
        ResponseHeader::new_good(0)
    }
}

impl BinaryEncodable for ResponseHeader {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.timestamp.byte_len(ctx)
            + 4
            + self.service_result.bits().byte_len(ctx)
            + self.service_diagnostics.byte_len(ctx)
            + self.string_table.byte_len(ctx)
            + self.additional_header.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.timestamp.encode(stream, ctx)?;
        crate::write_u32(stream, self.request_handle)?;
        self.service_result.bits().encode(stream, ctx)?;
        self.service_diagnostics.encode(stream, ctx)?;
        self.string_table.encode(stream, ctx)?;
        self.additional_header.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for ResponseHeader {
    fn decode<S: std::io::Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        let timestamp = UtcTime::decode(stream, ctx)?;
        let request_handle = crate::read_u32(stream)?;
        let service_result = StatusCode::from_bits(u32::decode(stream, ctx)?);
        let service_diagnostics = DiagnosticInfo::decode(stream, ctx)
            .map_err(|e| e.with_request_handle(request_handle))?;
        let string_table: Option<Vec<UAString>> = BinaryDecodable::decode(stream, ctx)?;
        let additional_header = ExtensionObject::decode(stream, ctx)
            .map_err(|e| e.with_request_handle(request_handle))?;
        Ok(ResponseHeader {
            timestamp,
            request_handle,
            service_result,
            service_diagnostics,
            string_table,
            additional_header,
        })
    }
}
