// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! `DiagnosticInfo`, extended diagnostic detail optionally attached to a
//! response. This client core decodes it but does not interpret its fields
//! beyond making them available to callers.

use std::io::Write;

use crate::encoding::{BinaryDecodable, BinaryEncodable, EncodingResult};
use crate::status_code::StatusCode;
use crate::string::UAString;
use crate::{read_i32, write_i32, Context, UaNullable};

const HAS_SYMBOLIC_ID: u8 = 0x01;
const HAS_NAMESPACE: u8 = 0x02;
const HAS_LOCALIZED_TEXT: u8 = 0x04;
const HAS_LOCALE: u8 = 0x08;
const HAS_ADDITIONAL_INFO: u8 = 0x10;
const HAS_INNER_STATUS_CODE: u8 = 0x20;
const HAS_INNER_DIAGNOSTIC_INFO: u8 = 0x40;

/// Extended, optional diagnostic detail about a service result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiagnosticInfo {
    /// Index into the response's string table for a symbolic identifier.
    pub symbolic_id: Option<i32>,
    /// Index into the response's string table for a namespace URI.
    pub namespace_uri: Option<i32>,
    /// Index into the response's string table for a locale.
    pub locale: Option<i32>,
    /// Index into the response's string table for localized text.
    pub localized_text: Option<i32>,
    /// Free-form additional diagnostic text.
    pub additional_info: UAString,
    /// A more specific status code than the one carried alongside this.
    pub inner_status_code: Option<StatusCode>,
    /// Diagnostic info for the inner status code.
    pub inner_diagnostic_info: Option<Box<DiagnosticInfo>>,
}

impl UaNullable for DiagnosticInfo {
    fn is_ua_null(&self) -> bool {
        self.symbolic_id.is_none()
            && self.namespace_uri.is_none()
            && self.locale.is_none()
            && self.localized_text.is_none()
            && self.additional_info.is_null()
            && self.inner_status_code.is_none()
            && self.inner_diagnostic_info.is_none()
    }
}

impl BinaryEncodable for DiagnosticInfo {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        let mut size = 1;
        if self.symbolic_id.is_some() {
            size += 4;
        }
        if self.namespace_uri.is_some() {
            size += 4;
        }
        if self.locale.is_some() {
            size += 4;
        }
        if self.localized_text.is_some() {
            size += 4;
        }
        if !self.additional_info.is_null() {
            size += self.additional_info.byte_len(ctx);
        }
        if let Some(code) = self.inner_status_code {
            size += code.bits().byte_len(ctx);
        }
        if let Some(inner) = &self.inner_diagnostic_info {
            size += inner.byte_len(ctx);
        }
        size
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        let mut mask = 0u8;
        if self.symbolic_id.is_some() {
            mask |= HAS_SYMBOLIC_ID;
        }
        if self.namespace_uri.is_some() {
            mask |= HAS_NAMESPACE;
        }
        if self.locale.is_some() {
            mask |= HAS_LOCALE;
        }
        if self.localized_text.is_some() {
            mask |= HAS_LOCALIZED_TEXT;
        }
        if !self.additional_info.is_null() {
            mask |= HAS_ADDITIONAL_INFO;
        }
        if self.inner_status_code.is_some() {
            mask |= HAS_INNER_STATUS_CODE;
        }
        if self.inner_diagnostic_info.is_some() {
            mask |= HAS_INNER_DIAGNOSTIC_INFO;
        }
        crate::write_u8(stream, mask)?;
        if let Some(v) = self.symbolic_id {
            write_i32(stream, v)?;
        }
        if let Some(v) = self.namespace_uri {
            write_i32(stream, v)?;
        }
        if let Some(v) = self.locale {
            write_i32(stream, v)?;
        }
        if let Some(v) = self.localized_text {
            write_i32(stream, v)?;
        }
        if !self.additional_info.is_null() {
            self.additional_info.encode(stream, ctx)?;
        }
        if let Some(code) = self.inner_status_code {
            code.bits().encode(stream, ctx)?;
        }
        if let Some(inner) = &self.inner_diagnostic_info {
            inner.encode(stream, ctx)?;
        }
        Ok(())
    }
}

impl BinaryDecodable for DiagnosticInfo {
    fn decode<S: std::io::Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        let _lock = ctx.options().depth_lock()?;
        let mask = crate::read_u8(stream)?;
        let symbolic_id = (mask & HAS_SYMBOLIC_ID != 0).then(|| read_i32(stream)).transpose()?;
        let namespace_uri = (mask & HAS_NAMESPACE != 0).then(|| read_i32(stream)).transpose()?;
        let locale = (mask & HAS_LOCALE != 0).then(|| read_i32(stream)).transpose()?;
        let localized_text = (mask & HAS_LOCALIZED_TEXT != 0)
            .then(|| read_i32(stream))
            .transpose()?;
        let additional_info = if mask & HAS_ADDITIONAL_INFO != 0 {
            UAString::decode(stream, ctx)?
        } else {
            UAString::null()
        };
        let inner_status_code = if mask & HAS_INNER_STATUS_CODE != 0 {
            Some(StatusCode::from_bits(u32::decode(stream, ctx)?))
        } else {
            None
        };
        let inner_diagnostic_info = if mask & HAS_INNER_DIAGNOSTIC_INFO != 0 {
            Some(Box::new(DiagnosticInfo::decode(stream, ctx)?))
        } else {
            None
        };
        Ok(DiagnosticInfo {
            symbolic_id,
            namespace_uri,
            locale,
            localized_text,
            additional_info,
            inner_status_code,
            inner_diagnostic_info,
        })
    }
}
