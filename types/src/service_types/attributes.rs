// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Attribute read and write services, plus raw/modified history read.

use std::io::{Read, Write};

use crate::byte_string::ByteString;
use crate::data_value::DataValue;
use crate::date_time::UtcTime;
use crate::diagnostic_info::DiagnosticInfo;
use crate::encoding::{BinaryDecodable, BinaryEncodable, EncodingResult};
use crate::enums::TimestampsToReturn;
use crate::extension_object::ExtensionObject;
use crate::node_id::NodeId;
use crate::object_id::ObjectId;
use crate::qualified_name::QualifiedName;
use crate::request_header::RequestHeader;
use crate::response_header::ResponseHeader;
use crate::status_code::StatusCode;
use crate::string::UAString;
use crate::Context;

use super::MessageInfo;

/// Identifies a node attribute to read, with an optional sub-range and
/// data encoding preference.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadValueId {
    pub node_id: NodeId,
    pub attribute_id: u32,
    pub index_range: UAString,
    pub data_encoding: QualifiedName,
}

impl BinaryEncodable for ReadValueId {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.node_id.byte_len(ctx)
            + 4
            + self.index_range.byte_len(ctx)
            + self.data_encoding.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.node_id.encode(stream, ctx)?;
        crate::write_u32(stream, self.attribute_id)?;
        self.index_range.encode(stream, ctx)?;
        self.data_encoding.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for ReadValueId {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(ReadValueId {
            node_id: NodeId::decode(stream, ctx)?,
            attribute_id: crate::read_u32(stream)?,
            index_range: UAString::decode(stream, ctx)?,
            data_encoding: QualifiedName::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadRequest {
    pub request_header: RequestHeader,
    pub max_age: f64,
    pub timestamps_to_return: TimestampsToReturn,
    pub nodes_to_read: Option<Vec<ReadValueId>>,
}

impl MessageInfo for ReadRequest {
    fn type_id(&self) -> ObjectId {
        ObjectId::ReadRequest_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for ReadRequest {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.request_header.byte_len(ctx)
            + self.max_age.byte_len(ctx)
            + self.timestamps_to_return.byte_len(ctx)
            + self.nodes_to_read.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.request_header.encode(stream, ctx)?;
        self.max_age.encode(stream, ctx)?;
        self.timestamps_to_return.encode(stream, ctx)?;
        self.nodes_to_read.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for ReadRequest {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(ReadRequest {
            request_header: RequestHeader::decode(stream, ctx)?,
            max_age: f64::decode(stream, ctx)?,
            timestamps_to_return: TimestampsToReturn::decode(stream, ctx)?,
            nodes_to_read: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadResponse {
    pub response_header: ResponseHeader,
    pub results: Option<Vec<DataValue>>,
    pub diagnostic_infos: Option<Vec<DiagnosticInfo>>,
}

impl MessageInfo for ReadResponse {
    fn type_id(&self) -> ObjectId {
        ObjectId::ReadResponse_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for ReadResponse {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.response_header.byte_len(ctx) + self.results.byte_len(ctx) + self.diagnostic_infos.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.response_header.encode(stream, ctx)?;
        self.results.encode(stream, ctx)?;
        self.diagnostic_infos.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for ReadResponse {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(ReadResponse {
            response_header: ResponseHeader::decode(stream, ctx)?,
            results: BinaryDecodable::decode(stream, ctx)?,
            diagnostic_infos: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WriteValue {
    pub node_id: NodeId,
    pub attribute_id: u32,
    pub index_range: UAString,
    pub value: DataValue,
}

impl BinaryEncodable for WriteValue {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.node_id.byte_len(ctx) + 4 + self.index_range.byte_len(ctx) + self.value.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.node_id.encode(stream, ctx)?;
        crate::write_u32(stream, self.attribute_id)?;
        self.index_range.encode(stream, ctx)?;
        self.value.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for WriteValue {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(WriteValue {
            node_id: NodeId::decode(stream, ctx)?,
            attribute_id: crate::read_u32(stream)?,
            index_range: UAString::decode(stream, ctx)?,
            value: DataValue::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WriteRequest {
    pub request_header: RequestHeader,
    pub nodes_to_write: Option<Vec<WriteValue>>,
}

impl MessageInfo for WriteRequest {
    fn type_id(&self) -> ObjectId {
        ObjectId::WriteRequest_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for WriteRequest {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.request_header.byte_len(ctx) + self.nodes_to_write.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.request_header.encode(stream, ctx)?;
        self.nodes_to_write.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for WriteRequest {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(WriteRequest {
            request_header: RequestHeader::decode(stream, ctx)?,
            nodes_to_write: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WriteResponse {
    pub response_header: ResponseHeader,
    pub results: Option<Vec<StatusCode>>,
    pub diagnostic_infos: Option<Vec<DiagnosticInfo>>,
}

impl MessageInfo for WriteResponse {
    fn type_id(&self) -> ObjectId {
        ObjectId::WriteResponse_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for WriteResponse {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.response_header.byte_len(ctx) + self.results.byte_len(ctx) + self.diagnostic_infos.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.response_header.encode(stream, ctx)?;
        self.results.encode(stream, ctx)?;
        self.diagnostic_infos.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for WriteResponse {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(WriteResponse {
            response_header: ResponseHeader::decode(stream, ctx)?,
            results: BinaryDecodable::decode(stream, ctx)?,
            diagnostic_infos: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

/// Parameters for reading a node's raw or processed (aggregated) history.
/// Carried inside `HistoryReadRequest::history_read_details` as an
/// `ExtensionObject`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadRawModifiedDetails {
    pub is_read_modified: bool,
    pub start_time: UtcTime,
    pub end_time: UtcTime,
    pub num_values_per_node: u32,
    pub return_bounds: bool,
}

impl BinaryEncodable for ReadRawModifiedDetails {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.is_read_modified.byte_len(ctx)
            + self.start_time.byte_len(ctx)
            + self.end_time.byte_len(ctx)
            + 4
            + self.return_bounds.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.is_read_modified.encode(stream, ctx)?;
        self.start_time.encode(stream, ctx)?;
        self.end_time.encode(stream, ctx)?;
        crate::write_u32(stream, self.num_values_per_node)?;
        self.return_bounds.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for ReadRawModifiedDetails {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(ReadRawModifiedDetails {
            is_read_modified: bool::decode(stream, ctx)?,
            start_time: UtcTime::decode(stream, ctx)?,
            end_time: UtcTime::decode(stream, ctx)?,
            num_values_per_node: crate::read_u32(stream)?,
            return_bounds: bool::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryReadValueId {
    pub node_id: NodeId,
    pub index_range: UAString,
    pub data_encoding: QualifiedName,
    pub continuation_point: ByteString,
}

impl BinaryEncodable for HistoryReadValueId {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.node_id.byte_len(ctx)
            + self.index_range.byte_len(ctx)
            + self.data_encoding.byte_len(ctx)
            + self.continuation_point.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.node_id.encode(stream, ctx)?;
        self.index_range.encode(stream, ctx)?;
        self.data_encoding.encode(stream, ctx)?;
        self.continuation_point.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for HistoryReadValueId {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(HistoryReadValueId {
            node_id: NodeId::decode(stream, ctx)?,
            index_range: UAString::decode(stream, ctx)?,
            data_encoding: QualifiedName::decode(stream, ctx)?,
            continuation_point: ByteString::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryReadResult {
    pub status_code: StatusCode,
    pub continuation_point: ByteString,
    pub history_data: ExtensionObject,
}

impl BinaryEncodable for HistoryReadResult {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.status_code.bits().byte_len(ctx)
            + self.continuation_point.byte_len(ctx)
            + self.history_data.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.status_code.bits().encode(stream, ctx)?;
        self.continuation_point.encode(stream, ctx)?;
        self.history_data.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for HistoryReadResult {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(HistoryReadResult {
            status_code: StatusCode::from_bits(u32::decode(stream, ctx)?),
            continuation_point: ByteString::decode(stream, ctx)?,
            history_data: ExtensionObject::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryReadRequest {
    pub request_header: RequestHeader,
    pub history_read_details: ExtensionObject,
    pub timestamps_to_return: TimestampsToReturn,
    pub release_continuation_points: bool,
    pub nodes_to_read: Option<Vec<HistoryReadValueId>>,
}

impl MessageInfo for HistoryReadRequest {
    fn type_id(&self) -> ObjectId {
        ObjectId::HistoryReadRequest_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for HistoryReadRequest {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.request_header.byte_len(ctx)
            + self.history_read_details.byte_len(ctx)
            + self.timestamps_to_return.byte_len(ctx)
            + self.release_continuation_points.byte_len(ctx)
            + self.nodes_to_read.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.request_header.encode(stream, ctx)?;
        self.history_read_details.encode(stream, ctx)?;
        self.timestamps_to_return.encode(stream, ctx)?;
        self.release_continuation_points.encode(stream, ctx)?;
        self.nodes_to_read.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for HistoryReadRequest {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(HistoryReadRequest {
            request_header: RequestHeader::decode(stream, ctx)?,
            history_read_details: ExtensionObject::decode(stream, ctx)?,
            timestamps_to_return: TimestampsToReturn::decode(stream, ctx)?,
            release_continuation_points: bool::decode(stream, ctx)?,
            nodes_to_read: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryReadResponse {
    pub response_header: ResponseHeader,
    pub results: Option<Vec<HistoryReadResult>>,
    pub diagnostic_infos: Option<Vec<DiagnosticInfo>>,
}

impl MessageInfo for HistoryReadResponse {
    fn type_id(&self) -> ObjectId {
        ObjectId::HistoryReadResponse_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for HistoryReadResponse {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.response_header.byte_len(ctx) + self.results.byte_len(ctx) + self.diagnostic_infos.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.response_header.encode(stream, ctx)?;
        self.results.encode(stream, ctx)?;
        self.diagnostic_infos.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for HistoryReadResponse {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(HistoryReadResponse {
            response_header: ResponseHeader::decode(stream, ctx)?,
            results: BinaryDecodable::decode(stream, ctx)?,
            diagnostic_infos: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}
