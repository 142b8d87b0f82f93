// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! The `Browse` service: walking references out of the address space.

use std::io::{Read, Write};

use crate::byte_string::ByteString;
use crate::date_time::UtcTime;
use crate::diagnostic_info::DiagnosticInfo;
use crate::encoding::{BinaryDecodable, BinaryEncodable, EncodingResult};
use crate::enums::{BrowseDirection, NodeClass};
use crate::expanded_node_id::ExpandedNodeId;
use crate::localized_text::LocalizedText;
use crate::node_id::NodeId;
use crate::object_id::ObjectId;
use crate::qualified_name::QualifiedName;
use crate::request_header::RequestHeader;
use crate::response_header::ResponseHeader;
use crate::status_code::StatusCode;
use crate::Context;

use super::MessageInfo;

/// Restricts a browse to a particular view of the address space. An empty
/// (null) view id means the entire address space.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewDescription {
    pub view_id: NodeId,
    pub timestamp: UtcTime,
    pub view_version: u32,
}

impl BinaryEncodable for ViewDescription {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.view_id.byte_len(ctx) + self.timestamp.byte_len(ctx) + 4
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.view_id.encode(stream, ctx)?;
        self.timestamp.encode(stream, ctx)?;
        crate::write_u32(stream, self.view_version)?;
        Ok(())
    }
}

impl BinaryDecodable for ViewDescription {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(ViewDescription {
            view_id: NodeId::decode(stream, ctx)?,
            timestamp: UtcTime::decode(stream, ctx)?,
            view_version: crate::read_u32(stream)?,
        })
    }
}

/// Identifies a node and the kind of references out of it to return.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BrowseDescription {
    pub node_id: NodeId,
    pub browse_direction: BrowseDirection,
    pub reference_type_id: NodeId,
    pub include_subtypes: bool,
    pub node_class_mask: u32,
    pub result_mask: u32,
}

impl BinaryEncodable for BrowseDescription {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.node_id.byte_len(ctx)
            + self.browse_direction.byte_len(ctx)
            + self.reference_type_id.byte_len(ctx)
            + self.include_subtypes.byte_len(ctx)
            + 4
            + 4
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.node_id.encode(stream, ctx)?;
        self.browse_direction.encode(stream, ctx)?;
        self.reference_type_id.encode(stream, ctx)?;
        self.include_subtypes.encode(stream, ctx)?;
        crate::write_u32(stream, self.node_class_mask)?;
        crate::write_u32(stream, self.result_mask)?;
        Ok(())
    }
}

impl BinaryDecodable for BrowseDescription {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(BrowseDescription {
            node_id: NodeId::decode(stream, ctx)?,
            browse_direction: BrowseDirection::decode(stream, ctx)?,
            reference_type_id: NodeId::decode(stream, ctx)?,
            include_subtypes: bool::decode(stream, ctx)?,
            node_class_mask: crate::read_u32(stream)?,
            result_mask: crate::read_u32(stream)?,
        })
    }
}

/// A single reference discovered by a browse.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceDescription {
    pub reference_type_id: NodeId,
    pub is_forward: bool,
    pub node_id: ExpandedNodeId,
    pub browse_name: QualifiedName,
    pub display_name: LocalizedText,
    pub node_class: NodeClass,
    pub type_definition: ExpandedNodeId,
}

impl BinaryEncodable for ReferenceDescription {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.reference_type_id.byte_len(ctx)
            + self.is_forward.byte_len(ctx)
            + self.node_id.byte_len(ctx)
            + self.browse_name.byte_len(ctx)
            + self.display_name.byte_len(ctx)
            + self.node_class.byte_len(ctx)
            + self.type_definition.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.reference_type_id.encode(stream, ctx)?;
        self.is_forward.encode(stream, ctx)?;
        self.node_id.encode(stream, ctx)?;
        self.browse_name.encode(stream, ctx)?;
        self.display_name.encode(stream, ctx)?;
        self.node_class.encode(stream, ctx)?;
        self.type_definition.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for ReferenceDescription {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(ReferenceDescription {
            reference_type_id: NodeId::decode(stream, ctx)?,
            is_forward: bool::decode(stream, ctx)?,
            node_id: ExpandedNodeId::decode(stream, ctx)?,
            browse_name: QualifiedName::decode(stream, ctx)?,
            display_name: LocalizedText::decode(stream, ctx)?,
            node_class: NodeClass::decode(stream, ctx)?,
            type_definition: ExpandedNodeId::decode(stream, ctx)?,
        })
    }
}

/// A browse's result for a single requested node: either a continuation
/// point (more references remain) or the full list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BrowseResult {
    pub status_code: StatusCode,
    pub continuation_point: ByteString,
    pub references: Option<Vec<ReferenceDescription>>,
}

impl BinaryEncodable for BrowseResult {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.status_code.bits().byte_len(ctx)
            + self.continuation_point.byte_len(ctx)
            + self.references.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.status_code.bits().encode(stream, ctx)?;
        self.continuation_point.encode(stream, ctx)?;
        self.references.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for BrowseResult {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(BrowseResult {
            status_code: StatusCode::from_bits(u32::decode(stream, ctx)?),
            continuation_point: ByteString::decode(stream, ctx)?,
            references: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BrowseRequest {
    pub request_header: RequestHeader,
    pub view: ViewDescription,
    pub requested_max_references_per_node: u32,
    pub nodes_to_browse: Option<Vec<BrowseDescription>>,
}

impl MessageInfo for BrowseRequest {
    fn type_id(&self) -> ObjectId {
        ObjectId::BrowseRequest_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for BrowseRequest {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.request_header.byte_len(ctx) + self.view.byte_len(ctx) + 4 + self.nodes_to_browse.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.request_header.encode(stream, ctx)?;
        self.view.encode(stream, ctx)?;
        crate::write_u32(stream, self.requested_max_references_per_node)?;
        self.nodes_to_browse.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for BrowseRequest {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(BrowseRequest {
            request_header: RequestHeader::decode(stream, ctx)?,
            view: ViewDescription::decode(stream, ctx)?,
            requested_max_references_per_node: crate::read_u32(stream)?,
            nodes_to_browse: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BrowseResponse {
    pub response_header: ResponseHeader,
    pub results: Option<Vec<BrowseResult>>,
    pub diagnostic_infos: Option<Vec<DiagnosticInfo>>,
}

impl MessageInfo for BrowseResponse {
    fn type_id(&self) -> ObjectId {
        ObjectId::BrowseResponse_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for BrowseResponse {
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

impl BinaryDecodable for BrowseResponse {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(BrowseResponse {
            response_header: ResponseHeader::decode(stream, ctx)?,
            results: BinaryDecodable::decode(stream, ctx)?,
            diagnostic_infos: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}
