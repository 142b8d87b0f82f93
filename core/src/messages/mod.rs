// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! [`RequestMessage`] and [`ResponseMessage`], the enums every service
//! request/response is wrapped in once it leaves the typed session API and
//! enters the chunking/secure channel layer.

use std::io::Read;

use opcua_types::{BinaryEncodable, EncodingResult, NodeId, ObjectId};

mod request;
mod response;

pub use request::RequestMessage;
pub use response::ResponseMessage;

use crate::comms::message_chunk::MessageChunkType;

/// Implemented by anything that knows which chunk type it travels in.
pub trait MessageType {
    fn message_type(&self) -> MessageChunkType;
}

/// Implemented by the request/response enums that flow through the
/// chunker and secure channel.
pub trait Message: BinaryEncodable + MessageType {
    /// The request handle correlating this message with its counterpart.
    fn request_handle(&self) -> u32;

    /// Decodes a message body given the `ObjectId` of its encoding, read
    /// off an already-decoded extension object node id.
    fn decode_by_object_id<S: Read>(
        stream: &mut S,
        object_id: ObjectId,
        ctx: &opcua_types::Context<'_>,
    ) -> EncodingResult<Self>
    where
        Self: Sized;

    /// The node id of this message's binary encoding.
    fn type_id(&self) -> NodeId;
}
