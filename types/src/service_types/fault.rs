// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! `ServiceFault`, returned in place of the expected response when a
//! request fails entirely rather than partially (see the response header's
//! `service_result`).

use std::io::{Read, Write};

use crate::encoding::{BinaryDecodable, BinaryEncodable, EncodingResult};
use crate::object_id::ObjectId;
use crate::response_header::ResponseHeader;
use crate::Context;

use super::MessageInfo;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceFault {
    pub response_header: ResponseHeader,
}

impl MessageInfo for ServiceFault {
    fn type_id(&self) -> ObjectId {
        ObjectId::ServiceFault_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for ServiceFault {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.response_header.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.response_header.encode(stream, ctx)
    }
}

impl BinaryDecodable for ServiceFault {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(ServiceFault {
            response_header: ResponseHeader::decode(stream, ctx)?,
        })
    }
}
