// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Data types, binary codec, and built-in structures for the OPC UA binary
//! protocol.
//!
//! This crate carries the wire-level vocabulary the client core and
//! transport layers build on: scalar encodings, the built-in structured
//! types (`NodeId`, `Variant`, `DataValue`, `ExtensionObject`, ...),
//! request/response headers, and the service message types the client
//! actually issues.

pub mod byte_string;
pub mod constants;
pub mod data_value;
pub mod date_time;
pub mod diagnostic_info;
pub mod encoding;
pub mod enums;
pub mod expanded_node_id;
pub mod extension_object;
pub mod guid;
pub mod localized_text;
pub mod node_id;
pub mod object_id;
pub mod primitives;
pub mod qualified_name;
pub mod request_header;
pub mod response_header;
pub mod service_types;
pub mod status_code;
pub mod string;
pub mod variant;

pub use byte_string::ByteString;
pub use data_value::DataValue;
pub use date_time::UtcTime;
pub use diagnostic_info::DiagnosticInfo;
pub use encoding::{
    byte_len_array, process_decode_io_result, process_encode_io_result, read_f32, read_f64,
    read_i16, read_i32, read_i64, read_u16, read_u32, read_u64, read_u8, skip_bytes, write_f32,
    write_f64, write_i16, write_i32, write_i64, write_u16, write_u32, write_u64, write_u8,
    BinaryDecodable, BinaryEncodable, Context, DecodingOptions, DepthGauge, DepthLock, Error,
    EncodingResult, SimpleBinaryDecodable, SimpleBinaryEncodable, UaNullable,
};
pub use enums::{
    ApplicationType, BrowseDirection, MessageSecurityMode, MonitoringMode, NodeClass,
    SecurityTokenRequestType, TimestampsToReturn, UserTokenType,
};
pub use expanded_node_id::ExpandedNodeId;
pub use extension_object::{ExtensionObject, ExtensionObjectEncoding};
pub use guid::Guid;
pub use localized_text::LocalizedText;
pub use node_id::{Identifier, NodeId};
pub use object_id::ObjectId;
pub use qualified_name::QualifiedName;
pub use request_header::{DiagnosticBits, RequestHeader};
pub use response_header::{AsRequestHandle, ResponseHeader};
pub use service_types::MessageInfo;
pub use status_code::StatusCode;
pub use string::UAString;
pub use variant::Variant;
