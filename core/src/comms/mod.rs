// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! UACP chunking and the secure channel's cryptographic state.

pub mod chunker;
pub mod message_chunk;
pub mod secure_channel;
pub mod security_header;
pub mod tcp_types;
pub mod url;
