// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Umbrella crate re-exporting the OPC UA client stack: binary types and
//! codec (`opcua_types`), cryptographic primitives (`opcua_crypto`), chunking
//! and comms plumbing (`opcua_core`), and the client itself (`opcua_client`).

pub use opcua_core::sync;

pub use opcua_client as client;
pub use opcua_core as core;
pub use opcua_crypto as crypto;
pub use opcua_types as types;
