// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Common OPC UA constants used throughout the codec and transport layers.

/// Default OPC UA TCP port.
pub const DEFAULT_OPC_UA_SERVER_PORT: u16 = 4840;

/// Maximum size in bytes of a single message, 0 means unlimited. Chosen as a
/// conservative default that most servers will accept without negotiation.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Maximum number of chunks making up a single message.
pub const MAX_CHUNK_COUNT: usize = 5 * 1024;

/// Maximum length in bytes of a decoded string.
pub const MAX_STRING_LENGTH: usize = 64 * 1024 * 1024;

/// Maximum length in bytes of a decoded byte string.
pub const MAX_BYTE_STRING_LENGTH: usize = 64 * 1024 * 1024;

/// Maximum number of elements in a decoded array.
pub const MAX_ARRAY_LENGTH: usize = 1024 * 1024;

/// Maximum recursion depth while decoding nested structures such as
/// `ExtensionObject` and `Variant`.
pub const MAX_DECODING_DEPTH: u64 = 64;

/// Default chunk size used when framing outbound messages, prior to any
/// negotiation via Hello/Acknowledge.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Fraction of a security token's lifetime at which renewal is triggered.
pub const TOKEN_RENEWAL_RATIO: f64 = 0.75;

/// Maximum length in bytes of a DER-encoded certificate accepted in a
/// security header, per Part 6's `MaxCertificateSize` guidance.
pub const MAX_CERTIFICATE_LENGTH: usize = 64 * 1024;

/// Smallest chunk size the UACP transport permits negotiating down to.
pub const MIN_CHUNK_SIZE: usize = 8192;
