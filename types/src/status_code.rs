// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! `StatusCode`, the result code returned throughout the protocol.
//!
//! The full OPC UA status code table (Part 6, Annex A) runs to several
//! hundred entries generated from the foundation's schema. This crate only
//! implements the subset actually produced or consumed by the client core:
//! the `Good`/`Uncertain`/`Bad` classification, the codes used in the wire
//! examples, and the retryable-error whitelist used by the retry policy.

use std::fmt;

/// Result code carried in every OPC UA response header, and in many other
/// places (results arrays, diagnostic info, etc).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    #[default]
    Good = 0x0000_0000,
    Uncertain = 0x4000_0000,

    BadUnexpectedError = 0x8000_0000,
    BadInternalError = 0x8001_0000,
    BadOutOfMemory = 0x8002_0000,
    BadResourceUnavailable = 0x8003_0000,
    BadCommunicationError = 0x8004_0000,
    BadEncodingError = 0x8007_0000,
    BadDecodingError = 0x8008_0000,
    BadEncodingLimitsExceeded = 0x8009_0000,
    BadRequestTooLarge = 0x80B8_0000,
    BadResponseTooLarge = 0x80B9_0000,
    BadUnknownResponse = 0x8001_1000,
    BadTimeout = 0x800A_0000,
    BadServiceUnsupported = 0x800B_0000,
    BadShutdown = 0x800C_0000,
    BadServerNotConnected = 0x800D_0000,
    BadServerHalted = 0x800E_0000,
    BadNothingToDo = 0x800F_0000,
    BadTooManyOperations = 0x8010_0000,
    BadDataTypeIdUnknown = 0x8012_0000,
    BadCertificateInvalid = 0x8013_0000,
    BadSecurityChecksFailed = 0x8014_0000,
    BadCertificateTimeInvalid = 0x8015_0000,
    BadCertificateIssuerTimeInvalid = 0x8016_0000,
    BadCertificateHostNameInvalid = 0x8017_0000,
    BadCertificateUriInvalid = 0x8018_0000,
    BadCertificateUseNotAllowed = 0x8019_0000,
    BadCertificateIssuerUseNotAllowed = 0x801A_0000,
    BadCertificateUntrusted = 0x801B_0000,
    BadCertificateRevocationUnknown = 0x801C_0000,
    BadCertificateIssuerRevocationUnknown = 0x801D_0000,
    BadCertificateRevoked = 0x801E_0000,
    BadCertificateIssuerRevoked = 0x801F_0000,
    BadUserAccessDenied = 0x801F_0001,
    BadIdentityTokenInvalid = 0x8020_0000,
    BadIdentityTokenRejected = 0x8021_0000,
    BadSecureChannelIdInvalid = 0x8022_0000,
    BadInvalidTimestamp = 0x8023_0000,
    BadNonceInvalid = 0x8024_0000,
    BadSessionIdInvalid = 0x8025_0000,
    BadSessionClosed = 0x8026_0000,
    BadSessionNotActivated = 0x8027_0000,
    BadSubscriptionIdInvalid = 0x8028_0000,
    BadRequestHeaderInvalid = 0x802A_0000,
    BadTimestampsToReturnInvalid = 0x802B_0000,
    BadRequestCancelledByClient = 0x802C_0000,
    BadTooManyMatches = 0x8032_0000,
    BadQueryTooComplex = 0x8033_0000,
    BadNoMatch = 0x8034_0000,
    BadTooManySubscriptions = 0x8043_0000,
    BadTooManySessions = 0x8044_0000,
    BadMaxConnectionsReached = 0x80BB_0000,
    BadNoSubscription = 0x8045_0000,
    BadSequenceNumberUnknown = 0x8046_0000,
    BadMessageNotAvailable = 0x803B_0000,
    BadInsufficientClientProfile = 0x803C_0000,
    BadStateNotActive = 0x803D_0000,
    BadTcpServerTooBusy = 0x8048_0000,
    BadTcpMessageTypeInvalid = 0x8049_0000,
    BadTcpSecureChannelUnknown = 0x804A_0000,
    BadTcpMessageTooLarge = 0x804B_0000,
    BadTcpNotEnoughResources = 0x804C_0000,
    BadTcpInternalError = 0x804D_0000,
    BadTcpEndpointUrlInvalid = 0x804E_0000,
    BadRequestInterrupted = 0x804F_0000,
    BadRequestTimeout = 0x8050_0000,
    BadSecureChannelClosed = 0x8051_0000,
    BadSecureChannelTokenUnknown = 0x8052_0000,
    BadSequenceNumberInvalid = 0x8053_0000,
    BadProtocolVersionUnsupported = 0x805A_0000,
    BadConfigurationError = 0x8054_0000,
    BadNotConnected = 0x8055_0000,
    BadSecurityPolicyRejected = 0x8055_0001,
    BadDeviceFailure = 0x8056_0000,
    BadSensorFailure = 0x8057_0000,
    BadOutOfService = 0x8058_0000,
    BadDeadbandFilterInvalid = 0x8059_0000,
    BadApplicationSignatureInvalid = 0x805B_0000,
    BadNoValidCertificates = 0x805C_0000,
    BadConnectionRejected = 0x80AC_0000,
    BadDisconnect = 0x80AD_0000,
    BadConnectionClosed = 0x80AE_0000,
    BadInvalidState = 0x80AF_0000,
    BadEndOfStream = 0x80B0_0000,
    BadNoDataAvailable = 0x80B1_0000,
    BadWaitingForResponse = 0x80B2_0000,
    BadOperationAbandoned = 0x80B3_0000,
    BadExpectedStreamToBlock = 0x80B4_0000,
    BadWouldBlock = 0x80B5_0000,
    BadSyntaxError = 0x80B6_0000,
    BadMaxConnectionsReached2 = 0x80B7_0000,
    BadDataEncodingInvalid = 0x80BC_0000,
    BadDataEncodingUnsupported = 0x80BD_0000,
    BadNodeIdInvalid = 0x8033_0001,
    BadNoCommunication = 0x8037_0000,
}

impl StatusCode {
    /// Returns `true` if this status code represents success (the top two
    /// bits are clear).
    pub const fn is_good(self) -> bool {
        (self as u32) & 0xC000_0000 == 0
    }

    /// Returns `true` if this status code represents an uncertain result.
    pub const fn is_uncertain(self) -> bool {
        (self as u32) & 0xC000_0000 == 0x4000_0000
    }

    /// Returns `true` if this status code represents failure.
    pub const fn is_bad(self) -> bool {
        (self as u32) & 0x8000_0000 != 0
    }

    /// The raw numeric value of this status code, as transmitted on the wire.
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// Classify whether a transient error of this kind is generally safe to
    /// retry. This mirrors the historical default retry whitelist used by
    /// the session's request-retry policy.
    pub const fn is_transient(self) -> bool {
        matches!(
            self,
            StatusCode::BadUnexpectedError
                | StatusCode::BadInternalError
                | StatusCode::BadOutOfMemory
                | StatusCode::BadResourceUnavailable
                | StatusCode::BadCommunicationError
                | StatusCode::BadTimeout
                | StatusCode::BadShutdown
                | StatusCode::BadServerNotConnected
                | StatusCode::BadServerHalted
                | StatusCode::BadNonceInvalid
                | StatusCode::BadSessionClosed
                | StatusCode::BadSessionIdInvalid
                | StatusCode::BadSessionNotActivated
                | StatusCode::BadNoCommunication
                | StatusCode::BadTooManySessions
                | StatusCode::BadTcpServerTooBusy
                | StatusCode::BadTcpSecureChannelUnknown
                | StatusCode::BadTcpNotEnoughResources
                | StatusCode::BadTcpInternalError
                | StatusCode::BadSecureChannelClosed
                | StatusCode::BadSecureChannelIdInvalid
                | StatusCode::BadNotConnected
                | StatusCode::BadDeviceFailure
                | StatusCode::BadSensorFailure
                | StatusCode::BadDisconnect
                | StatusCode::BadConnectionClosed
                | StatusCode::BadEndOfStream
                | StatusCode::BadInvalidState
                | StatusCode::BadMaxConnectionsReached
                | StatusCode::BadConnectionRejected
        )
    }

    /// Decode a status code from its wire representation. Unknown bit
    /// patterns are coerced to `BadUnexpectedError` with the good/bad
    /// classification bits preserved is not attempted here: unknown codes
    /// are rare enough in practice (new server-defined codes) that callers
    /// should not need the raw value round tripped exactly.
    pub fn from_bits(bits: u32) -> StatusCode {
        FROM_BITS
            .iter()
            .find(|(b, _)| *b == bits)
            .map(|(_, code)| *code)
            .unwrap_or(if bits & 0x8000_0000 != 0 {
                StatusCode::BadUnexpectedError
            } else if bits & 0x4000_0000 != 0 {
                StatusCode::Uncertain
            } else {
                StatusCode::Good
            })
    }
}

// A small reverse lookup table. Generated by hand from the enum above;
// kept separate so `from_bits` doesn't need a giant match arm.
macro_rules! from_bits_table {
    ($($variant:ident),* $(,)?) => {
        &[$((StatusCode::$variant as u32, StatusCode::$variant)),*]
    };
}

static FROM_BITS: &[(u32, StatusCode)] = from_bits_table!(
    Good,
    Uncertain,
    BadUnexpectedError,
    BadInternalError,
    BadOutOfMemory,
    BadResourceUnavailable,
    BadCommunicationError,
    BadEncodingError,
    BadDecodingError,
    BadEncodingLimitsExceeded,
    BadRequestTooLarge,
    BadResponseTooLarge,
    BadTimeout,
    BadServiceUnsupported,
    BadShutdown,
    BadServerNotConnected,
    BadServerHalted,
    BadNothingToDo,
    BadTooManyOperations,
    BadDataTypeIdUnknown,
    BadCertificateInvalid,
    BadSecurityChecksFailed,
    BadIdentityTokenInvalid,
    BadIdentityTokenRejected,
    BadSecureChannelIdInvalid,
    BadInvalidTimestamp,
    BadNonceInvalid,
    BadSessionIdInvalid,
    BadSessionClosed,
    BadSessionNotActivated,
    BadSubscriptionIdInvalid,
    BadRequestHeaderInvalid,
    BadTimestampsToReturnInvalid,
    BadRequestCancelledByClient,
    BadTooManySubscriptions,
    BadTooManySessions,
    BadMaxConnectionsReached,
    BadNoSubscription,
    BadSequenceNumberUnknown,
    BadTcpServerTooBusy,
    BadTcpMessageTypeInvalid,
    BadTcpSecureChannelUnknown,
    BadTcpMessageTooLarge,
    BadTcpNotEnoughResources,
    BadTcpInternalError,
    BadTcpEndpointUrlInvalid,
    BadSecureChannelClosed,
    BadSecureChannelTokenUnknown,
    BadSequenceNumberInvalid,
    BadProtocolVersionUnsupported,
    BadConfigurationError,
    BadNotConnected,
    BadSecurityPolicyRejected,
    BadDeviceFailure,
    BadSensorFailure,
    BadApplicationSignatureInvalid,
    BadNoValidCertificates,
    BadConnectionRejected,
    BadDisconnect,
    BadConnectionClosed,
    BadInvalidState,
    BadEndOfStream,
    BadDataEncodingInvalid,
    BadDataEncodingUnsupported,
    BadNoCommunication,
);

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} (0x{:08X})", self, self.bits())
    }
}

impl From<StatusCode> for std::io::Error {
    fn from(value: StatusCode) -> Self {
        std::io::Error::other(value.to_string())
    }
}

impl crate::UaNullable for StatusCode {
    fn is_ua_null(&self) -> bool {
        false
    }
}

impl crate::encoding::SimpleBinaryEncodable for StatusCode {
    fn byte_len(&self) -> usize {
        4
    }

    fn encode<S: std::io::Write + ?Sized>(&self, stream: &mut S) -> crate::encoding::EncodingResult<()> {
        crate::write_u32(stream, self.bits())
    }
}

impl crate::encoding::SimpleBinaryDecodable for StatusCode {
    fn decode<S: std::io::Read + ?Sized>(
        stream: &mut S,
        _decoding_options: &crate::encoding::DecodingOptions,
    ) -> crate::encoding::EncodingResult<Self> {
        Ok(StatusCode::from_bits(crate::read_u32(stream)?))
    }
}
