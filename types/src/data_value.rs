// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! `DataValue`, a `Variant` paired with status and timestamp metadata, as
//! returned by Read and carried in data change notifications.

use std::io::Write;

use crate::date_time::UtcTime;
use crate::encoding::{BinaryDecodable, BinaryEncodable, EncodingResult};
use crate::status_code::StatusCode;
use crate::variant::Variant;
use crate::{read_u8, write_u8, Context, UaNullable};

const HAS_VALUE: u8 = 0x01;
const HAS_STATUS: u8 = 0x02;
const HAS_SOURCE_TIMESTAMP: u8 = 0x04;
const HAS_SERVER_TIMESTAMP: u8 = 0x08;
const HAS_SOURCE_PICOSECONDS: u8 = 0x10;
const HAS_SERVER_PICOSECONDS: u8 = 0x20;

/// A value along with its quality and timestamps.
#[derive(Debug, Clone, Default)]
pub struct DataValue {
    /// The value itself.
    pub value: Option<Variant>,
    /// Quality of `value`. `None` implies `Good`.
    pub status: Option<StatusCode>,
    /// Timestamp applied by the source of the data.
    pub source_timestamp: Option<UtcTime>,
    /// Sub-second precision beyond `source_timestamp`, in units of 100ps.
    pub source_picoseconds: Option<u16>,
    /// Timestamp applied by the server when it received or processed the
    /// value.
    pub server_timestamp: Option<UtcTime>,
    /// Sub-second precision beyond `server_timestamp`, in units of 100ps.
    pub server_picoseconds: Option<u16>,
}

impl UaNullable for DataValue {
    fn is_ua_null(&self) -> bool {
        self.value.is_none()
    }
}

impl DataValue {
    /// A `DataValue` wrapping a good-quality value with both timestamps
    /// set to now.
    pub fn new_now(value: impl Into<Variant>) -> Self {
        let now = UtcTime::now();
        DataValue {
            value: Some(value.into()),
            status: Some(StatusCode::Good),
            source_timestamp: Some(now),
            server_timestamp: Some(now),
            ..Default::default()
        }
    }

    /// A `DataValue` carrying only a bad status code, no value.
    pub fn new_error(status: StatusCode) -> Self {
        DataValue {
            status: Some(status),
            ..Default::default()
        }
    }
}

impl BinaryEncodable for DataValue {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        let mut size = 1;
        if let Some(v) = &self.value {
            size += v.byte_len(ctx);
        }
        if let Some(v) = self.status {
            size += v.bits().byte_len(ctx);
        }
        if let Some(v) = &self.source_timestamp {
            size += v.byte_len(ctx);
        }
        if let Some(v) = self.source_picoseconds {
            size += v.byte_len(ctx);
        }
        if let Some(v) = &self.server_timestamp {
            size += v.byte_len(ctx);
        }
        if let Some(v) = self.server_picoseconds {
            size += v.byte_len(ctx);
        }
        size
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        let mut mask = 0u8;
        if self.value.is_some() {
            mask |= HAS_VALUE;
        }
        if self.status.is_some() {
            mask |= HAS_STATUS;
        }
        if self.source_timestamp.is_some() {
            mask |= HAS_SOURCE_TIMESTAMP;
        }
        if self.source_picoseconds.is_some() {
            mask |= HAS_SOURCE_PICOSECONDS;
        }
        if self.server_timestamp.is_some() {
            mask |= HAS_SERVER_TIMESTAMP;
        }
        if self.server_picoseconds.is_some() {
            mask |= HAS_SERVER_PICOSECONDS;
        }
        write_u8(stream, mask)?;
        if let Some(v) = &self.value {
            v.encode(stream, ctx)?;
        }
        if let Some(v) = self.status {
            v.bits().encode(stream, ctx)?;
        }
        if let Some(v) = &self.source_timestamp {
            v.encode(stream, ctx)?;
        }
        if let Some(v) = self.source_picoseconds {
            v.encode(stream, ctx)?;
        }
        if let Some(v) = &self.server_timestamp {
            v.encode(stream, ctx)?;
        }
        if let Some(v) = self.server_picoseconds {
            v.encode(stream, ctx)?;
        }
        Ok(())
    }
}

impl BinaryDecodable for DataValue {
    fn decode<S: std::io::Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        let mask = read_u8(stream)?;
        let value = (mask & HAS_VALUE != 0)
            .then(|| Variant::decode(stream, ctx))
            .transpose()?;
        let status = (mask & HAS_STATUS != 0)
            .then(|| u32::decode(stream, ctx).map(StatusCode::from_bits))
            .transpose()?;
        let source_timestamp = (mask & HAS_SOURCE_TIMESTAMP != 0)
            .then(|| UtcTime::decode(stream, ctx))
            .transpose()?;
        let source_picoseconds = (mask & HAS_SOURCE_PICOSECONDS != 0)
            .then(|| u16::decode(stream, ctx))
            .transpose()?;
        let server_timestamp = (mask & HAS_SERVER_TIMESTAMP != 0)
            .then(|| UtcTime::decode(stream, ctx))
            .transpose()?;
        let server_picoseconds = (mask & HAS_SERVER_PICOSECONDS != 0)
            .then(|| u16::decode(stream, ctx))
            .transpose()?;
        Ok(DataValue {
            value,
            status,
            source_timestamp,
            source_picoseconds,
            server_timestamp,
            server_picoseconds,
        })
    }
}
