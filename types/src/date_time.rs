// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! `UtcTime`, OPC UA's timestamp representation: 100-nanosecond ticks since
//! 1601-01-01 (the Windows `FILETIME` epoch).

use chrono::{DateTime, TimeZone, Utc};

use crate::encoding::{DecodingOptions, EncodingResult};
use crate::{SimpleBinaryDecodable, SimpleBinaryEncodable, UaNullable};

const FILETIME_EPOCH_OFFSET_100NS: i64 = 116_444_736_000_000_000;

/// An OPC UA timestamp, stored internally as a `chrono::DateTime<Utc>` and
/// encoded on the wire as 100ns ticks since 1601-01-01.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtcTime(pub DateTime<Utc>);

impl UaNullable for UtcTime {
    fn is_ua_null(&self) -> bool {
        self.0.timestamp() == 0 && self.0.timestamp_subsec_nanos() == 0
    }
}

impl Default for UtcTime {
    fn default() -> Self {
        UtcTime(Utc.timestamp_opt(0, 0).unwrap())
    }
}

impl From<DateTime<Utc>> for UtcTime {
    fn from(value: DateTime<Utc>) -> Self {
        UtcTime(value)
    }
}

impl UtcTime {
    /// The current time.
    pub fn now() -> UtcTime {
        UtcTime(Utc::now())
    }

    /// Construct from raw 100ns ticks since the 1601 epoch, as carried on
    /// the wire. Ticks before the epoch or beyond the representable range
    /// clamp to the epoch.
    pub fn from_ticks(ticks: i64) -> UtcTime {
        let unix_100ns = ticks - FILETIME_EPOCH_OFFSET_100NS;
        let secs = unix_100ns.div_euclid(10_000_000);
        let subsec_100ns = unix_100ns.rem_euclid(10_000_000);
        match Utc.timestamp_opt(secs, (subsec_100ns * 100) as u32) {
            chrono::LocalResult::Single(dt) => UtcTime(dt),
            _ => UtcTime::default(),
        }
    }

    /// Render as raw 100ns ticks since the 1601 epoch.
    pub fn as_ticks(&self) -> i64 {
        let secs = self.0.timestamp();
        let subsec_100ns = self.0.timestamp_subsec_nanos() as i64 / 100;
        secs * 10_000_000 + subsec_100ns + FILETIME_EPOCH_OFFSET_100NS
    }
}

impl SimpleBinaryEncodable for UtcTime {
    fn byte_len(&self) -> usize {
        8
    }

    fn encode<S: std::io::Write + ?Sized>(&self, stream: &mut S) -> EncodingResult<()> {
        crate::write_i64(stream, self.as_ticks())
    }
}

impl SimpleBinaryDecodable for UtcTime {
    fn decode<S: std::io::Read + ?Sized>(
        stream: &mut S,
        _decoding_options: &DecodingOptions,
    ) -> EncodingResult<Self> {
        let ticks = crate::read_i64(stream)?;
        Ok(UtcTime::from_ticks(ticks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_ticks() {
        let t = UtcTime::from_ticks(131_786_688_000_000_000); // 2018-08-10T23:00:00Z
        assert_eq!(t.0.format("%Y-%m-%dT%H:%M:%SZ").to_string(), "2018-08-10T23:00:00Z");
        assert_eq!(t.as_ticks(), 131_786_688_000_000_000);
    }
}
