// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! `LocalizedText`, a human-readable string tagged with an optional locale.

use std::io::Write;

use crate::encoding::EncodingResult;
use crate::string::UAString;
use crate::{read_u8, write_u8, Context, UaNullable};

const HAS_LOCALE: u8 = 0x1;
const HAS_TEXT: u8 = 0x2;

/// Human readable text, optionally tagged with a locale id such as `"en"`.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
pub struct LocalizedText {
    /// The locale, e.g. `"en-US"`. Null if not specified.
    pub locale: UAString,
    /// The text itself.
    pub text: UAString,
}

impl UaNullable for LocalizedText {
    fn is_ua_null(&self) -> bool {
        self.locale.is_null() && self.text.is_null()
    }
}

impl From<&str> for LocalizedText {
    fn from(text: &str) -> Self {
        LocalizedText {
            locale: UAString::null(),
            text: text.into(),
        }
    }
}

impl LocalizedText {
    /// Construct localized text with an explicit locale.
    pub fn new(locale: &str, text: &str) -> Self {
        LocalizedText {
            locale: locale.into(),
            text: text.into(),
        }
    }

    /// The null localized text.
    pub fn null() -> LocalizedText {
        LocalizedText::default()
    }
}

impl crate::BinaryEncodable for LocalizedText {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        let mut size = 1;
        if self.locale.value().is_some() {
            size += self.locale.byte_len(ctx);
        }
        if self.text.value().is_some() {
            size += self.text.byte_len(ctx);
        }
        size
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        let mut mask = 0u8;
        if self.locale.value().is_some() {
            mask |= HAS_LOCALE;
        }
        if self.text.value().is_some() {
            mask |= HAS_TEXT;
        }
        write_u8(stream, mask)?;
        if mask & HAS_LOCALE != 0 {
            self.locale.encode(stream, ctx)?;
        }
        if mask & HAS_TEXT != 0 {
            self.text.encode(stream, ctx)?;
        }
        Ok(())
    }
}

impl crate::BinaryDecodable for LocalizedText {
    fn decode<S: std::io::Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        let mask = read_u8(stream)?;
        let locale = if mask & HAS_LOCALE != 0 {
            UAString::decode(stream, ctx)?
        } else {
            UAString::null()
        };
        let text = if mask & HAS_TEXT != 0 {
            UAString::decode(stream, ctx)?
        } else {
            UAString::null()
        };
        Ok(LocalizedText { locale, text })
    }
}
