// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Small enumerations shared across service request/response structs.

use std::io::{Read, Write};

use crate::encoding::{BinaryDecodable, BinaryEncodable, EncodingResult};
use crate::{Error, UaNullable};
use crate::Context;

macro_rules! wire_enum {
    ($name:ident: $repr:ty { $($variant:ident = $value:expr),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub enum $name {
            #[default]
            $($variant,)*
        }

        impl $name {
            fn to_wire(self) -> $repr {
                match self {
                    $($name::$variant => $value,)*
                }
            }

            fn from_wire(value: $repr) -> EncodingResult<Self> {
                match value {
                    $($value => Ok($name::$variant),)*
                    other => Err(Error::decoding(format!(
                        concat!(stringify!($name), " has no variant for wire value {}"),
                        other
                    ))),
                }
            }
        }

        impl UaNullable for $name {
            fn is_ua_null(&self) -> bool {
                false
            }
        }

        impl BinaryEncodable for $name {
            fn byte_len(&self, ctx: &Context<'_>) -> usize {
                self.to_wire().byte_len(ctx)
            }

            fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
                self.to_wire().encode(stream, ctx)
            }
        }

        impl BinaryDecodable for $name {
            fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
                let raw = <$repr>::decode(stream, ctx)?;
                $name::from_wire(raw)
            }
        }
    };
}

wire_enum!(TimestampsToReturn: i32 {
    Source = 0,
    Server = 1,
    Both = 2,
    Neither = 3,
});

wire_enum!(MonitoringMode: i32 {
    Disabled = 0,
    Sampling = 1,
    Reporting = 2,
});

wire_enum!(NodeClass: i32 {
    Unspecified = 0,
    Object = 1,
    Variable = 2,
    Method = 4,
    ObjectType = 8,
    VariableType = 16,
    ReferenceType = 32,
    DataType = 64,
    View = 128,
});

wire_enum!(BrowseDirection: i32 {
    Forward = 0,
    Inverse = 1,
    Both = 2,
});

wire_enum!(SecurityTokenRequestType: i32 {
    Issue = 0,
    Renew = 1,
});

wire_enum!(MessageSecurityMode: i32 {
    Invalid = 0,
    None = 1,
    Sign = 2,
    SignAndEncrypt = 3,
});

wire_enum!(ApplicationType: i32 {
    Server = 0,
    Client = 1,
    ClientAndServer = 2,
    DiscoveryServer = 3,
});

wire_enum!(UserTokenType: i32 {
    Anonymous = 0,
    UserName = 1,
    Certificate = 2,
    IssuedToken = 3,
});
