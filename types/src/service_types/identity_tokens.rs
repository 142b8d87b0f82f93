// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Identity tokens carried in `ActivateSessionRequest`, and the signature
//! structure used to prove possession of a certificate's private key.

use std::io::{Read, Write};

use crate::byte_string::ByteString;
use crate::encoding::{BinaryDecodable, BinaryEncodable, EncodingResult};
use crate::object_id::ObjectId;
use crate::string::UAString;
use crate::Context;

use super::MessageInfo;

/// A signature produced over the server's certificate and nonce, proving
/// the client holds the matching private key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureData {
    pub algorithm: UAString,
    pub signature: ByteString,
}

impl SignatureData {
    pub fn null() -> Self {
        Self::default()
    }
}

impl BinaryEncodable for SignatureData {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.algorithm.byte_len(ctx) + self.signature.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.algorithm.encode(stream, ctx)?;
        self.signature.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for SignatureData {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(SignatureData {
            algorithm: UAString::decode(stream, ctx)?,
            signature: ByteString::decode(stream, ctx)?,
        })
    }
}

macro_rules! simple_token {
    ($name:ident { $($field:ident: $ty:ty),* $(,)? }, $object_id:ident) => {
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct $name {
            $(pub $field: $ty,)*
        }

        impl MessageInfo for $name {
            fn type_id(&self) -> ObjectId {
                ObjectId::$object_id
            }
        }

        impl BinaryEncodable for $name {
            fn byte_len(&self, ctx: &Context<'_>) -> usize {
                0 $(+ self.$field.byte_len(ctx))*
            }

            fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
                $(self.$field.encode(stream, ctx)?;)*
                Ok(())
            }
        }

        impl BinaryDecodable for $name {
            fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
                Ok($name {
                    $($field: BinaryDecodable::decode(stream, ctx)?,)*
                })
            }
        }
    };
}

simple_token!(
    AnonymousIdentityToken { policy_id: UAString },
    AnonymousIdentityToken_Encoding_DefaultBinary
);

simple_token!(
    UserNameIdentityToken {
        policy_id: UAString,
        user_name: UAString,
        password: ByteString,
        encryption_algorithm: UAString,
    },
    UserNameIdentityToken_Encoding_DefaultBinary
);

simple_token!(
    X509IdentityToken {
        policy_id: UAString,
        certificate_data: ByteString,
    },
    X509IdentityToken_Encoding_DefaultBinary
);

simple_token!(
    IssuedIdentityToken {
        policy_id: UAString,
        token_data: ByteString,
        encryption_algorithm: UAString,
    },
    IssuedIdentityToken_Encoding_DefaultBinary
);
