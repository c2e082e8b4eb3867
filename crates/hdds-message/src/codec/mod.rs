// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec boundary.
//!
//! Codecs drive messages only through the public accessor surface: fields
//! are enumerated in declaration order and read or written with
//! [`FieldSchema::get`](crate::FieldSchema::get) /
//! [`FieldSchema::set`](crate::FieldSchema::set). Binary wire formats are
//! left to external engines implementing [`Codec`].

#[cfg(feature = "json")]
mod json;

#[cfg(feature = "json")]
pub use json::{decode_json, encode_json, JsonCodec};

use crate::schema::MessageSchema;
use crate::{Error, Message};
use std::fmt;
use std::sync::Arc;

/// Error returned by codecs.
#[derive(Debug)]
pub enum CodecError {
    /// Field access rejected a decoded value.
    Schema(Error),
    /// Input is structurally invalid for the schema.
    InvalidData(String),
    /// Input names a field the schema does not declare.
    UnknownField { message: String, field: String },
    #[cfg(feature = "json")]
    Json(serde_json::Error),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(e) => write!(f, "Schema error: {}", e),
            Self::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
            Self::UnknownField { message, field } => {
                write!(f, "Unknown field '{}' in {}", field, message)
            }
            #[cfg(feature = "json")]
            Self::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Schema(e) => Some(e),
            #[cfg(feature = "json")]
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Error> for CodecError {
    fn from(e: Error) -> Self {
        Self::Schema(e)
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for CodecError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Encode/decode messages to and from a byte representation.
pub trait Codec {
    /// Serialize `message`.
    fn encode(&self, message: &Message) -> Result<Vec<u8>, CodecError>;

    /// Build a `schema` instance from `bytes`.
    fn decode(&self, schema: &Arc<MessageSchema>, bytes: &[u8]) -> Result<Message, CodecError>;
}
