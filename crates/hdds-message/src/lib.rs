// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # hdds-message - Schema-driven runtime message model
//!
//! Message and enum schemas are registered in a [`SchemaPool`] through
//! atomic build transactions. Each message schema gets a fixed storage
//! layout; instances are a schema handle plus a typed slot buffer, read
//! and written by field name through tagged [`Value`]s.
//!
//! ## Quick Start
//!
//! ```rust
//! use hdds_message::{FieldType, Message, SchemaPool, Value};
//!
//! let pool = SchemaPool::new();
//! pool.build(|b| {
//!     b.add_message("Point")?
//!         .optional("x", FieldType::Int32, 1)?
//!         .optional("y", FieldType::Int32, 2)?;
//!     Ok(())
//! })?;
//!
//! let point = pool.lookup_message("Point").expect("Point");
//! assert_eq!(point.layout().size(), 8);
//!
//! let mut p = Message::new(&point);
//! p.set("x", 3)?;
//! p.set("y", 4)?;
//!
//! let mut copy = p.duplicate();
//! copy.set("y", 9)?;
//! assert_eq!(p.get("y")?, Value::Int32(4));
//! # Ok::<(), hdds_message::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------+
//! |  SchemaPool (ArcSwap snapshot)  <--finalize--  SchemaBuilder  |
//! |     MessageSchema: fields + StorageLayout + prototype          |
//! |     EnumSchema:    name <-> number                             |
//! +---------------------------------------------------------------+
//! |  Message = Arc<MessageSchema> + SlotBuffer                     |
//! |     scalar slots inline | string/bytes/message/repeated handles |
//! +---------------------------------------------------------------+
//! |  RepeatedField: growable slot array of one element type        |
//! +---------------------------------------------------------------+
//! |  Codec boundary: Codec trait, JsonCodec (feature "json")       |
//! +---------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`schema`] - descriptors, layouts, pool and build transactions
//! - [`config`] - constants and [`PoolConfig`](config::PoolConfig)
//! - [`codec`] - codec trait and the JSON text codec
//! - [`trace`] - owned-reference visiting for host collectors

pub mod codec;
pub mod config;
mod error;
mod message;
mod repeated;
pub mod schema;
mod slot;
pub mod trace;
mod value;

pub use error::{Error, Result};
pub use message::{Message, MessageRef};
pub use repeated::{Cursor, ElementType, Iter as RepeatedIter, RepeatedField, RepeatedRef};
pub use schema::{
    BuildState, EnumBuilder, EnumSchema, FieldSchema, FieldType, Label, MessageBuilder,
    MessageSchema, PoolSnapshot, SchemaBuilder, SchemaPool, SchemaRef, StorageLayout,
};
pub use slot::size_of as slot_size;
pub use trace::{RefCounter, RefVisitor, Trace};
pub use value::{FromValue, Value};

#[cfg(feature = "json")]
pub use codec::{decode_json, encode_json, JsonCodec};
pub use codec::{Codec, CodecError};

#[cfg(test)]
mod tests;
