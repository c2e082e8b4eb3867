// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema registry: field, enum and message descriptors, storage layouts,
//! and the pool that commits them through build transactions.

mod builder;
mod enums;
mod field;
mod layout;
mod message;
mod pool;

pub use builder::{BuildState, EnumBuilder, MessageBuilder, SchemaBuilder};
pub use enums::EnumSchema;
pub use field::{FieldSchema, FieldType, Label};
pub use layout::StorageLayout;
pub use message::MessageSchema;
pub use pool::{PoolSnapshot, SchemaPool, SchemaRef};
