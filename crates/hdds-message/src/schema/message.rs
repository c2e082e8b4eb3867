// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message schemas: ordered field table plus the storage layout.

use super::field::FieldSchema;
use super::layout::StorageLayout;
use crate::repeated::{ElementType, RepeatedField, RepeatedRef};
use crate::slot::{self, SlotBuffer};
use crate::{FieldType, Message};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Immutable message type committed to a [`SchemaPool`](super::SchemaPool).
///
/// Fields are kept in declaration order; that order drives the storage
/// layout, hashing, and every codec.
pub struct MessageSchema {
    name: String,
    fields: Vec<FieldSchema>,
    by_name: HashMap<String, usize>,
    by_number: HashMap<u32, usize>,
    layout: StorageLayout,
    initial_repeated_capacity: usize,
    /// Zero-initialized storage image, built on first instantiation.
    prototype: OnceLock<SlotBuffer>,
}

impl MessageSchema {
    /// Assemble a schema from fields whose offsets already come from `layout`.
    pub(crate) fn new(
        name: String,
        fields: Vec<FieldSchema>,
        layout: StorageLayout,
        initial_repeated_capacity: usize,
    ) -> Self {
        let by_name = fields
            .iter()
            .map(|f| (f.name().to_string(), f.index()))
            .collect();
        let by_number = fields.iter().map(|f| (f.number(), f.index())).collect();
        Self {
            name,
            fields,
            by_name,
            by_number,
            layout,
            initial_repeated_capacity,
            prototype: OnceLock::new(),
        }
    }

    /// Fully-qualified message name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Iterate over the fields in declaration order.
    pub fn each(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter()
    }

    /// Field named `name`.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.by_name.get(name).map(|&index| &self.fields[index])
    }

    /// Field with number `number`.
    pub fn field_by_number(&self, number: u32) -> Option<&FieldSchema> {
        self.by_number.get(&number).map(|&index| &self.fields[index])
    }

    /// Number of declared fields.
    pub fn fields_len(&self) -> usize {
        self.fields.len()
    }

    /// Byte layout of instance storage.
    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Capacity reserved by the first push into a repeated field.
    pub fn initial_repeated_capacity(&self) -> usize {
        self.initial_repeated_capacity
    }

    /// Fresh zero-valued instance.
    pub fn new_message(self: &Arc<Self>) -> Message {
        Message::new(self)
    }

    /// Empty container for the repeated field `field`.
    pub(crate) fn new_repeated(&self, field: &FieldSchema) -> RepeatedRef {
        RepeatedRef::new(RepeatedField::with_element(
            ElementType::of_field(field),
            self.initial_repeated_capacity,
        ))
    }

    /// Zero-initialized storage image. Repeated slots hold a placeholder
    /// container that every instance replaces with its own.
    pub(crate) fn prototype(&self) -> &SlotBuffer {
        self.prototype.get_or_init(|| {
            let mut buf = SlotBuffer::with_size(self.layout.size());
            for field in &self.fields {
                if field.is_repeated() {
                    slot::init_repeated(&mut buf, field.offset(), self.new_repeated(field));
                } else {
                    slot::init(field.field_type(), &mut buf, field.offset());
                }
            }
            log::trace!(
                "[MessageSchema::prototype] built {} ({} bytes)",
                self.name,
                buf.len()
            );
            buf
        })
    }
}

impl fmt::Debug for MessageSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|field| {
                let ty = match (field.field_type(), field.type_name()) {
                    (FieldType::Message | FieldType::Enum, Some(name)) => name.to_string(),
                    (ty, _) => ty.to_string(),
                };
                format!("{} {} {} = {}", field.label(), ty, field.name(), field.number())
            })
            .collect();
        f.debug_struct("MessageSchema")
            .field("name", &self.name)
            .field("fields", &fields)
            .field("size", &self.layout.size())
            .finish()
    }
}
