// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field descriptors for message schemas.

use crate::schema::{EnumSchema, MessageSchema, SchemaRef};
use crate::{Error, Message, Result, Value};
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// Declared type of a field (or of a repeated field's elements).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Bool,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    /// UTF-8 text.
    String,
    /// Arbitrary byte sequence.
    Bytes,
    /// Nested message, resolved by name at finalize.
    Message,
    /// Enum value, resolved by name at finalize.
    Enum,
}

impl FieldType {
    /// Every field type, in declaration order.
    pub const ALL: [FieldType; 11] = [
        FieldType::Bool,
        FieldType::Int32,
        FieldType::Int64,
        FieldType::UInt32,
        FieldType::UInt64,
        FieldType::Float,
        FieldType::Double,
        FieldType::String,
        FieldType::Bytes,
        FieldType::Message,
        FieldType::Enum,
    ];

    /// Schema-language name of the type.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Message => "message",
            Self::Enum => "enum",
        }
    }

    /// Parse a schema-language type name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Width in bytes of a slot holding one value of this type.
    pub fn slot_size(self) -> usize {
        crate::slot::size_of(self)
    }

    /// Message and enum fields need a type name.
    pub fn needs_type_name(self) -> bool {
        matches!(self, Self::Message | Self::Enum)
    }

    /// Slot stores a handle into the reference table instead of an inline scalar.
    pub fn is_reference(self) -> bool {
        matches!(self, Self::String | Self::Bytes | Self::Message)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Optional,
    Required,
    Repeated,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Optional => "optional",
            Self::Required => "required",
            Self::Repeated => "repeated",
        })
    }
}

/// Target of a resolved type reference.
///
/// A message target that can reach back to the referencing schema is
/// held weakly (the pool keeps it alive); every other target is strong,
/// so the strong links between schemas never form a cycle.
#[derive(Debug)]
pub(crate) enum ResolvedRef {
    Message(Arc<MessageSchema>),
    CyclicMessage(Weak<MessageSchema>),
    Enum(Arc<EnumSchema>),
}

/// Immutable descriptor of one message field.
#[derive(Debug)]
pub struct FieldSchema {
    name: String,
    number: u32,
    field_type: FieldType,
    label: Label,
    /// Fully-qualified nested type name (message/enum fields only).
    type_name: Option<String>,
    /// Position in declaration order.
    index: usize,
    /// Byte offset of the slot in the message storage buffer.
    offset: usize,
    resolved: OnceLock<ResolvedRef>,
}

impl FieldSchema {
    pub(crate) fn new(
        name: String,
        number: u32,
        field_type: FieldType,
        label: Label,
        type_name: Option<String>,
        index: usize,
        offset: usize,
    ) -> Self {
        Self {
            name,
            number,
            field_type,
            label,
            type_name,
            index,
            offset,
            resolved: OnceLock::new(),
        }
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Declared type.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Cardinality label.
    pub fn label(&self) -> Label {
        self.label
    }

    /// Check if this field is repeated.
    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }

    /// Fully-qualified name of the nested message/enum type.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Position in declaration order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Byte offset of this field's slot.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Resolved nested type, if any.
    ///
    /// Returns `None` for scalar fields, and for a cyclic message field
    /// whose target schema has been dropped along with its pool. Setting
    /// a field without a class always fails.
    pub fn subtype(&self) -> Option<SchemaRef> {
        match self.resolved.get()? {
            ResolvedRef::Message(schema) => Some(SchemaRef::Message(Arc::clone(schema))),
            ResolvedRef::CyclicMessage(weak) => weak.upgrade().map(SchemaRef::Message),
            ResolvedRef::Enum(schema) => Some(SchemaRef::Enum(Arc::clone(schema))),
        }
    }

    /// Nested message schema (message fields only).
    pub fn message_type(&self) -> Option<Arc<MessageSchema>> {
        self.subtype()?.into_message()
    }

    /// Nested enum schema (enum fields only).
    pub fn enum_type(&self) -> Option<Arc<EnumSchema>> {
        self.subtype()?.into_enum()
    }

    /// Read this field from `message`.
    pub fn get(&self, message: &Message) -> Result<Value> {
        self.check_owner(message)?;
        Ok(message.read_field(self))
    }

    /// Write this field on `message`.
    pub fn set(&self, message: &mut Message, value: impl Into<Value>) -> Result<()> {
        self.check_owner(message)?;
        message.write_field(self, value.into())
    }

    /// Bind the nested type. Called exactly once, at finalize.
    pub(crate) fn resolve(&self, target: ResolvedRef) -> Result<()> {
        self.resolved
            .set(target)
            .map_err(|_| Error::LayoutError(format!("field '{}' resolved twice", self.name)))
    }

    fn check_owner(&self, message: &Message) -> Result<()> {
        let owned = message
            .schema()
            .fields()
            .get(self.index)
            .is_some_and(|f| std::ptr::eq(f, self));
        if owned {
            Ok(())
        } else {
            Err(Error::UnknownField {
                message: message.schema().name().to_string(),
                field: self.name.clone(),
            })
        }
    }
}
