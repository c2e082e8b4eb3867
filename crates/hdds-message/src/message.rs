// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message instances: a schema handle plus an owned slot buffer.
//!
//! Accessor dispatch goes through the schema's field table; there is no
//! per-type generated code. Every instance is fully zero-initialized at
//! construction, so reads never observe a partially built message.

use crate::repeated::{ElementType, RepeatedRef};
use crate::schema::{FieldSchema, MessageSchema};
use crate::slot::{self, SlotBuffer};
use crate::trace::{RefVisitor, Trace};
use crate::value::FromValue;
use crate::{Error, FieldType, Result, Value};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Slot protocol type for a field. Repeated slots hold a container handle,
/// which the protocol treats like a message reference.
fn slot_type(field: &FieldSchema) -> FieldType {
    if field.is_repeated() {
        FieldType::Message
    } else {
        field.field_type()
    }
}

/// A concrete value of a [`MessageSchema`].
///
/// # Example
///
/// ```rust
/// use hdds_message::{FieldType, Message, SchemaPool};
///
/// let pool = SchemaPool::new();
/// pool.build(|b| {
///     b.add_message("Point")?
///         .optional("x", FieldType::Int32, 1)?
///         .optional("y", FieldType::Int32, 2)?;
///     Ok(())
/// })
/// .expect("build");
///
/// let point = pool.lookup_message("Point").expect("Point");
/// let mut p = Message::new(&point);
/// p.set("x", 3).unwrap();
/// p.set("y", 4).unwrap();
/// assert_eq!(p.get_as::<i32>("x").unwrap(), 3);
/// assert_eq!(p.to_string(), "<Point: x: 3, y: 4>");
/// ```
pub struct Message {
    schema: Arc<MessageSchema>,
    storage: SlotBuffer,
}

impl Message {
    /// Zero-valued instance of `schema`.
    pub fn new(schema: &Arc<MessageSchema>) -> Self {
        let mut storage = schema.prototype().clone();
        for field in schema.fields().iter().filter(|f| f.is_repeated()) {
            slot::store_repeated(&mut storage, field.offset(), schema.new_repeated(field));
        }
        Self {
            schema: Arc::clone(schema),
            storage,
        }
    }

    /// Instance initialized from `(field name, value)` pairs.
    pub fn with_values<K, V>(
        schema: &Arc<MessageSchema>,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut message = Self::new(schema);
        for (name, value) in values {
            message.set(name.as_ref(), value)?;
        }
        Ok(message)
    }

    /// Schema of this instance.
    pub fn schema(&self) -> &Arc<MessageSchema> {
        &self.schema
    }

    /// Descriptor of field `name`.
    pub fn field(&self, name: &str) -> Result<&FieldSchema> {
        self.schema.field(name).ok_or_else(|| Error::UnknownField {
            message: self.schema.name().to_string(),
            field: name.to_string(),
        })
    }

    /// Read field `name`.
    ///
    /// Message fields return the held handle (never a copy); repeated
    /// fields return the shared container.
    pub fn get(&self, name: &str) -> Result<Value> {
        let field = self.field(name)?;
        Ok(self.read_field(field))
    }

    /// Read field `name` as `T`.
    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<T> {
        T::from_value(self.get(name)?)
    }

    /// Write field `name`. On error the instance is unchanged.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let schema = Arc::clone(&self.schema);
        let field = schema.field(name).ok_or_else(|| Error::UnknownField {
            message: schema.name().to_string(),
            field: name.to_string(),
        })?;
        self.write_field(field, value.into())
    }

    /// Container of repeated field `name`.
    pub fn repeated(&self, name: &str) -> Result<RepeatedRef> {
        let field = self.field(name)?;
        if !field.is_repeated() {
            return Err(Error::mismatch(
                "repeated field",
                format!("{} field '{}'", field.label(), field.name()),
            ));
        }
        match self.read_field(field) {
            Value::Repeated(container) => Ok(container),
            other => Err(Error::mismatch("repeated field", other.kind_name())),
        }
    }

    pub(crate) fn read_field(&self, field: &FieldSchema) -> Value {
        slot::get(slot_type(field), &self.storage, field.offset())
    }

    pub(crate) fn write_field(&mut self, field: &FieldSchema, value: Value) -> Result<()> {
        if field.is_repeated() {
            return self.write_repeated(field, value);
        }
        let class = field.subtype();
        slot::set(
            field.field_type(),
            class.as_ref(),
            &mut self.storage,
            field.offset(),
            value,
        )
        .map_err(|err| match err {
            Error::EncodingError(text) => Error::EncodingError(format!(
                "{}.{}: {}",
                self.schema.name(),
                field.name(),
                text
            )),
            other => other,
        })
    }

    fn write_repeated(&mut self, field: &FieldSchema, value: Value) -> Result<()> {
        let expected = ElementType::of_field(field);
        match value {
            Value::Repeated(container) => {
                if !container.element().same_as(&expected) {
                    return Err(Error::mismatch(
                        format!("repeated {}", expected.field_type()),
                        format!("repeated {}", container.element().field_type()),
                    ));
                }
                slot::store_repeated(&mut self.storage, field.offset(), container);
                Ok(())
            }
            Value::List(items) => {
                let container = self.repeated(field.name())?;
                let mut guard = container.write();
                guard.replace(items)
            }
            other => Err(Error::mismatch("repeated field", other.kind_name())),
        }
    }

    /// Iterate over `(field, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldSchema, Value)> + '_ {
        self.schema
            .fields()
            .iter()
            .map(move |field| (field, self.read_field(field)))
    }

    /// Shallow copy: scalars copied, nested messages shared. Repeated
    /// fields get a fresh container holding the same elements.
    pub fn duplicate(&self) -> Message {
        let mut storage = self.storage.clone();
        for field in self.schema.fields().iter().filter(|f| f.is_repeated()) {
            if let Some(container) = slot::repeated_at(&self.storage, field.offset()) {
                let copy = RepeatedRef::new(container.read().duplicate());
                slot::store_repeated(&mut storage, field.offset(), copy);
            }
        }
        Message {
            schema: Arc::clone(&self.schema),
            storage,
        }
    }

    /// Deep copy: nested messages and containers cloned transitively.
    pub fn deep_copy(&self) -> Message {
        let mut storage = self.storage.clone();
        for field in self.schema.fields() {
            let ty = slot_type(field);
            if ty.is_reference() {
                slot::deep_copy(ty, &mut storage, &self.storage, field.offset());
            }
        }
        Message {
            schema: Arc::clone(&self.schema),
            storage,
        }
    }

    /// Field-wise structural equality. Different schemas are never equal.
    pub fn equals(&self, other: &Message) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema)
            && self.schema.fields().iter().all(|field| {
                slot::equal(
                    slot_type(field),
                    &self.storage,
                    &other.storage,
                    field.offset(),
                )
            })
    }

    /// Order-dependent hash over fields in declaration order.
    pub fn hash_value(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        hasher.write(self.schema.name().as_bytes());
        for field in self.schema.fields() {
            slot::hash(slot_type(field), &self.storage, field.offset(), &mut hasher);
        }
        hasher.finish()
    }

    /// Move into a shared handle.
    pub fn into_ref(self) -> MessageRef {
        MessageRef::new(self)
    }

    fn fmt_field(&self, f: &mut fmt::Formatter<'_>, field: &FieldSchema) -> fmt::Result {
        let value = self.read_field(field);
        if let Value::Enum(number) = value {
            let known = field
                .enum_type()
                .and_then(|e| e.lookup_value(number).map(str::to_string));
            if let Some(name) = known {
                return write!(f, "{}: :{}", field.name(), name);
            }
        }
        write!(f, "{}: {}", field.name(), value)
    }
}

impl Clone for Message {
    fn clone(&self) -> Self {
        self.duplicate()
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Hash for Message {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

impl Trace for Message {
    fn trace(&self, visitor: &mut dyn RefVisitor) {
        for field in self.schema.fields() {
            slot::mark(slot_type(field), &self.storage, field.offset(), visitor);
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}: ", self.schema.name())?;
        for (index, field) in self.schema.fields().iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            self.fmt_field(f, field)?;
        }
        f.write_str(">")
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// ============================================================================
// Shared handle
// ============================================================================

/// Shared handle to a nested message.
///
/// Cloning the handle shares the instance; mutation through one handle is
/// visible through all of them. The schema is cached outside the lock.
#[derive(Clone)]
pub struct MessageRef {
    schema: Arc<MessageSchema>,
    cell: Arc<RwLock<Message>>,
}

impl MessageRef {
    /// Wrap an instance.
    pub fn new(message: Message) -> Self {
        Self {
            schema: Arc::clone(&message.schema),
            cell: Arc::new(RwLock::new(message)),
        }
    }

    /// Schema of the held instance (no lock taken).
    pub fn schema(&self) -> &Arc<MessageSchema> {
        &self.schema
    }

    /// Shared read access.
    pub fn read(&self) -> RwLockReadGuard<'_, Message> {
        self.cell.read()
    }

    /// Non-blocking read access.
    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, Message>> {
        self.cell.try_read()
    }

    /// Exclusive write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, Message> {
        self.cell.write()
    }

    /// Check if both handles point at the same instance.
    pub fn ptr_eq(a: &MessageRef, b: &MessageRef) -> bool {
        Arc::ptr_eq(&a.cell, &b.cell)
    }
}

impl From<Message> for MessageRef {
    fn from(message: Message) -> Self {
        MessageRef::new(message)
    }
}

impl PartialEq for MessageRef {
    fn eq(&self, other: &Self) -> bool {
        MessageRef::ptr_eq(self, other) || self.read().equals(&other.read())
    }
}

impl fmt::Debug for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_read() {
            Some(message) => write!(f, "MessageRef({})", *message),
            None => write!(f, "MessageRef(<{}: locked>)", self.schema.name()),
        }
    }
}
