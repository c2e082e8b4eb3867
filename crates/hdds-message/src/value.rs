// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field values exchanged with message accessors.

use crate::{Error, Message, MessageRef, RepeatedField, RepeatedRef, Result};
use std::fmt;
use std::sync::Arc;

/// A value read from or written to a field slot.
///
/// Reads always produce the variant matching the field's declared type.
/// Writes accept any variant the slot can convert losslessly (for example
/// an `Int64` into an `int32` field when it is in range).
#[derive(Clone)]
pub enum Value {
    // Scalars
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),

    // Strings
    String(Arc<str>),
    Bytes(Arc<[u8]>),

    // Typed references
    Enum(i32),
    Message(Option<MessageRef>),
    Repeated(RepeatedRef),

    /// Bulk input for repeated fields (replaces the container contents).
    List(Vec<Value>),
}

impl Value {
    /// Short type name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::UInt32(_) => "uint32",
            Self::UInt64(_) => "uint64",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Enum(_) => "enum",
            Self::Message(None) => "null message",
            Self::Message(Some(_)) => "message",
            Self::Repeated(_) => "repeated field",
            Self::List(_) => "list",
        }
    }

    /// Build a list value.
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Check if value is a null message.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Message(None))
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i32.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u32.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::UInt32(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as f32.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as raw bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as enum number.
    pub fn as_enum(&self) -> Option<i32> {
        match self {
            Self::Enum(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as a (non-null) message handle.
    pub fn as_message(&self) -> Option<&MessageRef> {
        match self {
            Self::Message(v) => v.as_ref(),
            _ => None,
        }
    }

    /// Try to get as a repeated field handle.
    pub fn as_repeated(&self) -> Option<&RepeatedRef> {
        match self {
            Self::Repeated(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int32(a), Self::Int32(b)) | (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            (Self::UInt32(a), Self::UInt32(b)) => a == b,
            (Self::UInt64(a), Self::UInt64(b)) => a == b,
            // Bitwise, like slot equality
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Message(a), Self::Message(b)) => a == b,
            (Self::Repeated(a), Self::Repeated(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int32(v) | Self::Enum(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::UInt32(v) => write!(f, "{}", v),
            Self::UInt64(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{:?}", v),
            Self::Bytes(v) => write!(f, "b\"{}\"", v.escape_ascii()),
            Self::Message(None) => f.write_str("nil"),
            Self::Message(Some(m)) => match m.try_read() {
                Some(inner) => write!(f, "{}", *inner),
                None => write!(f, "<{}: (locked)>", m.schema().name()),
            },
            Self::Repeated(r) => match r.try_read() {
                Some(inner) => write!(f, "{}", *inner),
                None => f.write_str("[(locked)]"),
            },
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind_name(), self)
    }
}

// Conversion traits
macro_rules! impl_from_scalar {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        }
    };
}

impl_from_scalar!(bool, Bool);
impl_from_scalar!(i32, Int32);
impl_from_scalar!(i64, Int64);
impl_from_scalar!(u32, UInt32);
impl_from_scalar!(u64, UInt64);
impl_from_scalar!(f32, Float);
impl_from_scalar!(f64, Double);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(Arc::from(v))
    }
}

impl From<Arc<str>> for Value {
    fn from(v: Arc<str>) -> Self {
        Self::String(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(Arc::from(v))
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(Arc::from(v))
    }
}

impl From<MessageRef> for Value {
    fn from(v: MessageRef) -> Self {
        Self::Message(Some(v))
    }
}

impl From<Option<MessageRef>> for Value {
    fn from(v: Option<MessageRef>) -> Self {
        Self::Message(v)
    }
}

impl From<Message> for Value {
    fn from(v: Message) -> Self {
        Self::Message(Some(MessageRef::new(v)))
    }
}

impl From<RepeatedRef> for Value {
    fn from(v: RepeatedRef) -> Self {
        Self::Repeated(v)
    }
}

impl From<RepeatedField> for Value {
    fn from(v: RepeatedField) -> Self {
        Self::Repeated(RepeatedRef::new(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

/// Trait for typed extraction from a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

macro_rules! impl_from_value {
    ($ty:ty, $variant:ident, $name:expr) => {
        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(Error::mismatch($name, other.kind_name())),
                }
            }
        }
    };
}

impl_from_value!(bool, Bool, "bool");
impl_from_value!(i64, Int64, "int64");
impl_from_value!(u32, UInt32, "uint32");
impl_from_value!(u64, UInt64, "uint64");
impl_from_value!(f32, Float, "float");
impl_from_value!(f64, Double, "double");
impl_from_value!(Arc<str>, String, "string");
impl_from_value!(Arc<[u8]>, Bytes, "bytes");
impl_from_value!(Option<MessageRef>, Message, "message");
impl_from_value!(RepeatedRef, Repeated, "repeated field");

// int32 and enum slots both read back as i32
impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int32(v) | Value::Enum(v) => Ok(v),
            other => Err(Error::mismatch("int32", other.kind_name())),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(v) => Ok(v.to_string()),
            other => Err(Error::mismatch("string", other.kind_name())),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(v) => Ok(v.to_vec()),
            other => Err(Error::mismatch("bytes", other.kind_name())),
        }
    }
}

impl FromValue for MessageRef {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Message(Some(v)) => Ok(v),
            other => Err(Error::mismatch("message", other.kind_name())),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}
