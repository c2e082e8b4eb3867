// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Native slot protocol: typed cells inside a byte buffer.
//!
//! A [`SlotBuffer`] is a flat byte buffer plus a table of owned references.
//! Scalar slots store their value inline (little-endian). Reference slots
//! (string, bytes, message, repeated) store a `u32` handle into the table.
//! Every handle in a buffer is distinct, so rotating cells (repeated-field
//! insert) permutes handles without aliasing them.
//!
//! All functions here take the field type and the slot offset; the caller
//! (message storage or repeated field) owns the layout.

use crate::config::HANDLE_SLOT_SIZE;
use crate::schema::SchemaRef;
use crate::trace::RefVisitor;
use crate::{Error, FieldType, MessageRef, RepeatedRef, Result, Value};
use std::hash::Hasher;
use std::sync::Arc;

/// Owned reference held by a reference slot.
#[derive(Debug, Clone)]
pub(crate) enum OwnedRef {
    Str(Arc<str>),
    Bytes(Arc<[u8]>),
    Message(Option<MessageRef>),
    Repeated(RepeatedRef),
}

/// Byte cells plus the reference table they point into.
#[derive(Debug, Clone, Default)]
pub(crate) struct SlotBuffer {
    bytes: Vec<u8>,
    refs: Vec<OwnedRef>,
}

impl SlotBuffer {
    /// Zero-filled buffer of `size` bytes with an empty reference table.
    pub(crate) fn with_size(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
            refs: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Grow (or shrink) the byte area. New bytes are zero.
    pub(crate) fn resize(&mut self, size: usize) {
        self.bytes.resize(size, 0);
    }

    /// Rotate `start..end` right by `by` bytes.
    pub(crate) fn rotate_right(&mut self, start: usize, end: usize, by: usize) {
        self.bytes[start..end].rotate_right(by);
    }

    fn cell<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[offset..offset + N]);
        out
    }

    fn write_cell(&mut self, offset: usize, data: &[u8]) {
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
    }

    fn handle(&self, offset: usize) -> usize {
        u32::from_le_bytes(self.cell::<HANDLE_SLOT_SIZE>(offset)) as usize
    }

    /// Append `value` to the reference table and point the cell at it.
    fn alloc(&mut self, offset: usize, value: OwnedRef) {
        let handle = self.refs.len() as u32;
        self.refs.push(value);
        self.write_cell(offset, &handle.to_le_bytes());
    }

    pub(crate) fn owned(&self, offset: usize) -> &OwnedRef {
        &self.refs[self.handle(offset)]
    }

    fn owned_mut(&mut self, offset: usize) -> &mut OwnedRef {
        let handle = self.handle(offset);
        &mut self.refs[handle]
    }
}

// ============================================================================
// Repeated slots
// ============================================================================

/// Allocate a repeated slot holding `field`.
pub(crate) fn init_repeated(buf: &mut SlotBuffer, offset: usize, field: RepeatedRef) {
    buf.alloc(offset, OwnedRef::Repeated(field));
}

/// Point an already-allocated repeated slot at `field`.
pub(crate) fn store_repeated(buf: &mut SlotBuffer, offset: usize, field: RepeatedRef) {
    *buf.owned_mut(offset) = OwnedRef::Repeated(field);
}

/// Container held by a repeated slot.
pub(crate) fn repeated_at(buf: &SlotBuffer, offset: usize) -> Option<&RepeatedRef> {
    match buf.owned(offset) {
        OwnedRef::Repeated(field) => Some(field),
        _ => None,
    }
}

// ============================================================================
// Protocol
// ============================================================================

/// Width in bytes of a slot for `field_type`.
pub fn size_of(field_type: FieldType) -> usize {
    match field_type {
        FieldType::Bool => 1,
        FieldType::Int32 | FieldType::UInt32 | FieldType::Float | FieldType::Enum => 4,
        FieldType::Int64 | FieldType::UInt64 | FieldType::Double => 8,
        FieldType::String | FieldType::Bytes | FieldType::Message => HANDLE_SLOT_SIZE,
    }
}

fn zero_ref(field_type: FieldType) -> Option<OwnedRef> {
    match field_type {
        FieldType::String => Some(OwnedRef::Str(Arc::from(""))),
        FieldType::Bytes => Some(OwnedRef::Bytes(Arc::from(&[][..]))),
        FieldType::Message => Some(OwnedRef::Message(None)),
        _ => None,
    }
}

/// Write the zero value into a fresh cell (allocates a handle for references).
pub(crate) fn init(field_type: FieldType, buf: &mut SlotBuffer, offset: usize) {
    match zero_ref(field_type) {
        Some(value) => buf.alloc(offset, value),
        None => buf.write_cell(offset, &[0u8; 8][..size_of(field_type)]),
    }
}

/// Write the zero value into an initialized cell (keeps its handle).
pub(crate) fn reset(field_type: FieldType, buf: &mut SlotBuffer, offset: usize) {
    match zero_ref(field_type) {
        Some(value) => *buf.owned_mut(offset) = value,
        None => buf.write_cell(offset, &[0u8; 8][..size_of(field_type)]),
    }
}

/// Validate `value` against the slot type (and class, for message/enum
/// slots), then store it. On error the cell is left untouched.
pub(crate) fn set(
    field_type: FieldType,
    class: Option<&SchemaRef>,
    buf: &mut SlotBuffer,
    offset: usize,
    value: Value,
) -> Result<()> {
    match field_type {
        FieldType::Bool => match value {
            Value::Bool(v) => buf.write_cell(offset, &[u8::from(v)]),
            other => return Err(Error::mismatch("bool", other.kind_name())),
        },
        FieldType::Int32 => {
            let v = integer_as::<i32>(&value, field_type)?;
            buf.write_cell(offset, &v.to_le_bytes());
        }
        FieldType::Int64 => {
            let v = integer_as::<i64>(&value, field_type)?;
            buf.write_cell(offset, &v.to_le_bytes());
        }
        FieldType::UInt32 => {
            let v = integer_as::<u32>(&value, field_type)?;
            buf.write_cell(offset, &v.to_le_bytes());
        }
        FieldType::UInt64 => {
            let v = integer_as::<u64>(&value, field_type)?;
            buf.write_cell(offset, &v.to_le_bytes());
        }
        FieldType::Float => {
            let wide = float_of(&value, field_type)?;
            if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
                return Err(Error::mismatch(
                    field_type.name(),
                    format!("out-of-range value {}", wide),
                ));
            }
            buf.write_cell(offset, &(wide as f32).to_le_bytes());
        }
        FieldType::Double => {
            let v = float_of(&value, field_type)?;
            buf.write_cell(offset, &v.to_le_bytes());
        }
        FieldType::String => {
            let text = match value {
                Value::String(s) => s,
                Value::Bytes(b) => std::str::from_utf8(&b)
                    .map(Arc::from)
                    .map_err(|_| Error::EncodingError(String::from_utf8_lossy(&b).into_owned()))?,
                other => return Err(Error::mismatch("string", other.kind_name())),
            };
            *buf.owned_mut(offset) = OwnedRef::Str(text);
        }
        FieldType::Bytes => {
            let bytes = match value {
                Value::Bytes(b) => b,
                Value::String(s) => Arc::from(s.as_bytes()),
                other => return Err(Error::mismatch("bytes", other.kind_name())),
            };
            *buf.owned_mut(offset) = OwnedRef::Bytes(bytes);
        }
        FieldType::Message => {
            let message = match value {
                Value::Message(None) => None,
                Value::Message(Some(m)) => match class {
                    Some(SchemaRef::Message(expected)) if Arc::ptr_eq(m.schema(), expected) => {
                        Some(m)
                    }
                    Some(SchemaRef::Message(expected)) => {
                        return Err(Error::mismatch(
                            format!("message {}", expected.name()),
                            format!("message {} of another schema", m.schema().name()),
                        ))
                    }
                    _ => {
                        return Err(Error::mismatch(
                            "message of a resolved class",
                            format!("message {}", m.schema().name()),
                        ))
                    }
                },
                other => return Err(Error::mismatch("message", other.kind_name())),
            };
            *buf.owned_mut(offset) = OwnedRef::Message(message);
        }
        FieldType::Enum => {
            let Some(SchemaRef::Enum(e)) = class else {
                return Err(Error::mismatch("enum of a resolved class", value.kind_name()));
            };
            let number = match &value {
                Value::Enum(n) => *n,
                Value::String(name) => e.lookup_name(name).ok_or_else(|| {
                    Error::mismatch(format!("value of enum {}", e.name()), name.to_string())
                })?,
                _ => integer_as::<i32>(&value, field_type)?,
            };
            buf.write_cell(offset, &number.to_le_bytes());
        }
    }
    Ok(())
}

/// Read the slot as a [`Value`]. Message slots return the held handle.
pub(crate) fn get(field_type: FieldType, buf: &SlotBuffer, offset: usize) -> Value {
    match field_type {
        FieldType::Bool => Value::Bool(buf.bytes[offset] != 0),
        FieldType::Int32 => Value::Int32(i32::from_le_bytes(buf.cell(offset))),
        FieldType::Int64 => Value::Int64(i64::from_le_bytes(buf.cell(offset))),
        FieldType::UInt32 => Value::UInt32(u32::from_le_bytes(buf.cell(offset))),
        FieldType::UInt64 => Value::UInt64(u64::from_le_bytes(buf.cell(offset))),
        FieldType::Float => Value::Float(f32::from_le_bytes(buf.cell(offset))),
        FieldType::Double => Value::Double(f64::from_le_bytes(buf.cell(offset))),
        FieldType::Enum => Value::Enum(i32::from_le_bytes(buf.cell(offset))),
        FieldType::String | FieldType::Bytes | FieldType::Message => match buf.owned(offset) {
            OwnedRef::Str(s) => Value::String(Arc::clone(s)),
            OwnedRef::Bytes(b) => Value::Bytes(Arc::clone(b)),
            OwnedRef::Message(m) => Value::Message(m.clone()),
            OwnedRef::Repeated(r) => Value::Repeated(r.clone()),
        },
    }
}

/// Visit the owned reference held by the slot, if any.
pub(crate) fn mark(
    field_type: FieldType,
    buf: &SlotBuffer,
    offset: usize,
    visitor: &mut dyn RefVisitor,
) {
    if !field_type.is_reference() {
        return;
    }
    match buf.owned(offset) {
        OwnedRef::Str(s) => visitor.visit_string(s),
        OwnedRef::Bytes(b) => visitor.visit_bytes(b),
        OwnedRef::Message(Some(m)) => visitor.visit_message(m),
        OwnedRef::Message(None) => {}
        OwnedRef::Repeated(r) => visitor.visit_repeated(r),
    }
}

/// Shallow copy: scalars bit-copied, references shared.
pub(crate) fn duplicate(field_type: FieldType, to: &mut SlotBuffer, from: &SlotBuffer, offset: usize) {
    if field_type.is_reference() {
        *to.owned_mut(offset) = from.owned(offset).clone();
    } else {
        copy_cell(field_type, to, from, offset);
    }
}

/// Deep copy: scalars bit-copied, references cloned into fresh owners.
pub(crate) fn deep_copy(field_type: FieldType, to: &mut SlotBuffer, from: &SlotBuffer, offset: usize) {
    if !field_type.is_reference() {
        copy_cell(field_type, to, from, offset);
        return;
    }
    let copy = match from.owned(offset) {
        OwnedRef::Str(s) => OwnedRef::Str(Arc::from(&**s)),
        OwnedRef::Bytes(b) => OwnedRef::Bytes(Arc::from(&**b)),
        OwnedRef::Message(m) => {
            OwnedRef::Message(m.as_ref().map(|m| MessageRef::new(m.read().deep_copy())))
        }
        OwnedRef::Repeated(r) => OwnedRef::Repeated(RepeatedRef::new(r.read().deep_copy())),
    };
    *to.owned_mut(offset) = copy;
}

fn copy_cell(field_type: FieldType, to: &mut SlotBuffer, from: &SlotBuffer, offset: usize) {
    let width = size_of(field_type);
    to.bytes[offset..offset + width].copy_from_slice(&from.bytes[offset..offset + width]);
}

/// Structural equality of the slot at `offset` in two buffers.
///
/// Scalars compare bitwise (so NaN equals itself and `0.0 != -0.0`).
pub(crate) fn equal(field_type: FieldType, a: &SlotBuffer, b: &SlotBuffer, offset: usize) -> bool {
    if !field_type.is_reference() {
        let width = size_of(field_type);
        return a.bytes[offset..offset + width] == b.bytes[offset..offset + width];
    }
    match (a.owned(offset), b.owned(offset)) {
        (OwnedRef::Str(x), OwnedRef::Str(y)) => x.as_bytes() == y.as_bytes(),
        (OwnedRef::Bytes(x), OwnedRef::Bytes(y)) => x == y,
        (OwnedRef::Message(x), OwnedRef::Message(y)) => x == y,
        (OwnedRef::Repeated(x), OwnedRef::Repeated(y)) => x == y,
        _ => false,
    }
}

/// Feed the slot into `hasher`, consistent with [`equal`].
pub(crate) fn hash(field_type: FieldType, buf: &SlotBuffer, offset: usize, hasher: &mut impl Hasher) {
    if !field_type.is_reference() {
        hasher.write(&buf.bytes[offset..offset + size_of(field_type)]);
        return;
    }
    match buf.owned(offset) {
        OwnedRef::Str(s) => {
            hasher.write_usize(s.len());
            hasher.write(s.as_bytes());
        }
        OwnedRef::Bytes(b) => {
            hasher.write_usize(b.len());
            hasher.write(b);
        }
        OwnedRef::Message(None) => hasher.write_u8(0),
        OwnedRef::Message(Some(m)) => {
            hasher.write_u8(1);
            hasher.write_u64(m.read().hash_value());
        }
        OwnedRef::Repeated(r) => hasher.write_u64(r.read().hash_value()),
    }
}

// ============================================================================
// Numeric coercion
// ============================================================================

/// Integer view of a numeric value. Floats must be integral.
fn integer_of(value: &Value, field_type: FieldType) -> Result<i128> {
    match *value {
        Value::Int32(v) | Value::Enum(v) => Ok(i128::from(v)),
        Value::Int64(v) => Ok(i128::from(v)),
        Value::UInt32(v) => Ok(i128::from(v)),
        Value::UInt64(v) => Ok(i128::from(v)),
        Value::Float(v) => integral(f64::from(v), field_type),
        Value::Double(v) => integral(v, field_type),
        ref other => Err(Error::mismatch(field_type.name(), other.kind_name())),
    }
}

fn integral(v: f64, field_type: FieldType) -> Result<i128> {
    if v.is_finite() && v.fract() == 0.0 {
        Ok(v as i128)
    } else {
        Err(Error::mismatch(
            field_type.name(),
            format!("non-integral value {}", v),
        ))
    }
}

fn integer_as<T: TryFrom<i128>>(value: &Value, field_type: FieldType) -> Result<T> {
    let wide = integer_of(value, field_type)?;
    T::try_from(wide).map_err(|_| {
        Error::mismatch(field_type.name(), format!("out-of-range value {}", wide))
    })
}

fn float_of(value: &Value, field_type: FieldType) -> Result<f64> {
    match *value {
        Value::Float(v) => Ok(f64::from(v)),
        Value::Double(v) => Ok(v),
        Value::Int32(v) => Ok(f64::from(v)),
        Value::UInt32(v) => Ok(f64::from(v)),
        Value::Int64(v) => Ok(v as f64),
        Value::UInt64(v) => Ok(v as f64),
        ref other => Err(Error::mismatch(field_type.name(), other.kind_name())),
    }
}
