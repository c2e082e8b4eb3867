// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Repeated field container: growable, type-homogeneous slot array.
//!
//! Elements live back to back in a [`SlotBuffer`], `width` bytes each.
//! Cells in `len..capacity` are allocated and zero-initialized, so growth
//! only ever appends and insert/pop never allocate handles.

use crate::config::DEFAULT_REPEATED_CAPACITY;
use crate::schema::{EnumSchema, FieldSchema, MessageSchema, SchemaRef};
use crate::slot::{self, SlotBuffer};
use crate::trace::{RefVisitor, Trace};
use crate::{Error, FieldType, Result, Value};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Element type of a repeated field: field type plus message/enum class.
#[derive(Debug, Clone)]
pub struct ElementType {
    field_type: FieldType,
    class: Option<SchemaRef>,
}

impl ElementType {
    /// Scalar, string or bytes elements.
    ///
    /// Message and enum elements need a class; use [`ElementType::message`]
    /// or [`ElementType::enumeration`].
    pub fn scalar(field_type: FieldType) -> Result<Self> {
        if field_type.needs_type_name() {
            return Err(Error::mismatch(
                format!("{} class", field_type),
                "no class",
            ));
        }
        Ok(Self {
            field_type,
            class: None,
        })
    }

    /// Message elements of `schema`.
    pub fn message(schema: &Arc<MessageSchema>) -> Self {
        Self {
            field_type: FieldType::Message,
            class: Some(SchemaRef::Message(Arc::clone(schema))),
        }
    }

    /// Enum elements of `schema`.
    pub fn enumeration(schema: &Arc<EnumSchema>) -> Self {
        Self {
            field_type: FieldType::Enum,
            class: Some(SchemaRef::Enum(Arc::clone(schema))),
        }
    }

    /// Element type of a repeated field descriptor.
    pub(crate) fn of_field(field: &FieldSchema) -> Self {
        Self {
            field_type: field.field_type(),
            class: field.subtype(),
        }
    }

    /// Declared element type.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Message/enum class, if any.
    pub fn class(&self) -> Option<&SchemaRef> {
        self.class.as_ref()
    }

    /// Same field type and the same class object.
    pub fn same_as(&self, other: &ElementType) -> bool {
        self.field_type == other.field_type
            && match (&self.class, &other.class) {
                (Some(a), Some(b)) => SchemaRef::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }

    fn describe(&self) -> String {
        match &self.class {
            Some(class) => format!("{} {}", self.field_type, class.name()),
            None => self.field_type.to_string(),
        }
    }
}

/// Ordered, growable sequence of one element type.
///
/// # Example
///
/// ```rust
/// use hdds_message::{FieldType, RepeatedField};
///
/// let mut ints = RepeatedField::new(FieldType::Int32).expect("scalar");
/// ints.push(1).unwrap();
/// ints.push(2).unwrap();
/// ints.push(3).unwrap();
/// assert_eq!(ints.pop().unwrap().as_i32(), Some(3));
/// assert_eq!(ints.len(), 2);
/// assert_eq!(ints.get(0).unwrap().as_i32(), Some(1));
/// ```
pub struct RepeatedField {
    element: ElementType,
    width: usize,
    storage: SlotBuffer,
    size: usize,
    capacity: usize,
    initial_capacity: usize,
}

impl RepeatedField {
    /// Empty container of scalar, string or bytes elements.
    pub fn new(field_type: FieldType) -> Result<Self> {
        Ok(Self::with_element(
            ElementType::scalar(field_type)?,
            DEFAULT_REPEATED_CAPACITY,
        ))
    }

    /// Empty container of `element`. Nothing is allocated until the first push.
    pub fn with_element(element: ElementType, initial_capacity: usize) -> Self {
        Self {
            width: slot::size_of(element.field_type),
            element,
            storage: SlotBuffer::default(),
            size: 0,
            capacity: 0,
            initial_capacity: initial_capacity.max(1),
        }
    }

    /// Element type.
    pub fn element(&self) -> &ElementType {
        &self.element
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Check if the container is empty.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Allocated element slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Ensure room for `new_size` elements, doubling the capacity.
    pub fn reserve(&mut self, new_size: usize) {
        if new_size <= self.capacity {
            return;
        }
        let mut capacity = self.capacity.max(self.initial_capacity);
        while capacity < new_size {
            capacity *= 2;
        }
        self.storage.resize(capacity * self.width);
        for index in self.capacity..capacity {
            slot::init(self.element.field_type, &mut self.storage, index * self.width);
        }
        self.capacity = capacity;
    }

    fn offset(&self, index: usize) -> usize {
        index * self.width
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.size {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index,
                len: self.size,
            })
        }
    }

    fn write(&mut self, index: usize, value: Value) -> Result<()> {
        let offset = self.offset(index);
        slot::set(
            self.element.field_type,
            self.element.class.as_ref(),
            &mut self.storage,
            offset,
            value,
        )
    }

    /// Append an element.
    pub fn push(&mut self, value: impl Into<Value>) -> Result<()> {
        self.reserve(self.size + 1);
        self.write(self.size, value.into())?;
        self.size += 1;
        Ok(())
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Result<Value> {
        if self.size == 0 {
            return Err(Error::EmptyContainer);
        }
        self.size -= 1;
        let offset = self.offset(self.size);
        let value = slot::get(self.element.field_type, &self.storage, offset);
        slot::reset(self.element.field_type, &mut self.storage, offset);
        Ok(value)
    }

    /// Element at `index`.
    pub fn get(&self, index: usize) -> Result<Value> {
        self.check_index(index)?;
        Ok(slot::get(
            self.element.field_type,
            &self.storage,
            self.offset(index),
        ))
    }

    /// Overwrite the element at `index`.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        self.check_index(index)?;
        self.write(index, value.into())
    }

    /// Insert at `index`, shifting trailing elements right. `index == len`
    /// appends.
    pub fn insert(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        if index > self.size {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.size,
            });
        }
        // Validate into the spare tail cell, then rotate it into place.
        self.reserve(self.size + 1);
        self.write(self.size, value.into())?;
        let start = self.offset(index);
        let end = self.offset(self.size + 1);
        self.storage.rotate_right(start, end, self.width);
        self.size += 1;
        Ok(())
    }

    /// Insert several values at `index`, in order. Either all are
    /// inserted or none.
    pub fn insert_all(
        &mut self,
        index: usize,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<()> {
        if index > self.size {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.size,
            });
        }
        let staged = self.staged(values)?;
        let count = staged.size;
        if count == 0 {
            return Ok(());
        }
        self.reserve(self.size + count);
        for i in 0..count {
            self.copy_from(&staged, i, self.size + i)?;
        }
        let start = self.offset(index);
        let end = self.offset(self.size + count);
        self.storage.rotate_right(start, end, count * self.width);
        self.size += count;
        Ok(())
    }

    /// Replace the contents with `values`. Validation happens before the
    /// swap, so a bad element leaves the container unchanged.
    pub fn replace(&mut self, values: impl IntoIterator<Item = Value>) -> Result<()> {
        let staged = self.staged(values)?;
        self.clear();
        self.reserve(staged.size);
        for index in 0..staged.size {
            let offset = self.offset(index);
            slot::duplicate(
                self.element.field_type,
                &mut self.storage,
                &staged.storage,
                offset,
            );
        }
        self.size = staged.size;
        Ok(())
    }

    /// Validate `values` into a scratch container of the same element type.
    fn staged(&self, values: impl IntoIterator<Item = Value>) -> Result<RepeatedField> {
        let mut staged = RepeatedField::with_element(self.element.clone(), self.initial_capacity);
        for value in values {
            staged.push(value)?;
        }
        Ok(staged)
    }

    /// Drop all elements. Capacity is kept.
    pub fn clear(&mut self) {
        for index in 0..self.size {
            let offset = self.offset(index);
            slot::reset(self.element.field_type, &mut self.storage, offset);
        }
        self.size = 0;
    }

    /// New container holding `self` followed by `other`.
    pub fn concat(&self, other: &RepeatedField) -> Result<RepeatedField> {
        if !self.element.same_as(&other.element) {
            return Err(Error::mismatch(
                self.element.describe(),
                other.element.describe(),
            ));
        }
        let mut out = RepeatedField::with_element(self.element.clone(), self.initial_capacity);
        out.reserve(self.size + other.size);
        for (src, base) in [(self, 0), (other, self.size)] {
            for index in 0..src.size {
                out.copy_from(src, index, base + index)?;
            }
        }
        out.size = self.size + other.size;
        Ok(out)
    }

    /// Shallow-copy element `from_index` of `src` into slot `to_index`.
    fn copy_from(&mut self, src: &RepeatedField, from_index: usize, to_index: usize) -> Result<()> {
        let value = slot::get(src.element.field_type, &src.storage, src.offset(from_index));
        self.write(to_index, value)
    }

    /// Element-wise structural equality.
    pub fn equals(&self, other: &RepeatedField) -> bool {
        if self.size != other.size || !self.element.same_as(&other.element) {
            return false;
        }
        if self.size == 0 {
            return true;
        }
        // Offsets coincide because both containers share the element width.
        (0..self.size).all(|index| {
            slot::equal(
                self.element.field_type,
                &self.storage,
                &other.storage,
                self.offset(index),
            )
        })
    }

    /// Order-sensitive hash of the elements.
    pub fn hash_value(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        hasher.write_usize(self.size);
        for index in 0..self.size {
            slot::hash(
                self.element.field_type,
                &self.storage,
                self.offset(index),
                &mut hasher,
            );
        }
        hasher.finish()
    }

    /// New container sharing nested messages with `self`.
    pub fn duplicate(&self) -> RepeatedField {
        self.copy_with(slot::duplicate)
    }

    /// New container with nested messages cloned transitively.
    pub fn deep_copy(&self) -> RepeatedField {
        self.copy_with(slot::deep_copy)
    }

    fn copy_with(&self, copy: fn(FieldType, &mut SlotBuffer, &SlotBuffer, usize)) -> RepeatedField {
        let mut out = RepeatedField::with_element(self.element.clone(), self.initial_capacity);
        out.reserve(self.size);
        for index in 0..self.size {
            copy(
                self.element.field_type,
                &mut out.storage,
                &self.storage,
                self.offset(index),
            );
        }
        out.size = self.size;
        out
    }

    /// Iterate over the elements.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            field: self,
            index: 0,
        }
    }

    /// Collect the elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.iter().collect()
    }
}

impl PartialEq for RepeatedField {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Hash for RepeatedField {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

impl Trace for RepeatedField {
    fn trace(&self, visitor: &mut dyn RefVisitor) {
        for index in 0..self.size {
            slot::mark(
                self.element.field_type,
                &self.storage,
                self.offset(index),
                visitor,
            );
        }
    }
}

impl fmt::Display for RepeatedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, value) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str("]")
    }
}

impl fmt::Debug for RepeatedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepeatedField")
            .field("element", &self.element.describe())
            .field("len", &self.size)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<'a> IntoIterator for &'a RepeatedField {
    type Item = Value;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over a [`RepeatedField`].
pub struct Iter<'a> {
    field: &'a RepeatedField,
    index: usize,
}

impl Iterator for Iter<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let value = self.field.get(self.index).ok()?;
        self.index += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.field.size.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

// ============================================================================
// Shared handle
// ============================================================================

/// Shared handle to a repeated field held by a message.
///
/// The element type is cached outside the lock so type checks never block.
#[derive(Clone)]
pub struct RepeatedRef {
    element: ElementType,
    cell: Arc<RwLock<RepeatedField>>,
}

impl RepeatedRef {
    /// Wrap a container.
    pub fn new(field: RepeatedField) -> Self {
        Self {
            element: field.element.clone(),
            cell: Arc::new(RwLock::new(field)),
        }
    }

    /// Element type (no lock taken).
    pub fn element(&self) -> &ElementType {
        &self.element
    }

    /// Shared read access.
    pub fn read(&self) -> RwLockReadGuard<'_, RepeatedField> {
        self.cell.read()
    }

    /// Non-blocking read access.
    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, RepeatedField>> {
        self.cell.try_read()
    }

    /// Exclusive write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, RepeatedField> {
        self.cell.write()
    }

    /// Check if both handles point at the same container.
    pub fn ptr_eq(a: &RepeatedRef, b: &RepeatedRef) -> bool {
        Arc::ptr_eq(&a.cell, &b.cell)
    }

    /// Traversal that re-reads the length at every step.
    ///
    /// Unlike [`RepeatedField::iter`] the container is not borrowed, so it
    /// may be mutated between steps; truncation simply ends the traversal.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            field: self.clone(),
            index: 0,
        }
    }
}

impl PartialEq for RepeatedRef {
    fn eq(&self, other: &Self) -> bool {
        RepeatedRef::ptr_eq(self, other) || self.read().equals(&other.read())
    }
}

impl fmt::Debug for RepeatedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_read() {
            Some(field) => write!(f, "RepeatedRef({})", *field),
            None => write!(f, "RepeatedRef(<locked {}>)", self.element.describe()),
        }
    }
}

/// Lazy forward traversal over a shared repeated field.
pub struct Cursor {
    field: RepeatedRef,
    index: usize,
}

impl Iterator for Cursor {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let value = self.field.read().get(self.index).ok()?;
        self.index += 1;
        Some(value)
    }
}
