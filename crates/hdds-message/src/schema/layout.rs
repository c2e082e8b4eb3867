// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Storage layout: field -> byte offset plan for a message buffer.
//!
//! Offsets are assigned in a single pass over the fields in declaration
//! order. Each slot is aligned to its own width; there is no tail padding.
//!
//! ```text
//! Point { x: int32 #1, flag: bool #2, y: int64 #3 }
//!
//!   0      4  5      8              16
//!   +------+--+------+--------------+
//!   |  x   |f | pad  |      y       |
//!   +------+--+------+--------------+
//! ```

use crate::{Error, Result};
use std::collections::HashSet;
use std::ops::Range;

/// Immutable byte layout of a message's fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    offsets: Vec<usize>,
    widths: Vec<usize>,
    size: usize,
}

impl StorageLayout {
    /// Compute the layout for `(field number, slot width)` pairs in
    /// declaration order.
    ///
    /// Fails with [`Error::LayoutError`] on a duplicate field number or a
    /// zero-width slot.
    pub fn compute(
        message: &str,
        slots: impl IntoIterator<Item = (u32, usize)>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut offsets = Vec::new();
        let mut widths = Vec::new();
        let mut size = 0usize;

        for (number, width) in slots {
            if !seen.insert(number) {
                return Err(Error::LayoutError(format!(
                    "duplicate field number {} in {}",
                    number, message
                )));
            }
            if width == 0 {
                return Err(Error::LayoutError(format!(
                    "zero-width slot for field {} in {}",
                    number, message
                )));
            }
            let offset = align_up(size, width);
            offsets.push(offset);
            widths.push(width);
            size = offset + width;
        }

        log::trace!(
            "[StorageLayout::compute] {}: {} slots, {} bytes",
            message,
            offsets.len(),
            size
        );
        Ok(Self {
            offsets,
            widths,
            size,
        })
    }

    /// Total buffer size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Check if the layout has no slots.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Offset of the slot at declaration index `index`.
    pub fn offset(&self, index: usize) -> Option<usize> {
        self.offsets.get(index).copied()
    }

    /// Width of the slot at declaration index `index`.
    pub fn width(&self, index: usize) -> Option<usize> {
        self.widths.get(index).copied()
    }

    /// Byte range of every slot, in declaration order.
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.offsets
            .iter()
            .zip(&self.widths)
            .map(|(&offset, &width)| offset..offset + width)
    }
}

fn align_up(offset: usize, align: usize) -> usize {
    offset.div_ceil(align) * align
}
