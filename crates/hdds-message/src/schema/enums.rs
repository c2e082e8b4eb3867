// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enum schemas: bidirectional name <-> number mapping.

use std::collections::HashMap;

/// Immutable enumerated type.
///
/// Names are unique. Numbers may repeat (aliases); looking a number up
/// returns the first name registered with it.
#[derive(Debug)]
pub struct EnumSchema {
    name: String,
    values: Vec<(String, i32)>,
    by_name: HashMap<String, i32>,
    by_number: HashMap<i32, usize>,
}

impl EnumSchema {
    /// Build from values in registration order. Names must already be unique.
    pub(crate) fn new(name: String, values: Vec<(String, i32)>) -> Self {
        let mut by_name = HashMap::with_capacity(values.len());
        let mut by_number = HashMap::with_capacity(values.len());
        for (index, (value_name, number)) in values.iter().enumerate() {
            by_name.insert(value_name.clone(), *number);
            by_number.entry(*number).or_insert(index);
        }
        Self {
            name,
            values,
            by_name,
            by_number,
        }
    }

    /// Fully-qualified enum name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number registered under `name`.
    pub fn lookup_name(&self, name: &str) -> Option<i32> {
        self.by_name.get(name).copied()
    }

    /// First name registered with `number`.
    pub fn lookup_value(&self, number: i32) -> Option<&str> {
        self.by_number
            .get(&number)
            .map(|&index| self.values[index].0.as_str())
    }

    /// Iterate over `(name, number)` pairs in registration order.
    pub fn each(&self) -> impl Iterator<Item = (&str, i32)> {
        self.values.iter().map(|(name, number)| (name.as_str(), *number))
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the enum has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
