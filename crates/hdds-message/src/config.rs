// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message runtime configuration - single source of truth.
//!
//! - **Level 1 (Static)**: compile-time constants (field number bounds, slot widths)
//! - **Level 2 (Dynamic)**: [`PoolConfig`] for per-pool build behaviour
//!
//! # Example
//!
//! ```rust
//! use hdds_message::config::PoolConfig;
//! use hdds_message::SchemaPool;
//!
//! let config = PoolConfig {
//!     initial_repeated_capacity: 32,
//!     ..PoolConfig::default()
//! };
//! let pool = SchemaPool::with_config(config);
//! assert_eq!(pool.config().repeated_capacity(), 32);
//! ```

use std::ops::RangeInclusive;

// =======================================================================
// Field numbers
// =======================================================================

/// Smallest valid field number.
pub const FIELD_NUMBER_MIN: u32 = 1;

/// Largest valid field number (29-bit tag space).
pub const FIELD_NUMBER_MAX: u32 = (1 << 29) - 1;

/// Field numbers reserved for the implementation.
///
/// Rejected unless [`PoolConfig::allow_reserved_field_numbers`] is set.
pub const RESERVED_FIELD_NUMBERS: RangeInclusive<u32> = 19_000..=19_999;

// =======================================================================
// Slot widths
// =======================================================================

/// Width of a reference slot (string, bytes, message, repeated).
///
/// The cell holds a `u32` handle into the owning buffer's reference table.
pub const HANDLE_SLOT_SIZE: usize = 4;

/// Initial capacity of a repeated field on first growth.
pub const DEFAULT_REPEATED_CAPACITY: usize = 8;

// =======================================================================
// Runtime configuration
// =======================================================================

/// Per-pool build configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct PoolConfig {
    /// Capacity allocated by the first push into an empty repeated field.
    pub initial_repeated_capacity: usize,
    /// Accept field numbers inside [`RESERVED_FIELD_NUMBERS`].
    pub allow_reserved_field_numbers: bool,
    /// Resolve nested type names relative to the enclosing message scope.
    pub relative_name_resolution: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_repeated_capacity: DEFAULT_REPEATED_CAPACITY,
            allow_reserved_field_numbers: false,
            relative_name_resolution: true,
        }
    }
}

impl PoolConfig {
    /// Effective initial repeated capacity (never zero).
    pub fn repeated_capacity(&self) -> usize {
        self.initial_repeated_capacity.max(1)
    }

    /// Check whether `number` may be used as a field number.
    pub fn accepts_field_number(&self, number: u32) -> bool {
        if !(FIELD_NUMBER_MIN..=FIELD_NUMBER_MAX).contains(&number) {
            return false;
        }
        self.allow_reserved_field_numbers || !RESERVED_FIELD_NUMBERS.contains(&number)
    }

    /// Load a configuration from JSON. Missing keys keep their defaults.
    #[cfg(feature = "json")]
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
