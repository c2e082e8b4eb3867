// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema pool: registry of committed message and enum schemas.
//!
//! # Architecture
//!
//! ```text
//! SchemaPool
//!   snapshot: ArcSwap<PoolSnapshot>   lock-free readers
//!   txn:      Mutex<()>               one finalize at a time
//!
//! PoolSnapshot (immutable)
//!   entries:  [SchemaRef; n]          arena, index = commit order
//!   by_name:  name -> index
//! ```
//!
//! A finalize builds a new snapshot from the current one and swaps it in.
//! Readers holding the old snapshot keep a consistent view; a failed
//! transaction never touches the published snapshot.

use super::builder::SchemaBuilder;
use super::enums::EnumSchema;
use super::message::MessageSchema;
use crate::config::PoolConfig;
use crate::Result;
use arc_swap::ArcSwap;
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// A committed schema: message or enum.
#[derive(Debug, Clone)]
pub enum SchemaRef {
    Message(Arc<MessageSchema>),
    Enum(Arc<EnumSchema>),
}

impl SchemaRef {
    /// Fully-qualified name.
    pub fn name(&self) -> &str {
        match self {
            Self::Message(m) => m.name(),
            Self::Enum(e) => e.name(),
        }
    }

    /// `"message"` or `"enum"`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Enum(_) => "enum",
        }
    }

    /// Check if both refer to the same committed schema object.
    pub fn ptr_eq(a: &SchemaRef, b: &SchemaRef) -> bool {
        match (a, b) {
            (Self::Message(x), Self::Message(y)) => Arc::ptr_eq(x, y),
            (Self::Enum(x), Self::Enum(y)) => Arc::ptr_eq(x, y),
            _ => false,
        }
    }

    pub fn as_message(&self) -> Option<&Arc<MessageSchema>> {
        match self {
            Self::Message(m) => Some(m),
            Self::Enum(_) => None,
        }
    }

    pub fn as_enum(&self) -> Option<&Arc<EnumSchema>> {
        match self {
            Self::Enum(e) => Some(e),
            Self::Message(_) => None,
        }
    }

    pub fn into_message(self) -> Option<Arc<MessageSchema>> {
        match self {
            Self::Message(m) => Some(m),
            Self::Enum(_) => None,
        }
    }

    pub fn into_enum(self) -> Option<Arc<EnumSchema>> {
        match self {
            Self::Enum(e) => Some(e),
            Self::Message(_) => None,
        }
    }
}

/// Immutable view of the pool contents at one point in time.
#[derive(Debug, Default, Clone)]
pub struct PoolSnapshot {
    entries: Vec<SchemaRef>,
    by_name: HashMap<String, usize>,
}

impl PoolSnapshot {
    /// Schema registered under `name`.
    pub fn get(&self, name: &str) -> Option<&SchemaRef> {
        self.by_name.get(name).map(|&index| &self.entries[index])
    }

    /// Check if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Schemas in commit order.
    pub fn entries(&self) -> &[SchemaRef] {
        &self.entries
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of this snapshot with `added` appended. Names must be new.
    pub(crate) fn extended(&self, added: &[SchemaRef]) -> PoolSnapshot {
        let mut next = self.clone();
        for entry in added {
            next.by_name
                .insert(entry.name().to_string(), next.entries.len());
            next.entries.push(entry.clone());
        }
        next
    }
}

/// Registry of committed schemas.
///
/// # Example
///
/// ```rust
/// use hdds_message::{FieldType, SchemaPool};
///
/// let pool = SchemaPool::new();
/// pool.build(|b| {
///     b.add_enum("Color")?.value("RED", 0)?.value("GREEN", 1)?;
///     Ok(())
/// })
/// .expect("build");
///
/// let color = pool.lookup_enum("Color").expect("Color");
/// assert_eq!(color.lookup_value(1), Some("GREEN"));
/// assert_eq!(color.lookup_name("RED"), Some(0));
/// ```
pub struct SchemaPool {
    snapshot: ArcSwap<PoolSnapshot>,
    txn: Mutex<()>,
    config: PoolConfig,
}

impl SchemaPool {
    /// Empty pool with the default configuration.
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Empty pool with `config`.
    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(PoolSnapshot::default()),
            txn: Mutex::new(()),
            config,
        }
    }

    /// Process-wide pool shared by generated code.
    pub fn generated() -> &'static SchemaPool {
        static POOL: OnceLock<SchemaPool> = OnceLock::new();
        POOL.get_or_init(SchemaPool::new)
    }

    /// Build configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Start a build transaction.
    pub fn builder(&self) -> SchemaBuilder<'_> {
        SchemaBuilder::new(self)
    }

    /// Run `define` against a fresh builder, then finalize it.
    ///
    /// Returns the committed schemas in registration order (enums first).
    pub fn build<F>(&self, define: F) -> Result<Vec<SchemaRef>>
    where
        F: FnOnce(&mut SchemaBuilder<'_>) -> Result<()>,
    {
        let mut builder = self.builder();
        define(&mut builder)?;
        builder.finalize()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<PoolSnapshot> {
        self.snapshot.load_full()
    }

    /// Schema registered under `name`. A leading `.` is ignored.
    pub fn lookup(&self, name: &str) -> Option<SchemaRef> {
        let name = name.strip_prefix('.').unwrap_or(name);
        self.snapshot.load().get(name).cloned()
    }

    /// Message schema registered under `name`.
    pub fn lookup_message(&self, name: &str) -> Option<Arc<MessageSchema>> {
        self.lookup(name)?.into_message()
    }

    /// Enum schema registered under `name`.
    pub fn lookup_enum(&self, name: &str) -> Option<Arc<EnumSchema>> {
        self.lookup(name)?.into_enum()
    }

    /// Number of committed schemas.
    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    /// Check if nothing has been committed.
    pub fn is_empty(&self) -> bool {
        self.snapshot.load().is_empty()
    }

    /// Committed names in commit order.
    pub fn names(&self) -> Vec<String> {
        self.snapshot
            .load()
            .entries()
            .iter()
            .map(|entry| entry.name().to_string())
            .collect()
    }

    pub(crate) fn lock_transaction(&self) -> MutexGuard<'_, ()> {
        self.txn.lock()
    }

    pub(crate) fn publish(&self, snapshot: PoolSnapshot) {
        self.snapshot.store(Arc::new(snapshot));
    }
}

impl Default for SchemaPool {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SchemaPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaPool")
            .field("names", &self.names())
            .field("config", &self.config)
            .finish()
    }
}
