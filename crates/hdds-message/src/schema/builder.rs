// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Build transactions: accumulate definitions, then commit them atomically.
//!
//! ```text
//!   Open --finalize--> Finalizing --ok---> Committed --add--> Open
//!                                 \-err--> Failed (terminal)
//! ```
//!
//! Finalize resolves every nested type name against the pending batch and
//! the pool, computes every storage layout, links the field descriptors,
//! and only then publishes the new pool snapshot. Any error before the
//! publish leaves the pool exactly as it was.

use super::enums::EnumSchema;
use super::field::{FieldSchema, Label, ResolvedRef};
use super::layout::StorageLayout;
use super::message::MessageSchema;
use super::pool::{PoolSnapshot, SchemaPool, SchemaRef};
use crate::config::{PoolConfig, HANDLE_SLOT_SIZE};
use crate::{Error, FieldType, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Build transaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// Accepting definitions.
    Open,
    /// Resolving and laying out the pending batch.
    Finalizing,
    /// Last batch merged into the pool.
    Committed,
    /// Finalize failed; nothing was committed.
    Failed,
}

#[derive(Debug, Clone)]
struct FieldDef {
    name: String,
    number: u32,
    field_type: FieldType,
    label: Label,
    type_name: Option<String>,
}

impl FieldDef {
    fn slot_width(&self) -> usize {
        if self.label == Label::Repeated {
            HANDLE_SLOT_SIZE
        } else {
            self.field_type.slot_size()
        }
    }
}

#[derive(Debug)]
struct MessageDef {
    name: String,
    fields: Vec<FieldDef>,
    committed: bool,
}

#[derive(Debug)]
struct EnumDef {
    name: String,
    values: Vec<(String, i32)>,
    committed: bool,
}

/// Pending batch of message and enum definitions for one pool.
///
/// # Example
///
/// ```rust
/// use hdds_message::{FieldType, SchemaPool};
///
/// let pool = SchemaPool::new();
/// let mut builder = pool.builder();
/// // Forward reference: Line is declared before Point.
/// builder
///     .add_message("Line")?
///     .optional_ref("from", FieldType::Message, 1, "Point")?
///     .optional_ref("to", FieldType::Message, 2, "Point")?;
/// builder
///     .add_message("Point")?
///     .optional("x", FieldType::Int32, 1)?
///     .optional("y", FieldType::Int32, 2)?;
/// builder.finalize()?;
///
/// let line = pool.lookup_message("Line").expect("Line");
/// let from = line.field("from").expect("from");
/// assert_eq!(from.type_name(), Some("Point"));
/// # Ok::<(), hdds_message::Error>(())
/// ```
#[derive(Debug)]
pub struct SchemaBuilder<'p> {
    pool: &'p SchemaPool,
    messages: Vec<MessageDef>,
    enums: Vec<EnumDef>,
    state: BuildState,
    failure: Option<Error>,
}

impl<'p> SchemaBuilder<'p> {
    pub(crate) fn new(pool: &'p SchemaPool) -> Self {
        Self {
            pool,
            messages: Vec::new(),
            enums: Vec::new(),
            state: BuildState::Open,
            failure: None,
        }
    }

    /// Current transaction state.
    pub fn state(&self) -> BuildState {
        self.state
    }

    fn ensure_usable(&self) -> Result<()> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn ensure_new_name(&self, name: &str) -> Result<()> {
        let pending = self.messages.iter().any(|d| d.name == name)
            || self.enums.iter().any(|d| d.name == name);
        if pending || self.pool.lookup(name).is_some() {
            return Err(Error::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    /// Register a new message definition.
    pub fn add_message(&mut self, name: impl Into<String>) -> Result<MessageBuilder<'_>> {
        self.ensure_usable()?;
        let name = name.into();
        self.ensure_new_name(&name)?;
        self.state = BuildState::Open;
        self.messages.push(MessageDef {
            name,
            fields: Vec::new(),
            committed: false,
        });
        let config = self.pool.config();
        let index = self.messages.len() - 1;
        Ok(MessageBuilder {
            def: &mut self.messages[index],
            config,
        })
    }

    /// Register a new enum definition.
    pub fn add_enum(&mut self, name: impl Into<String>) -> Result<EnumBuilder<'_>> {
        self.ensure_usable()?;
        let name = name.into();
        self.ensure_new_name(&name)?;
        self.state = BuildState::Open;
        self.enums.push(EnumDef {
            name,
            values: Vec::new(),
            committed: false,
        });
        let index = self.enums.len() - 1;
        Ok(EnumBuilder {
            def: &mut self.enums[index],
        })
    }

    /// Reopen a pending message definition to add more fields.
    pub fn message(&mut self, name: &str) -> Result<MessageBuilder<'_>> {
        self.ensure_usable()?;
        let config = self.pool.config();
        let Some(index) = self.messages.iter().position(|d| d.name == name) else {
            return Err(self.missing_definition(name));
        };
        let def = &mut self.messages[index];
        if def.committed {
            return Err(Error::SchemaFrozen(name.to_string()));
        }
        Ok(MessageBuilder { def, config })
    }

    /// Reopen a pending enum definition to add more values.
    pub fn enumeration(&mut self, name: &str) -> Result<EnumBuilder<'_>> {
        self.ensure_usable()?;
        let Some(index) = self.enums.iter().position(|d| d.name == name) else {
            return Err(self.missing_definition(name));
        };
        let def = &mut self.enums[index];
        if def.committed {
            return Err(Error::SchemaFrozen(name.to_string()));
        }
        Ok(EnumBuilder { def })
    }

    /// Error for reopening a name this builder never registered: frozen
    /// when another transaction already committed it, unknown otherwise.
    fn missing_definition(&self, name: &str) -> Error {
        if self.pool.lookup(name).is_some() {
            Error::SchemaFrozen(name.to_string())
        } else {
            Error::UnknownType(name.to_string())
        }
    }

    /// Resolve, lay out and commit the pending batch as one unit.
    ///
    /// Returns the committed schemas: enums first, then messages, each in
    /// registration order.
    pub fn finalize(&mut self) -> Result<Vec<SchemaRef>> {
        self.ensure_usable()?;
        self.state = BuildState::Finalizing;
        match self.commit() {
            Ok(added) => {
                let mut messages = 0usize;
                let mut enums = 0usize;
                for def in self.messages.iter_mut().filter(|d| !d.committed) {
                    def.committed = true;
                    messages += 1;
                }
                for def in self.enums.iter_mut().filter(|d| !d.committed) {
                    def.committed = true;
                    enums += 1;
                }
                self.state = BuildState::Committed;
                log::debug!(
                    "[SchemaBuilder::finalize] committed {} messages, {} enums",
                    messages,
                    enums
                );
                Ok(added)
            }
            Err(err) => {
                log::warn!("[SchemaBuilder::finalize] transaction failed: {}", err);
                self.state = BuildState::Failed;
                self.failure = Some(err.clone());
                Err(err)
            }
        }
    }

    fn commit(&self) -> Result<Vec<SchemaRef>> {
        let _txn = self.pool.lock_transaction();
        let snapshot = self.pool.snapshot();
        let config = self.pool.config();

        let messages: Vec<&MessageDef> = self.messages.iter().filter(|d| !d.committed).collect();
        let enums: Vec<&EnumDef> = self.enums.iter().filter(|d| !d.committed).collect();

        // Another transaction may have taken a name since registration.
        let names = messages
            .iter()
            .map(|d| d.name.as_str())
            .chain(enums.iter().map(|d| d.name.as_str()));
        let mut pending: HashMap<&str, FieldType> = HashMap::new();
        for name in names {
            if snapshot.contains(name) {
                return Err(Error::DuplicateName(name.to_string()));
            }
        }
        pending.extend(messages.iter().map(|d| (d.name.as_str(), FieldType::Message)));
        pending.extend(enums.iter().map(|d| (d.name.as_str(), FieldType::Enum)));

        let mut resolved: Vec<Vec<Option<String>>> = Vec::with_capacity(messages.len());
        for def in &messages {
            let names = def
                .fields
                .iter()
                .map(|field| match &field.type_name {
                    Some(type_name) => {
                        resolve_name(config, def, field, type_name, &pending, &snapshot).map(Some)
                    }
                    None => Ok(None),
                })
                .collect::<Result<Vec<_>>>()?;
            resolved.push(names);
        }

        let mut added: Vec<SchemaRef> = enums
            .iter()
            .map(|def| SchemaRef::Enum(Arc::new(EnumSchema::new(def.name.clone(), def.values.clone()))))
            .collect();

        let mut built: Vec<Arc<MessageSchema>> = Vec::with_capacity(messages.len());
        for (def, type_names) in messages.iter().zip(resolved) {
            let layout = StorageLayout::compute(
                &def.name,
                def.fields.iter().map(|f| (f.number, f.slot_width())),
            )?;
            let mut fields = Vec::with_capacity(def.fields.len());
            for (index, (field, type_name)) in def.fields.iter().zip(type_names).enumerate() {
                let offset = layout.offset(index).ok_or_else(|| {
                    Error::LayoutError(format!("no slot for {}.{}", def.name, field.name))
                })?;
                fields.push(FieldSchema::new(
                    field.name.clone(),
                    field.number,
                    field.field_type,
                    field.label,
                    type_name,
                    index,
                    offset,
                ));
            }
            built.push(Arc::new(MessageSchema::new(
                def.name.clone(),
                fields,
                layout,
                config.repeated_capacity(),
            )));
        }
        added.extend(built.iter().cloned().map(SchemaRef::Message));

        link(&built, &added, &snapshot)?;
        self.pool.publish(snapshot.extended(&added));
        Ok(added)
    }
}

/// Candidate full names for `type_name` referenced from message `scope`,
/// innermost scope first.
fn candidates(scope: &str, type_name: &str, relative: bool) -> Vec<String> {
    if let Some(absolute) = type_name.strip_prefix('.') {
        return vec![absolute.to_string()];
    }
    if !relative {
        return vec![type_name.to_string()];
    }
    let mut out = Vec::new();
    let mut prefix = scope;
    loop {
        out.push(format!("{}.{}", prefix, type_name));
        match prefix.rfind('.') {
            Some(pos) => prefix = &prefix[..pos],
            None => break,
        }
    }
    out.push(type_name.to_string());
    out
}

fn resolve_name(
    config: &PoolConfig,
    def: &MessageDef,
    field: &FieldDef,
    type_name: &str,
    pending: &HashMap<&str, FieldType>,
    snapshot: &PoolSnapshot,
) -> Result<String> {
    for candidate in candidates(&def.name, type_name, config.relative_name_resolution) {
        let kind = pending.get(candidate.as_str()).copied().or_else(|| {
            snapshot.get(&candidate).map(|entry| match entry {
                SchemaRef::Message(_) => FieldType::Message,
                SchemaRef::Enum(_) => FieldType::Enum,
            })
        });
        if let Some(kind) = kind {
            if kind != field.field_type {
                return Err(Error::mismatch(
                    format!("{} type for {}.{}", field.field_type, def.name, field.name),
                    format!("{} {}", kind, candidate),
                ));
            }
            return Ok(candidate);
        }
    }
    Err(Error::UnresolvedReference {
        message: def.name.clone(),
        field: field.name.clone(),
        type_name: type_name.to_string(),
    })
}

/// Check if `from` reaches `to` through message fields of the batch.
/// Committed schemas never point into a new batch, so only batch edges
/// can close a cycle.
fn reaches<'a>(batch: &HashMap<&'a str, &'a Arc<MessageSchema>>, from: &'a str, to: &str) -> bool {
    let mut stack = vec![from];
    let mut seen: HashSet<&'a str> = HashSet::new();
    while let Some(name) = stack.pop() {
        if name == to {
            return true;
        }
        if !seen.insert(name) {
            continue;
        }
        if let Some(&message) = batch.get(name) {
            stack.extend(
                message
                    .fields()
                    .iter()
                    .filter(|f| f.field_type() == FieldType::Message)
                    .filter_map(FieldSchema::type_name),
            );
        }
    }
    false
}

/// Bind every message/enum field of the new schemas to its target.
fn link(built: &[Arc<MessageSchema>], added: &[SchemaRef], snapshot: &PoolSnapshot) -> Result<()> {
    let by_name: HashMap<&str, &SchemaRef> = added.iter().map(|e| (e.name(), e)).collect();
    let batch: HashMap<&str, &Arc<MessageSchema>> = built.iter().map(|m| (m.name(), m)).collect();
    for message in built {
        for field in message.fields() {
            let Some(type_name) = field.type_name() else {
                continue;
            };
            let target = by_name
                .get(type_name)
                .copied()
                .or_else(|| snapshot.get(type_name))
                .ok_or_else(|| Error::UnresolvedReference {
                    message: message.name().to_string(),
                    field: field.name().to_string(),
                    type_name: type_name.to_string(),
                })?;
            let link = match target {
                SchemaRef::Message(m) if reaches(&batch, m.name(), message.name()) => {
                    ResolvedRef::CyclicMessage(Arc::downgrade(m))
                }
                SchemaRef::Message(m) => ResolvedRef::Message(Arc::clone(m)),
                SchemaRef::Enum(e) => ResolvedRef::Enum(Arc::clone(e)),
            };
            field.resolve(link)?;
        }
    }
    Ok(())
}

/// Adds fields to a pending message definition.
#[derive(Debug)]
pub struct MessageBuilder<'b> {
    def: &'b mut MessageDef,
    config: &'b PoolConfig,
}

impl MessageBuilder<'_> {
    /// Message name.
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Add a field. `type_name` is required for message and enum fields
    /// and rejected for every other type.
    pub fn field(
        &mut self,
        label: Label,
        name: impl Into<String>,
        field_type: FieldType,
        number: u32,
        type_name: Option<&str>,
    ) -> Result<&mut Self> {
        let name = name.into();
        let message = &self.def.name;
        if !self.config.accepts_field_number(number) {
            return Err(Error::InvalidFieldNumber {
                message: message.clone(),
                field: name,
                number,
            });
        }
        if self.def.fields.iter().any(|f| f.name == name) {
            return Err(Error::DuplicateFieldName {
                message: message.clone(),
                field: name,
            });
        }
        if self.def.fields.iter().any(|f| f.number == number) {
            return Err(Error::DuplicateFieldNumber {
                message: message.clone(),
                number,
            });
        }
        match (field_type.needs_type_name(), type_name) {
            (true, None) => {
                return Err(Error::MissingTypeName {
                    message: message.clone(),
                    field: name,
                })
            }
            (false, Some(type_name)) => {
                return Err(Error::mismatch(
                    "message or enum field",
                    format!("{} field '{}' naming {}", field_type, name, type_name),
                ))
            }
            _ => {}
        }
        self.def.fields.push(FieldDef {
            name,
            number,
            field_type,
            label,
            type_name: type_name.map(str::to_string),
        });
        Ok(self)
    }

    /// Add an optional scalar, string or bytes field.
    pub fn optional(
        &mut self,
        name: impl Into<String>,
        field_type: FieldType,
        number: u32,
    ) -> Result<&mut Self> {
        self.field(Label::Optional, name, field_type, number, None)
    }

    /// Add a required scalar, string or bytes field.
    pub fn required(
        &mut self,
        name: impl Into<String>,
        field_type: FieldType,
        number: u32,
    ) -> Result<&mut Self> {
        self.field(Label::Required, name, field_type, number, None)
    }

    /// Add a repeated scalar, string or bytes field.
    pub fn repeated(
        &mut self,
        name: impl Into<String>,
        field_type: FieldType,
        number: u32,
    ) -> Result<&mut Self> {
        self.field(Label::Repeated, name, field_type, number, None)
    }

    /// Add an optional message or enum field referencing `type_name`.
    pub fn optional_ref(
        &mut self,
        name: impl Into<String>,
        field_type: FieldType,
        number: u32,
        type_name: &str,
    ) -> Result<&mut Self> {
        self.field(Label::Optional, name, field_type, number, Some(type_name))
    }

    /// Add a required message or enum field referencing `type_name`.
    pub fn required_ref(
        &mut self,
        name: impl Into<String>,
        field_type: FieldType,
        number: u32,
        type_name: &str,
    ) -> Result<&mut Self> {
        self.field(Label::Required, name, field_type, number, Some(type_name))
    }

    /// Add a repeated message or enum field referencing `type_name`.
    pub fn repeated_ref(
        &mut self,
        name: impl Into<String>,
        field_type: FieldType,
        number: u32,
        type_name: &str,
    ) -> Result<&mut Self> {
        self.field(Label::Repeated, name, field_type, number, Some(type_name))
    }
}

/// Adds values to a pending enum definition.
#[derive(Debug)]
pub struct EnumBuilder<'b> {
    def: &'b mut EnumDef,
}

impl EnumBuilder<'_> {
    /// Enum name.
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Add a value. Names must be unique; numbers may repeat (aliases).
    pub fn value(&mut self, name: impl Into<String>, number: i32) -> Result<&mut Self> {
        let name = name.into();
        if self.def.values.iter().any(|(existing, _)| *existing == name) {
            return Err(Error::DuplicateName(format!("{}.{}", self.def.name, name)));
        }
        self.def.values.push((name, number));
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_innermost_first() {
        assert_eq!(
            candidates("pkg.Outer", "Inner", true),
            vec!["pkg.Outer.Inner", "pkg.Inner", "Inner"]
        );
        assert_eq!(candidates("pkg.Outer", ".pkg.Inner", true), vec!["pkg.Inner"]);
        assert_eq!(candidates("pkg.Outer", "Inner", false), vec!["Inner"]);
    }

    #[test]
    fn test_duplicate_name_in_batch_and_pool() {
        let pool = SchemaPool::new();
        pool.build(|b| {
            b.add_message("A")?;
            Ok(())
        })
        .expect("first");

        let mut builder = pool.builder();
        assert_eq!(
            builder.add_message("A").unwrap_err(),
            Error::DuplicateName("A".into())
        );
        builder.add_enum("E").expect("E");
        assert_eq!(
            builder.add_message("E").unwrap_err(),
            Error::DuplicateName("E".into())
        );
    }

    #[test]
    fn test_field_validation() {
        let pool = SchemaPool::new();
        let mut builder = pool.builder();
        let mut msg = builder.add_message("M").expect("M");
        msg.optional("a", FieldType::Int32, 1).expect("a");

        assert!(matches!(
            msg.optional("a", FieldType::Int32, 2),
            Err(Error::DuplicateFieldName { .. })
        ));
        assert!(matches!(
            msg.optional("b", FieldType::Int32, 1),
            Err(Error::DuplicateFieldNumber { number: 1, .. })
        ));
        assert!(matches!(
            msg.optional("c", FieldType::Int32, 0),
            Err(Error::InvalidFieldNumber { number: 0, .. })
        ));
        assert!(matches!(
            msg.optional("d", FieldType::Int32, 19_123),
            Err(Error::InvalidFieldNumber { .. })
        ));
        assert!(matches!(
            msg.optional("e", FieldType::Message, 3),
            Err(Error::MissingTypeName { .. })
        ));
        assert!(matches!(
            msg.optional_ref("f", FieldType::Int32, 4, "Other"),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_unresolved_reference_commits_nothing() {
        let pool = SchemaPool::new();
        let mut builder = pool.builder();
        builder
            .add_message("A")
            .expect("A")
            .optional_ref("b", FieldType::Message, 1, "B")
            .expect("field");
        builder.add_message("C").expect("C");

        let err = builder.finalize().unwrap_err();
        assert_eq!(
            err,
            Error::UnresolvedReference {
                message: "A".into(),
                field: "b".into(),
                type_name: "B".into(),
            }
        );
        assert_eq!(builder.state(), BuildState::Failed);
        assert!(pool.is_empty());
        // Failed is terminal.
        assert_eq!(builder.add_message("B").unwrap_err(), err);
    }

    #[test]
    fn test_kind_mismatch_on_resolution() {
        let pool = SchemaPool::new();
        let result = pool.build(|b| {
            b.add_enum("Color")?.value("RED", 0)?;
            b.add_message("M")?
                .optional_ref("c", FieldType::Message, 1, "Color")?;
            Ok(())
        });
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_committed_definitions_are_frozen() {
        let pool = SchemaPool::new();
        let mut builder = pool.builder();
        builder.add_message("A").expect("A");
        builder.finalize().expect("commit");
        assert_eq!(builder.state(), BuildState::Committed);

        assert_eq!(
            builder.message("A").unwrap_err(),
            Error::SchemaFrozen("A".into())
        );
        assert_eq!(
            builder.message("Nope").unwrap_err(),
            Error::UnknownType("Nope".into())
        );

        // A second batch on the same builder.
        builder.add_message("B").expect("B");
        assert_eq!(builder.state(), BuildState::Open);
        builder.finalize().expect("second commit");
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_reopen_name_committed_by_earlier_transaction() {
        let pool = SchemaPool::new();
        pool.build(|b| {
            b.add_message("Point")?.optional("x", FieldType::Int32, 1)?;
            b.add_enum("Color")?.value("RED", 0)?;
            Ok(())
        })
        .expect("first");

        let mut builder = pool.builder();
        assert_eq!(
            builder.message("Point").unwrap_err(),
            Error::SchemaFrozen("Point".into())
        );
        assert_eq!(
            builder.enumeration("Color").unwrap_err(),
            Error::SchemaFrozen("Color".into())
        );
        assert_eq!(
            builder.enumeration("Shade").unwrap_err(),
            Error::UnknownType("Shade".into())
        );
        // Rejections do not poison the builder.
        assert_eq!(builder.state(), BuildState::Open);
        builder.add_message("Line").expect("Line");
        builder.finalize().expect("commit");
        assert_eq!(pool.lookup_message("Point").map(|p| p.fields_len()), Some(1));
    }

    #[test]
    fn test_cycle_detection_within_batch() {
        let pool = SchemaPool::new();
        let mut builder = pool.builder();
        builder
            .add_message("A")
            .expect("A")
            .optional_ref("b", FieldType::Message, 1, "B")
            .expect("b");
        builder
            .add_message("B")
            .expect("B")
            .optional_ref("a", FieldType::Message, 1, "A")
            .expect("a")
            .optional_ref("c", FieldType::Message, 2, "C")
            .expect("c");
        builder.add_message("C").expect("C");
        let added = builder.finalize().expect("commit");

        let batch: HashMap<&str, &Arc<MessageSchema>> = added
            .iter()
            .filter_map(SchemaRef::as_message)
            .map(|m| (m.name(), m))
            .collect();
        assert!(reaches(&batch, "A", "B"));
        assert!(reaches(&batch, "B", "A"));
        assert!(reaches(&batch, "B", "C"));
        assert!(!reaches(&batch, "C", "B"));
    }

    #[test]
    fn test_reopen_pending_message() {
        let pool = SchemaPool::new();
        let mut builder = pool.builder();
        builder
            .add_message("A")
            .expect("A")
            .optional("x", FieldType::Int32, 1)
            .expect("x");
        builder
            .message("A")
            .expect("reopen")
            .optional("y", FieldType::Int64, 2)
            .expect("y");
        builder.finalize().expect("commit");

        let a = pool.lookup_message("A").expect("A");
        assert_eq!(a.fields_len(), 2);
        assert_eq!(a.layout().size(), 16);
        assert_eq!(a.field("y").map(|f| f.offset()), Some(8));
    }

    #[test]
    fn test_duplicate_enum_value() {
        let pool = SchemaPool::new();
        let mut builder = pool.builder();
        let mut color = builder.add_enum("Color").expect("Color");
        color.value("RED", 0).expect("RED");
        color.value("CRIMSON", 0).expect("alias");
        assert_eq!(
            color.value("RED", 1).unwrap_err(),
            Error::DuplicateName("Color.RED".into())
        );
    }

    #[test]
    fn test_scoped_resolution() {
        let pool = SchemaPool::new();
        pool.build(|b| {
            b.add_message("pkg.Outer")?
                .optional_ref("inner", FieldType::Message, 1, "Inner")?
                .optional_ref("kind", FieldType::Enum, 2, "Kind")?;
            b.add_message("pkg.Outer.Inner")?;
            b.add_enum("pkg.Kind")?.value("A", 0)?;
            Ok(())
        })
        .expect("build");

        let outer = pool.lookup_message("pkg.Outer").expect("Outer");
        assert_eq!(
            outer.field("inner").and_then(|f| f.type_name()),
            Some("pkg.Outer.Inner")
        );
        assert_eq!(
            outer.field("kind").and_then(|f| f.type_name()),
            Some("pkg.Kind")
        );
    }
}
