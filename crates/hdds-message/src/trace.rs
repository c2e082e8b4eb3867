// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reachability tracing over owned references.
//!
//! Ownership is explicit in Rust, so nothing here is needed for memory
//! safety. The hook exists for hosts that mirror instances into their own
//! object graph (scripting bridges, leak checkers): one [`Trace::trace`]
//! call visits every owned reference of an entity exactly once, without
//! recursing into nested messages.

use crate::{MessageRef, RepeatedRef};
use std::sync::Arc;

/// Receives the owned references of a traced entity.
///
/// All methods default to no-ops; implement the ones you care about.
pub trait RefVisitor {
    /// Nested message held by a message field or repeated element.
    fn visit_message(&mut self, _message: &MessageRef) {}
    /// Repeated field container held by a message.
    fn visit_repeated(&mut self, _field: &RepeatedRef) {}
    /// Text value.
    fn visit_string(&mut self, _value: &Arc<str>) {}
    /// Byte-string value.
    fn visit_bytes(&mut self, _value: &Arc<[u8]>) {}
}

/// Entities that own references: messages and repeated fields.
pub trait Trace {
    /// Visit every owned reference once.
    fn trace(&self, visitor: &mut dyn RefVisitor);
}

/// Visitor that counts references by kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefCounter {
    pub messages: usize,
    pub repeated: usize,
    pub strings: usize,
    pub bytes: usize,
}

impl RefCounter {
    /// Total number of references visited.
    pub fn total(&self) -> usize {
        self.messages + self.repeated + self.strings + self.bytes
    }
}

impl RefVisitor for RefCounter {
    fn visit_message(&mut self, _message: &MessageRef) {
        self.messages += 1;
    }

    fn visit_repeated(&mut self, _field: &RepeatedRef) {
        self.repeated += 1;
    }

    fn visit_string(&mut self, _value: &Arc<str>) {
        self.strings += 1;
    }

    fn visit_bytes(&mut self, _value: &Arc<[u8]>) {
        self.bytes += 1;
    }
}
