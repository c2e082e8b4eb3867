// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error kinds for schema building and message access.

/// Errors raised by the schema pool, builders, and message accessors.
///
/// Every variant carries the offending name, number, index or type so the
/// caller can build its own diagnostic.
///
/// # Example
///
/// ```rust
/// use hdds_message::{Error, FieldType, Message, SchemaPool};
///
/// let pool = SchemaPool::new();
/// pool.build(|b| {
///     b.add_message("Point")?.optional("x", FieldType::Int32, 1)?;
///     Ok(())
/// })
/// .expect("build");
///
/// let schema = pool.lookup_message("Point").expect("Point");
/// let mut msg = Message::new(&schema);
/// match msg.set("z", 1) {
///     Err(Error::UnknownField { field, .. }) => assert_eq!(field, "z"),
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ========================================================================
    // Build Transaction Errors
    // ========================================================================
    /// Message or enum name already present in the pool or the pending batch.
    DuplicateName(String),
    /// Two fields of one message share a name.
    DuplicateFieldName { message: String, field: String },
    /// Two fields of one message share a field number.
    DuplicateFieldNumber { message: String, number: u32 },
    /// Field number outside the valid range, or inside the reserved block.
    InvalidFieldNumber {
        message: String,
        field: String,
        number: u32,
    },
    /// Message or enum typed field registered without a type name.
    MissingTypeName { message: String, field: String },
    /// Nested type name did not resolve at finalize time.
    UnresolvedReference {
        message: String,
        field: String,
        type_name: String,
    },
    /// Builder asked for a definition it never registered.
    UnknownType(String),
    /// Definition already committed to the pool.
    SchemaFrozen(String),
    /// Internal invariant violated while computing a storage layout.
    LayoutError(String),

    // ========================================================================
    // Instance Errors
    // ========================================================================
    /// Field name not declared on the message schema.
    UnknownField { message: String, field: String },
    /// Value does not match the declared type, class or numeric range.
    TypeMismatch { expected: String, got: String },
    /// Text field assigned bytes that are not valid UTF-8.
    EncodingError(String),
    /// Repeated field index outside `0..len`.
    IndexOutOfRange { index: usize, len: usize },
    /// Pop from an empty repeated field.
    EmptyContainer,
}

impl Error {
    pub(crate) fn mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Build
            Error::DuplicateName(name) => write!(f, "Duplicate type name: {}", name),
            Error::DuplicateFieldName { message, field } => {
                write!(f, "Duplicate field name '{}' in {}", field, message)
            }
            Error::DuplicateFieldNumber { message, number } => {
                write!(f, "Duplicate field number {} in {}", number, message)
            }
            Error::InvalidFieldNumber {
                message,
                field,
                number,
            } => write!(
                f,
                "Invalid field number {} for {}.{}",
                number, message, field
            ),
            Error::MissingTypeName { message, field } => {
                write!(f, "Field {}.{} requires a type name", message, field)
            }
            Error::UnresolvedReference {
                message,
                field,
                type_name,
            } => write!(
                f,
                "Unresolved type '{}' referenced by {}.{}",
                type_name, message, field
            ),
            Error::UnknownType(name) => write!(f, "Unknown pending type: {}", name),
            Error::SchemaFrozen(name) => write!(f, "Schema already committed: {}", name),
            Error::LayoutError(msg) => write!(f, "Layout error: {}", msg),
            // Instance
            Error::UnknownField { message, field } => {
                write!(f, "Unknown field '{}' on {}", field, message)
            }
            Error::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, got)
            }
            Error::EncodingError(field) => {
                write!(f, "Invalid UTF-8 assigned to string field {}", field)
            }
            Error::IndexOutOfRange { index, len } => {
                write!(f, "Index out of range: {} >= {}", index, len)
            }
            Error::EmptyContainer => write!(f, "Repeated field is empty"),
        }
    }
}

impl std::error::Error for Error {}

/// Convenient alias for results using the crate [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
