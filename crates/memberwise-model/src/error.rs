//! Error types for member access and value conversion.

use std::fmt;

use thiserror::Error;

use crate::types::ValueType;
use crate::value::Value;

/// Member capability that an access attempted to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Reading the member from a source instance.
    Read,
    /// Writing the member on a target instance.
    Write,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// Errors raised while reading, writing or converting member values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// A write-only member was read, or a read-only member was written.
    #[error("member '{member}' of {owner} does not support {operation}")]
    UnsupportedOperation {
        owner: String,
        member: String,
        operation: Operation,
    },

    /// A value did not match the type a member or parameter declares.
    #[error("expected a value of type {expected}, got {actual}")]
    TypeMismatch { expected: ValueType, actual: String },

    /// A name or discriminant does not identify a variant of the enum.
    #[error("'{value}' is not a variant of enum {enum_name}")]
    UnknownVariant {
        enum_name: &'static str,
        value: String,
    },

    /// A value could not be represented in the requested type.
    #[error("cannot convert {value} to {target}")]
    Conversion { value: String, target: ValueType },

    /// A row did not hold exactly one cell per declared column.
    #[error("row {row} declares {expected} columns, got {actual} cells")]
    CellCount {
        row: String,
        expected: usize,
        actual: usize,
    },
}

impl ModelError {
    /// Builds a [`ModelError::TypeMismatch`] describing `actual`.
    pub fn type_mismatch(expected: ValueType, actual: &Value) -> Self {
        Self::TypeMismatch {
            expected,
            actual: actual.describe(),
        }
    }

    /// Builds a [`ModelError::Conversion`] for `value` into `target`.
    pub fn conversion(value: &Value, target: &ValueType) -> Self {
        Self::Conversion {
            value: value.describe(),
            target: target.clone(),
        }
    }
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
