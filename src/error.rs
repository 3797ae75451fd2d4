//! Error types for schema inference and reconciliation.

use thiserror::Error;

use crate::types::ColumnType;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Longest value preview carried inside a [`SchemaError::DataTooLong`].
const VALUE_PREVIEW_CHARS: usize = 64;

/// Errors raised by the inference, reconciliation and partitioning passes.
///
/// Apart from [`SchemaError::Task`], none of these are transient: the same
/// input always produces the same error, so callers should not retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Empty or malformed input.
    #[error("invalid input: {0}")]
    Input(String),

    /// A single value is longer than the widest text type can hold.
    #[error("data too long: value '{value}' has length {length}")]
    DataTooLong {
        /// Leading characters of the offending value.
        value: String,
        /// Full length of the value in characters.
        length: u64,
    },

    /// A type modification is not a lossless widening.
    #[error("unsafe type change on column '{column}': {from} -> {to}")]
    UnsafeTypeChange {
        column: String,
        from: ColumnType,
        to: ColumnType,
    },

    /// A column does not fit into an otherwise empty part table.
    #[error("column '{column}' needs {size} bytes per row, limit is {limit}")]
    ColumnTooWide {
        column: String,
        size: u64,
        limit: u64,
    },

    /// A table must carry a primary key before its columns can be split.
    #[error("table '{table}' has no primary key to replicate across parts")]
    MissingPrimaryKey { table: String },

    /// A concurrent planning task panicked or was cancelled.
    #[error("planning task failed: {0}")]
    Task(String),
}

impl SchemaError {
    /// Create an input error.
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    /// Create a data-too-long error, keeping only a short preview of the value.
    pub fn data_too_long(value: &str, length: u64) -> Self {
        Self::DataTooLong {
            value: value.chars().take(VALUE_PREVIEW_CHARS).collect(),
            length,
        }
    }

    /// Whether the error came from a type transition the caller may choose to force.
    pub fn is_unsafe_type_change(&self) -> bool {
        matches!(self, Self::UnsafeTypeChange { .. })
    }
}
