//! Column definitions and table headers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::ColumnType;

/// One input record: column name to loosely-typed value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// A table's full column set: column name to definition.
///
/// Ordered by name so every pass over a header is deterministic.
pub type MetadataHeader = BTreeMap<String, ColumnDefinition>;

/// Everything the engine knows about one column.
///
/// Every field has a default, so partial definitions (for example a
/// caller-supplied header naming only `type`) deserialize cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnDefinition {
    /// Canonical type; `None` while no value has been observed.
    #[serde(rename = "type")]
    pub column_type: Option<ColumnType>,
    /// Max character length, or precision for decimal-capable types.
    pub length: u64,
    /// Digits after the point (decimal-capable types only).
    pub decimal: u32,
    pub allow_null: bool,
    pub unique: bool,
    pub pseudounique: bool,
    pub index: bool,
    pub primary: bool,
    pub auto_increment: bool,
    pub default: Option<String>,
    /// System-managed value (e.g. a creation timestamp).
    pub calculated: bool,
    /// System-managed value refreshed on update.
    pub updated_calculated: bool,
    pub calculated_default: Option<String>,
    /// Type before this change; only set inside an alter plan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_type: Option<ColumnType>,
}

impl ColumnDefinition {
    /// A definition of the given type with every option at its default.
    pub fn of_type(column_type: ColumnType) -> Self {
        Self {
            column_type: Some(column_type),
            ..Default::default()
        }
    }

    pub fn with_length(mut self, length: u64) -> Self {
        self.length = length;
        self
    }

    pub fn with_decimal(mut self, decimal: u32) -> Self {
        self.decimal = decimal;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.allow_null = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.index = true;
        self
    }

    pub fn as_unique(mut self) -> Self {
        self.unique = true;
        self.index = true;
        self
    }

    pub fn as_primary(mut self) -> Self {
        self.primary = true;
        self
    }

    /// Whether the column is part of any index-like structure.
    pub fn is_keyed(&self) -> bool {
        self.index || self.unique || self.primary
    }

    /// Integer digits of a decimal-capable definition (precision minus scale).
    pub fn integer_digits(&self) -> u64 {
        self.length.saturating_sub(u64::from(self.decimal))
    }
}

/// Names of the primary-key columns, in header order.
pub fn primary_key_columns(header: &MetadataHeader) -> Vec<String> {
    header
        .iter()
        .filter(|(_, def)| def.primary)
        .map(|(name, _)| name.clone())
        .collect()
}
