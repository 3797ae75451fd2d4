//! Reading live table headers from a server catalog.
//!
//! Reconciliation needs the header the table has *now*. Servers describe
//! their columns in catalog rows (`information_schema.columns` and friends);
//! [`header_from_catalog`] turns those rows into a [`MetadataHeader`] using a
//! dialect's type and default-value tables, and [`SchemaReader`] abstracts
//! over where the rows come from.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::column::{ColumnDefinition, MetadataHeader};
use crate::dialect::{helpers, DialectCapabilities};
use crate::error::SchemaResult;
use crate::types::DEFAULT_TEXT_TYPE;

/// Key participation reported by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKey {
    #[serde(rename = "PRI")]
    Primary,
    #[serde(rename = "UNI")]
    Unique,
    #[serde(rename = "MUL")]
    Multiple,
}

/// One column as described by a server catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogColumn {
    pub name: String,
    /// Full server type, possibly with arguments (`decimal(10,2)`).
    pub data_type: String,
    pub is_nullable: bool,
    pub key: Option<ColumnKey>,
    pub default: Option<String>,
    pub auto_increment: bool,
    pub character_maximum_length: Option<u64>,
    pub numeric_precision: Option<u64>,
    pub numeric_scale: Option<u32>,
}

impl CatalogColumn {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            ..Default::default()
        }
    }

    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    pub fn with_key(mut self, key: ColumnKey) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Build a header from catalog rows.
///
/// Unknown server types are logged and read as the default text type, so a
/// table with one exotic column can still be reconciled.
pub fn header_from_catalog(
    columns: &[CatalogColumn],
    dialect: &dyn DialectCapabilities,
) -> MetadataHeader {
    columns
        .iter()
        .map(|column| (column.name.clone(), definition_from_catalog(column, dialect)))
        .collect()
}

fn definition_from_catalog(
    column: &CatalogColumn,
    dialect: &dyn DialectCapabilities,
) -> ColumnDefinition {
    let column_type = dialect.server_to_local(&column.data_type).unwrap_or_else(|| {
        warn!(
            column = %column.name,
            server_type = %column.data_type,
            dialect = dialect.name(),
            fallback = %DEFAULT_TEXT_TYPE,
            "unknown server type"
        );
        DEFAULT_TEXT_TYPE
    });

    let args = helpers::split_server_type(&column.data_type).args;
    let (arg_length, arg_decimal) = args.as_deref().map(parse_type_args).unwrap_or_default();

    let mut def = ColumnDefinition::of_type(column_type);

    if dialect.accepts_length(column_type) {
        def.length = column
            .character_maximum_length
            .or(column.numeric_precision)
            .or(arg_length)
            .unwrap_or(0);
    }
    if dialect.accepts_decimal(column_type) {
        def.decimal = column.numeric_scale.or(arg_decimal).unwrap_or(0);
    }

    def.allow_null = column.is_nullable;
    def.auto_increment = column.auto_increment;
    match column.key {
        Some(ColumnKey::Primary) => def.primary = true,
        Some(ColumnKey::Unique) => {
            def.unique = true;
            def.index = true;
        }
        Some(ColumnKey::Multiple) => def.index = true,
        None => {}
    }

    if let Some(raw) = column.default.as_deref() {
        apply_default(&mut def, raw, dialect);
    }

    def
}

/// Parse `length` or `precision,scale` type arguments.
fn parse_type_args(inner: &str) -> (Option<u64>, Option<u32>) {
    let parts: Vec<&str> = inner.split(',').map(|s| s.trim()).collect();
    match parts.as_slice() {
        [length] => (length.parse().ok(), None),
        [precision, scale] => (precision.parse().ok(), scale.parse().ok()),
        _ => (None, None),
    }
}

fn apply_default(def: &mut ColumnDefinition, raw: &str, dialect: &dyn DialectCapabilities) {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("null") {
        return;
    }

    // MySQL appends the refresh clause to the default expression.
    let upper = raw.to_ascii_uppercase();
    let (expr, on_update) = match upper.find(" ON UPDATE ") {
        Some(pos) => (&raw[..pos], true),
        None => (raw, false),
    };

    if let Some(local) = dialect.local_default(expr) {
        def.calculated = true;
        def.updated_calculated = on_update;
        def.calculated_default = Some(local.to_string());
        return;
    }

    let literal = expr
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(expr);
    def.default = Some(literal.to_string());
}

// =============================================================================
// Readers
// =============================================================================

/// Source of live table headers.
///
/// # Example
///
/// ```ignore
/// use autoschema::metadata::SchemaReader;
///
/// async fn example(reader: &impl SchemaReader) -> SchemaResult<()> {
///     let current = reader.read_header("orders").await?;
///     let all = reader
///         .read_headers_batch(&["orders".into(), "customers".into()])
///         .await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SchemaReader: Send + Sync {
    /// Read the header of one table; `None` when the table doesn't exist.
    async fn read_header(&self, table: &str) -> SchemaResult<Option<MetadataHeader>>;

    /// Batch read multiple tables.
    ///
    /// Default implementation reads tables in parallel using `join_all`.
    async fn read_headers_batch(
        &self,
        tables: &[String],
    ) -> SchemaResult<Vec<Option<MetadataHeader>>> {
        let futures: Vec<_> = tables.iter().map(|table| self.read_header(table)).collect();

        let results = futures::future::join_all(futures).await;

        // Collect results, failing if any failed
        results.into_iter().collect()
    }
}

/// Reader over catalog rows already held in memory.
///
/// Useful when the caller fetched `information_schema` itself, and in tests.
#[derive(Debug, Clone)]
pub struct CatalogSchemaReader<D: DialectCapabilities> {
    dialect: D,
    tables: HashMap<String, Vec<CatalogColumn>>,
}

impl<D: DialectCapabilities> CatalogSchemaReader<D> {
    pub fn new(dialect: D) -> Self {
        Self {
            dialect,
            tables: HashMap::new(),
        }
    }

    /// Register the catalog rows of a table.
    pub fn with_table(mut self, table: impl Into<String>, columns: Vec<CatalogColumn>) -> Self {
        self.tables.insert(table.into(), columns);
        self
    }

    pub fn dialect(&self) -> &D {
        &self.dialect
    }
}

#[async_trait]
impl<D: DialectCapabilities> SchemaReader for CatalogSchemaReader<D> {
    async fn read_header(&self, table: &str) -> SchemaResult<Option<MetadataHeader>> {
        let Some(columns) = self.tables.get(table) else {
            debug!(table, "table not in catalog");
            return Ok(None);
        };
        Ok(Some(header_from_catalog(columns, &self.dialect)))
    }
}
