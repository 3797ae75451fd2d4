//! Table metadata: column definitions, headers, and live catalog reading.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐      ┌──────────────────────────────┐
//! │  SchemaReader (async)        │      │  Profiler / Reconciler       │
//! │  - read_header()             │ ───▶ │  consume MetadataHeader      │
//! │  - read_headers_batch()      │      │  (column name → definition)  │
//! └──────────────────────────────┘      └──────────────────────────────┘
//!               │
//!               ▼
//! ┌──────────────────────────────┐
//! │  header_from_catalog()       │
//! │  catalog rows + dialect      │
//! └──────────────────────────────┘
//! ```

mod column;
mod reader;

pub use column::{primary_key_columns, ColumnDefinition, MetadataHeader, Row};
pub use reader::{
    header_from_catalog, CatalogColumn, CatalogSchemaReader, ColumnKey, SchemaReader,
};
