//! # autoschema
//!
//! Schema inference, reconciliation and partitioning for semi-structured rows.
//!
//! ## Architecture
//!
//! Rows arrive as loosely-typed JSON objects. autoschema decides which SQL
//! columns they need, how an existing table must change to hold them, and
//! how to split a table that grows too wide:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Rows (JSON objects)                      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [predict + collate]
//! ┌─────────────────────────────────────────────────────────┐
//! │            Profiler → MetadataHeader                     │
//! │            (types, lengths, cardinality)                 │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [keys]
//! ┌─────────────────────────────────────────────────────────┐
//! │         Primary key + index prediction                   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [reconcile, against the live header]
//! ┌─────────────────────────────────────────────────────────┐
//! │    AlterTableChanges + updated MetadataHeader            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [partition]
//! ┌─────────────────────────────────────────────────────────┐
//! │     Row-size estimate, part tables, split rows           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The core is synchronous and performs no I/O. Live headers come in through
//! the async [`metadata::SchemaReader`] seam; [`pipeline`] strings the stages
//! together.

pub mod collate;
pub mod config;
pub mod dialect;
pub mod error;
pub mod keys;
pub mod metadata;
pub mod partition;
pub mod pipeline;
pub mod predict;
pub mod profile;
pub mod reconcile;
pub mod types;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::collate::collate_types;
    pub use crate::config::Settings;
    pub use crate::dialect::{Dialect, DialectCapabilities};
    pub use crate::error::{SchemaError, SchemaResult};
    pub use crate::keys::{predict_indexes, KeyOptions};
    pub use crate::metadata::{
        header_from_catalog, CatalogColumn, CatalogSchemaReader, ColumnDefinition, MetadataHeader,
        Row, SchemaReader,
    };
    pub use crate::partition::{
        estimate_row_size, organize_split_data, organize_split_table, RowSizeEstimate, SplitLayout,
    };
    pub use crate::pipeline::{
        plan_table, plan_table_from_reader, plan_table_with_settings, plan_tables_from_reader,
        TableBatch, TablePlan,
    };
    pub use crate::predict::{predict_str, predict_type};
    pub use crate::profile::{get_metadata, ProfileConfig, Profiler};
    pub use crate::reconcile::{compare_metadata, AlterTableChanges, Reconciler, Reconciliation};
    pub use crate::types::{ColumnType, TypeGroup};
}
