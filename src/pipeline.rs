//! End-to-end table planning.
//!
//! Runs the full data flow for one batch of rows headed for one table:
//!
//! ```text
//! rows ──▶ profile ──▶ reconcile (if the table exists) ──▶ keys & indexes
//!                                                              │
//!                     split layout + split rows ◀── row size ◀─┘
//!                     (only when the table is too wide)
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::config::Settings;
use crate::dialect::DialectCapabilities;
use crate::error::{SchemaError, SchemaResult};
use crate::keys::{predict_indexes, KeyOptions};
use crate::metadata::{primary_key_columns, MetadataHeader, Row, SchemaReader};
use crate::partition::{
    estimate_row_size, needs_split, organize_split_data, organize_split_table, RowSizeEstimate,
    SplitLayout,
};
use crate::profile::{ProfileConfig, Profiler};
use crate::reconcile::{AlterTableChanges, Reconciler};

/// Column layout and rows for a table split into parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitPlan {
    pub layout: SplitLayout,
    pub rows: BTreeMap<String, Vec<Row>>,
}

/// Everything needed to create or alter a table and load the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePlan {
    pub table: String,
    /// Header the table has once the plan is applied.
    pub header: MetadataHeader,
    /// Alterations for an existing table; `None` when the table is new.
    pub changes: Option<AlterTableChanges>,
    pub row_size: RowSizeEstimate,
    pub split: Option<SplitPlan>,
}

/// One table's batch for [`plan_tables_from_reader`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableBatch {
    pub table: String,
    pub rows: Vec<Row>,
}

impl TableBatch {
    pub fn new(table: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            table: table.into(),
            rows,
        }
    }
}

/// Plan a table with strict reconciliation.
pub fn plan_table(
    live: Option<&MetadataHeader>,
    table: &str,
    rows: &[Row],
    config: &ProfileConfig,
    dialect: &dyn DialectCapabilities,
) -> SchemaResult<TablePlan> {
    plan(live, table, rows, config, dialect, false)
}

/// Plan a table with every option taken from `settings`.
pub fn plan_table_with_settings(
    live: Option<&MetadataHeader>,
    table: &str,
    rows: &[Row],
    settings: &Settings,
) -> SchemaResult<TablePlan> {
    plan(
        live,
        table,
        rows,
        &settings.profile,
        &settings.dialect,
        settings.reconcile.widen_incompatible,
    )
}

/// Read the live header through `reader`, then plan.
pub async fn plan_table_from_reader(
    reader: &dyn SchemaReader,
    table: &str,
    rows: &[Row],
    config: &ProfileConfig,
    dialect: &dyn DialectCapabilities,
) -> SchemaResult<TablePlan> {
    let live = reader.read_header(table).await?;
    plan_table(live.as_ref(), table, rows, config, dialect)
}

/// Plan many tables, reading their live headers in one batch.
///
/// With `workers.use_workers` set, tables are planned on the blocking pool,
/// at most `workers.max_workers` at a time. Plans come back in batch order.
pub async fn plan_tables_from_reader(
    reader: &dyn SchemaReader,
    batches: Vec<TableBatch>,
    settings: &Settings,
) -> SchemaResult<Vec<TablePlan>> {
    let names: Vec<String> = batches.iter().map(|batch| batch.table.clone()).collect();
    let live = reader.read_headers_batch(&names).await?;

    if !settings.workers.use_workers {
        return batches
            .iter()
            .zip(live.iter())
            .map(|(batch, live)| {
                plan_table_with_settings(live.as_ref(), &batch.table, &batch.rows, settings)
            })
            .collect();
    }

    let permits = Arc::new(Semaphore::new(settings.workers.max_workers.max(1)));
    let mut handles = Vec::with_capacity(batches.len());
    for (batch, live) in batches.into_iter().zip(live) {
        let permit = Arc::clone(&permits)
            .acquire_owned()
            .await
            .map_err(|err| SchemaError::Task(err.to_string()))?;
        let settings = settings.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            plan_table_with_settings(live.as_ref(), &batch.table, &batch.rows, &settings)
        }));
    }

    let mut plans = Vec::with_capacity(handles.len());
    for joined in futures::future::join_all(handles).await {
        plans.push(joined.map_err(|err| SchemaError::Task(err.to_string()))??);
    }
    Ok(plans)
}

fn plan(
    live: Option<&MetadataHeader>,
    table: &str,
    rows: &[Row],
    config: &ProfileConfig,
    dialect: &dyn DialectCapabilities,
    widen_incompatible: bool,
) -> SchemaResult<TablePlan> {
    let (header, changes) = match live {
        None => (Profiler::new(config.clone()).profile(rows)?, None),
        Some(live) => {
            // Keys are predicted on the merged header, not the batch alone.
            let profile_only = ProfileConfig {
                auto_indexing: false,
                ..config.clone()
            };
            let profiled = Profiler::new(profile_only).profile(rows)?;
            let reconciliation = Reconciler::new()
                .with_dialect(dialect)
                .widen_incompatible(widen_incompatible)
                .reconcile(live, &profiled)?;

            let mut header = reconciliation.updated_metadata;
            let mut changes = reconciliation.changes;
            if config.auto_indexing {
                // The live key only grows: configured columns join it.
                let existing = primary_key_columns(&header);
                let mut requested = existing.clone();
                for column in config.primary_key.iter().flatten() {
                    if !requested.contains(column) {
                        requested.push(column.clone());
                    }
                }
                // Existing rows carry no value for added columns.
                let options = KeyOptions {
                    max_key_length: config.max_key_length,
                    primary_key: (!requested.is_empty()).then_some(requested),
                    ..KeyOptions::default()
                }
                .excluding(changes.add_columns.keys().cloned());
                let predicted = predict_indexes(&mut header, &options, Some(rows));
                if !predicted.is_empty() && predicted != existing {
                    changes.primary_key_changes = predicted;
                }
            }
            (header, Some(changes))
        }
    };

    let row_size = estimate_row_size(&header, dialect);
    let split = if needs_split(&header, dialect) {
        let layout = organize_split_table(table, &header, &SplitLayout::new(), dialect)?;
        let rows = organize_split_data(rows, &layout);
        debug!(table, parts = layout.len(), row_size = row_size.row_size, "splitting table");
        Some(SplitPlan { layout, rows })
    } else {
        None
    };

    Ok(TablePlan {
        table: table.to_string(),
        header,
        changes,
        row_size,
        split,
    })
}
