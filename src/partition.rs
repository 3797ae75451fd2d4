//! Row-size estimation and vertical table splitting.
//!
//! When a profiled table is too wide for the target dialect, its columns are
//! packed into part tables named `<table>__part_000`, `<table>__part_001`, …
//! Every part carries the full primary key, so parts can be joined back
//! together.
//!
//! Packing is first-fit: new columns go to the last part until it nearly
//! reaches the dialect's row ceiling or column limit, then a new part opens.
//! Columns already placed never move, so a layout stays stable across loads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dialect::DialectCapabilities;
use crate::error::{SchemaError, SchemaResult};
use crate::metadata::{primary_key_columns, ColumnDefinition, MetadataHeader, Row};
use crate::profile::is_blank;
use crate::types::ColumnType;

/// Fixed per-row storage overhead.
pub const ROW_OVERHEAD: u64 = 24;
/// Extra bytes for a nullable column's null marker.
pub const NULLABLE_COST: u64 = 1;
/// Extra bytes for a column taking part in an index.
pub const KEY_COST: u64 = 8;
/// In-row pointer size for off-row text and json.
pub const LARGE_OBJECT_POINTER: u64 = 20;

/// Part table name to the columns it holds.
pub type SplitLayout = BTreeMap<String, MetadataHeader>;

/// Estimated bytes per row, checked against a dialect's ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSizeEstimate {
    pub row_size: u64,
    pub exceeds_limit: bool,
    pub nearly_exceeds_limit: bool,
}

/// Estimated in-row bytes of one column.
pub fn column_size(def: &ColumnDefinition) -> u64 {
    let base = match def.column_type.unwrap_or(ColumnType::Varchar) {
        ColumnType::Boolean | ColumnType::Tinyint => 1,
        ColumnType::Smallint => 2,
        ColumnType::Int => 4,
        ColumnType::Numeric | ColumnType::Bigint | ColumnType::Double | ColumnType::Exponent => 8,
        ColumnType::Decimal => 16,
        ColumnType::Binary => def.length.div_ceil(8).max(1),
        ColumnType::Date | ColumnType::Time => 4,
        ColumnType::Datetime => 8,
        ColumnType::Datetimetz => 10,
        ColumnType::Varchar => def.length,
        ColumnType::Text | ColumnType::Mediumtext | ColumnType::Longtext | ColumnType::Json => {
            LARGE_OBJECT_POINTER
        }
    };

    let null_marker = if def.allow_null { NULLABLE_COST } else { 0 };
    let key = if def.is_keyed() { KEY_COST } else { 0 };
    base + null_marker + key
}

/// Estimate the row size of `header` for `dialect`.
pub fn estimate_row_size(
    header: &MetadataHeader,
    dialect: &dyn DialectCapabilities,
) -> RowSizeEstimate {
    let row_size = ROW_OVERHEAD + header.values().map(column_size).sum::<u64>();
    RowSizeEstimate {
        row_size,
        exceeds_limit: row_size > dialect.max_row_size(),
        nearly_exceeds_limit: row_size >= dialect.near_row_size(),
    }
}

/// Whether `header` needs splitting for `dialect`.
pub fn needs_split(header: &MetadataHeader, dialect: &dyn DialectCapabilities) -> bool {
    estimate_row_size(header, dialect).nearly_exceeds_limit
        || header.len() > dialect.max_column_count()
}

/// Name of the `index`-th part of `table`.
pub fn part_name(table: &str, index: usize) -> String {
    format!("{table}__part_{index:03}")
}

/// Position of a part named by [`part_name`].
fn part_index(part: &str) -> Option<usize> {
    part.rsplit_once("__part_")
        .and_then(|(_, index)| index.parse().ok())
}

/// Extend `current` so every column of `new_header` has a part.
///
/// Placed columns stay where they are (their definitions refreshed from
/// `new_header`); unplaced ones are appended first-fit.
pub fn organize_split_table(
    table: &str,
    new_header: &MetadataHeader,
    current: &SplitLayout,
    dialect: &dyn DialectCapabilities,
) -> SchemaResult<SplitLayout> {
    let primary = primary_key_columns(new_header);
    if primary.is_empty() {
        return Err(SchemaError::MissingPrimaryKey {
            table: table.to_string(),
        });
    }
    let key_header: MetadataHeader = primary
        .iter()
        .map(|name| (name.clone(), new_header[name].clone()))
        .collect();

    let mut layout = current.clone();
    for (part, columns) in layout.iter_mut() {
        for (name, def) in columns.iter_mut() {
            if let Some(fresh) = new_header.get(name) {
                *def = fresh.clone();
            }
        }
        columns.extend(key_header.clone());

        let estimate = estimate_row_size(columns, dialect);
        if estimate.exceeds_limit {
            warn!(%part, row_size = estimate.row_size, "placed columns outgrew the row limit");
        }
    }

    if layout.is_empty() {
        layout.insert(part_name(table, 0), key_header.clone());
    }

    let unplaced: Vec<(&String, &ColumnDefinition)> = new_header
        .iter()
        .filter(|(name, def)| !def.primary && !layout.values().any(|part| part.contains_key(*name)))
        .collect();

    for (name, def) in unplaced {
        place_column(table, name, def, &key_header, &mut layout, dialect)?;
    }

    Ok(layout)
}

fn place_column(
    table: &str,
    name: &str,
    def: &ColumnDefinition,
    key_header: &MetadataHeader,
    layout: &mut SplitLayout,
    dialect: &dyn DialectCapabilities,
) -> SchemaResult<()> {
    let max_columns = dialect.max_column_count();

    let active = layout
        .keys()
        .max_by_key(|part| part_index(part))
        .cloned()
        .unwrap_or_default();
    if let Some(part) = layout.get_mut(&active) {
        part.insert(name.to_string(), def.clone());
        let estimate = estimate_row_size(part, dialect);
        let fits_columns = part.len() <= max_columns;

        if fits_columns && !estimate.nearly_exceeds_limit {
            return Ok(());
        }
        // A part holding only the key may take one column up to the hard limit.
        if fits_columns && !estimate.exceeds_limit && part.len() == key_header.len() + 1 {
            return Ok(());
        }
        part.remove(name);
    }

    let mut fresh = key_header.clone();
    fresh.insert(name.to_string(), def.clone());
    let estimate = estimate_row_size(&fresh, dialect);
    if estimate.exceeds_limit || fresh.len() > max_columns {
        return Err(SchemaError::ColumnTooWide {
            column: name.to_string(),
            size: estimate.row_size,
            limit: dialect.max_row_size(),
        });
    }

    let part = part_name(table, layout.len());
    debug!(%part, column = name, "opening part table");
    layout.insert(part, fresh);
    Ok(())
}

/// Project rows onto the parts of `layout`.
///
/// Every part gets an entry; a row only lands in a part when it carries a
/// non-blank value for one of the part's non-key columns.
pub fn organize_split_data(rows: &[Row], layout: &SplitLayout) -> BTreeMap<String, Vec<Row>> {
    let mut split: BTreeMap<String, Vec<Row>> =
        layout.keys().map(|part| (part.clone(), Vec::new())).collect();

    for row in rows {
        for (part, columns) in layout {
            let contributes = columns
                .iter()
                .filter(|(_, def)| !def.primary)
                .any(|(name, _)| row.get(name).is_some_and(|value| !is_blank(value)));
            if !contributes {
                continue;
            }

            let sub_row: Row = columns
                .keys()
                .filter_map(|name| row.get(name).map(|value| (name.clone(), value.clone())))
                .collect();
            if let Some(bucket) = split.get_mut(part) {
                bucket.push(sub_row);
            }
        }
    }

    split
}
