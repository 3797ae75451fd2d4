//! Column profiling: from raw rows to a [`MetadataHeader`].
//!
//! The profiler makes one pass over the (optionally sampled) rows, predicting
//! a type for every non-blank value and folding it into the column's running
//! type with the collator. Lengths, numeric precision and cardinality are
//! accumulated on the way. A post-pass settles text widths, uniqueness and
//! indexes, then hands the header to the key predictor.
//!
//! # Example
//!
//! ```ignore
//! use autoschema::profile::{get_metadata, ProfileConfig};
//!
//! let header = get_metadata(&ProfileConfig::default(), &rows)?;
//! assert_eq!(header["id"].column_type, Some(ColumnType::Tinyint));
//! ```

mod config;
mod stats;

pub use config::{thresholds, ProfileConfig};

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{SchemaError, SchemaResult};
use crate::keys::predict_indexes;
use crate::metadata::{ColumnDefinition, MetadataHeader, Row};
use crate::predict::value_to_string;
use crate::types::{ColumnType, TypeGroup};
use stats::ColumnStats;

/// Text marker some exporters write for SQL NULL.
pub const NULL_MARKER: &str = "\\N";

/// Whether a value counts as missing.
///
/// JSON null, the `\N` marker and the text `null` (any case) are blank.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s == NULL_MARKER || s.eq_ignore_ascii_case("null"),
        _ => false,
    }
}

/// Profile rows with the given config.
pub fn get_metadata(config: &ProfileConfig, rows: &[Row]) -> SchemaResult<MetadataHeader> {
    Profiler::new(config.clone()).profile(rows)
}

/// Configurable column profiler.
#[derive(Debug, Clone, Default)]
pub struct Profiler {
    config: ProfileConfig,
    header: Option<MetadataHeader>,
}

impl Profiler {
    pub fn new(config: ProfileConfig) -> Self {
        Self {
            config,
            header: None,
        }
    }

    /// Profile only the columns of `header`, keeping their other options.
    pub fn with_header(mut self, header: MetadataHeader) -> Self {
        self.header = Some(header);
        self
    }

    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    /// Profile rows, sampling with the thread-local generator.
    pub fn profile(&self, rows: &[Row]) -> SchemaResult<MetadataHeader> {
        self.profile_with_rng(rows, &mut rand::rng())
    }

    /// Profile rows, sampling with `rng`.
    pub fn profile_with_rng<R: Rng + ?Sized>(
        &self,
        rows: &[Row],
        rng: &mut R,
    ) -> SchemaResult<MetadataHeader> {
        if rows.is_empty() && self.header.is_none() {
            return Err(SchemaError::input("cannot profile an empty dataset without a header"));
        }

        let columns = self.columns(rows);
        let sample = self.sample(rows, rng);

        let mut stats: BTreeMap<&str, ColumnStats> = columns
            .iter()
            .map(|name| (name.as_str(), ColumnStats::default()))
            .collect();

        for row in sample.iter() {
            for (name, column) in stats.iter_mut() {
                match row.get(*name) {
                    Some(value) if !is_blank(value) => {
                        if let Some(rendered) = value_to_string(value) {
                            column.observe(rendered)?;
                        }
                    }
                    _ => column.observe_blank(),
                }
            }
        }

        let row_count = sample.len();
        let mut header = MetadataHeader::new();
        for (name, column) in stats {
            let supplied = self.header.as_ref().and_then(|h| h.get(name));
            match self.definition(column, supplied, row_count) {
                Some(def) => {
                    trace!(
                        column = name,
                        column_type = ?def.column_type,
                        length = def.length,
                        unique = def.unique,
                        "profiled column"
                    );
                    header.insert(name.to_string(), def);
                }
                None => trace!(column = name, "dropping column without observed type"),
            }
        }

        if self.config.auto_indexing {
            predict_indexes(&mut header, &self.config.key_options(), Some(&*sample));
        }

        Ok(header)
    }

    /// Columns to profile: the supplied header's, or every key seen in any row.
    fn columns(&self, rows: &[Row]) -> BTreeSet<String> {
        match &self.header {
            Some(header) => header.keys().cloned().collect(),
            None => rows.iter().flat_map(|row| row.keys().cloned()).collect(),
        }
    }

    fn sample<'a, R: Rng + ?Sized>(&self, rows: &'a [Row], rng: &mut R) -> Cow<'a, [Row]> {
        let sampling = self.config.sampling;
        if !(sampling > 0.0 && sampling < 1.0) {
            return Cow::Borrowed(rows);
        }

        let total = rows.len();
        let target = ((total as f64 * sampling).round() as usize)
            .max(self.config.sampling_minimum)
            .min(total);
        if target >= total {
            return Cow::Borrowed(rows);
        }

        let mut picked = rand::seq::index::sample(rng, total, target).into_vec();
        picked.sort_unstable();
        debug!(total, sampled = target, "sampling rows for profiling");
        Cow::Owned(picked.into_iter().map(|i| rows[i].clone()).collect())
    }

    fn definition(
        &self,
        column: ColumnStats,
        supplied: Option<&ColumnDefinition>,
        row_count: usize,
    ) -> Option<ColumnDefinition> {
        let column_type = column
            .column_type
            .or_else(|| supplied.and_then(|def| def.column_type))?;
        let column_type = self.settle_text_width(column_type, column.max_length);

        let mut def = supplied.cloned().unwrap_or_default();
        def.column_type = Some(column_type);
        def.allow_null |= column.saw_blank;

        if column_type.is_decimal_capable() {
            let decimal = column.max_decimal_digits.min(self.config.decimal_max_length);
            def.decimal = decimal;
            def.length = column.max_integer_digits + u64::from(decimal);
        } else {
            def.length = column.max_length;
            def.decimal = 0;
        }

        let cardinality = column.cardinality();
        let trusted = row_count >= self.config.minimum_unique;
        def.unique = row_count > 0 && cardinality == row_count;
        def.pseudounique =
            trusted && cardinality as f64 >= self.config.pseudo_unique * row_count as f64;

        let categorical = self.config.categorical > 0.0
            && trusted
            && (cardinality as f64) <= self.config.categorical * row_count as f64;

        def.index = def.index
            || def.unique
            || def.pseudounique
            || categorical
            || column_type.group() == TypeGroup::Date;

        Some(def)
    }

    /// Widen text columns whose longest value outgrew the observed tier.
    fn settle_text_width(&self, column_type: ColumnType, max_length: u64) -> ColumnType {
        if !column_type.is_text() {
            return column_type;
        }
        let mut settled = match ColumnType::text_for_length(max_length) {
            Some(fit) if TypeGroup::rank(fit) > TypeGroup::rank(column_type) => fit,
            _ => column_type,
        };
        if settled == ColumnType::Varchar && max_length > self.config.max_varchar_length {
            settled = ColumnType::Text;
        }
        settled
    }
}
