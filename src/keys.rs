//! Primary-key and index prediction.
//!
//! Works on a profiled header. Indexes are cheap decisions (date columns and
//! short unique columns); the primary key is chosen from non-null,
//! key-eligible unique columns, searching small composite keys against the
//! observed rows when no single column stands out.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use tracing::{debug, warn};

use crate::metadata::{ColumnDefinition, MetadataHeader, Row};
use crate::predict::value_to_string;
use crate::profile::is_blank;
use crate::types::{ColumnType, TypeGroup};

/// Widest composite key the search will try.
pub const MAX_COMPOSITE_KEY_COLUMNS: usize = 4;
/// Ranked candidates considered by the composite search.
pub const MAX_KEY_CANDIDATES: usize = 12;
/// Default maximum length of an indexed column.
pub const DEFAULT_MAX_KEY_LENGTH: u64 = 255;

/// Options for [`predict_indexes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOptions {
    /// Longest column (in characters) that may be indexed or keyed.
    pub max_key_length: u64,
    /// Explicit primary key; bypasses prediction when set.
    pub primary_key: Option<Vec<String>>,
    /// Columns that may never join the key.
    pub excluded: BTreeSet<String>,
}

impl Default for KeyOptions {
    fn default() -> Self {
        Self {
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            primary_key: None,
            excluded: BTreeSet::new(),
        }
    }
}

impl KeyOptions {
    pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn excluding<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(columns.into_iter().map(Into::into));
        self
    }
}

/// Mark indexes and choose a primary key, mutating `header` in place.
///
/// Returns the primary-key columns. An empty result means no key could be
/// chosen unambiguously; the header then has no primary column.
pub fn predict_indexes(
    header: &mut MetadataHeader,
    options: &KeyOptions,
    rows: Option<&[Row]>,
) -> Vec<String> {
    mark_indexes(header, options.max_key_length);

    if let Some(explicit) = options.primary_key.as_ref().filter(|pk| !pk.is_empty()) {
        let explicit: Vec<String> = explicit
            .iter()
            .filter(|name| !options.excluded.contains(*name))
            .cloned()
            .collect();
        return apply_explicit_key(header, &explicit);
    }

    for def in header.values_mut() {
        def.primary = false;
    }

    let mut candidates: Vec<(&String, &ColumnDefinition)> = header
        .iter()
        .filter(|(name, def)| {
            !options.excluded.contains(*name) && is_candidate(def, options.max_key_length)
        })
        .collect();
    candidates.sort_by(|a, b| rank(a, b));
    let candidates: Vec<String> = candidates.into_iter().map(|(name, _)| name.clone()).collect();

    let chosen = match (candidates.len(), rows) {
        (0, _) => Vec::new(),
        (_, Some(rows)) if !rows.is_empty() => {
            search_composite_key(header, &candidates, &options.excluded, rows)
        }
        (1, _) => candidates,
        _ => candidates
            .iter()
            .find(|name| header.get(*name).is_some_and(|def| def.unique))
            .map(|name| vec![name.clone()])
            .unwrap_or_default(),
    };

    for name in &chosen {
        if let Some(def) = header.get_mut(name) {
            def.primary = true;
        }
    }
    debug!(primary_key = ?chosen, "predicted primary key");
    chosen
}

fn mark_indexes(header: &mut MetadataHeader, max_key_length: u64) {
    for def in header.values_mut() {
        let Some(ty) = def.column_type else { continue };
        if ty.group() == TypeGroup::Date {
            def.index = true;
        }
        if (def.unique || def.pseudounique) && def.length <= max_key_length {
            def.index = true;
        }
    }
}

fn apply_explicit_key(header: &mut MetadataHeader, explicit: &[String]) -> Vec<String> {
    for (name, def) in header.iter_mut() {
        def.primary = explicit.contains(name);
    }
    let applied: Vec<String> = explicit
        .iter()
        .filter(|name| header.contains_key(*name))
        .cloned()
        .collect();
    if applied.len() < explicit.len() {
        warn!(requested = ?explicit, applied = ?applied, "primary key names missing from header");
    }
    applied
}

fn is_candidate(def: &ColumnDefinition, max_key_length: u64) -> bool {
    !def.allow_null
        && def.column_type.is_some_and(|ty| ty.is_key_eligible())
        && (def.unique || def.pseudounique)
        && def.length <= max_key_length
}

/// Integers before text, then narrower type, shorter length, name.
fn rank(a: &(&String, &ColumnDefinition), b: &(&String, &ColumnDefinition)) -> Ordering {
    let key = |(name, def): &(&String, &ColumnDefinition)| {
        let ty = def.column_type.unwrap_or(ColumnType::Varchar);
        (!ty.is_integer(), ty, def.length, (*name).clone())
    };
    key(a).cmp(&key(b))
}

fn search_composite_key(
    header: &MetadataHeader,
    candidates: &[String],
    excluded: &BTreeSet<String>,
    rows: &[Row],
) -> Vec<String> {
    if candidates.len() > MAX_KEY_CANDIDATES {
        debug!(
            candidates = candidates.len(),
            limit = MAX_KEY_CANDIDATES,
            "truncating key candidates"
        );
    }
    let candidates = &candidates[..candidates.len().min(MAX_KEY_CANDIDATES)];
    let dates: Vec<&String> = header
        .iter()
        .filter(|(name, def)| {
            !excluded.contains(*name)
                && !def.allow_null
                && def.column_type.is_some_and(|ty| ty.group() == TypeGroup::Date)
        })
        .map(|(name, _)| name)
        .collect();

    for size in 1..=MAX_COMPOSITE_KEY_COLUMNS {
        for combo in combinations(candidates.len(), size) {
            let columns: Vec<&str> = combo.iter().map(|&i| candidates[i].as_str()).collect();
            if is_distinct(&columns, rows) {
                return columns.into_iter().map(String::from).collect();
            }
        }

        if size < 2 {
            continue;
        }
        for combo in combinations(candidates.len(), size - 1) {
            for date in &dates {
                let mut columns: Vec<&str> =
                    combo.iter().map(|&i| candidates[i].as_str()).collect();
                columns.push(date.as_str());
                if is_distinct(&columns, rows) {
                    return columns.into_iter().map(String::from).collect();
                }
            }
        }
    }

    warn!(
        candidates = candidates.len(),
        max_columns = MAX_COMPOSITE_KEY_COLUMNS,
        "no distinct key within search bounds"
    );
    Vec::new()
}

/// Whether the value tuples of `columns` are present and distinct on every row.
fn is_distinct(columns: &[&str], rows: &[Row]) -> bool {
    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(rows.len());
    for row in rows {
        let mut tuple = Vec::with_capacity(columns.len());
        for column in columns {
            match row.get(*column) {
                Some(value) if !is_blank(value) => match value_to_string(value) {
                    Some(s) => tuple.push(s),
                    None => return false,
                },
                _ => return false,
            }
        }
        if !seen.insert(tuple) {
            return false;
        }
    }
    true
}

/// Index combinations of `k` out of `n`, in lexicographic order.
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k == 0 || k > n {
        return Vec::new();
    }
    let mut result = Vec::new();
    let mut current: Vec<usize> = (0..k).collect();
    loop {
        result.push(current.clone());

        // Rightmost index that can still move.
        let Some(pos) = (0..k).rev().find(|&i| current[i] < n - k + i) else {
            return result;
        };
        current[pos] += 1;
        for i in pos + 1..k {
            current[i] = current[i - 1] + 1;
        }
    }
}
