//! Per-column accumulators filled during the profiling scan.

use std::collections::HashSet;

use crate::collate::collate_pair;
use crate::error::SchemaResult;
use crate::predict::{char_length, normalize_number, predict_str};
use crate::types::ColumnType;

/// What one pass over the rows learned about a column.
#[derive(Debug, Default)]
pub(crate) struct ColumnStats {
    pub column_type: Option<ColumnType>,
    pub distinct: HashSet<String>,
    pub max_length: u64,
    pub max_integer_digits: u64,
    pub max_decimal_digits: u32,
    pub saw_blank: bool,
}

impl ColumnStats {
    /// Record one non-blank value, already rendered as text.
    pub fn observe(&mut self, rendered: String) -> SchemaResult<()> {
        if let Some(ty) = predict_str(&rendered)? {
            self.column_type = Some(match self.column_type {
                Some(current) => collate_pair(current, ty),
                None => ty,
            });
        }

        self.max_length = self.max_length.max(char_length(&rendered));
        if let Some(number) = normalize_number(rendered.trim().trim_start_matches(['-', '+'])) {
            self.max_integer_digits = self.max_integer_digits.max(number.integer_digits());
            self.max_decimal_digits = self.max_decimal_digits.max(number.decimal_digits());
        }

        self.distinct.insert(rendered);
        Ok(())
    }

    pub fn observe_blank(&mut self) {
        self.saw_blank = true;
    }

    /// Distinct non-blank values seen.
    pub fn cardinality(&self) -> usize {
        self.distinct.len()
    }
}
