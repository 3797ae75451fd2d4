//! Profiling options.

use serde::{Deserialize, Serialize};

use crate::keys::{KeyOptions, DEFAULT_MAX_KEY_LENGTH};

/// Default profiling thresholds.
pub mod thresholds {
    /// Distinct ratio at which a column counts as pseudo-unique.
    pub const PSEUDO_UNIQUE: f64 = 0.95;
    /// Distinct ratio at or below which a column is indexed as categorical (0 disables).
    pub const CATEGORICAL: f64 = 0.0;
    /// Fraction of rows to sample (0 disables sampling).
    pub const SAMPLING: f64 = 0.0;
    /// Fewest rows a sample may contain.
    pub const SAMPLING_MINIMUM: usize = 100;
    /// Fewest rows before cardinality ratios are trusted.
    pub const MINIMUM_UNIQUE: usize = 50;
    /// Longest varchar before the column escalates to text.
    pub const MAX_VARCHAR_LENGTH: u64 = crate::types::VARCHAR_CEILING;
    /// Most fractional digits kept for decimal columns.
    pub const DECIMAL_MAX_LENGTH: u32 = 10;
}

/// Options consumed by the profiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub pseudo_unique: f64,
    pub categorical: f64,
    pub sampling: f64,
    pub sampling_minimum: usize,
    pub minimum_unique: usize,
    pub max_key_length: u64,
    pub max_varchar_length: u64,
    /// Run key and index prediction after profiling.
    pub auto_indexing: bool,
    pub decimal_max_length: u32,
    /// Explicit primary key passed to key prediction.
    pub primary_key: Option<Vec<String>>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            pseudo_unique: thresholds::PSEUDO_UNIQUE,
            categorical: thresholds::CATEGORICAL,
            sampling: thresholds::SAMPLING,
            sampling_minimum: thresholds::SAMPLING_MINIMUM,
            minimum_unique: thresholds::MINIMUM_UNIQUE,
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            max_varchar_length: thresholds::MAX_VARCHAR_LENGTH,
            auto_indexing: true,
            decimal_max_length: thresholds::DECIMAL_MAX_LENGTH,
            primary_key: None,
        }
    }
}

impl ProfileConfig {
    /// Options for the key predictor derived from this config.
    pub fn key_options(&self) -> KeyOptions {
        KeyOptions {
            max_key_length: self.max_key_length,
            primary_key: self.primary_key.clone(),
            ..KeyOptions::default()
        }
    }
}
