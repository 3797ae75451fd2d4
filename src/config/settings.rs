//! TOML-based configuration for autoschema.
//!
//! Supports a config file (autoschema.toml). Every section and field is
//! optional; missing values take the defaults shown here.
//!
//! Example configuration:
//! ```toml
//! dialect = "postgres"
//!
//! [profile]
//! pseudo_unique = 0.95
//! categorical = 0.0
//! sampling = 0.0
//! sampling_minimum = 100
//! minimum_unique = 50
//! max_key_length = 255
//! max_varchar_length = 6553
//! auto_indexing = true
//! decimal_max_length = 10
//! primary_key = ["id"]
//!
//! [reconcile]
//! widen_incompatible = false
//!
//! [workers]
//! use_workers = false
//! max_workers = 4
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::dialect::Dialect;
use crate::profile::ProfileConfig;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "AUTOSCHEMA_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Target dialect for reconciliation and splitting.
    pub dialect: Dialect,

    /// Column profiling options.
    pub profile: ProfileConfig,

    /// Reconciliation options.
    pub reconcile: ReconcileSettings,

    /// Multi-table planning concurrency.
    pub workers: WorkerSettings,
}

/// Reconciliation options.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconcileSettings {
    /// Widen incompatible type changes to the collated type instead of failing.
    pub widen_incompatible: bool,
}

/// Concurrency of multi-table planning.
///
/// Read by [`plan_tables_from_reader`](crate::pipeline::plan_tables_from_reader);
/// single-table planning always runs on the caller's thread.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Plan tables concurrently.
    pub use_workers: bool,

    /// Upper bound on concurrently planned tables.
    pub max_workers: usize,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            use_workers: false,
            max_workers: 4,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `AUTOSCHEMA_CONFIG`
    /// 2. `./autoschema.toml`
    /// 3. `~/.config/autoschema/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("autoschema.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("autoschema").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// Check value ranges serde can't express.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let profile = &self.profile;
        if !(profile.pseudo_unique > 0.0 && profile.pseudo_unique <= 1.0) {
            return Err(SettingsError::InvalidConfig(format!(
                "profile.pseudo_unique must be in (0, 1], got {}",
                profile.pseudo_unique
            )));
        }
        if !(0.0..=1.0).contains(&profile.categorical) {
            return Err(SettingsError::InvalidConfig(format!(
                "profile.categorical must be in [0, 1], got {}",
                profile.categorical
            )));
        }
        if !(0.0..=1.0).contains(&profile.sampling) {
            return Err(SettingsError::InvalidConfig(format!(
                "profile.sampling must be in [0, 1], got {}",
                profile.sampling
            )));
        }
        if self.workers.use_workers && self.workers.max_workers == 0 {
            return Err(SettingsError::InvalidConfig(
                "workers.max_workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
