//! Configuration module for autoschema.
//!
//! Handles the TOML settings file and its discovery.

mod settings;

pub use settings::{ReconcileSettings, Settings, SettingsError, WorkerSettings};
