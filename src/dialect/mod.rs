//! Database dialect descriptors.
//!
//! The engine never talks to a database, but several decisions depend on the
//! target server: which types carry a length, how server type names map to
//! canonical types, and how wide a row may be before the table is split.
//! Each dialect implements [`DialectCapabilities`] as a unit struct holding
//! static tables.
//!
//! | Fact | MySQL | PostgreSQL | SQL Server | SQLite |
//! |------|-------|------------|------------|--------|
//! | Max row size (bytes) | 16384 | 8192 | 8060 | 16384 |
//! | Max column count | 1017 | 1600 | 1024 | 2000 |
//! | Max index count | 64 | 64 | 999 | 64 |
//! | Length on integers | ❌ | ❌ | ❌ | ❌ |
//! | Precision on double | ✓ | ❌ | ❌ | ❌ |
//!
//! # Usage
//!
//! ```ignore
//! use autoschema::dialect::{Dialect, DialectCapabilities};
//!
//! let dialect: Dialect = "postgresql".parse()?;
//! assert_eq!(dialect.server_to_local("character varying(20)"), Some(ColumnType::Varchar));
//! ```

pub mod helpers;
mod mysql;
mod postgres;
mod sqlite;
mod tsql;

pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;
pub use tsql::TSql;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::types::ColumnType;

/// Per-dialect facts consulted by reconciliation, catalog reading and table
/// splitting.
///
/// Defaults describe the common case; dialects override what differs.
pub trait DialectCapabilities: std::fmt::Debug + Send + Sync {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Type Rules
    // =========================================================================

    /// Types that must be declared with a length.
    fn types_requiring_length(&self) -> &'static [ColumnType] {
        &[ColumnType::Varchar]
    }

    /// Types that may carry a length but don't need one.
    fn types_optional_length(&self) -> &'static [ColumnType] {
        &[ColumnType::Decimal, ColumnType::Binary]
    }

    /// Types declared without length or precision.
    fn types_without_length(&self) -> &'static [ColumnType];

    /// Types whose definition carries a decimal scale.
    fn decimal_types(&self) -> &'static [ColumnType] {
        &[ColumnType::Decimal]
    }

    /// Whether `ty` carries a length in this dialect.
    fn accepts_length(&self, ty: ColumnType) -> bool {
        !self.types_without_length().contains(&ty)
    }

    /// Whether `ty` carries a decimal scale in this dialect.
    fn accepts_decimal(&self, ty: ColumnType) -> bool {
        self.decimal_types().contains(&ty)
    }

    // =========================================================================
    // Type Names
    // =========================================================================

    /// Server base type names and the canonical type they map to.
    fn server_types(&self) -> &'static helpers::ServerTypeMap;

    /// Map a catalog type name (`varchar(255)`, `INT UNSIGNED`) to a canonical type.
    fn server_to_local(&self, server_type: &str) -> Option<ColumnType> {
        let split = helpers::split_server_type(server_type);
        helpers::lookup_server_type(self.server_types(), &split.base)
    }

    /// Server type name for a canonical type.
    fn local_to_server(&self, ty: ColumnType) -> &'static str;

    // =========================================================================
    // Default Values
    // =========================================================================

    /// Canonical default expressions and their server spelling.
    fn default_values(&self) -> &'static helpers::DefaultValueMap;

    /// Server spelling of a canonical default expression.
    fn translate_default(&self, local: &str) -> Option<&'static str> {
        helpers::translate_default(self.default_values(), local)
    }

    /// Canonical spelling of a server default expression.
    fn local_default(&self, server: &str) -> Option<&'static str> {
        helpers::local_default(self.default_values(), server)
    }

    // =========================================================================
    // Limits
    // =========================================================================

    /// Maximum number of indexes on one table.
    fn max_index_count(&self) -> usize {
        64
    }

    /// Maximum row size in bytes.
    fn max_row_size(&self) -> u64;

    /// Row size at which a table counts as nearly full (80% of the maximum).
    fn near_row_size(&self) -> u64 {
        self.max_row_size() * 4 / 5
    }

    /// Maximum number of columns on one table.
    fn max_column_count(&self) -> usize;
}

/// Supported target dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    #[serde(alias = "mariadb")]
    MySql,
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    #[serde(alias = "mssql", alias = "sqlserver")]
    TSql,
    #[serde(alias = "sqlite3")]
    Sqlite,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [
        Dialect::MySql,
        Dialect::Postgres,
        Dialect::TSql,
        Dialect::Sqlite,
    ];

    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn DialectCapabilities {
        match self {
            Dialect::MySql => &MySql,
            Dialect::Postgres => &Postgres,
            Dialect::TSql => &TSql,
            Dialect::Sqlite => &Sqlite,
        }
    }
}

// Implement DialectCapabilities for Dialect enum by delegating to concrete types
impl DialectCapabilities for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn types_requiring_length(&self) -> &'static [ColumnType] {
        self.dialect().types_requiring_length()
    }

    fn types_optional_length(&self) -> &'static [ColumnType] {
        self.dialect().types_optional_length()
    }

    fn types_without_length(&self) -> &'static [ColumnType] {
        self.dialect().types_without_length()
    }

    fn decimal_types(&self) -> &'static [ColumnType] {
        self.dialect().decimal_types()
    }

    fn server_types(&self) -> &'static helpers::ServerTypeMap {
        self.dialect().server_types()
    }

    fn server_to_local(&self, server_type: &str) -> Option<ColumnType> {
        self.dialect().server_to_local(server_type)
    }

    fn local_to_server(&self, ty: ColumnType) -> &'static str {
        self.dialect().local_to_server(ty)
    }

    fn default_values(&self) -> &'static helpers::DefaultValueMap {
        self.dialect().default_values()
    }

    fn max_index_count(&self) -> usize {
        self.dialect().max_index_count()
    }

    fn max_row_size(&self) -> u64 {
        self.dialect().max_row_size()
    }

    fn near_row_size(&self) -> u64 {
        self.dialect().near_row_size()
    }

    fn max_column_count(&self) -> usize {
        self.dialect().max_column_count()
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}

impl FromStr for Dialect {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "tsql" | "mssql" | "sqlserver" => Ok(Dialect::TSql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            other => Err(SchemaError::input(format!("unknown dialect '{other}'"))),
        }
    }
}
