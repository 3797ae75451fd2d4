//! SQLite dialect.
//!
//! SQLite stores values by affinity, so server type names are loose: any
//! declared name is accepted and only the affinity-bearing words matter.
//! Lengths are never enforced; the engine keeps them as documentation.

use super::helpers::{self, DefaultValueMap, ServerTypeMap};
use super::DialectCapabilities;
use crate::types::ColumnType;

/// SQLite dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

const SERVER_TYPES: &ServerTypeMap = &[
    ("boolean", ColumnType::Boolean),
    ("tinyint", ColumnType::Tinyint),
    ("smallint", ColumnType::Smallint),
    ("int", ColumnType::Int),
    ("integer", ColumnType::Int),
    ("bigint", ColumnType::Bigint),
    ("numeric", ColumnType::Decimal),
    ("decimal", ColumnType::Decimal),
    ("real", ColumnType::Double),
    ("double", ColumnType::Double),
    ("float", ColumnType::Double),
    ("varchar", ColumnType::Varchar),
    ("char", ColumnType::Varchar),
    ("text", ColumnType::Text),
    ("clob", ColumnType::Longtext),
    ("json", ColumnType::Json),
    ("date", ColumnType::Date),
    ("time", ColumnType::Time),
    ("datetime", ColumnType::Datetime),
    ("timestamp", ColumnType::Datetime),
];

const DEFAULT_VALUES: &DefaultValueMap = &[
    (helpers::DEFAULT_CURRENT_TIMESTAMP, "CURRENT_TIMESTAMP"),
    (helpers::DEFAULT_CURRENT_DATE, "CURRENT_DATE"),
    (helpers::DEFAULT_UUID, "(lower(hex(randomblob(16))))"),
];

impl DialectCapabilities for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn types_without_length(&self) -> &'static [ColumnType] {
        &[
            ColumnType::Boolean,
            ColumnType::Tinyint,
            ColumnType::Smallint,
            ColumnType::Int,
            ColumnType::Numeric,
            ColumnType::Bigint,
            ColumnType::Double,
            ColumnType::Exponent,
            ColumnType::Text,
            ColumnType::Mediumtext,
            ColumnType::Longtext,
            ColumnType::Json,
            ColumnType::Date,
            ColumnType::Time,
            ColumnType::Datetime,
            ColumnType::Datetimetz,
        ]
    }

    fn server_types(&self) -> &'static ServerTypeMap {
        SERVER_TYPES
    }

    fn server_to_local(&self, server_type: &str) -> Option<ColumnType> {
        let split = helpers::split_server_type(server_type);
        helpers::lookup_server_type(SERVER_TYPES, &split.base).or_else(|| {
            // Affinity rules for names outside the table.
            let base = split.base.as_str();
            if base.contains("int") {
                Some(ColumnType::Bigint)
            } else if base.contains("char") || base.contains("clob") || base.contains("text") {
                Some(ColumnType::Text)
            } else if base.contains("real") || base.contains("floa") || base.contains("doub") {
                Some(ColumnType::Double)
            } else {
                None
            }
        })
    }

    fn local_to_server(&self, ty: ColumnType) -> &'static str {
        match ty {
            ColumnType::Boolean => "boolean",
            ColumnType::Binary => "blob",
            ColumnType::Tinyint
            | ColumnType::Smallint
            | ColumnType::Int
            | ColumnType::Numeric
            | ColumnType::Bigint => "integer",
            ColumnType::Decimal => "numeric",
            ColumnType::Double | ColumnType::Exponent => "real",
            ColumnType::Varchar => "varchar",
            ColumnType::Text | ColumnType::Mediumtext | ColumnType::Longtext => "text",
            ColumnType::Json => "json",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::Datetime | ColumnType::Datetimetz => "datetime",
        }
    }

    fn default_values(&self) -> &'static DefaultValueMap {
        DEFAULT_VALUES
    }

    fn max_row_size(&self) -> u64 {
        16_384
    }

    fn max_column_count(&self) -> usize {
        2000
    }
}
