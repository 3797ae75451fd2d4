//! PostgreSQL dialect.
//!
//! PostgreSQL differences from the common case:
//! - Native `boolean`, `jsonb` and `timestamp with time zone`
//! - `text` is unbounded, so every canonical text width maps to it
//! - Heap tuples must fit an 8KiB page

use super::helpers::{self, DefaultValueMap, ServerTypeMap};
use super::DialectCapabilities;
use crate::types::ColumnType;

/// PostgreSQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

const SERVER_TYPES: &ServerTypeMap = &[
    ("boolean", ColumnType::Boolean),
    ("bool", ColumnType::Boolean),
    ("bit", ColumnType::Binary),
    ("bit varying", ColumnType::Binary),
    ("varbit", ColumnType::Binary),
    ("smallint", ColumnType::Smallint),
    ("int2", ColumnType::Smallint),
    ("smallserial", ColumnType::Smallint),
    ("integer", ColumnType::Int),
    ("int", ColumnType::Int),
    ("int4", ColumnType::Int),
    ("serial", ColumnType::Int),
    ("bigint", ColumnType::Bigint),
    ("int8", ColumnType::Bigint),
    ("bigserial", ColumnType::Bigint),
    ("numeric", ColumnType::Decimal),
    ("decimal", ColumnType::Decimal),
    ("real", ColumnType::Double),
    ("float4", ColumnType::Double),
    ("double precision", ColumnType::Double),
    ("float8", ColumnType::Double),
    ("character varying", ColumnType::Varchar),
    ("varchar", ColumnType::Varchar),
    ("character", ColumnType::Varchar),
    ("char", ColumnType::Varchar),
    ("uuid", ColumnType::Varchar),
    ("text", ColumnType::Text),
    ("json", ColumnType::Json),
    ("jsonb", ColumnType::Json),
    ("date", ColumnType::Date),
    ("time", ColumnType::Time),
    ("time without time zone", ColumnType::Time),
    ("timestamp", ColumnType::Datetime),
    ("timestamp without time zone", ColumnType::Datetime),
    ("timestamp with time zone", ColumnType::Datetimetz),
    ("timestamptz", ColumnType::Datetimetz),
];

const DEFAULT_VALUES: &DefaultValueMap = &[
    (helpers::DEFAULT_CURRENT_TIMESTAMP, "now()"),
    (helpers::DEFAULT_CURRENT_DATE, "CURRENT_DATE"),
    (helpers::DEFAULT_UUID, "gen_random_uuid()"),
];

impl DialectCapabilities for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
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

    fn local_to_server(&self, ty: ColumnType) -> &'static str {
        match ty {
            ColumnType::Boolean => "boolean",
            ColumnType::Binary => "bit varying",
            ColumnType::Tinyint | ColumnType::Smallint => "smallint",
            ColumnType::Int => "integer",
            ColumnType::Numeric | ColumnType::Bigint => "bigint",
            ColumnType::Decimal => "numeric",
            ColumnType::Double | ColumnType::Exponent => "double precision",
            ColumnType::Varchar => "character varying",
            ColumnType::Text | ColumnType::Mediumtext | ColumnType::Longtext => "text",
            ColumnType::Json => "jsonb",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::Datetime => "timestamp",
            ColumnType::Datetimetz => "timestamp with time zone",
        }
    }

    fn default_values(&self) -> &'static DefaultValueMap {
        DEFAULT_VALUES
    }

    fn max_row_size(&self) -> u64 {
        8_192
    }

    fn max_column_count(&self) -> usize {
        1600
    }
}
