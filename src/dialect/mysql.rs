//! MySQL / MariaDB dialect.
//!
//! MySQL differences from the common case:
//! - `TINYINT(1)` is the boolean type
//! - `DOUBLE(M,D)` still carries precision and scale
//! - `TIMESTAMP` is stored in UTC, so it maps to `datetimetz`
//! - InnoDB rows top out at 16KiB in the default page size

use super::helpers::{self, DefaultValueMap, ServerTypeMap};
use super::DialectCapabilities;
use crate::types::ColumnType;

/// MySQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

const SERVER_TYPES: &ServerTypeMap = &[
    ("bool", ColumnType::Boolean),
    ("boolean", ColumnType::Boolean),
    ("bit", ColumnType::Binary),
    ("tinyint", ColumnType::Tinyint),
    ("smallint", ColumnType::Smallint),
    ("mediumint", ColumnType::Int),
    ("int", ColumnType::Int),
    ("integer", ColumnType::Int),
    ("bigint", ColumnType::Bigint),
    ("year", ColumnType::Smallint),
    ("decimal", ColumnType::Decimal),
    ("dec", ColumnType::Decimal),
    ("numeric", ColumnType::Decimal),
    ("fixed", ColumnType::Decimal),
    ("float", ColumnType::Double),
    ("double", ColumnType::Double),
    ("double precision", ColumnType::Double),
    ("real", ColumnType::Double),
    ("char", ColumnType::Varchar),
    ("varchar", ColumnType::Varchar),
    ("enum", ColumnType::Varchar),
    ("set", ColumnType::Varchar),
    ("tinytext", ColumnType::Varchar),
    ("text", ColumnType::Text),
    ("mediumtext", ColumnType::Mediumtext),
    ("longtext", ColumnType::Longtext),
    ("json", ColumnType::Json),
    ("date", ColumnType::Date),
    ("time", ColumnType::Time),
    ("datetime", ColumnType::Datetime),
    ("timestamp", ColumnType::Datetimetz),
];

const DEFAULT_VALUES: &DefaultValueMap = &[
    (helpers::DEFAULT_CURRENT_TIMESTAMP, "CURRENT_TIMESTAMP"),
    (helpers::DEFAULT_CURRENT_DATE, "(CURRENT_DATE)"),
    (helpers::DEFAULT_UUID, "(UUID())"),
];

impl DialectCapabilities for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn types_optional_length(&self) -> &'static [ColumnType] {
        &[ColumnType::Decimal, ColumnType::Double, ColumnType::Binary]
    }

    fn types_without_length(&self) -> &'static [ColumnType] {
        &[
            ColumnType::Boolean,
            ColumnType::Tinyint,
            ColumnType::Smallint,
            ColumnType::Int,
            ColumnType::Numeric,
            ColumnType::Bigint,
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

    fn decimal_types(&self) -> &'static [ColumnType] {
        &[ColumnType::Decimal, ColumnType::Double]
    }

    fn server_types(&self) -> &'static ServerTypeMap {
        SERVER_TYPES
    }

    fn server_to_local(&self, server_type: &str) -> Option<ColumnType> {
        let split = helpers::split_server_type(server_type);
        if split.base == "tinyint" && split.args.as_deref() == Some("1") {
            return Some(ColumnType::Boolean);
        }
        helpers::lookup_server_type(SERVER_TYPES, &split.base)
    }

    fn local_to_server(&self, ty: ColumnType) -> &'static str {
        match ty {
            ColumnType::Boolean => "tinyint(1)",
            ColumnType::Binary => "bit",
            ColumnType::Tinyint => "tinyint",
            ColumnType::Smallint => "smallint",
            ColumnType::Int => "int",
            ColumnType::Numeric => "bigint",
            ColumnType::Bigint => "bigint",
            ColumnType::Decimal => "decimal",
            ColumnType::Double | ColumnType::Exponent => "double",
            ColumnType::Varchar => "varchar",
            ColumnType::Text => "text",
            ColumnType::Mediumtext => "mediumtext",
            ColumnType::Longtext => "longtext",
            ColumnType::Json => "json",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::Datetime => "datetime",
            ColumnType::Datetimetz => "timestamp",
        }
    }

    fn default_values(&self) -> &'static DefaultValueMap {
        DEFAULT_VALUES
    }

    fn max_row_size(&self) -> u64 {
        16_384
    }

    fn max_column_count(&self) -> usize {
        1017
    }
}
