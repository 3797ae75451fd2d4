//! T-SQL (SQL Server) dialect.
//!
//! T-SQL differences from the common case:
//! - `bit` is the boolean type
//! - `nvarchar(max)` stands in for every large text width
//! - `datetimeoffset` carries the zone
//! - Rows are limited to 8060 bytes of in-row data

use super::helpers::{self, DefaultValueMap, ServerTypeMap};
use super::DialectCapabilities;
use crate::types::ColumnType;

/// T-SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct TSql;

const SERVER_TYPES: &ServerTypeMap = &[
    ("bit", ColumnType::Boolean),
    ("binary", ColumnType::Binary),
    ("varbinary", ColumnType::Binary),
    ("tinyint", ColumnType::Tinyint),
    ("smallint", ColumnType::Smallint),
    ("int", ColumnType::Int),
    ("bigint", ColumnType::Bigint),
    ("decimal", ColumnType::Decimal),
    ("numeric", ColumnType::Decimal),
    ("money", ColumnType::Decimal),
    ("smallmoney", ColumnType::Decimal),
    ("float", ColumnType::Double),
    ("real", ColumnType::Double),
    ("char", ColumnType::Varchar),
    ("nchar", ColumnType::Varchar),
    ("varchar", ColumnType::Varchar),
    ("nvarchar", ColumnType::Varchar),
    ("uniqueidentifier", ColumnType::Varchar),
    ("text", ColumnType::Text),
    ("ntext", ColumnType::Text),
    ("date", ColumnType::Date),
    ("time", ColumnType::Time),
    ("datetime", ColumnType::Datetime),
    ("datetime2", ColumnType::Datetime),
    ("smalldatetime", ColumnType::Datetime),
    ("datetimeoffset", ColumnType::Datetimetz),
];

const DEFAULT_VALUES: &DefaultValueMap = &[
    (helpers::DEFAULT_CURRENT_TIMESTAMP, "GETDATE()"),
    (helpers::DEFAULT_CURRENT_DATE, "CAST(GETDATE() AS DATE)"),
    (helpers::DEFAULT_UUID, "NEWID()"),
];

impl DialectCapabilities for TSql {
    fn name(&self) -> &'static str {
        "tsql"
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
        if matches!(split.base.as_str(), "varchar" | "nvarchar")
            && split.args.as_deref() == Some("max")
        {
            return Some(ColumnType::Longtext);
        }
        helpers::lookup_server_type(SERVER_TYPES, &split.base)
    }

    fn local_to_server(&self, ty: ColumnType) -> &'static str {
        match ty {
            ColumnType::Boolean => "bit",
            ColumnType::Binary => "varbinary",
            ColumnType::Tinyint => "tinyint",
            ColumnType::Smallint => "smallint",
            ColumnType::Int => "int",
            ColumnType::Numeric | ColumnType::Bigint => "bigint",
            ColumnType::Decimal => "decimal",
            ColumnType::Double | ColumnType::Exponent => "float",
            ColumnType::Varchar => "nvarchar",
            ColumnType::Text
            | ColumnType::Mediumtext
            | ColumnType::Longtext
            | ColumnType::Json => "nvarchar(max)",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::Datetime => "datetime2",
            ColumnType::Datetimetz => "datetimeoffset",
        }
    }

    fn default_values(&self) -> &'static DefaultValueMap {
        DEFAULT_VALUES
    }

    fn max_index_count(&self) -> usize {
        999
    }

    fn max_row_size(&self) -> u64 {
        8_060
    }

    fn max_column_count(&self) -> usize {
        1024
    }
}
