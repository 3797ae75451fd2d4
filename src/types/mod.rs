//! Canonical column types.
//!
//! This module defines the dialect-agnostic type vocabulary the inference
//! engine works in. Every observed value is classified into one of these
//! types, and every dialect translates them to and from its own server type
//! names (see [`crate::dialect`]).
//!
//! Types are arranged in closed groups, each ordered from narrowest to widest.
//! Group order encodes "inclusiveness": a wider member of a group can hold
//! every value a narrower member can.
//!
//! ```text
//! int          boolean < binary < tinyint < smallint < int < numeric < bigint
//! special_int  decimal < double < exponent
//! text         varchar < text < mediumtext < longtext
//! special_text json
//! date         date < time < datetime < datetimetz
//! ```

mod groups;
mod safe_changes;

pub use groups::{TypeGroup, DEFAULT_TEXT_TYPE, KEY_TYPES};
pub use safe_changes::{is_safe_change, safe_targets, safe_type_changes, SafeTypeChanges};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Upper bound (exclusive) on the character length stored as `varchar`.
pub const VARCHAR_CEILING: u64 = 6_553;
/// Upper bound (exclusive) on the character length stored as `text`.
pub const TEXT_CEILING: u64 = 65_535;
/// Upper bound (exclusive) on the character length stored as `mediumtext`.
pub const MEDIUMTEXT_CEILING: u64 = 16_777_215;
/// Upper bound (exclusive) on the character length stored as `longtext`.
pub const LONGTEXT_CEILING: u64 = 4_294_967_295;

/// A canonical, dialect-agnostic column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Boolean,
    Binary,
    Tinyint,
    Smallint,
    Int,
    Numeric,
    Bigint,
    Decimal,
    Double,
    #[serde(alias = "exponential")]
    Exponent,
    Varchar,
    Text,
    Mediumtext,
    Longtext,
    Json,
    Date,
    Time,
    Datetime,
    Datetimetz,
}

impl ColumnType {
    /// Every canonical type, grouped and ordered narrow to wide.
    pub const ALL: [ColumnType; 19] = [
        ColumnType::Boolean,
        ColumnType::Binary,
        ColumnType::Tinyint,
        ColumnType::Smallint,
        ColumnType::Int,
        ColumnType::Numeric,
        ColumnType::Bigint,
        ColumnType::Decimal,
        ColumnType::Double,
        ColumnType::Exponent,
        ColumnType::Varchar,
        ColumnType::Text,
        ColumnType::Mediumtext,
        ColumnType::Longtext,
        ColumnType::Json,
        ColumnType::Date,
        ColumnType::Time,
        ColumnType::Datetime,
        ColumnType::Datetimetz,
    ];

    /// Parse a canonical type name (case-insensitive).
    ///
    /// `exponential` is accepted as an alias of `exponent`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "boolean" => Some(ColumnType::Boolean),
            "binary" => Some(ColumnType::Binary),
            "tinyint" => Some(ColumnType::Tinyint),
            "smallint" => Some(ColumnType::Smallint),
            "int" => Some(ColumnType::Int),
            "numeric" => Some(ColumnType::Numeric),
            "bigint" => Some(ColumnType::Bigint),
            "decimal" => Some(ColumnType::Decimal),
            "double" => Some(ColumnType::Double),
            "exponent" | "exponential" => Some(ColumnType::Exponent),
            "varchar" => Some(ColumnType::Varchar),
            "text" => Some(ColumnType::Text),
            "mediumtext" => Some(ColumnType::Mediumtext),
            "longtext" => Some(ColumnType::Longtext),
            "json" => Some(ColumnType::Json),
            "date" => Some(ColumnType::Date),
            "time" => Some(ColumnType::Time),
            "datetime" => Some(ColumnType::Datetime),
            "datetimetz" => Some(ColumnType::Datetimetz),
            _ => None,
        }
    }

    /// The canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "boolean",
            ColumnType::Binary => "binary",
            ColumnType::Tinyint => "tinyint",
            ColumnType::Smallint => "smallint",
            ColumnType::Int => "int",
            ColumnType::Numeric => "numeric",
            ColumnType::Bigint => "bigint",
            ColumnType::Decimal => "decimal",
            ColumnType::Double => "double",
            ColumnType::Exponent => "exponent",
            ColumnType::Varchar => "varchar",
            ColumnType::Text => "text",
            ColumnType::Mediumtext => "mediumtext",
            ColumnType::Longtext => "longtext",
            ColumnType::Json => "json",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::Datetime => "datetime",
            ColumnType::Datetimetz => "datetimetz",
        }
    }

    /// The group this type belongs to.
    pub fn group(&self) -> TypeGroup {
        TypeGroup::of(*self)
    }

    /// Returns true if the type may take part in a primary key.
    pub fn is_key_eligible(&self) -> bool {
        KEY_TYPES.contains(self)
    }

    /// Returns true if values of this type carry digits after the point.
    pub fn is_decimal_capable(&self) -> bool {
        matches!(self, ColumnType::Decimal | ColumnType::Double)
    }

    /// Returns true for the integer family (including boolean/binary).
    pub fn is_integer(&self) -> bool {
        self.group() == TypeGroup::Int
    }

    /// Returns true for the variable-length text family.
    pub fn is_text(&self) -> bool {
        self.group() == TypeGroup::Text
    }

    /// Returns true for date and time types.
    pub fn is_temporal(&self) -> bool {
        self.group() == TypeGroup::Date
    }

    /// Returns true for types stored off-row behind a pointer.
    pub fn is_large_object(&self) -> bool {
        matches!(
            self,
            ColumnType::Text | ColumnType::Mediumtext | ColumnType::Longtext | ColumnType::Json
        )
    }

    /// The narrowest text type able to hold `length` characters.
    ///
    /// Returns `None` when the length reaches the `longtext` ceiling.
    pub fn text_for_length(length: u64) -> Option<Self> {
        if length < VARCHAR_CEILING {
            Some(ColumnType::Varchar)
        } else if length < TEXT_CEILING {
            Some(ColumnType::Text)
        } else if length < MEDIUMTEXT_CEILING {
            Some(ColumnType::Mediumtext)
        } else if length < LONGTEXT_CEILING {
            Some(ColumnType::Longtext)
        } else {
            None
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = crate::error::SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| crate::error::SchemaError::input(format!("unknown type '{s}'")))
    }
}
