//! Type groups and their narrow-to-wide ordering.

use super::ColumnType;

/// Type used whenever collation has to give up on a specific type.
pub const DEFAULT_TEXT_TYPE: ColumnType = ColumnType::Varchar;

/// Types eligible for primary/unique keys.
pub const KEY_TYPES: [ColumnType; 4] = [
    ColumnType::Tinyint,
    ColumnType::Smallint,
    ColumnType::Int,
    ColumnType::Varchar,
];

const INT_GROUP: [ColumnType; 7] = [
    ColumnType::Boolean,
    ColumnType::Binary,
    ColumnType::Tinyint,
    ColumnType::Smallint,
    ColumnType::Int,
    ColumnType::Numeric,
    ColumnType::Bigint,
];

const SPECIAL_INT_GROUP: [ColumnType; 3] =
    [ColumnType::Decimal, ColumnType::Double, ColumnType::Exponent];

const TEXT_GROUP: [ColumnType; 4] = [
    ColumnType::Varchar,
    ColumnType::Text,
    ColumnType::Mediumtext,
    ColumnType::Longtext,
];

const SPECIAL_TEXT_GROUP: [ColumnType; 1] = [ColumnType::Json];

const DATE_GROUP: [ColumnType; 4] = [
    ColumnType::Date,
    ColumnType::Time,
    ColumnType::Datetime,
    ColumnType::Datetimetz,
];

/// A closed family of related types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeGroup {
    Int,
    SpecialInt,
    Text,
    SpecialText,
    Date,
}

impl TypeGroup {
    /// The group a type belongs to.
    pub fn of(ty: ColumnType) -> Self {
        match ty {
            ColumnType::Boolean
            | ColumnType::Binary
            | ColumnType::Tinyint
            | ColumnType::Smallint
            | ColumnType::Int
            | ColumnType::Numeric
            | ColumnType::Bigint => TypeGroup::Int,
            ColumnType::Decimal | ColumnType::Double | ColumnType::Exponent => {
                TypeGroup::SpecialInt
            }
            ColumnType::Varchar
            | ColumnType::Text
            | ColumnType::Mediumtext
            | ColumnType::Longtext => TypeGroup::Text,
            ColumnType::Json => TypeGroup::SpecialText,
            ColumnType::Date | ColumnType::Time | ColumnType::Datetime | ColumnType::Datetimetz => {
                TypeGroup::Date
            }
        }
    }

    /// Members of the group, narrowest first.
    pub fn members(&self) -> &'static [ColumnType] {
        match self {
            TypeGroup::Int => &INT_GROUP,
            TypeGroup::SpecialInt => &SPECIAL_INT_GROUP,
            TypeGroup::Text => &TEXT_GROUP,
            TypeGroup::SpecialText => &SPECIAL_TEXT_GROUP,
            TypeGroup::Date => &DATE_GROUP,
        }
    }

    /// Position of `ty` inside its group (0 = narrowest).
    pub fn rank(ty: ColumnType) -> usize {
        Self::of(ty)
            .members()
            .iter()
            .position(|member| *member == ty)
            .unwrap_or(0)
    }

    /// The widest member of this group found among `present`.
    ///
    /// Scans the group from widest to narrowest.
    pub fn widest_of(&self, present: &[ColumnType]) -> Option<ColumnType> {
        self.members()
            .iter()
            .rev()
            .find(|member| present.contains(member))
            .copied()
    }
}
