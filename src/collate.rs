//! Type collation: merging many observed types into one column type.
//!
//! Collation folds the observed types left to right through [`collate_pair`],
//! which applies three layers of rules in priority order:
//!
//! 1. **Overrides** for pairs whose answer is not "the wider group member":
//!    boolean+binary → binary, decimal+exponent → exponent,
//!    datetime+datetimetz → datetimetz.
//! 2. **Cross-group** rules: special numerics absorb integers, text absorbs
//!    everything else, and json/date mixed with anything foreign falls back to
//!    the default text type (type specificity is discarded).
//! 3. **Same-group** rules: widest member wins, except the date group which
//!    collapses to datetime.

use tracing::trace;

use crate::error::{SchemaError, SchemaResult};
use crate::types::{ColumnType, TypeGroup, DEFAULT_TEXT_TYPE};

/// Pairs resolved before any group rule. Listed in both argument orders.
const OVERRIDES: [(ColumnType, ColumnType, ColumnType); 6] = [
    (ColumnType::Boolean, ColumnType::Binary, ColumnType::Binary),
    (ColumnType::Binary, ColumnType::Boolean, ColumnType::Binary),
    (ColumnType::Decimal, ColumnType::Exponent, ColumnType::Exponent),
    (ColumnType::Exponent, ColumnType::Decimal, ColumnType::Exponent),
    (ColumnType::Datetime, ColumnType::Datetimetz, ColumnType::Datetimetz),
    (ColumnType::Datetimetz, ColumnType::Datetime, ColumnType::Datetimetz),
];

/// Collate a sequence of observed types into one representative type.
///
/// `None` entries are observations without a type and are skipped. An empty
/// slice is an input error; a slice of only `None`s yields the default text
/// type.
pub fn collate_types(types: &[Option<ColumnType>]) -> SchemaResult<ColumnType> {
    if types.is_empty() {
        return Err(SchemaError::input("cannot collate an empty list of types"));
    }

    let mut observed = types.iter().flatten().copied();
    let Some(first) = observed.next() else {
        return Ok(DEFAULT_TEXT_TYPE);
    };

    let collated = observed.fold(first, collate_pair);
    trace!(count = types.len(), result = %collated, "collated types");
    Ok(collated)
}

/// Merge two observed types.
pub fn collate_pair(acc: ColumnType, next: ColumnType) -> ColumnType {
    if acc == next {
        return acc;
    }

    if let Some((_, _, result)) = OVERRIDES
        .iter()
        .find(|(left, right, _)| *left == acc && *right == next)
    {
        return *result;
    }

    let (acc_group, next_group) = (acc.group(), next.group());
    let pair = [acc, next];

    if acc_group != next_group {
        match (acc_group, next_group) {
            (TypeGroup::SpecialInt, TypeGroup::Int) => return acc,
            (TypeGroup::Int, TypeGroup::SpecialInt) => return next,
            _ => {}
        }
        if acc_group == TypeGroup::Text || next_group == TypeGroup::Text {
            return TypeGroup::Text.widest_of(&pair).unwrap_or(DEFAULT_TEXT_TYPE);
        }
        return DEFAULT_TEXT_TYPE;
    }

    match acc_group {
        TypeGroup::SpecialInt | TypeGroup::Int | TypeGroup::Text => {
            acc_group.widest_of(&pair).unwrap_or(DEFAULT_TEXT_TYPE)
        }
        TypeGroup::Date => ColumnType::Datetime,
        TypeGroup::SpecialText => DEFAULT_TEXT_TYPE,
    }
}
