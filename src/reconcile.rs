//! Reconciling a live header with a freshly profiled one.
//!
//! The result is an [`AlterTableChanges`] plan plus the header the table will
//! have once the plan is applied. Reconciliation never loses data: types only
//! move along [`SafeTypeChanges`](crate::types::SafeTypeChanges) edges,
//! lengths only grow, columns only become nullable, and the primary key only
//! grows or follows a rename.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::collate::collate_pair;
use crate::dialect::DialectCapabilities;
use crate::error::{SchemaError, SchemaResult};
use crate::metadata::{primary_key_columns, ColumnDefinition, MetadataHeader};
use crate::types::{is_safe_change, ColumnType, TypeGroup};

/// One column rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameColumn {
    pub old_name: String,
    pub new_name: String,
}

/// Everything an `ALTER TABLE` builder needs to bring a table up to date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlterTableChanges {
    pub add_columns: MetadataHeader,
    /// Widened columns; `previous_type` is set when the type itself changed.
    pub modify_columns: MetadataHeader,
    pub drop_columns: Vec<String>,
    pub rename_columns: Vec<RenameColumn>,
    pub nullable_columns: Vec<String>,
    pub no_longer_unique: Vec<String>,
    /// Full new primary key; empty when the key is unchanged.
    pub primary_key_changes: Vec<String>,
}

impl AlterTableChanges {
    /// Whether applying the plan would change nothing.
    pub fn is_empty(&self) -> bool {
        self.add_columns.is_empty()
            && self.modify_columns.is_empty()
            && self.drop_columns.is_empty()
            && self.rename_columns.is_empty()
            && self.nullable_columns.is_empty()
            && self.no_longer_unique.is_empty()
            && self.primary_key_changes.is_empty()
    }
}

/// Output of a reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub changes: AlterTableChanges,
    /// The header after the changes are applied.
    pub updated_metadata: MetadataHeader,
}

/// Reconcile with default options.
pub fn compare_metadata(
    old: &MetadataHeader,
    new: &MetadataHeader,
    dialect: Option<&dyn DialectCapabilities>,
) -> SchemaResult<Reconciliation> {
    let reconciler = match dialect {
        Some(dialect) => Reconciler::new().with_dialect(dialect),
        None => Reconciler::new(),
    };
    reconciler.reconcile(old, new)
}

/// Configurable reconciler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler<'a> {
    dialect: Option<&'a dyn DialectCapabilities>,
    widen_incompatible: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the dialect's length rules to merged definitions.
    pub fn with_dialect(mut self, dialect: &'a dyn DialectCapabilities) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Widen incompatible type pairs to their collated type instead of failing.
    pub fn widen_incompatible(mut self, widen: bool) -> Self {
        self.widen_incompatible = widen;
        self
    }

    pub fn reconcile(
        &self,
        old: &MetadataHeader,
        new: &MetadataHeader,
    ) -> SchemaResult<Reconciliation> {
        let mut changes = AlterTableChanges::default();
        let mut updated = old.clone();

        let mut adds: Vec<&String> = new.keys().filter(|name| !old.contains_key(*name)).collect();
        let mut drops: Vec<&String> = old.keys().filter(|name| !new.contains_key(*name)).collect();

        let rename = match (adds.as_slice(), drops.as_slice()) {
            ([added], [dropped]) if same_shape(&old[*dropped], &new[*added]) => Some(RenameColumn {
                old_name: (*dropped).clone(),
                new_name: (*added).clone(),
            }),
            _ => None,
        };
        if rename.is_some() {
            adds.clear();
            drops.clear();
        }

        if let Some(rename) = &rename {
            changes.rename_columns.push(rename.clone());
            updated.remove(&rename.old_name);
            let (merged, modified) = self.merge_column(
                &rename.new_name,
                &old[&rename.old_name],
                &new[&rename.new_name],
                &mut changes,
            )?;
            if let Some(modified) = modified {
                changes.modify_columns.insert(rename.new_name.clone(), modified);
            }
            updated.insert(rename.new_name.clone(), merged);
        }

        for name in adds {
            let mut def = new[name].clone();
            def.primary = false;
            def.previous_type = None;
            changes.add_columns.insert(name.clone(), def.clone());
            updated.insert(name.clone(), def);
        }

        for name in drops {
            changes.drop_columns.push(name.clone());
            if let Some(def) = updated.get_mut(name) {
                if !def.allow_null {
                    def.allow_null = true;
                    changes.nullable_columns.push(name.clone());
                }
            }
        }

        for (name, old_def) in old.iter().filter(|(name, _)| new.contains_key(*name)) {
            let new_def = &new[name];
            let (merged, modified) = self.merge_column(name, old_def, new_def, &mut changes)?;
            if let Some(modified) = modified {
                changes.modify_columns.insert(name.clone(), modified);
            }
            updated.insert(name.clone(), merged);
        }

        self.merge_primary_key(old, new, rename.as_ref(), &mut updated, &mut changes);

        debug!(
            added = changes.add_columns.len(),
            modified = changes.modify_columns.len(),
            dropped = changes.drop_columns.len(),
            renamed = changes.rename_columns.len(),
            "reconciled headers"
        );

        Ok(Reconciliation {
            changes,
            updated_metadata: updated,
        })
    }

    /// Merge one column present on both sides.
    ///
    /// Returns the merged definition and, when something widened, the
    /// modify entry for the plan.
    fn merge_column(
        &self,
        name: &str,
        old_def: &ColumnDefinition,
        new_def: &ColumnDefinition,
        changes: &mut AlterTableChanges,
    ) -> SchemaResult<(ColumnDefinition, Option<ColumnDefinition>)> {
        let mut merged = old_def.clone();
        merged.previous_type = None;

        let previous_type = match (old_def.column_type, new_def.column_type) {
            (Some(from), Some(to)) if from != to => match self.resolve_type(name, from, to)? {
                Some(target) => {
                    merged.column_type = Some(target);
                    Some(from)
                }
                None => None,
            },
            (None, Some(to)) => {
                merged.column_type = Some(to);
                None
            }
            _ => None,
        };
        let type_changed = merged.column_type != old_def.column_type;

        self.merge_length(&mut merged, old_def, new_def);
        let grew = merged.length > old_def.length || merged.decimal > old_def.decimal;

        if new_def.allow_null && !old_def.allow_null {
            merged.allow_null = true;
            changes.nullable_columns.push(name.to_string());
        }
        if old_def.unique && !new_def.unique {
            merged.unique = false;
            changes.no_longer_unique.push(name.to_string());
        }

        let modified = (type_changed || grew).then(|| {
            let mut entry = merged.clone();
            entry.previous_type = previous_type;
            entry
        });
        Ok((merged, modified))
    }

    /// Decide the target of a type transition.
    ///
    /// `Ok(None)` means the old type already holds the new values.
    fn resolve_type(
        &self,
        column: &str,
        from: ColumnType,
        to: ColumnType,
    ) -> SchemaResult<Option<ColumnType>> {
        if is_safe_change(from, to) {
            return Ok(Some(to));
        }

        let collated = collate_pair(from, to);
        if is_safe_change(to, from) || collated == from {
            return Ok(None);
        }

        if self.widen_incompatible {
            if let Some(target) = widened_target(from, collated) {
                warn!(column, %from, %to, %target, "widening incompatible type change");
                return Ok(Some(target));
            }
        }

        warn!(column, %from, %to, "unsafe type change");
        Err(SchemaError::UnsafeTypeChange {
            column: column.to_string(),
            from,
            to,
        })
    }

    fn merge_length(
        &self,
        merged: &mut ColumnDefinition,
        old_def: &ColumnDefinition,
        new_def: &ColumnDefinition,
    ) {
        let Some(ty) = merged.column_type else {
            merged.length = old_def.length.max(new_def.length);
            return;
        };

        if self.dialect.is_some_and(|d| !d.accepts_length(ty)) {
            merged.length = 0;
            merged.decimal = 0;
            return;
        }

        let decimal_capable = match self.dialect {
            Some(dialect) => dialect.accepts_decimal(ty),
            None => ty.is_decimal_capable(),
        };
        if decimal_capable {
            let integer = old_def.integer_digits().max(new_def.integer_digits());
            let decimal = old_def.decimal.max(new_def.decimal);
            merged.length = integer + u64::from(decimal);
            merged.decimal = decimal;
        } else if ty.is_text() {
            merged.length = old_def.length.max(rendered_width(new_def));
            merged.decimal = 0;
        } else {
            merged.length = old_def.length.max(new_def.length);
            merged.decimal = 0;
        }
    }

    fn merge_primary_key(
        &self,
        old: &MetadataHeader,
        new: &MetadataHeader,
        rename: Option<&RenameColumn>,
        updated: &mut MetadataHeader,
        changes: &mut AlterTableChanges,
    ) {
        let renamed = |name: String| match rename {
            Some(r) if r.old_name == name => r.new_name.clone(),
            _ => name,
        };
        let before: BTreeSet<String> = primary_key_columns(old).into_iter().map(renamed).collect();

        let mut after = before.clone();
        for name in new.iter().filter(|(_, def)| def.primary).map(|(name, _)| name) {
            let on_both_sides = old.contains_key(name)
                || rename.is_some_and(|r| &r.new_name == name);
            if on_both_sides {
                after.insert(name.clone());
            }
        }

        let renamed_key = rename.is_some_and(|r| old.get(&r.old_name).is_some_and(|d| d.primary));
        if after == before && !renamed_key {
            return;
        }

        for (name, def) in updated.iter_mut() {
            def.primary = after.contains(name);
        }
        changes.primary_key_changes = after.into_iter().collect();
    }
}

/// Columns match as a rename when everything but the name agrees.
fn same_shape(old_def: &ColumnDefinition, new_def: &ColumnDefinition) -> bool {
    old_def.column_type == new_def.column_type
        && old_def.length == new_def.length
        && old_def.decimal == new_def.decimal
        && old_def.primary == new_def.primary
        && old_def.unique == new_def.unique
}

/// Characters needed to store the values of `def` as text.
///
/// Decimal lengths count digits only, so the sign and point are added back.
fn rendered_width(def: &ColumnDefinition) -> u64 {
    match def.column_type {
        Some(ty) if ty.is_decimal_capable() => {
            let point = u64::from(def.decimal > 0);
            def.integer_digits() + u64::from(def.decimal) + point + 1
        }
        _ => def.length,
    }
}

/// Safe widening target for an incompatible pair, from their collated type.
fn widened_target(from: ColumnType, collated: ColumnType) -> Option<ColumnType> {
    if collated.is_text() {
        let floor = TypeGroup::rank(collated);
        return TypeGroup::Text
            .members()
            .iter()
            .skip(floor)
            .copied()
            .find(|member| is_safe_change(from, *member));
    }
    is_safe_change(from, collated).then_some(collated)
}
