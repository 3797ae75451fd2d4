use autoschema::dialect::Dialect;
use autoschema::error::SchemaError;
use autoschema::metadata::{ColumnDefinition, MetadataHeader, Row};
use autoschema::profile::{get_metadata, ProfileConfig};
use autoschema::reconcile::{compare_metadata, RenameColumn, Reconciler};
use autoschema::types::ColumnType;
use insta::assert_snapshot;
use serde_json::{json, Value};

fn header(columns: Vec<(&str, ColumnDefinition)>) -> MetadataHeader {
    columns
        .into_iter()
        .map(|(name, def)| (name.to_string(), def))
        .collect()
}

fn rows(values: Vec<Value>) -> Vec<Row> {
    values
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect()
}

fn int_id() -> ColumnDefinition {
    ColumnDefinition::of_type(ColumnType::Int).with_length(4).as_primary()
}

#[test]
fn test_self_reconcile_is_empty() {
    let data = rows(vec![
        json!({"id": 1, "price": "9.99", "sold": "2024-02-01 10:00:00", "tag": null}),
        json!({"id": 2, "price": "120.5", "sold": "2024-02-02 11:30:00", "tag": "x"}),
    ]);
    let profiled = get_metadata(&ProfileConfig::default(), &data).unwrap();

    for dialect in Dialect::ALL {
        let result = compare_metadata(&profiled, &profiled, Some(&dialect)).unwrap();
        assert!(result.changes.is_empty(), "{dialect}: {:?}", result.changes);
    }
    let result = compare_metadata(&profiled, &profiled, None).unwrap();
    assert!(result.changes.is_empty());
    assert_eq!(result.updated_metadata, profiled);
}

#[test]
fn test_new_column_is_added() {
    let old = header(vec![("id", int_id())]);
    let email = ColumnDefinition::of_type(ColumnType::Varchar).with_length(255);
    let new = header(vec![("id", int_id()), ("email", email.clone())]);

    let result = compare_metadata(&old, &new, None).unwrap();
    assert_eq!(result.changes.add_columns, header(vec![("email", email)]));
    assert!(result.changes.modify_columns.is_empty());
    assert!(result.changes.drop_columns.is_empty());
    assert!(result.changes.primary_key_changes.is_empty());
    assert!(result.updated_metadata.contains_key("email"));
}

#[test]
fn test_added_columns_never_join_the_key() {
    let old = header(vec![("id", int_id())]);
    let new = header(vec![
        ("id", int_id()),
        ("region", ColumnDefinition::of_type(ColumnType::Varchar).with_length(4).as_primary()),
    ]);

    let result = compare_metadata(&old, &new, None).unwrap();
    assert!(!result.changes.add_columns["region"].primary);
    assert!(result.changes.primary_key_changes.is_empty());
}

#[test]
fn test_single_matching_pair_is_a_rename() {
    let label = ColumnDefinition::of_type(ColumnType::Varchar).with_length(20);
    let old = header(vec![("id", int_id()), ("old_name", label.clone())]);
    let new = header(vec![("id", int_id()), ("new_name", label)]);

    let result = compare_metadata(&old, &new, None).unwrap();
    assert_eq!(
        result.changes.rename_columns,
        vec![RenameColumn {
            old_name: "old_name".into(),
            new_name: "new_name".into(),
        }]
    );
    assert!(result.changes.add_columns.is_empty());
    assert!(result.changes.drop_columns.is_empty());
    assert!(result.updated_metadata.contains_key("new_name"));
    assert!(!result.updated_metadata.contains_key("old_name"));

    let json = serde_json::to_string(&result.changes).unwrap();
    assert_snapshot!(json, @r#"{"addColumns":{},"modifyColumns":{},"dropColumns":[],"renameColumns":[{"oldName":"old_name","newName":"new_name"}],"nullableColumns":[],"noLongerUnique":[],"primaryKeyChanges":[]}"#);
}

#[test]
fn test_ambiguous_pairs_are_add_and_drop() {
    let label = ColumnDefinition::of_type(ColumnType::Varchar).with_length(20);
    let old = header(vec![("a", label.clone()), ("b", label.clone())]);
    let new = header(vec![("c", label.clone()), ("d", label)]);

    let result = compare_metadata(&old, &new, None).unwrap();
    assert!(result.changes.rename_columns.is_empty());
    assert_eq!(result.changes.add_columns.len(), 2);
    assert_eq!(result.changes.drop_columns, vec!["a", "b"]);
}

#[test]
fn test_mismatched_shape_is_add_and_drop() {
    let old = header(vec![
        ("id", int_id()),
        ("gone", ColumnDefinition::of_type(ColumnType::Varchar).with_length(20)),
    ]);
    let new = header(vec![
        ("id", int_id()),
        ("fresh", ColumnDefinition::of_type(ColumnType::Int).with_length(3)),
    ]);

    let result = compare_metadata(&old, &new, None).unwrap();
    assert!(result.changes.rename_columns.is_empty());
    assert!(result.changes.add_columns.contains_key("fresh"));
    assert_eq!(result.changes.drop_columns, vec!["gone"]);
    // Dropped columns stay, relaxed to nullable, until the caller drops them.
    assert_eq!(result.changes.nullable_columns, vec!["gone"]);
    assert!(result.updated_metadata["gone"].allow_null);
}

#[test]
fn test_unsafe_change_is_an_error() {
    let old = header(vec![("when", ColumnDefinition::of_type(ColumnType::Int).with_length(4))]);
    let new = header(vec![("when", ColumnDefinition::of_type(ColumnType::Date).with_length(10))]);

    let err = compare_metadata(&old, &new, None).unwrap_err();
    assert!(err.is_unsafe_type_change());
    assert!(matches!(
        err,
        SchemaError::UnsafeTypeChange {
            from: ColumnType::Int,
            to: ColumnType::Date,
            ..
        }
    ));
}

#[test]
fn test_widening_incompatible_types_on_request() {
    let old = header(vec![("when", ColumnDefinition::of_type(ColumnType::Int).with_length(4))]);
    let new = header(vec![("when", ColumnDefinition::of_type(ColumnType::Date).with_length(10))]);

    let result = Reconciler::new()
        .widen_incompatible(true)
        .reconcile(&old, &new)
        .unwrap();
    let modified = &result.changes.modify_columns["when"];
    assert_eq!(modified.column_type, Some(ColumnType::Varchar));
    assert_eq!(modified.previous_type, Some(ColumnType::Int));
    assert_eq!(modified.length, 10);
    assert_eq!(result.updated_metadata["when"].previous_type, None);
}

#[test]
fn test_safe_widening_is_a_modify() {
    let old = header(vec![("n", ColumnDefinition::of_type(ColumnType::Int).with_length(5))]);
    let new = header(vec![("n", ColumnDefinition::of_type(ColumnType::Bigint).with_length(12))]);

    let result = compare_metadata(&old, &new, None).unwrap();
    let modified = &result.changes.modify_columns["n"];
    assert_eq!(modified.column_type, Some(ColumnType::Bigint));
    assert_eq!(modified.previous_type, Some(ColumnType::Int));
    assert_eq!(modified.length, 12);
}

#[test]
fn test_narrower_batch_keeps_the_wider_type() {
    let old = header(vec![("n", ColumnDefinition::of_type(ColumnType::Bigint).with_length(12))]);
    let new = header(vec![("n", ColumnDefinition::of_type(ColumnType::Tinyint).with_length(2))]);

    let result = compare_metadata(&old, &new, None).unwrap();
    assert!(result.changes.is_empty());
    assert_eq!(result.updated_metadata["n"].column_type, Some(ColumnType::Bigint));
    assert_eq!(result.updated_metadata["n"].length, 12);
}

#[test]
fn test_lengths_only_grow() {
    let cases = [
        (ColumnType::Varchar, 40, 0, ColumnType::Varchar, 25, 0),
        (ColumnType::Varchar, 10, 0, ColumnType::Varchar, 64, 0),
        (ColumnType::Decimal, 6, 2, ColumnType::Decimal, 5, 4),
        (ColumnType::Decimal, 12, 1, ColumnType::Decimal, 3, 2),
        (ColumnType::Int, 4, 0, ColumnType::Decimal, 8, 3),
    ];

    for (old_ty, old_len, old_dec, new_ty, new_len, new_dec) in cases {
        let old_def = ColumnDefinition::of_type(old_ty)
            .with_length(old_len)
            .with_decimal(old_dec);
        let new_def = ColumnDefinition::of_type(new_ty)
            .with_length(new_len)
            .with_decimal(new_dec);
        let old = header(vec![("v", old_def.clone())]);
        let new = header(vec![("v", new_def.clone())]);

        let merged = compare_metadata(&old, &new, None).unwrap().updated_metadata["v"].clone();
        assert!(merged.length >= old_def.length && merged.length >= new_def.length);
        assert!(merged.decimal >= old_def.decimal && merged.decimal >= new_def.decimal);
    }
}

#[test]
fn test_decimal_keeps_integer_and_fraction_digits() {
    let old = header(vec![(
        "price",
        ColumnDefinition::of_type(ColumnType::Decimal).with_length(6).with_decimal(2),
    )]);
    let new = header(vec![(
        "price",
        ColumnDefinition::of_type(ColumnType::Decimal).with_length(5).with_decimal(4),
    )]);

    let result = compare_metadata(&old, &new, None).unwrap();
    let price = &result.changes.modify_columns["price"];
    assert_eq!(price.length, 8);
    assert_eq!(price.decimal, 4);
}

#[test]
fn test_dialect_without_integer_lengths() {
    let old = header(vec![("n", ColumnDefinition::of_type(ColumnType::Int).with_length(3))]);
    let new = header(vec![("n", ColumnDefinition::of_type(ColumnType::Int).with_length(9))]);

    let strict = compare_metadata(&old, &new, Some(&Dialect::Postgres)).unwrap();
    assert!(strict.changes.modify_columns.is_empty());
    assert_eq!(strict.updated_metadata["n"].length, 0);

    let loose = compare_metadata(&old, &new, None).unwrap();
    assert_eq!(loose.changes.modify_columns["n"].length, 9);
}

#[test]
fn test_nullability_and_uniqueness_relax() {
    let old = header(vec![(
        "code",
        ColumnDefinition::of_type(ColumnType::Varchar).with_length(8).as_unique(),
    )]);
    let new = header(vec![(
        "code",
        ColumnDefinition::of_type(ColumnType::Varchar).with_length(8).nullable(),
    )]);

    let result = compare_metadata(&old, &new, None).unwrap();
    assert_eq!(result.changes.nullable_columns, vec!["code"]);
    assert_eq!(result.changes.no_longer_unique, vec!["code"]);
    let code = &result.updated_metadata["code"];
    assert!(code.allow_null);
    assert!(!code.unique);

    // Never tightened back.
    let again = compare_metadata(&result.updated_metadata, &old, None).unwrap();
    assert!(again.changes.is_empty());
    assert!(again.updated_metadata["code"].allow_null);
}

#[test]
fn test_primary_key_grows() {
    let old = header(vec![
        ("tenant", int_id()),
        ("sku", ColumnDefinition::of_type(ColumnType::Varchar).with_length(12)),
    ]);
    let new = header(vec![
        ("tenant", int_id()),
        ("sku", ColumnDefinition::of_type(ColumnType::Varchar).with_length(12).as_primary()),
    ]);

    let result = compare_metadata(&old, &new, None).unwrap();
    assert_eq!(result.changes.primary_key_changes, vec!["sku", "tenant"]);
    assert!(result.updated_metadata["sku"].primary);
    assert!(result.updated_metadata["tenant"].primary);
}

#[test]
fn test_primary_key_never_shrinks() {
    let old = header(vec![("tenant", int_id()), ("sku", int_id())]);
    let new = header(vec![
        ("tenant", int_id()),
        ("sku", ColumnDefinition::of_type(ColumnType::Int).with_length(4)),
    ]);

    let result = compare_metadata(&old, &new, None).unwrap();
    assert!(result.changes.primary_key_changes.is_empty());
    assert!(result.updated_metadata["sku"].primary);
}

#[test]
fn test_renamed_key_column_is_reported() {
    let old = header(vec![("user_id", int_id())]);
    let new = header(vec![("account_id", int_id())]);

    let result = compare_metadata(&old, &new, None).unwrap();
    assert_eq!(result.changes.rename_columns.len(), 1);
    assert_eq!(result.changes.primary_key_changes, vec!["account_id"]);
    assert!(result.updated_metadata["account_id"].primary);
}

#[test]
fn test_renamed_column_becomes_nullable() {
    let old = header(vec![
        ("id", int_id()),
        ("old_name", ColumnDefinition::of_type(ColumnType::Varchar).with_length(20)),
    ]);
    let new = header(vec![
        ("id", int_id()),
        ("new_name", ColumnDefinition::of_type(ColumnType::Varchar).with_length(20).nullable()),
    ]);

    let result = compare_metadata(&old, &new, None).unwrap();
    assert_eq!(result.changes.rename_columns.len(), 1);
    assert_eq!(result.changes.nullable_columns, vec!["new_name"]);
    assert!(result.updated_metadata["new_name"].allow_null);
    assert!(result.changes.modify_columns.is_empty());
}

#[test]
fn test_numbers_into_text_keep_their_rendered_width() {
    let old = header(vec![("v", ColumnDefinition::of_type(ColumnType::Varchar).with_length(5))]);
    let data = rows(vec![json!({"v": "-1234.5"})]);
    let new = get_metadata(&ProfileConfig::default(), &data).unwrap();
    assert_eq!(new["v"].column_type, Some(ColumnType::Decimal));

    let result = compare_metadata(&old, &new, Some(&Dialect::MySql)).unwrap();
    let merged = &result.updated_metadata["v"];
    assert_eq!(merged.column_type, Some(ColumnType::Varchar));
    assert!(merged.length >= 7, "varchar({}) cannot hold -1234.5", merged.length);
    assert_eq!(result.changes.modify_columns["v"].length, 7);
}
