use autoschema::keys::{predict_indexes, KeyOptions, MAX_KEY_CANDIDATES};
use autoschema::metadata::{primary_key_columns, ColumnDefinition, MetadataHeader, Row};
use autoschema::profile::{get_metadata, ProfileConfig};
use autoschema::types::ColumnType;
use serde_json::{json, Value};

fn rows(values: Vec<Value>) -> Vec<Row> {
    values
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect()
}

fn pseudo(ty: ColumnType, length: u64) -> ColumnDefinition {
    let mut def = ColumnDefinition::of_type(ty).with_length(length);
    def.pseudounique = true;
    def
}

#[test]
fn test_composite_key_from_candidates() {
    let mut header = MetadataHeader::new();
    header.insert("order_id".into(), pseudo(ColumnType::Tinyint, 1));
    header.insert("line".into(), pseudo(ColumnType::Tinyint, 1));
    let data = rows(vec![
        json!({"order_id": 1, "line": 1}),
        json!({"order_id": 1, "line": 2}),
        json!({"order_id": 2, "line": 1}),
        json!({"order_id": 2, "line": 2}),
    ]);

    let pk = predict_indexes(&mut header, &KeyOptions::default(), Some(&data[..]));
    assert_eq!(pk, vec!["line", "order_id"]);
    assert_eq!(primary_key_columns(&header), vec!["line", "order_id"]);
}

#[test]
fn test_date_column_completes_a_key() {
    let mut header = MetadataHeader::new();
    header.insert("store".into(), pseudo(ColumnType::Smallint, 3));
    header.insert("day".into(), ColumnDefinition::of_type(ColumnType::Date).with_length(10));
    let data = rows(vec![
        json!({"store": 101, "day": "2024-05-01"}),
        json!({"store": 101, "day": "2024-05-02"}),
        json!({"store": 102, "day": "2024-05-01"}),
    ]);

    let pk = predict_indexes(&mut header, &KeyOptions::default(), Some(&data[..]));
    assert_eq!(pk, vec!["store", "day"]);
    assert!(header["day"].primary);
    assert!(header["day"].index);
}

#[test]
fn test_explicit_key_bypasses_prediction() {
    let data = rows(vec![
        json!({"id": 1, "email": "a@example.com"}),
        json!({"id": 2, "email": "b@example.com"}),
    ]);
    let mut header = get_metadata(
        &ProfileConfig {
            auto_indexing: false,
            ..Default::default()
        },
        &data,
    )
    .unwrap();

    let options = KeyOptions::default().with_primary_key(["email", "missing"]);
    let pk = predict_indexes(&mut header, &options, Some(&data[..]));
    assert_eq!(pk, vec!["email"]);
    assert!(header["email"].primary);
    assert!(!header["id"].primary);
}

#[test]
fn test_configured_primary_key_reaches_the_profiler() {
    let data = rows(vec![
        json!({"id": 1, "sku": "A-1"}),
        json!({"id": 2, "sku": "A-2"}),
    ]);
    let config = ProfileConfig {
        primary_key: Some(vec!["sku".into()]),
        ..Default::default()
    };
    let header = get_metadata(&config, &data).unwrap();
    assert_eq!(primary_key_columns(&header), vec!["sku"]);
}

#[test]
fn test_without_rows_the_first_unique_candidate_wins() {
    let mut header = MetadataHeader::new();
    header.insert("code".into(), pseudo(ColumnType::Varchar, 8));
    header.insert(
        "ref".into(),
        ColumnDefinition::of_type(ColumnType::Varchar).with_length(12).as_unique(),
    );

    let pk = predict_indexes(&mut header, &KeyOptions::default(), None);
    assert_eq!(pk, vec!["ref"]);
}

#[test]
fn test_long_and_nullable_columns_never_key() {
    let mut header = MetadataHeader::new();
    header.insert(
        "title".into(),
        ColumnDefinition::of_type(ColumnType::Varchar).with_length(300).as_unique(),
    );
    header.insert(
        "slot".into(),
        ColumnDefinition::of_type(ColumnType::Int).with_length(4).as_unique().nullable(),
    );
    header.insert(
        "payload".into(),
        ColumnDefinition::of_type(ColumnType::Json).with_length(20).as_unique(),
    );

    let pk = predict_indexes(&mut header, &KeyOptions::default(), None);
    assert!(pk.is_empty());
    assert!(primary_key_columns(&header).is_empty());
}

#[test]
fn test_search_gives_up_within_bounds() {
    let mut header = MetadataHeader::new();
    let mut row = serde_json::Map::new();
    for i in 0..MAX_KEY_CANDIDATES + 3 {
        let name = format!("c{i:02}");
        header.insert(name.clone(), pseudo(ColumnType::Tinyint, 1));
        row.insert(name, json!(5));
    }
    let data = vec![row.clone(), row];

    let pk = predict_indexes(&mut header, &KeyOptions::default(), Some(&data[..]));
    assert!(pk.is_empty());
}

#[test]
fn test_stale_primary_flags_are_cleared() {
    let mut header = MetadataHeader::new();
    header.insert(
        "old".into(),
        ColumnDefinition::of_type(ColumnType::Varchar).with_length(4).nullable().as_primary(),
    );
    header.insert(
        "id".into(),
        ColumnDefinition::of_type(ColumnType::Int).with_length(4).as_unique(),
    );

    let pk = predict_indexes(&mut header, &KeyOptions::default(), None);
    assert_eq!(pk, vec!["id"]);
    assert!(!header["old"].primary);
}

#[test]
fn test_excluded_columns_never_join_the_key() {
    let mut header = MetadataHeader::new();
    header.insert("id".into(), pseudo(ColumnType::Tinyint, 1));
    header.insert("code".into(), pseudo(ColumnType::Tinyint, 1));
    header.insert("day".into(), ColumnDefinition::of_type(ColumnType::Date).with_length(10));
    let data = rows(vec![
        json!({"id": 1, "code": 1, "day": "2024-05-01"}),
        json!({"id": 2, "code": 1, "day": "2024-05-02"}),
        json!({"id": 3, "code": 2, "day": "2024-05-01"}),
    ]);

    let options = KeyOptions::default().excluding(["id", "day"]);
    let pk = predict_indexes(&mut header, &options, Some(&data[..]));
    assert!(pk.is_empty());
    assert!(primary_key_columns(&header).is_empty());
}
