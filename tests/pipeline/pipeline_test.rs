use autoschema::config::Settings;
use autoschema::dialect::Dialect;
use autoschema::error::SchemaError;
use autoschema::metadata::{header_from_catalog, primary_key_columns, CatalogColumn, ColumnKey, Row};
use autoschema::partition::part_name;
use autoschema::pipeline::{plan_table, plan_table_with_settings};
use autoschema::profile::ProfileConfig;
use autoschema::types::ColumnType;
use serde_json::{json, Map, Value};
use tracing_subscriber::EnvFilter;

/// Route engine logs to the test harness; `RUST_LOG=autoschema=debug` to see them.
fn setup_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

fn rows(values: Vec<Value>) -> Vec<Row> {
    values
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect()
}

fn wide_rows(columns: usize, with_id: bool) -> Vec<Row> {
    (1..=2)
        .map(|id| {
            let mut row = Map::new();
            if with_id {
                row.insert("id".into(), json!(id));
            }
            for i in 0..columns {
                row.insert(format!("c{i:02}"), json!("x".repeat(255)));
            }
            row
        })
        .collect()
}

#[test]
fn test_new_table() {
    let data = rows(vec![
        json!({"id": 1, "name": "John Doe"}),
        json!({"id": 2, "name": "Jane Smith"}),
    ]);
    let plan = plan_table(None, "people", &data, &ProfileConfig::default(), &Dialect::MySql)
        .unwrap();

    assert_eq!(plan.table, "people");
    assert!(plan.changes.is_none());
    assert!(plan.split.is_none());
    assert!(plan.header["id"].primary);
    assert!(!plan.row_size.nearly_exceeds_limit);
}

#[test]
fn test_existing_table_gains_a_column() {
    setup_logging();
    let live = header_from_catalog(
        &[
            CatalogColumn::new("id", "int(11)").with_key(ColumnKey::Primary),
            CatalogColumn::new("name", "varchar(40)"),
        ],
        &Dialect::MySql,
    );
    let data = rows(vec![
        json!({"id": 3, "name": "Ada", "email": "ada@example.com"}),
        json!({"id": 4, "name": "Alan", "email": "alan@example.com"}),
    ]);

    let plan = plan_table(Some(&live), "people", &data, &ProfileConfig::default(), &Dialect::MySql)
        .unwrap();
    let changes = plan.changes.unwrap();

    assert_eq!(changes.add_columns.keys().collect::<Vec<_>>(), vec!["email"]);
    assert!(changes.modify_columns.is_empty());
    assert!(changes.drop_columns.is_empty());
    assert!(changes.primary_key_changes.is_empty());

    assert_eq!(plan.header["id"].column_type, Some(ColumnType::Int));
    assert!(plan.header["id"].primary);
    assert_eq!(plan.header["name"].length, 40);
    assert!(!plan.header["email"].primary);
}

#[test]
fn test_added_column_never_keys_a_keyless_table() {
    let live = header_from_catalog(&[CatalogColumn::new("name", "varchar(40)")], &Dialect::MySql);
    let data = rows(vec![json!({"name": "Ada", "id": 3}), json!({"name": "Ada", "id": 4})]);

    let plan = plan_table(Some(&live), "people", &data, &ProfileConfig::default(), &Dialect::MySql)
        .unwrap();
    let changes = plan.changes.unwrap();

    assert!(!changes.add_columns["id"].primary);
    assert!(!plan.header["id"].primary);
    assert!(changes.primary_key_changes.is_empty());
    assert!(primary_key_columns(&plan.header).is_empty());
}

#[test]
fn test_unchanged_batch_plans_no_changes() {
    let live = header_from_catalog(
        &[
            CatalogColumn::new("id", "bigint").with_key(ColumnKey::Primary),
            CatalogColumn::new("score", "decimal(6,2)"),
        ],
        &Dialect::Postgres,
    );
    let data = rows(vec![json!({"id": 7, "score": "12.5"}), json!({"id": 8, "score": "99.25"})]);

    let config = ProfileConfig::default();
    let plan = plan_table(Some(&live), "scores", &data, &config, &Dialect::Postgres).unwrap();
    assert!(plan.changes.unwrap().is_empty());
}

#[test]
fn test_incompatible_batch_fails_unless_widening() {
    setup_logging();
    let live = header_from_catalog(
        &[
            CatalogColumn::new("id", "int").with_key(ColumnKey::Primary),
            CatalogColumn::new("day", "date"),
        ],
        &Dialect::MySql,
    );
    let data = rows(vec![json!({"id": 1, "day": 5}), json!({"id": 2, "day": 6})]);

    let err = plan_table(Some(&live), "visits", &data, &ProfileConfig::default(), &Dialect::MySql)
        .unwrap_err();
    assert!(err.is_unsafe_type_change());

    let settings = Settings::from_toml_str("[reconcile]\nwiden_incompatible = true\n").unwrap();
    let plan = plan_table_with_settings(Some(&live), "visits", &data, &settings).unwrap();
    let day = &plan.changes.unwrap().modify_columns["day"];
    assert_eq!(day.column_type, Some(ColumnType::Varchar));
    assert_eq!(day.previous_type, Some(ColumnType::Date));
}

#[test]
fn test_configured_key_extends_live_key() {
    let live = header_from_catalog(
        &[
            CatalogColumn::new("tenant", "int").with_key(ColumnKey::Primary),
            CatalogColumn::new("sku", "varchar(12)"),
        ],
        &Dialect::MySql,
    );
    let data = rows(vec![
        json!({"tenant": 1, "sku": "A-1"}),
        json!({"tenant": 1, "sku": "A-2"}),
    ]);
    let config = ProfileConfig {
        primary_key: Some(vec!["sku".into()]),
        ..Default::default()
    };

    let plan = plan_table(Some(&live), "stock", &data, &config, &Dialect::MySql).unwrap();
    assert_eq!(plan.changes.unwrap().primary_key_changes, vec!["tenant", "sku"]);
    assert!(plan.header["sku"].primary && plan.header["tenant"].primary);
}

#[test]
fn test_wide_table_is_split() {
    setup_logging();
    let data = wide_rows(60, true);
    let plan = plan_table(None, "wide", &data, &ProfileConfig::default(), &Dialect::MySql)
        .unwrap();

    assert!(plan.row_size.nearly_exceeds_limit);
    let split = plan.split.unwrap();
    assert_eq!(split.layout.len(), 2);
    for part in [part_name("wide", 0), part_name("wide", 1)] {
        assert!(split.layout[&part]["id"].primary);
        assert_eq!(split.rows[&part].len(), 2);
    }
}

#[test]
fn test_wide_table_without_key_cannot_split() {
    setup_logging();
    let data = wide_rows(60, false);
    let err = plan_table(None, "wide", &data, &ProfileConfig::default(), &Dialect::MySql)
        .unwrap_err();
    assert!(matches!(err, SchemaError::MissingPrimaryKey { .. }));
}

#[test]
fn test_plan_serializes_camel_case() {
    let data = rows(vec![json!({"id": 1})]);
    let plan = plan_table(None, "t", &data, &ProfileConfig::default(), &Dialect::Sqlite).unwrap();
    let value = serde_json::to_value(&plan).unwrap();
    assert!(value.get("rowSize").is_some());
    assert_eq!(value["header"]["id"]["type"], json!("boolean"));
}
