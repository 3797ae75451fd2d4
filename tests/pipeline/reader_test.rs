use async_trait::async_trait;
use autoschema::config::Settings;
use autoschema::dialect::Dialect;
use autoschema::error::{SchemaError, SchemaResult};
use autoschema::metadata::{
    CatalogColumn, CatalogSchemaReader, ColumnKey, MetadataHeader, Row, SchemaReader,
};
use autoschema::pipeline::{plan_table_from_reader, plan_tables_from_reader, TableBatch};
use autoschema::profile::ProfileConfig;
use autoschema::types::ColumnType;
use serde_json::{json, Value};

fn rows(values: Vec<Value>) -> Vec<Row> {
    values
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect()
}

fn catalog() -> CatalogSchemaReader<Dialect> {
    CatalogSchemaReader::new(Dialect::MySql)
        .with_table(
            "customers",
            vec![
                CatalogColumn::new("id", "int unsigned").with_key(ColumnKey::Primary),
                CatalogColumn::new("name", "varchar(64)"),
            ],
        )
        .with_table(
            "orders",
            vec![
                CatalogColumn::new("order_id", "bigint").with_key(ColumnKey::Primary),
                CatalogColumn::new("placed", "datetime"),
            ],
        )
}

struct UnreachableReader;

#[async_trait]
impl SchemaReader for UnreachableReader {
    async fn read_header(&self, table: &str) -> SchemaResult<Option<MetadataHeader>> {
        Err(SchemaError::input(format!("catalog unavailable for {table}")))
    }
}

#[tokio::test]
async fn test_read_known_and_unknown_tables() {
    let reader = catalog();

    let customers = reader.read_header("customers").await.unwrap().unwrap();
    assert_eq!(customers["id"].column_type, Some(ColumnType::Int));
    assert!(customers["id"].primary);
    assert_eq!(customers["name"].length, 64);

    assert!(reader.read_header("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_batch_read_keeps_order() {
    let reader = catalog();
    let tables = vec!["orders".to_string(), "missing".to_string(), "customers".to_string()];

    let headers = reader.read_headers_batch(&tables).await.unwrap();
    assert_eq!(headers.len(), 3);
    assert!(headers[0].as_ref().unwrap().contains_key("order_id"));
    assert!(headers[1].is_none());
    assert!(headers[2].as_ref().unwrap().contains_key("name"));
}

#[tokio::test]
async fn test_plan_against_reader() {
    let reader = catalog();
    let data = rows(vec![
        json!({"id": 10, "name": "Ada", "city": "London"}),
        json!({"id": 11, "name": "Grace", "city": "Arlington"}),
    ]);

    let plan = plan_table_from_reader(
        &reader,
        "customers",
        &data,
        &ProfileConfig::default(),
        reader.dialect(),
    )
    .await
    .unwrap();

    let changes = plan.changes.unwrap();
    assert!(changes.add_columns.contains_key("city"));
    assert!(changes.modify_columns.is_empty());
}

#[tokio::test]
async fn test_plan_many_tables_on_workers() {
    let reader = catalog();
    let settings =
        Settings::from_toml_str("[workers]\nuse_workers = true\nmax_workers = 2\n").unwrap();

    let batches = vec![
        TableBatch::new(
            "orders",
            rows(vec![
                json!({"order_id": 1, "placed": "2024-06-01 09:00:00"}),
                json!({"order_id": 2, "placed": "2024-06-01 09:05:00"}),
            ]),
        ),
        TableBatch::new("events", rows(vec![json!({"kind": "click"}), json!({"kind": "view"})])),
        TableBatch::new("customers", rows(vec![json!({"id": 1, "name": "Ada"})])),
    ];

    let plans = plan_tables_from_reader(&reader, batches, &settings).await.unwrap();
    let tables: Vec<&str> = plans.iter().map(|plan| plan.table.as_str()).collect();
    assert_eq!(tables, vec!["orders", "events", "customers"]);

    assert!(plans[0].changes.as_ref().unwrap().is_empty());
    assert!(plans[1].changes.is_none());
    assert!(plans[2].changes.is_some());
}

#[tokio::test]
async fn test_sequential_and_worker_plans_agree() {
    let reader = catalog();
    let batches = vec![
        TableBatch::new("customers", rows(vec![json!({"id": 5, "name": "Lin"})])),
        TableBatch::new("audit", rows(vec![json!({"at": "2024-01-01", "who": "ops"})])),
    ];

    let sequential = plan_tables_from_reader(&reader, batches.clone(), &Settings::default())
        .await
        .unwrap();

    let mut settings = Settings::default();
    settings.workers.use_workers = true;
    let parallel = plan_tables_from_reader(&reader, batches, &settings).await.unwrap();

    assert_eq!(sequential, parallel);
}

#[tokio::test]
async fn test_reader_errors_propagate() {
    let data = rows(vec![json!({"id": 1})]);
    let err = plan_table_from_reader(
        &UnreachableReader,
        "anything",
        &data,
        &ProfileConfig::default(),
        &Dialect::MySql,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, SchemaError::Input(message) if message.contains("anything")));

    let batches = vec![TableBatch::new("anything", data)];
    let err = plan_tables_from_reader(&UnreachableReader, batches, &Settings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SchemaError::Input(_)));
}
