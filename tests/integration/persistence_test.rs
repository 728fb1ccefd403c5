//! Integration tests for the JSON stores.

use pretty_assertions::assert_eq;
use querydesk::db::Dialect;
use querydesk::persistence::{ConfigStore, DataDir, HistoryStore, Template, TemplateStore};
use serde_json::{json, Value};
use tempfile::tempdir;

fn read(path: &std::path::Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_stores_share_one_data_dir() {
    let dir = tempdir().unwrap();
    let data_dir = DataDir::new(dir.path().join("nested"));

    let (mut config, mut templates, mut history) = data_dir.open_stores();
    config.set_table_name("orders");
    history.add_query("SELECT 1", Dialect::Postgres);
    let mut template = Template::new_for(Dialect::Mysql);
    template.name = "All orders".to_string();
    template.query = "SELECT * FROM orders".to_string();
    templates.add(template).unwrap();

    assert!(data_dir.config_path().exists());
    assert!(data_dir.templates_path().exists());
    assert!(data_dir.history_path().exists());

    let (config, templates, history) = data_dir.open_stores();
    assert_eq!(config.current().table_name, "orders");
    assert_eq!(templates.all().len(), 4);
    assert_eq!(history.len(), 1);
}

#[test]
fn test_on_disk_field_names() {
    let dir = tempdir().unwrap();
    let data_dir = DataDir::new(dir.path());
    let (mut config, _, mut history) = data_dir.open_stores();

    config.set_dialect(Dialect::Mongodb);
    config.set_connection_url("mongodb://localhost:27017/app");
    let entry = history.add_query("{ \"find\": {} }", Dialect::Mongodb);
    history.toggle_favorite(&entry.id);

    assert_eq!(
        read(&data_dir.config_path()),
        json!({"type": "mongodb", "url": "mongodb://localhost:27017/app", "tableName": ""})
    );

    let saved = read(&data_dir.history_path());
    assert_eq!(saved[0]["db_type"], "mongodb");
    assert_eq!(saved[0]["is_favorite"], true);
    assert_eq!(saved[0]["id"], entry.id.as_str());
}

#[test]
fn test_reads_files_written_elsewhere() {
    let dir = tempdir().unwrap();
    let data_dir = DataDir::new(dir.path());

    std::fs::write(
        data_dir.templates_path(),
        r#"[{"id":"t1","name":"Top","query":"SELECT 1","database_type":"mysql"}]"#,
    )
    .unwrap();
    std::fs::write(
        data_dir.history_path(),
        r#"[{"id":"query_1","query":"SELECT 1","db_type":"postgres","timestamp":"2024-03-01T09:30:00.000Z"}]"#,
    )
    .unwrap();

    let templates = TemplateStore::open(data_dir.templates_path());
    let template = templates.get("t1").unwrap();
    assert_eq!(template.dialect, Dialect::Mysql);
    assert_eq!(template.description, "");
    assert!(!template.is_public);

    let history = HistoryStore::open(data_dir.history_path());
    let entry = history.get("query_1").unwrap();
    assert!(!entry.is_favorite);
    assert_eq!(entry.timestamp, "2024-03-01T09:30:00.000Z");
}

#[test]
fn test_corrupt_files_fall_back_to_defaults() {
    let dir = tempdir().unwrap();
    let data_dir = DataDir::new(dir.path());
    std::fs::write(data_dir.config_path(), "{not json").unwrap();
    std::fs::write(data_dir.templates_path(), "[{\"id\": 1}]").unwrap();
    std::fs::write(data_dir.history_path(), "").unwrap();

    let config = ConfigStore::open(data_dir.config_path());
    assert_eq!(config.current().dialect, Dialect::Postgres);
    assert_eq!(config.current().table_name, "");

    let templates = TemplateStore::open(data_dir.templates_path());
    assert_eq!(templates.all().len(), 3);

    let history = HistoryStore::open(data_dir.history_path());
    assert!(history.is_empty());
}

#[test]
fn test_history_dedup_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("query_history.json");

    let mut history = HistoryStore::open(&path);
    let first = history.add_query("SELECT 1", Dialect::Postgres);
    history.add_query("SELECT 2", Dialect::Postgres);

    let mut history = HistoryStore::open(&path);
    let again = history.add_query("SELECT 1", Dialect::Postgres);
    assert_eq!(again.id, first.id);
    assert_eq!(history.len(), 2);
    assert_eq!(history.list(false)[0].query, "SELECT 1");

    history.add_query("SELECT 1", Dialect::Mysql);
    assert_eq!(history.len(), 3);
}
