//! Configuration loading integration tests

use graph_batch_rs::config::Config;
use graph_batch_rs::utils::error::GraphBatchError;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_loads_complete_yaml_file() {
    let file = write_config(
        r#"
client_id: app-id
client_secret: app-secret
tenant_id: tenant-id
calendar_email: room@contoso.com
batch_capacity: 10
max_concurrent_batches: 4
"#,
    );

    let config = Config::from_file(file.path()).await.unwrap();
    assert_eq!(config.client_id, "app-id");
    assert_eq!(config.batch_capacity, 10);
    assert_eq!(config.max_concurrent_batches, 4);
    // Defaults fill the gaps
    assert_eq!(config.base_url, "https://graph.microsoft.com/v1.0");
}

#[tokio::test]
async fn test_missing_file_is_a_config_error() {
    let err = Config::from_file("/nonexistent/batch.yaml").await.unwrap_err();
    assert!(matches!(err, GraphBatchError::Config(_)));
}

#[tokio::test]
async fn test_invalid_yaml_is_a_config_error() {
    let file = write_config("client_id: [unclosed");
    let err = Config::from_file(file.path()).await.unwrap_err();
    assert!(matches!(err, GraphBatchError::Config(_)));
}

#[tokio::test]
async fn test_incomplete_config_fails_validation() {
    // No credentials at all
    let file = write_config("batch_capacity: 5");
    let err = Config::from_file(file.path()).await.unwrap_err();
    assert!(matches!(err, GraphBatchError::Config(_)));
}

#[tokio::test]
async fn test_environment_overrides_file_values() {
    let file = write_config(
        r#"
client_id: app-id
client_secret: file-secret
tenant_id: tenant-id
calendar_email: room@contoso.com
batch_capacity: 10
"#,
    );

    // set_var is unsafe since the 2024 edition; no other test touches these
    unsafe {
        std::env::set_var("GRAPH_CLIENT_SECRET", "env-secret");
        std::env::set_var("GRAPH_BATCH_CAPACITY", "5");
    }

    let config = Config::from_file(file.path()).await.unwrap();

    unsafe {
        std::env::remove_var("GRAPH_CLIENT_SECRET");
        std::env::remove_var("GRAPH_BATCH_CAPACITY");
    }

    assert_eq!(config.client_secret, "env-secret");
    assert_eq!(config.batch_capacity, 5);
    // File values without overrides survive
    assert_eq!(config.client_id, "app-id");
}
