//! Integration tests for buffer configuration
//!
//! Covers programmatic construction, TOML loading, and environment overrides.

use batchbuf::BufferConfig;
use std::io::Write;

#[test]
fn test_programmatic_buffer_config() {
    let config = BufferConfig {
        name: "request-log-buffer".to_string(),
        capacity: 500,
        flush_interval_ms: 2000,
        max_retry_depth: 10,
    };

    assert_eq!(config.name, "request-log-buffer");
    assert_eq!(config.capacity, 500);
    assert_eq!(config.flush_interval_ms, 2000);
    assert_eq!(config.max_retry_depth, 10);
    assert!(config.validate().is_ok());
}

#[test]
fn test_default_buffer_config() {
    let config = BufferConfig::default();

    assert_eq!(config.name, "batch-buffer");
    assert_eq!(config.capacity, 100);
    assert_eq!(config.flush_interval_ms, 1000);
    assert_eq!(config.max_retry_depth, 5);
}

#[test]
fn test_config_from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    writeln!(
        file,
        r#"
name = "file-buffer"
capacity = 250
flush_interval_ms = 500
"#
    )
    .expect("write temp file");

    let config = BufferConfig::from_file(file.path().to_str().unwrap()).unwrap();

    assert_eq!(config.name, "file-buffer");
    assert_eq!(config.capacity, 250);
    assert_eq!(config.flush_interval_ms, 500);
    // Omitted fields fall back to defaults
    assert_eq!(config.max_retry_depth, 5);
}

#[test]
fn test_config_from_missing_file() {
    let result = BufferConfig::from_file("/nonexistent/batchbuf.toml");
    assert!(result.is_err());
}

#[test]
fn test_config_from_invalid_toml() {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    writeln!(file, "capacity = \"lots\"").expect("write temp file");

    let result = BufferConfig::from_file(file.path().to_str().unwrap());
    assert!(result.is_err());
}

#[test]
fn test_env_overrides() {
    std::env::set_var("BATCHBUF_NAME", "env-buffer");
    std::env::set_var("BATCHBUF_CAPACITY", "42");
    std::env::set_var("BATCHBUF_MAX_RETRY_DEPTH", "not-a-number");

    let mut config = BufferConfig::default();
    config.apply_env_overrides();

    assert_eq!(config.name, "env-buffer");
    assert_eq!(config.capacity, 42);
    // Unparseable override is ignored
    assert_eq!(config.max_retry_depth, 5);

    std::env::remove_var("BATCHBUF_NAME");
    std::env::remove_var("BATCHBUF_CAPACITY");
    std::env::remove_var("BATCHBUF_MAX_RETRY_DEPTH");
}

#[test]
fn test_validation_bounds() {
    let config = BufferConfig {
        max_retry_depth: 101,
        ..Default::default()
    };
    assert!(config.validate().is_err());

    let config = BufferConfig {
        flush_interval_ms: 0,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}
