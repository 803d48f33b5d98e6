//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading dispatcher configuration from
//! files.

use std::io::Write;
use std::path::PathBuf;

use cloudapi_domain::CloudApiError;
use cloudapi_infra::config;
use tempfile::NamedTempFile;

fn config_file(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("cloudapi")
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes()).expect("Failed to write to temp file");
    file
}

#[test]
fn test_load_config_from_json_file() {
    let file = config_file(
        r#"{
            "defaults": {
                "redirect": 2,
                "include_header": true,
                "timeout_ms": 1500
            },
            "ca_bundle": "/etc/ssl/cloudapi-ca.pem",
            "timeout_secs": 45,
            "user_agent": "ops-bot/2.1"
        }"#,
        ".json",
    );

    let config = config::load_from_file(Some(file.path().to_path_buf()))
        .expect("Failed to load config from JSON file");

    assert_eq!(config.defaults.redirect, Some(2));
    assert_eq!(config.defaults.include_header, Some(true));
    assert_eq!(config.defaults.timeout_ms, Some(1500));
    assert_eq!(config.defaults.no_verify_peer, None);
    assert_eq!(config.ca_bundle, Some(PathBuf::from("/etc/ssl/cloudapi-ca.pem")));
    assert_eq!(config.timeout_secs, Some(45));
    assert_eq!(config.user_agent.as_deref(), Some("ops-bot/2.1"));
}

#[test]
fn test_load_config_from_toml_file() {
    let file = config_file(
        r#"
timeout_secs = 20

[defaults]
no_verify_peer = true
display = false
"#,
        ".toml",
    );

    let config = config::load_from_file(Some(file.path().to_path_buf()))
        .expect("Failed to load config from TOML file");

    assert_eq!(config.timeout_secs, Some(20));
    assert_eq!(config.defaults.no_verify_peer, Some(true));
    assert_eq!(config.defaults.display, Some(false));
    assert_eq!(config.ca_bundle, None);
}

#[test]
fn test_load_config_with_no_fields() {
    let file = config_file("{}", ".json");

    let config = config::load_from_file(Some(file.path().to_path_buf()))
        .expect("Failed to load empty config");

    assert_eq!(config, config::DispatcherConfig::default());
}

#[test]
fn test_load_config_from_nonexistent_file() {
    let result = config::load_from_file(Some("/nonexistent/path/cloudapi.json".into()));

    match result {
        Err(CloudApiError::Config(msg)) => {
            assert!(msg.contains("not found"), "Error message should mention 'not found'");
        }
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
fn test_load_config_with_invalid_format() {
    let file = config_file(r#"{ "timeout_secs": "#, ".json");

    match config::load_from_file(Some(file.path().to_path_buf())) {
        Err(CloudApiError::Config(msg)) => {
            assert!(msg.contains("Invalid JSON"), "Error message should mention invalid JSON");
        }
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
fn test_loaded_config_builds_dispatcher() {
    let file = config_file(r#"{ "defaults": { "redirect": 1 }, "timeout_secs": 5 }"#, ".json");
    let config = config::load_from_file(Some(file.path().to_path_buf())).expect("config");

    let dispatcher = cloudapi_infra::Dispatcher::from_config(
        cloudapi_domain::CredentialStore::new(),
        &config,
    )
    .expect("dispatcher");

    assert_eq!(dispatcher.defaults().redirect, Some(1));
}

#[test]
fn test_missing_ca_bundle_is_config_error() {
    let file = config_file(r#"{ "ca_bundle": "/nonexistent/ca.pem" }"#, ".json");
    let config = config::load_from_file(Some(file.path().to_path_buf())).expect("config");

    let result =
        cloudapi_infra::Dispatcher::from_config(cloudapi_domain::CredentialStore::new(), &config);
    assert!(matches!(result, Err(CloudApiError::Config(_))));
}
