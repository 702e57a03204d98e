//! Tests for config module

use std::io::Write;

use classgrid::api::client::ClientConfig;
use classgrid::config::Config;
use serial_test::serial;
use std::time::Duration;

const VARS: [&str; 6] = [
    "CLASSGRID_API_URL",
    "CLASSGRID_API_TOKEN",
    "CLASSGRID_TIMEOUT_SECS",
    "CLASSGRID_RETRY_COUNT",
    "CLASSGRID_LOG_LEVEL",
    "CLASSGRID_LOG_FORMAT",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();
    let config = Config::from_env().unwrap();

    assert_eq!(config.api.base_url, "http://localhost:8000/api");
    assert!(config.api.auth_token.is_none());
    assert_eq!(config.api.timeout_secs, 10);
    assert_eq!(config.logging.format, "text");
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    std::env::set_var("CLASSGRID_API_URL", "https://portal.example.edu/api");
    std::env::set_var("CLASSGRID_API_TOKEN", "abc123");
    std::env::set_var("CLASSGRID_TIMEOUT_SECS", "30");
    std::env::set_var("CLASSGRID_RETRY_COUNT", "5");
    std::env::set_var("CLASSGRID_LOG_FORMAT", "json");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.api.base_url, "https://portal.example.edu/api");
    assert_eq!(config.api.auth_token.as_deref(), Some("abc123"));
    assert_eq!(config.request_timeout(), Duration::from_secs(30));
    assert_eq!(config.api.retry_count, 5);
    assert_eq!(config.logging.format, "json");
}

#[test]
#[serial]
fn test_from_env_ignores_unparsable_numbers() {
    clear_env();
    std::env::set_var("CLASSGRID_TIMEOUT_SECS", "soon");
    std::env::set_var("CLASSGRID_API_TOKEN", "");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.api.timeout_secs, 10);
    assert!(config.api.auth_token.is_none());
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[api]
base_url = "https://portal.example.edu/api/"
auth_token = "file-token"
retry_count = 0

[logging]
level = "debug"
format = "json"
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.api.retry_count, 0);
    assert_eq!(config.api.timeout_secs, 10);
    assert_eq!(config.logging.level, "debug");

    let client = ClientConfig::from(&config.api);
    assert_eq!(client.base_url, "https://portal.example.edu/api");
    assert_eq!(client.auth_token.as_deref(), Some("file-token"));
}

#[test]
fn test_from_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_from_file_invalid_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[api\nbase_url = ").unwrap();

    let err = Config::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML"));
}
