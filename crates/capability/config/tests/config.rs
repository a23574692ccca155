use bridge_config::{AppConfig, ConfigError, InfluxToken};
use std::collections::HashMap;
use std::path::PathBuf;

fn token_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "sensor-bridge-token-{}-{}",
        std::process::id(),
        name
    ));
    std::fs::write(&path, contents).expect("write token");
    path
}

fn base_vars(token_path: &PathBuf) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert("NATS_URI".to_string(), "nats://127.0.0.1:4222".to_string());
    vars.insert(
        "INFLUXDB_URL".to_string(),
        "http://127.0.0.1:8086".to_string(),
    );
    vars.insert(
        "INFLUXDB_TOKEN_FILE".to_string(),
        token_path.display().to_string(),
    );
    vars.insert("INFLUXDB_ORG".to_string(), "acme".to_string());
    vars.insert("INFLUXDB_BUCKET".to_string(), "sensors".to_string());
    vars
}

fn load(vars: &HashMap<String, String>) -> Result<AppConfig, ConfigError> {
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn load_config_from_lookup() {
    let path = token_file("load", "secret-token\n");
    let config = load(&base_vars(&path)).expect("config");

    assert_eq!(config.nats_uri, "nats://127.0.0.1:4222");
    assert_eq!(config.influx_url, "http://127.0.0.1:8086");
    assert_eq!(config.influx_org, "acme");
    assert_eq!(config.influx_bucket, "sensors");
    assert!(config.target_device.is_none());
    assert_eq!(config.influx_token.secret(), "secret-token");
}

#[test]
fn missing_required_var_is_reported() {
    let path = token_file("missing", "secret-token");
    let mut vars = base_vars(&path);
    vars.remove("INFLUXDB_BUCKET");
    let err = load(&vars).expect_err("missing bucket");
    assert_eq!(err.to_string(), "missing required env: INFLUXDB_BUCKET");

    vars = base_vars(&path);
    vars.insert("NATS_URI".to_string(), "  ".to_string());
    let err = load(&vars).expect_err("blank nats uri");
    assert!(matches!(err, ConfigError::Missing(key) if key == "NATS_URI"));
}

#[test]
fn token_file_must_exist_and_be_non_empty() {
    let mut vars = base_vars(&PathBuf::from("/nonexistent/sensor-bridge/token"));
    let err = load(&vars).expect_err("missing file");
    assert!(matches!(err, ConfigError::TokenFile { .. }));

    let empty = token_file("empty", "\n");
    vars = base_vars(&empty);
    let err = load(&vars).expect_err("empty file");
    assert!(err.to_string().contains("file is empty"));
}

#[test]
fn target_device_filter_is_optional() {
    let path = token_file("device", "secret-token");
    let mut vars = base_vars(&path);
    vars.insert("TARGET_DEVICE".to_string(), "1c:bf:ce:15:ec:4d".to_string());
    let config = load(&vars).expect("config");
    assert_eq!(config.target_device.as_deref(), Some("1c:bf:ce:15:ec:4d"));

    vars.insert("TARGET_DEVICE".to_string(), "*".to_string());
    assert!(load(&vars).expect("config").target_device.is_none());

    vars.insert("TARGET_DEVICE".to_string(), "".to_string());
    assert!(load(&vars).expect("config").target_device.is_none());
}

#[test]
fn target_device_rejects_subject_separators() {
    let path = token_file("separators", "secret-token");
    let mut vars = base_vars(&path);
    vars.insert("TARGET_DEVICE".to_string(), "a.b".to_string());
    let err = load(&vars).expect_err("dot");
    assert!(matches!(err, ConfigError::Invalid(key, _) if key == "TARGET_DEVICE"));
}

#[test]
fn token_debug_is_redacted() {
    let token = InfluxToken::new("super-secret");
    let debug = format!("{:?}", token);
    assert!(!debug.contains("super-secret"));
    assert!(debug.contains("12 bytes"));
    assert_eq!(token.len(), 12);
}
