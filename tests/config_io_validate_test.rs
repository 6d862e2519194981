use eos::config::Config;
use std::fs;

#[test]
fn save_and_load_yaml_roundtrip() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("config.yaml");

    let mut cfg = Config::default();
    cfg.cloud.username = "user@example.com".to_string();
    cfg.logging.file = path.with_extension("log").to_string_lossy().to_string();

    cfg.save_to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.cloud.username, "user@example.com");
    assert_eq!(loaded.logging.file, cfg.logging.file);
}

#[test]
fn config_validation_errors() {
    let mut cfg = Config::default();
    cfg.cloud.username = "user@example.com".to_string();
    assert!(cfg.validate().is_ok());

    // Empty base URL
    cfg.cloud.base_url.clear();
    assert!(cfg.validate().is_err());

    // Empty username
    cfg = Config::default();
    assert!(cfg.validate().is_err());

    // Zero request timeout
    cfg = Config::default();
    cfg.cloud.username = "user@example.com".to_string();
    cfg.cloud.timeout_seconds = 0;
    assert!(cfg.validate().is_err());

    // Poll interval zero
    cfg = Config::default();
    cfg.cloud.username = "user@example.com".to_string();
    cfg.poll_interval_ms = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn from_file_with_invalid_yaml_fails() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), b"bad: [unclosed").unwrap();
    let err = Config::from_file(tmp.path()).unwrap_err();
    let msg = format!("{}", err);
    assert!(msg.contains("Serialization error"));
}

#[test]
fn optional_serial_defaults_to_discovery() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(
        tmp.path(),
        b"cloud:\n  base_url: https://eoappi.eocharging.com\n  username: u@example.com\n  password: secret\n  timeout_seconds: 10\nlogging:\n  level: INFO\n  file: /tmp/eos.log\n  backup_count: 3\n  json_format: false\npoll_interval_ms: 30000\n",
    )
    .unwrap();

    let cfg = Config::from_file(tmp.path()).unwrap();
    assert!(cfg.cloud.serial.is_none());
    assert!(cfg.validate().is_ok());
}
