// Config loading and validation tests

use equipment_report::config::AppConfig;

const VALID_CONFIG: &str = r#"
[server]
port = 8000
host = "0.0.0.0"

[database]
path = "data/history.db"
max_pool_size = 4
retention_count = 5

[report]
title = "Plant A Equipment Report"
filename = "plant_a.pdf"
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.database.path, "data/history.db");
    assert_eq!(config.database.retention_count, 5);
    assert_eq!(config.report.title, "Plant A Equipment Report");
    assert_eq!(config.report.filename, "plant_a.pdf");
    assert!(config.auth.is_none());
}

#[test]
fn test_config_defaults_when_omitted() {
    let minimal = r#"
[server]
port = 8000
host = "127.0.0.1"

[database]
path = "history.db"
max_pool_size = 1
"#;
    let config = AppConfig::load_from_str(minimal).expect("valid");
    assert_eq!(config.database.retention_count, 5);
    assert_eq!(config.upload.max_bytes, 10 * 1024 * 1024);
    assert_eq!(config.report.title, "Chemical Equipment Report");
    assert_eq!(config.report.filename, "equipment_report.pdf");
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 8000", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_empty_db_path() {
    let bad = VALID_CONFIG.replace("path = \"data/history.db\"", "path = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("database.path"));
}

#[test]
fn test_config_validation_rejects_max_pool_size_zero() {
    let bad = VALID_CONFIG.replace("max_pool_size = 4", "max_pool_size = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("max_pool_size"));
}

#[test]
fn test_config_validation_rejects_retention_count_zero() {
    let bad = VALID_CONFIG.replace("retention_count = 5", "retention_count = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("retention_count"));
}

#[test]
fn test_config_validation_rejects_filename_with_path_separator() {
    let bad = VALID_CONFIG.replace("filename = \"plant_a.pdf\"", "filename = \"../x.pdf\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("report.filename"));
}

#[test]
fn test_config_auth_section() {
    let with_auth = format!(
        "{}\n[auth]\nusername = \"my_name\"\npassword = \"123456\"\n",
        VALID_CONFIG
    );
    let config = AppConfig::load_from_str(&with_auth).expect("valid");
    let auth = config.auth.expect("auth configured");
    assert_eq!(auth.username, "my_name");

    let bad = with_auth.replace("password = \"123456\"", "password = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("auth.password"));
}

#[test]
fn test_config_validation_rejects_invalid_toml() {
    let err = AppConfig::load_from_str("not valid toml [[[").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_config_load_from_file_via_env() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let result = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    let config = result.expect("load from CONFIG_FILE");
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.database.path, "data/history.db");
}
