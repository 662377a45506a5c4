use dockhand_core::{CONFIG_FILE, DeployConfig, Error};
use tempfile::TempDir;

#[test]
fn load_parses_full_config() {
    let tmp = TempDir::new().unwrap();
    let json = r#"{
        "machine": "prod-1",
        "name": "shop",
        "additional-compose-files": ["docker-compose.prod.yml", "docker-compose.metrics.yml"]
    }"#;
    std::fs::write(tmp.path().join(CONFIG_FILE), json).unwrap();

    let config = DeployConfig::load(tmp.path()).unwrap();

    assert_eq!(config.machine, "prod-1");
    assert_eq!(config.name.as_deref(), Some("shop"));
    assert_eq!(
        config.additional_compose_files,
        vec!["docker-compose.prod.yml", "docker-compose.metrics.yml"]
    );
}

#[test]
fn load_minimal_config_fills_defaults() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join(CONFIG_FILE), r#"{"machine": "staging"}"#).unwrap();

    let config = DeployConfig::load(tmp.path()).unwrap();

    assert_eq!(config.machine, "staging");
    assert!(config.name.is_none());
    assert!(config.additional_compose_files.is_empty());
}

#[test]
fn load_missing_file_is_an_error() {
    let tmp = TempDir::new().unwrap();

    let result = DeployConfig::load(tmp.path());

    assert!(matches!(result, Err(Error::ConfigLoad { .. })));
    let err = result.unwrap_err().to_string();
    assert!(err.contains(CONFIG_FILE));
}

#[test]
fn load_invalid_json_returns_parse_error() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join(CONFIG_FILE), "not valid {{{{ json").unwrap();

    let result = DeployConfig::load(tmp.path());

    assert!(matches!(result, Err(Error::ConfigParse { .. })));
    let err = result.unwrap_err().to_string();
    assert!(err.contains("parse"));
}

#[test]
fn load_missing_machine_field_returns_parse_error() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join(CONFIG_FILE), r#"{"name": "shop"}"#).unwrap();

    let result = DeployConfig::load(tmp.path());

    assert!(matches!(result, Err(Error::ConfigParse { .. })));
}

#[test]
fn load_ignores_unknown_fields() {
    let tmp = TempDir::new().unwrap();
    let json = r#"{"machine": "prod-1", "registry": "ghcr.io/acme"}"#;
    std::fs::write(tmp.path().join(CONFIG_FILE), json).unwrap();

    let config = DeployConfig::load(tmp.path()).unwrap();
    assert_eq!(config.machine, "prod-1");
}
