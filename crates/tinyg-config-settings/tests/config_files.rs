use tempfile::TempDir;
use tinyg_config_settings::{Config, ConfigError, Parity, SettingsError};

fn sample() -> Config {
    let mut config = Config::new();
    config.connection.port = "/dev/ttyACM1".to_string();
    config.connection.baud_rate = 230400;
    config.connection.parity = Parity::Even;
    config.connection.timeout_ms = 250;
    config.archive.filename_pattern = "shop-%Y%m%d.config".to_string();
    config
}

#[test]
fn test_toml_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    sample().save_to_file(&path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("[connection]"));
    assert!(content.contains("parity = \"even\""));

    assert_eq!(Config::load_from_file(&path).unwrap(), sample());
}

#[test]
fn test_json_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    sample().save_to_file(&path).unwrap();
    assert_eq!(Config::load_from_file(&path).unwrap(), sample());
}

#[test]
fn test_explicit_path_wins() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"connection":{"baud_rate":9600}}"#).unwrap();

    let config = Config::load_or_default(Some(&path)).unwrap();
    assert_eq!(config.connection.baud_rate, 9600);
    assert_eq!(config.connection.port, "/dev/ttyUSB0");
}

#[test]
fn test_missing_file_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let err = Config::load_or_default(Some(&path)).unwrap_err();
    assert!(matches!(err, SettingsError::LoadError { .. }));
}

#[test]
fn test_invalid_values_are_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[connection]\nbaud_rate = 0\n").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Config(ConfigError::ValueOutOfRange { .. })
    ));
}

#[test]
fn test_malformed_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[connection\nport = ").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::TomlError(_)));
}
