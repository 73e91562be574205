//! Settings for tinyg-config
//!
//! Two sections, both optional in the file:
//! - `connection`: how to reach the controller
//! - `archive`: how archive files are named
//!
//! Files may be JSON or TOML, chosen by extension.

use crate::error::{ConfigError, SettingsError, SettingsResult};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tinyg_config_communication::{ConnectionParams, SerialParity};

/// Directory under the platform config directory holding the settings file
pub const CONFIG_DIR_NAME: &str = "tinyg-config";

/// Settings file name looked up in [`CONFIG_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Parity as written in settings files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    /// No parity bit
    #[default]
    None,
    /// Even parity
    Even,
    /// Odd parity
    Odd,
}

impl std::fmt::Display for Parity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Even => write!(f, "even"),
            Self::Odd => write!(f, "odd"),
        }
    }
}

impl From<Parity> for SerialParity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => SerialParity::None,
            Parity::Even => SerialParity::Even,
            Parity::Odd => SerialParity::Odd,
        }
    }
}

/// Connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Serial port name
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Data bits (5-8)
    pub data_bits: u8,
    /// Stop bits (1 or 2)
    pub stop_bits: u8,
    /// Parity
    pub parity: Parity,
    /// RTS/CTS hardware flow control
    pub flow_control: bool,
    /// Time to wait for each reply line, in milliseconds
    pub timeout_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115200,
            data_bits: 8,
            stop_bits: 1,
            parity: Parity::None,
            flow_control: false,
            timeout_ms: 1000,
        }
    }
}

impl ConnectionSettings {
    /// Serial parameters for opening the port
    pub fn connection_params(&self) -> ConnectionParams {
        ConnectionParams {
            port: self.port.clone(),
            baud_rate: self.baud_rate,
            data_bits: self.data_bits,
            stop_bits: self.stop_bits,
            parity: self.parity.into(),
            flow_control: self.flow_control,
        }
    }

    /// Per-line reply timeout
    pub fn reply_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }
}

/// Archive file settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveSettings {
    /// `chrono` format string for default archive file names
    pub filename_pattern: String,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            filename_pattern: "TinyG-%Y%m%d-%H%M%S.config".to_string(),
        }
    }
}

/// Complete settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Connection settings
    pub connection: ConnectionSettings,
    /// Archive file settings
    pub archive: ArchiveSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform location of the settings file, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from `path` if given, else from [`Config::default_path`] if that
    /// file exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => {
                tracing::debug!("No settings file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::LoadError {
            path: path.display().to_string(),
            source,
        })?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content).map_err(|source| SettingsError::SaveError {
            path: path.display().to_string(),
            source,
        })?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let connection = &self.connection;

        if connection.port.trim().is_empty() {
            return Err(ConfigError::MissingValue("connection.port".to_string()));
        }

        if connection.baud_rate == 0 {
            return Err(out_of_range("connection.baud_rate", connection.baud_rate));
        }

        if connection.timeout_ms == 0 {
            return Err(out_of_range("connection.timeout_ms", connection.timeout_ms));
        }

        if !(5..=8).contains(&connection.data_bits) {
            return Err(out_of_range("connection.data_bits", connection.data_bits));
        }

        if !matches!(connection.stop_bits, 1 | 2) {
            return Err(out_of_range("connection.stop_bits", connection.stop_bits));
        }

        let pattern = &self.archive.filename_pattern;
        if pattern.trim().is_empty() {
            return Err(ConfigError::MissingValue(
                "archive.filename_pattern".to_string(),
            ));
        }

        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(out_of_range("archive.filename_pattern", pattern));
        }

        Ok(())
    }
}

fn out_of_range(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("(none)").to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.connection.port, "/dev/ttyUSB0");
        assert_eq!(config.connection.baud_rate, 115200);
        assert_eq!(config.connection.timeout_ms, 1000);
        assert_eq!(config.archive.filename_pattern, "TinyG-%Y%m%d-%H%M%S.config");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_connection_params() {
        let mut settings = ConnectionSettings::default();
        settings.parity = Parity::Even;
        settings.stop_bits = 2;
        let params = settings.connection_params();
        assert_eq!(params.parity, SerialParity::Even);
        assert_eq!(params.stop_bits, 2);
        assert_eq!(params.port, "/dev/ttyUSB0");
        assert_eq!(
            settings.reply_timeout(),
            std::time::Duration::from_millis(1000)
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::new();
        config.connection.baud_rate = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValueOutOfRange { .. })
        ));

        let mut config = Config::new();
        config.connection.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.connection.data_bits = 9;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.connection.stop_bits = 3;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.connection.port = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingValue(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_filename_pattern() {
        let mut config = Config::new();
        config.archive.filename_pattern = "TinyG-%Q.config".to_string();
        match config.validate() {
            Err(ConfigError::ValueOutOfRange { key, value }) => {
                assert_eq!(key, "archive.filename_pattern");
                assert_eq!(value, "TinyG-%Q.config");
            }
            other => panic!("expected ValueOutOfRange, got {:?}", other),
        }

        config.archive.filename_pattern = "TinyG-%Y%m%d-%H%M%S.config".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [connection]
            port = "/dev/ttyACM0"
            parity = "odd"
            "#,
        )
        .unwrap();
        assert_eq!(config.connection.port, "/dev/ttyACM0");
        assert_eq!(config.connection.parity, Parity::Odd);
        assert_eq!(config.connection.baud_rate, 115200);
        assert_eq!(config.archive, ArchiveSettings::default());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = Config::new()
            .save_to_file(Path::new("settings.yaml"))
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Config(ConfigError::UnsupportedFormat(_))
        ));
    }
}
