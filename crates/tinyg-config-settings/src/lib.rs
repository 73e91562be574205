//! tinyg-config Settings Crate
//!
//! Connection and archive settings, loaded from a JSON or TOML file in the
//! platform config directory.

pub mod config;
pub mod error;

pub use config::{
    ArchiveSettings, Config, ConnectionSettings, Parity, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
};
pub use error::{ConfigError, SettingsError, SettingsResult};
