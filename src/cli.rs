//! Command-line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tinyg_config_settings::Config;

/// Archive, restore, and show TinyG controller configuration
#[derive(Parser, Debug)]
#[command(name = "tinyg-config", version = crate::LONG_VERSION, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Serial port of the controller
    #[arg(short, long, global = true)]
    pub port: Option<String>,

    /// Baud rate
    #[arg(short, long, global = true)]
    pub baud: Option<u32>,

    /// Time to wait for each reply line, in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Settings file (.toml or .json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log every line sent to and received from the controller
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read the controller's configuration and save it as JSON
    Archive {
        /// Archive file; named from the settings' filename pattern if omitted
        file: Option<PathBuf>,
    },
    /// Write a saved configuration (JSON or `$$` text) back to the controller
    Restore {
        /// Configuration file to restore
        file: PathBuf,
    },
    /// Print a configuration in `$$` text form
    Show {
        /// Configuration file; read from the controller if omitted
        file: Option<PathBuf>,
    },
    /// Print a configuration as indented JSON
    Dump {
        /// Configuration file; read from the controller if omitted
        file: Option<PathBuf>,
    },
}

impl Cli {
    /// Apply command-line overrides on top of file settings
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(port) = &self.port {
            config.connection.port = port.clone();
        }
        if let Some(baud) = self.baud {
            config.connection.baud_rate = baud;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.connection.timeout_ms = timeout_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_archive_with_overrides() {
        let cli = Cli::parse_from([
            "tinyg-config",
            "-p",
            "/dev/ttyACM0",
            "archive",
            "-b",
            "9600",
            "--timeout-ms",
            "200",
        ]);
        assert_eq!(cli.command, Command::Archive { file: None });

        let mut config = Config::new();
        cli.apply_overrides(&mut config);
        assert_eq!(config.connection.port, "/dev/ttyACM0");
        assert_eq!(config.connection.baud_rate, 9600);
        assert_eq!(config.connection.timeout_ms, 200);
    }

    #[test]
    fn test_parse_file_arguments() {
        let cli = Cli::parse_from(["tinyg-config", "restore", "saved.config"]);
        assert_eq!(
            cli.command,
            Command::Restore {
                file: PathBuf::from("saved.config")
            }
        );

        let cli = Cli::parse_from(["tinyg-config", "-v", "show"]);
        assert!(cli.verbose);
        assert_eq!(cli.command, Command::Show { file: None });
    }

    #[test]
    fn test_restore_requires_file() {
        assert!(Cli::try_parse_from(["tinyg-config", "restore"]).is_err());
    }

    #[test]
    fn test_no_overrides_keeps_settings() {
        let cli = Cli::parse_from(["tinyg-config", "dump", "a.json"]);
        let mut config = Config::new();
        cli.apply_overrides(&mut config);
        assert_eq!(config, Config::new());
    }
}
