//! # tinyg-config
//!
//! Archive, restore, and show the configuration of a TinyG motion
//! controller.
//!
//! ## Architecture
//!
//! The tool is organized as a workspace:
//!
//! 1. **tinyg-config-core** - Schema registry, configuration store, JSON and `$$` text codec
//! 2. **tinyg-config-communication** - Serial line channel and the request/response driver
//! 3. **tinyg-config-settings** - Connection and archive settings files
//! 4. **tinyg-config** - The command-line tool tying them together

pub mod cli;
pub mod commands;

pub use tinyg_config_communication::{
    ConnectionParams, LineChannel, SerialChannel, TinyGConfigDriver, TransferReport,
};
pub use tinyg_config_core::{
    format_text, read_config, to_json, to_json_pretty, ConfigStore, ConfigValue, Error,
    InputFormat, Result,
};
pub use tinyg_config_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Version string shown by `--version`
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("BUILD_DATE"),
    ")"
);

/// Initialize logging
///
/// Sets up structured logging with:
/// - stderr output, so command output on stdout stays clean
/// - `info` by default, `debug` when `verbose` is set
/// - RUST_LOG environment variable support
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
