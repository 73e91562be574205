//! The four commands: archive, restore, show, and dump
//!
//! Everything that talks to the controller takes a [`TinyGConfigDriver`]
//! over any [`LineChannel`]; only [`run`] opens the serial port.

use crate::cli::{Cli, Command};
use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, TimeZone};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tinyg_config_communication::{LineChannel, SerialChannel, TinyGConfigDriver, TransferReport};
use tinyg_config_core::{format_text, read_config, to_json, to_json_pretty, ConfigStore};
use tinyg_config_settings::Config;

/// Run the parsed command line
pub fn run(cli: &Cli) -> Result<()> {
    let mut config =
        Config::load_or_default(cli.config.as_deref()).context("Failed to load settings")?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid settings")?;

    match &cli.command {
        Command::Archive { file } => {
            let path = match file {
                Some(path) => path.clone(),
                None => {
                    let path = default_archive_name(
                        &config.archive.filename_pattern,
                        &chrono::Local::now(),
                    )?;
                    println!("Archiving to {}", path.display());
                    path
                }
            };
            let mut driver = open_driver(&config)?;
            let report = archive(&mut driver, &path)?;
            check_report("read", &report)
        }
        Command::Restore { file } => {
            let store = load_store(file)?;
            let mut driver = open_driver(&config)?;
            let report = restore(&mut driver, &store)?;
            check_report("written", &report)
        }
        Command::Show { file } => {
            let (store, report) = load_or_read(file.as_deref(), &config)?;
            print!("{}", format_text(&store));
            check_report("read", &report)
        }
        Command::Dump { file } => {
            let (store, report) = load_or_read(file.as_deref(), &config)?;
            println!("{}", to_json_pretty(&store)?);
            check_report("read", &report)
        }
    }
}

/// Open the configured serial port and wrap it in a driver
pub fn open_driver(config: &Config) -> Result<TinyGConfigDriver<SerialChannel>> {
    let params = config.connection.connection_params();
    let channel = SerialChannel::open(&params)
        .with_context(|| format!("Failed to open controller on {}", params.port))?;
    tracing::debug!("Using controller on {}", channel.port_name());
    Ok(TinyGConfigDriver::new(
        channel,
        config.connection.reply_timeout(),
    ))
}

/// Ask the controller for millimeter units.
///
/// An unanswered or malformed reply is only logged; the group transfers
/// still run. A broken channel is an error.
pub fn force_metric<C: LineChannel>(driver: &mut TinyGConfigDriver<C>) -> Result<()> {
    match driver.ensure_metric_units() {
        Ok(()) => Ok(()),
        Err(e) if e.is_connection_error() => {
            Err(e).context("Failed to switch controller to millimeters")
        }
        Err(e) => {
            tracing::warn!("No confirmation of millimeter units, continuing: {}", e);
            Ok(())
        }
    }
}

/// Switch the controller to millimeters and read every group
pub fn read_device<C: LineChannel>(
    driver: &mut TinyGConfigDriver<C>,
) -> Result<(ConfigStore, TransferReport)> {
    force_metric(driver)?;
    let mut store = ConfigStore::new();
    let report = driver.read_all_groups(&mut store)?;
    Ok((store, report))
}

/// Read every group from the controller and save the result to `path`.
///
/// The file is written even if some groups failed, so the groups that were
/// read are kept.
pub fn archive<C: LineChannel>(
    driver: &mut TinyGConfigDriver<C>,
    path: &Path,
) -> Result<TransferReport> {
    let (store, report) = read_device(driver)?;
    let json = to_json(&store)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write archive {}", path.display()))?;
    tracing::info!("Saved {} groups to {}", store.len(), path.display());
    Ok(report)
}

/// Switch the controller to millimeters and write every group of `store`
pub fn restore<C: LineChannel>(
    driver: &mut TinyGConfigDriver<C>,
    store: &ConfigStore,
) -> Result<TransferReport> {
    force_metric(driver)?;
    Ok(driver.write_all_groups(store)?)
}

/// Read and parse a JSON or `$$` text configuration file
pub fn load_store(path: &Path) -> Result<ConfigStore> {
    let input = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut store = ConfigStore::new();
    let format = read_config(&mut store, &input)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::debug!(
        "Read {} values from {} ({:?})",
        store.value_count(),
        path.display(),
        format
    );
    Ok(store)
}

/// Archive file name for `now` from a `chrono` format pattern
pub fn default_archive_name<Tz: TimeZone>(pattern: &str, now: &DateTime<Tz>) -> Result<PathBuf>
where
    Tz::Offset: std::fmt::Display,
{
    let mut name = String::new();
    write!(name, "{}", now.format(pattern))
        .map_err(|_| anyhow!("Invalid archive filename pattern '{}'", pattern))?;
    Ok(PathBuf::from(name))
}

/// Turn failed groups into an error, after every group was attempted
pub fn check_report(verb: &str, report: &TransferReport) -> Result<()> {
    if report.is_success() {
        return Ok(());
    }
    for (group_id, err) in &report.failed {
        tracing::error!("Group '{}' not {}: {}", group_id, verb, err);
    }
    bail!(
        "{} of {} groups could not be {}: {}",
        report.failed.len(),
        report.completed.len() + report.skipped.len() + report.failed.len(),
        verb,
        report.failed_groups().join(", ")
    )
}

fn load_or_read(file: Option<&Path>, config: &Config) -> Result<(ConfigStore, TransferReport)> {
    match file {
        Some(path) => Ok((load_store(path)?, TransferReport::default())),
        None => read_device(&mut open_driver(config)?),
    }
}
