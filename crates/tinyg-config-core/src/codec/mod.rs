//! Text and JSON codec
//!
//! Reads the two persisted forms of a controller configuration (a JSON
//! document, or the firmware's own `$$` text dump) into a [`ConfigStore`],
//! and writes a store back out as JSON or as aligned `$$`-style text.

pub mod format;
pub mod json;
pub mod text;

pub use format::{format_field_line, format_text, AXIS_MODES};
pub use json::{groups_from_value, parse_json, to_json, to_json_pretty};
pub use text::{id_to_group_key, parse_setting_line, parse_text, SettingLine};

use crate::error::CodecError;
use crate::store::ConfigStore;

/// Persisted configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// A single JSON object of group maps
    Json,
    /// The firmware's `$$` text dump
    Text,
}

/// Guess the format of `input` from its first non-empty line
pub fn detect_format(input: &str) -> InputFormat {
    let first = input.lines().map(str::trim_start).find(|line| !line.is_empty());
    match first {
        Some(line) if line.starts_with('{') => InputFormat::Json,
        _ => InputFormat::Text,
    }
}

/// Parse `input` and merge it into `store`.
///
/// The input is parsed completely before anything is merged, so a malformed
/// document leaves `store` untouched.
pub fn read_config(store: &mut ConfigStore, input: &str) -> Result<InputFormat, CodecError> {
    let format = detect_format(input);
    tracing::debug!("Reading configuration as {:?}", format);

    let parsed = match format {
        InputFormat::Json => {
            let mut parsed = ConfigStore::new();
            parsed.merge_groups(parse_json(input)?);
            parsed
        }
        InputFormat::Text => parse_text(input)?,
    };

    for (group_id, fields) in parsed.groups() {
        store.merge(group_id, fields.clone());
    }
    Ok(format)
}

/// Parse `input` into a fresh store
pub fn parse_config(input: &str) -> Result<ConfigStore, CodecError> {
    let mut store = ConfigStore::new();
    read_config(&mut store, input)?;
    Ok(store)
}
