//! JSON form of a configuration
//!
//! The archive format is one object with group ids as keys and field maps as
//! values, e.g. `{"sys":{"ja":2000000},"x":{"vm":16000}}`. The same shape is
//! the payload of the controller's `r` replies.

use crate::error::CodecError;
use crate::store::{ConfigGroup, ConfigStore};
use crate::value::ConfigValue;
use serde_json::Value;
use std::collections::BTreeMap;

/// Convert a JSON object of group maps into typed groups
pub fn groups_from_value(value: &Value) -> Result<BTreeMap<String, ConfigGroup>, CodecError> {
    let top = value
        .as_object()
        .ok_or_else(|| CodecError::malformed(format!("expected an object of groups, got {}", value)))?;

    let mut groups = BTreeMap::new();
    for (group_id, fields) in top {
        let fields = fields.as_object().ok_or_else(|| {
            CodecError::malformed(format!(
                "group '{}' must be an object of settings, got {}",
                group_id, fields
            ))
        })?;

        let mut group = ConfigGroup::new();
        for (key, value) in fields {
            group.insert(key.clone(), ConfigValue::from_json(group_id, key, value)?);
        }
        groups.insert(group_id.clone(), group);
    }
    Ok(groups)
}

/// Parse a JSON configuration document
pub fn parse_json(input: &str) -> Result<BTreeMap<String, ConfigGroup>, CodecError> {
    let value: Value = serde_json::from_str(input)?;
    groups_from_value(&value)
}

/// Compact single-line JSON, the archive file format
pub fn to_json(store: &ConfigStore) -> serde_json::Result<String> {
    serde_json::to_string(store)
}

/// Indented JSON with sorted keys, for reading
pub fn to_json_pretty(store: &ConfigStore) -> serde_json::Result<String> {
    serde_json::to_string_pretty(store)
}
