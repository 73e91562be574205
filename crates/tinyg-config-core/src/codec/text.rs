//! `$$` text dump parser
//!
//! In text mode the controller prints one setting per line:
//!
//! ```text
//! [ja]  junction acceleration 2000000 mm
//! [1mi] m1 microsteps         8 [1,2,4,8]
//! [xvm] x velocity maximum    16000 mm/min
//! [id]  TinyG ID              0084-d3fc-c34b-0f6
//! ```
//!
//! The bracketed flat key joins the group id and the field key. Lines that
//! do not start with `[` (prompts, banners, blank lines) carry no setting.

use crate::error::CodecError;
use crate::schema::{self, SchemaId, GROUP_MAPPING, SYSTEM_GROUP};
use crate::store::ConfigStore;
use crate::value::ConfigValue;

/// One setting read from a text line
#[derive(Debug, Clone, PartialEq)]
pub struct SettingLine {
    /// Resolved group id
    pub group_id: &'static str,
    /// Field key within the group
    pub key: String,
    /// Parsed value
    pub value: ConfigValue,
}

/// Split a flat text key into `(group id, field key)`.
///
/// Bare system keys (`ja`, `mt`) have no group prefix and are checked first.
/// Otherwise the first group in [`GROUP_MAPPING`] order that is a prefix of
/// `flat_key` and whose schema defines the remainder wins.
pub fn id_to_group_key(flat_key: &str) -> Option<(&'static str, &str)> {
    if schema::schema(SchemaId::System).contains(flat_key) {
        return Some((SYSTEM_GROUP, flat_key));
    }

    GROUP_MAPPING.iter().find_map(|&(group_id, schema_id)| {
        let key = flat_key.strip_prefix(group_id)?;
        schema::schema(schema_id)
            .contains(key)
            .then_some((group_id, key))
    })
}

/// Parse one line of a text dump.
///
/// Returns `Ok(None)` for lines that carry no setting. `line_number` is
/// only used in error messages.
pub fn parse_setting_line(line: &str, line_number: usize) -> Result<Option<SettingLine>, CodecError> {
    let Some(bracketed) = line.strip_prefix('[') else {
        return Ok(None);
    };
    let close = bracketed.find(']').ok_or_else(|| {
        CodecError::malformed(format!("unterminated key at line {}: {}", line_number, line.trim_end()))
    })?;
    let flat_key = &bracketed[..close];
    let tokens: Vec<&str> = bracketed[close + 1..].split_whitespace().collect();

    let (group_id, key) = id_to_group_key(flat_key).ok_or_else(|| CodecError::UnknownFlatKey {
        flat_key: flat_key.to_string(),
        line_number,
    })?;

    let missing = || CodecError::MissingValue {
        flat_key: flat_key.to_string(),
        line_number,
    };

    let token = if group_id == SYSTEM_GROUP && key == "id" {
        // The board id is the one non-numeric setting: `[id] TinyG ID <value>`
        tokens.get(2).copied().ok_or_else(missing)?
    } else {
        let description = schema::schema_for(group_id)
            .field(key)
            .map(|f| f.description)
            .unwrap_or_default();
        let start = skip_description(&tokens, description);
        tokens[start..]
            .iter()
            .copied()
            .find(|token| ConfigValue::is_numeric_token(token))
            .ok_or_else(missing)?
    };

    tracing::trace!("Parsed key '{}' value '{}'", flat_key, token);

    Ok(Some(SettingLine {
        group_id,
        key: key.to_string(),
        value: ConfigValue::parse(token),
    }))
}

/// Index of the first token after the field description, or 0 if the
/// description does not appear in the line.
///
/// Descriptions are decorated (`m1 microsteps`, `motor 1 microsteps`); a
/// number inside the decoration must not be taken for the value.
fn skip_description(tokens: &[&str], description: &str) -> usize {
    let words: Vec<&str> = description.split_whitespace().collect();
    if words.is_empty() || words.len() > tokens.len() {
        return 0;
    }
    tokens
        .windows(words.len())
        .position(|window| window == words.as_slice())
        .map(|pos| pos + words.len())
        .unwrap_or(0)
}

/// Parse a complete text dump into a fresh store
pub fn parse_text(input: &str) -> Result<ConfigStore, CodecError> {
    let mut store = ConfigStore::new();
    for (index, line) in input.lines().enumerate() {
        if let Some(setting) = parse_setting_line(line, index + 1)? {
            store.set(setting.group_id, &setting.key, setting.value);
        }
    }
    Ok(store)
}
