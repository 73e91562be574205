//! `$$`-style text output
//!
//! Reproduces the column layout the firmware prints for its `$$` command so
//! that a saved configuration can be compared against a live dump by eye.

use crate::schema::{self, FieldDef, SchemaId, GROUP_MAPPING, SYSTEM_GROUP};
use crate::store::ConfigStore;
use crate::value::ConfigValue;

/// Labels of the axis mode (`am`) setting, indexed by value
pub const AXIS_MODES: [&str; 4] = ["[disabled]", "[standard]", "[inhibited]", "[radius]"];

const KEY_WIDTH: usize = 5;
const DESCRIPTION_WIDTH: usize = 29;
const LABEL_WIDTH: usize = 35;

/// Render one field as a `$$` line (without the trailing newline)
pub fn format_field_line(
    group_id: &str,
    schema_id: SchemaId,
    field: &FieldDef,
    value: &ConfigValue,
) -> String {
    let key_label = if group_id == SYSTEM_GROUP {
        format!("[{}]", field.key)
    } else {
        format!("[{}{}]", group_id, field.key)
    };

    let description = match schema_id.description_prefix(group_id) {
        Some(prefix) => format!("{} {}", prefix, field.description),
        None => field.description.to_string(),
    };

    let units = if field.key == "am" {
        axis_mode_label(value).unwrap_or(field.format.units)
    } else {
        field.format.units
    };
    let rendered = field.format.render_with_units(value, units);

    let label: String = format!(
        "{:<kw$} {:<dw$}",
        key_label,
        description,
        kw = KEY_WIDTH,
        dw = DESCRIPTION_WIDTH
    )
    .chars()
    .take(LABEL_WIDTH)
    .collect();

    let trim = alignment(&rendered) + 1;
    let keep = label.chars().count().saturating_sub(trim);
    let label: String = label.chars().take(keep).collect();

    format!("{} {}", label, rendered)
}

/// Render every stored field the registry knows, in mapping and schema
/// order, one line each
pub fn format_text(store: &ConfigStore) -> String {
    let mut out = String::new();
    for &(group_id, schema_id) in GROUP_MAPPING {
        let Some(values) = store.group(group_id) else {
            continue;
        };
        for field in schema::schema(schema_id).fields {
            if let Some(value) = values.get(field.key) {
                out.push_str(&format_field_line(group_id, schema_id, field, value));
                out.push('\n');
            }
        }
    }
    out
}

fn axis_mode_label(value: &ConfigValue) -> Option<&'static str> {
    let index = usize::try_from(value.as_whole()?).ok()?;
    AXIS_MODES.get(index).copied()
}

/// Number of label characters the value pushes into the label column.
///
/// The first `.` wins over the first space when it comes earlier; with
/// neither, one character.
fn alignment(rendered: &str) -> usize {
    let space = rendered.find(' ');
    let period = rendered.find('.');

    let mut align = space;
    if let Some(p) = period {
        if p > 0 && space.is_none_or(|s| s > 0 && p < s) {
            align = Some(p);
        }
    }
    align.unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(group_id: &str, key: &str, value: ConfigValue) -> String {
        let schema_id = schema::try_schema_id_for(group_id).unwrap();
        let field = schema::schema(schema_id).field(key).unwrap();
        format_field_line(group_id, schema_id, field, &value)
    }

    #[test]
    fn test_alignment_rule() {
        assert_eq!(alignment("440.20"), 3);
        assert_eq!(alignment("2000000 mm"), 7);
        assert_eq!(alignment("0.000 mm"), 1);
        assert_eq!(alignment("16000 mm/min"), 5);
        assert_eq!(alignment("8"), 1);
        assert_eq!(alignment("0084-d3fc"), 1);
        assert_eq!(alignment(".5 mm"), 2);
        assert_eq!(alignment("1 [0=G61,1=G61.1,2=G64]"), 1);
    }

    #[test]
    fn test_system_lines() {
        assert_eq!(
            line("sys", "fb", ConfigValue::Float(440.2)),
            "[fb]  firmware build            440.20"
        );
        assert_eq!(
            line("sys", "ja", ConfigValue::Integer(2000000)),
            "[ja]  junction acceleration 2000000 mm"
        );
        assert_eq!(
            line("sys", "id", ConfigValue::from("0084-d3fc")),
            "[id]  TinyG ID                    0084-d3fc"
        );
    }

    #[test]
    fn test_decorated_lines() {
        assert_eq!(
            line("1", "mi", ConfigValue::Integer(8)),
            "[1mi] m1 microsteps               8 [1,2,4,8]"
        );
        assert_eq!(
            line("x", "vm", ConfigValue::Integer(16000)),
            "[xvm] x velocity maximum      16000 mm/min"
        );
        assert_eq!(
            line("g54", "x", ConfigValue::Float(0.0)),
            "[g54x] g54 x offset               0.000 mm"
        );
        assert_eq!(
            line("p1", "frq", ConfigValue::Integer(100)),
            "[p1frq] pwm frequency           100 Hz"
        );
    }

    #[test]
    fn test_axis_mode_label() {
        assert_eq!(
            line("x", "am", ConfigValue::Integer(1)),
            "[xam] x axis mode                 1 [standard]"
        );
        assert_eq!(
            line("a", "am", ConfigValue::Integer(3)),
            "[aam] a axis mode                 3 [radius]"
        );
        assert_eq!(
            line("y", "am", ConfigValue::Integer(0)),
            "[yam] y axis mode                 0 [disabled]"
        );
        // Outside the enumeration the schema suffix is kept
        assert_eq!(
            line("z", "am", ConfigValue::Integer(9)),
            "[zam] z axis mode                 9 [standard]"
        );
    }

    #[test]
    fn test_format_text_order_and_filtering() {
        let mut store = ConfigStore::new();
        store.set("x", "vm", ConfigValue::Integer(16000));
        store.set("x", "am", ConfigValue::Integer(1));
        store.set("x", "unknown", ConfigValue::Integer(3));
        store.set("sys", "ja", ConfigValue::Integer(2000000));
        store.set("nogroup", "vm", ConfigValue::Integer(1));

        let text = format_text(&store);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("[ja]"));
        assert!(lines[1].starts_with("[xam]"));
        assert!(lines[2].starts_with("[xvm]"));
    }
}
