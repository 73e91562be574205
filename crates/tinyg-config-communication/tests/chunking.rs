use proptest::prelude::*;
use serde_json::Value;
use std::collections::BTreeSet;
use tinyg_config_communication::firmware::tinyg::config_transfer::build_write_commands;
use tinyg_config_communication::{MAX_COMMAND_LINE, MAX_KEYS_PER_WRITE};
use tinyg_config_core::{ConfigGroup, ConfigValue};

fn any_value() -> impl Strategy<Value = ConfigValue> {
    prop_oneof![
        any::<i64>().prop_map(ConfigValue::Integer),
        (-1.0e9f64..1.0e9).prop_map(ConfigValue::Float),
        "[a-z0-9-]{0,60}".prop_map(ConfigValue::String),
    ]
}

fn any_group() -> impl Strategy<Value = ConfigGroup> {
    prop::collection::btree_map("[a-z]{1,6}", any_value(), 0..40)
}

proptest! {
    #[test]
    fn write_commands_fit_and_cover_every_key(
        group_id in prop::sample::select(vec!["sys", "1", "x", "g54", "p1"]),
        fields in any_group(),
    ) {
        let commands = build_write_commands(group_id, &fields).unwrap();

        let mut seen = Vec::new();
        for command in &commands {
            prop_assert!(command.len() + 1 <= MAX_COMMAND_LINE, "too long: {}", command);

            let json: Value = serde_json::from_str(command).unwrap();
            let body = json[group_id].as_object().unwrap();
            prop_assert!(!body.is_empty());
            prop_assert!(body.len() <= MAX_KEYS_PER_WRITE);
            for key in body.keys() {
                prop_assert!(fields.contains_key(key));
                seen.push(key.clone());
            }
        }

        let unique: BTreeSet<&String> = seen.iter().collect();
        prop_assert_eq!(unique.len(), seen.len());
        prop_assert_eq!(seen.len(), fields.len());
    }
}
