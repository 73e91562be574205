//! Configuration store
//!
//! Two-level map of group id to field key to value. Both levels are sorted
//! so serialized output is stable between runs.

use crate::schema;
use crate::value::ConfigValue;
use serde::Serialize;
use std::collections::BTreeMap;

/// Field key to value map of one group
pub type ConfigGroup = BTreeMap<String, ConfigValue>;

/// In-memory controller configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigStore {
    groups: BTreeMap<String, ConfigGroup>,
}

impl ConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `fields` into `group_id`.
    ///
    /// New keys are inserted, existing keys overwritten, and keys not
    /// mentioned keep their values. Keys are not checked against the schema:
    /// fields the registry does not know are kept and written back, they are
    /// just never displayed.
    pub fn merge<I, K>(&mut self, group_id: &str, fields: I)
    where
        I: IntoIterator<Item = (K, ConfigValue)>,
        K: Into<String>,
    {
        let group = self.groups.entry(group_id.to_string()).or_default();
        for (key, value) in fields {
            group.insert(key.into(), value);
        }
    }

    /// Merge several groups at once
    pub fn merge_groups(&mut self, groups: BTreeMap<String, ConfigGroup>) {
        for (group_id, fields) in groups {
            self.merge(&group_id, fields);
        }
    }

    /// Set a single value
    pub fn set(&mut self, group_id: &str, key: &str, value: ConfigValue) {
        self.merge(group_id, [(key, value)]);
    }

    /// Copy of a group's fields, if the group is present
    pub fn group_snapshot(&self, group_id: &str) -> Option<ConfigGroup> {
        self.groups.get(group_id).cloned()
    }

    /// Borrow a group's fields
    pub fn group(&self, group_id: &str) -> Option<&ConfigGroup> {
        self.groups.get(group_id)
    }

    /// Look up one value
    pub fn get(&self, group_id: &str, key: &str) -> Option<&ConfigValue> {
        self.groups.get(group_id).and_then(|group| group.get(key))
    }

    /// Iterate groups in sorted id order
    pub fn groups(&self) -> impl Iterator<Item = (&str, &ConfigGroup)> {
        self.groups
            .iter()
            .map(|(group_id, fields)| (group_id.as_str(), fields))
    }

    /// Number of groups held
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True if no group has been merged yet
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of values across all groups
    pub fn value_count(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }

    /// Drop the read-only keys of `group_id` from `fields`
    pub fn filter_read_only(group_id: &str, mut fields: ConfigGroup) -> ConfigGroup {
        fields.retain(|key, _| !schema::is_read_only(group_id, key));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_inserts_new_group() {
        let mut store = ConfigStore::new();
        store.merge("x", [("vm", ConfigValue::Integer(500))]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("x", "vm"), Some(&ConfigValue::Integer(500)));
    }

    #[test]
    fn test_merge_is_shallow_union() {
        let mut store = ConfigStore::new();
        store.merge(
            "x",
            [
                ("vm", ConfigValue::Integer(500)),
                ("fr", ConfigValue::Integer(400)),
            ],
        );
        store.merge(
            "x",
            [
                ("vm", ConfigValue::Integer(800)),
                ("tm", ConfigValue::Float(150.0)),
            ],
        );

        assert_eq!(store.get("x", "vm"), Some(&ConfigValue::Integer(800)));
        assert_eq!(store.get("x", "fr"), Some(&ConfigValue::Integer(400)));
        assert_eq!(store.get("x", "tm"), Some(&ConfigValue::Float(150.0)));
        assert_eq!(store.value_count(), 3);
    }

    #[test]
    fn test_merge_tolerates_unknown_keys() {
        let mut store = ConfigStore::new();
        store.set("x", "qq", ConfigValue::Integer(1));
        assert_eq!(store.get("x", "qq"), Some(&ConfigValue::Integer(1)));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut store = ConfigStore::new();
        store.set("sys", "ja", ConfigValue::Integer(2000000));

        let mut snapshot = store.group_snapshot("sys").unwrap();
        snapshot.insert("ja".to_string(), ConfigValue::Integer(1));
        snapshot.clear();

        assert_eq!(store.get("sys", "ja"), Some(&ConfigValue::Integer(2000000)));
        assert!(store.group_snapshot("y").is_none());
    }

    #[test]
    fn test_filter_read_only() {
        let mut fields = ConfigGroup::new();
        for key in ["fb", "fv", "id", "ja"] {
            fields.insert(key.to_string(), ConfigValue::Integer(1));
        }

        let filtered = ConfigStore::filter_read_only("sys", fields.clone());
        assert_eq!(filtered.keys().collect::<Vec<_>>(), vec!["ja"]);

        let untouched = ConfigStore::filter_read_only("x", fields.clone());
        assert_eq!(untouched, fields);
    }
}
