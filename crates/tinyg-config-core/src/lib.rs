//! # tinyg-config Core
//!
//! Configuration model of the TinyG motion controller:
//! - the schema registry (which groups exist, which fields each one has)
//! - the configuration store (group → key → value)
//! - the codec between the store, JSON documents, and `$$` text dumps
//!
//! Nothing in this crate talks to a device; see `tinyg-config-communication`
//! for the request/response driver.

pub mod codec;
pub mod error;
pub mod schema;
pub mod store;
pub mod value;

pub use codec::{
    detect_format, format_text, id_to_group_key, parse_config, read_config, to_json,
    to_json_pretty, InputFormat,
};
pub use error::{CodecError, ConnectionError, Error, ProtocolError, Result};
pub use schema::{
    group_ids, read_only_keys, schema_for, try_schema_for, DisplayFormat, FieldDef, Schema,
    SchemaId, ValueFormat, GROUP_MAPPING, SYSTEM_GROUP,
};
pub use store::{ConfigGroup, ConfigStore};
pub use value::ConfigValue;
