//! Firmware protocol implementations
//!
//! Only TinyG (and its JSON protocol) is supported.

pub mod tinyg;
