//! Configuration values
//!
//! The controller reports every setting as an integer, a float, or (for the
//! board identifier) a string. `ConfigValue` keeps that distinction explicit
//! instead of guessing at use sites.

use crate::error::CodecError;
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};
use std::fmt;

/// A single scalar setting value
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// Whole number, e.g. a microstep count or a velocity
    Integer(i64),
    /// Finite floating point number, e.g. a travel limit
    Float(f64),
    /// Anything that is not a number, e.g. the board id
    String(String),
}

impl ConfigValue {
    /// Parse a token taken from a text dump.
    ///
    /// Total: tries an integer first, then a finite float, and falls back to
    /// the literal string.
    pub fn parse(token: &str) -> Self {
        if let Ok(int) = token.parse::<i64>() {
            return ConfigValue::Integer(int);
        }
        match token.parse::<f64>() {
            Ok(float) if float.is_finite() => ConfigValue::Float(float),
            _ => ConfigValue::String(token.to_string()),
        }
    }

    /// True if `token` reads as a finite number.
    pub fn is_numeric_token(token: &str) -> bool {
        token.parse::<f64>().is_ok_and(f64::is_finite)
    }

    /// Convert a JSON field value, rejecting booleans, nulls, and nested
    /// structures.
    pub fn from_json(group: &str, key: &str, value: &Value) -> Result<Self, CodecError> {
        let unsupported = || CodecError::UnsupportedValue {
            group: group.to_string(),
            key: key.to_string(),
            found: value.to_string(),
        };

        match value {
            Value::Number(num) => {
                if let Some(int) = num.as_i64() {
                    Ok(ConfigValue::Integer(int))
                } else {
                    num.as_f64()
                        .filter(|f| f.is_finite())
                        .map(ConfigValue::Float)
                        .ok_or_else(unsupported)
                }
            }
            Value::String(s) => Ok(ConfigValue::String(s.clone())),
            _ => Err(unsupported()),
        }
    }

    /// JSON representation used on the wire and in archive files
    pub fn to_json(&self) -> Value {
        match self {
            ConfigValue::Integer(int) => Value::from(*int),
            // Finite by construction; `from_f64` only fails for NaN/inf
            ConfigValue::Float(float) => Number::from_f64(*float)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ConfigValue::String(s) => Value::String(s.clone()),
        }
    }

    /// The value as a whole number, if it is one.
    ///
    /// Floats with no fractional part count as whole numbers; the controller
    /// sometimes reports integer settings with a trailing `.000`.
    pub fn as_whole(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(int) => Some(*int),
            ConfigValue::Float(float)
                if float.fract() == 0.0 && float.abs() < i64::MAX as f64 =>
            {
                Some(*float as i64)
            }
            _ => None,
        }
    }

    /// The value as a float, if it is numeric
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Integer(int) => Some(*int as f64),
            ConfigValue::Float(float) => Some(*float),
            ConfigValue::String(_) => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Integer(int) => write!(f, "{}", int),
            // Debug keeps the decimal point on whole floats (`1.0`, not `1`)
            ConfigValue::Float(float) => write!(f, "{:?}", float),
            ConfigValue::String(s) => f.write_str(s),
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Integer(int) => serializer.serialize_i64(*int),
            ConfigValue::Float(float) => serializer.serialize_f64(*float),
            ConfigValue::String(s) => serializer.serialize_str(s),
        }
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}
