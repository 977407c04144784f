//! Cache Value Module
//!
//! The payload stored under a key. Stores treat it as opaque except for
//! the counter operations, which coerce it to an integer.

use serde::{Deserialize, Serialize};

// == Value ==
/// A cached payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
}

impl Value {
    // == Counter Coercion ==
    /// Interprets the value as a counter.
    ///
    /// Integers are used as-is, numeric strings are parsed and floats are
    /// truncated. Anything else counts as zero.
    pub fn as_count(&self) -> i64 {
        match self {
            Value::Int(n) => *n,
            Value::Str(s) => s.trim().parse().unwrap_or(0),
            Value::Float(f) => *f as i64,
            Value::Bool(_) | Value::Bytes(_) => 0,
        }
    }

    /// Returns the string slice for `Str` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    // == Wire Encoding ==
    /// Encodes the value as text bytes for a remote key/value service.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Value::Bool(b) => b.to_string().into_bytes(),
            Value::Int(n) => n.to_string().into_bytes(),
            Value::Float(f) => f.to_string().into_bytes(),
            Value::Str(s) => s.as_bytes().to_vec(),
            Value::Bytes(b) => b.clone(),
        }
    }

    /// Decodes bytes returned by a remote service.
    ///
    /// Type information does not survive the round trip: UTF-8 payloads come
    /// back as `Str`, everything else as `Bytes`.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(s) => Value::Str(s),
            Err(e) => Value::Bytes(e.into_bytes()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}
