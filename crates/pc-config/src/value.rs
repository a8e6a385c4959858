//! Config values.

use crate::attr_dict::AttrDict;
use crate::config::Config;
use pc_common::{Error, Result};
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;
use std::ops::Index;

static NULL: Value = Value::Null;

/// A single value held by a config container.
///
/// Nested mappings are always containers: `Dict` under the default (uniform)
/// conversion, `Config` when a tracked config was converted with
/// `same_class = true`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Dict(AttrDict),
    Config(Config),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Config(_) => "config",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for `Dict` and `Config`.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Dict(_) | Value::Config(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// The mapping behind a `Dict` or a nested `Config`.
    pub fn as_dict(&self) -> Option<&AttrDict> {
        match self {
            Value::Dict(d) => Some(d),
            Value::Config(c) => Some(c.dict()),
            _ => None,
        }
    }

    /// Mutable access to a nested mapping. Writes through a nested `Config`
    /// are not recorded in its provenance.
    pub fn as_dict_mut(&mut self) -> Option<&mut AttrDict> {
        match self {
            Value::Dict(d) => Some(d),
            Value::Config(c) => Some(c.dict_mut()),
            _ => None,
        }
    }

    /// Take the mapping out of a container value.
    pub fn into_dict(self) -> Option<AttrDict> {
        match self {
            Value::Dict(d) => Some(d),
            Value::Config(c) => Some(c.into_dict()),
            _ => None,
        }
    }

    /// Attribute-style access: the value stored under `key` in this container.
    pub fn attr(&self, key: &str) -> Result<&Value> {
        match self.as_dict() {
            Some(dict) => dict.attr(key),
            None => Err(Error::KeyNotFound(key.to_string())),
        }
    }

    /// Convert raw JSON into a value, turning nested objects into `Dict`s.
    pub fn from_json(value: &JsonValue) -> Result<Value> {
        crate::convert::convert_value::<AttrDict>(value, false)
    }

    /// Render back into raw JSON. Non-finite floats become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Integer(i) => JsonValue::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::List(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Dict(d) => d.to_json(),
            Value::Config(c) => c.to_json(),
        }
    }

    /// Text form of a scalar as written to the environment.
    pub(crate) fn scalar_text(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Float(f) => Some(format!("{f:?}")),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scalar_text() {
            Some(text) => f.write_str(&text),
            None => write!(f, "{}", self.to_json()),
        }
    }
}

impl Index<&str> for Value {
    type Output = Value;

    /// Missing keys and non-container values index to `Null`.
    fn index(&self, key: &str) -> &Value {
        self.as_dict().and_then(|d| d.get(key)).unwrap_or(&NULL)
    }
}

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, idx: usize) -> &Value {
        self.as_list().and_then(|items| items.get(idx)).unwrap_or(&NULL)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => items.serialize(serializer),
            Value::Dict(d) => d.serialize(serializer),
            Value::Config(c) => c.serialize(serializer),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i.into())
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<AttrDict> for Value {
    fn from(d: AttrDict) -> Self {
        Value::Dict(d)
    }
}

impl From<Config> for Value {
    fn from(c: Config) -> Self {
        Value::Config(c)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_nested() {
        let value = Value::from_json(&json!({"a": [{"b": 1}, 2.5, null]})).unwrap();
        assert!(value["a"][0].is_container());
        assert_eq!(value["a"][0]["b"].as_i64(), Some(1));
        assert_eq!(value["a"][1].as_f64(), Some(2.5));
        assert!(value["a"][2].is_null());
    }

    #[test]
    fn test_index_misses_are_null() {
        let value = Value::from(3);
        assert!(value["x"].is_null());
        assert!(value[4].is_null());
    }

    #[test]
    fn test_attr_on_scalar_fails() {
        let err = Value::from("s").attr("x").unwrap_err();
        assert!(matches!(err, Error::KeyNotFound(ref k) if k == "x"));
    }

    #[test]
    fn test_to_json_round_trip() {
        let raw = json!({"a": {"b": [1, "two", true]}, "c": 1.5});
        assert_eq!(Value::from_json(&raw).unwrap().to_json(), raw);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(1.0).to_string(), "1.0");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(vec![Value::from(1)]).to_string(), "[1]");
    }

    #[test]
    fn test_option_conversion() {
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::from(Some("x")).as_str(), Some("x"));
    }
}
