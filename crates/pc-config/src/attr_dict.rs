//! Attribute-accessible nested mapping.
//!
//! `AttrDict` is the container every config is built from. Keys are strings,
//! values are [`Value`]s, and any nested mapping is itself a container, so a
//! path like `server.tls.cert` can be walked with [`AttrDict::get_nested`] or
//! step by step with [`AttrDict::attr`] / [`Value::attr`].
//!
//! Keys are kept in sorted order, which keeps iteration, env export and
//! serialization deterministic.

use crate::value::Value;
use pc_codec::RawMap;
use pc_common::{Error, Result};
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::ops::Index;

/// Names of container operations. A config key may not shadow one of them.
pub const RESERVED_KEYS: &[&str] = &[
    "clear",
    "from_dict",
    "get",
    "get_nested",
    "insert",
    "items",
    "keys",
    "load_config",
    "merge",
    "provenance",
    "remove",
    "to_env",
    "update",
    "values",
];

/// Check whether `key` collides with a container operation.
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

pub(crate) fn check_key(key: &str) -> Result<()> {
    if is_reserved(key) {
        return Err(Error::ReservedKey(key.to_string()));
    }
    Ok(())
}

/// A nested string-keyed mapping of config values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttrDict {
    entries: BTreeMap<String, Value>,
}

impl AttrDict {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a container over already-typed top-level entries.
    ///
    /// Values are taken as they are; use [`AttrDict::from_dict`] to convert
    /// raw nested data.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut dict = Self::new();
        for (key, value) in entries {
            dict.insert(key, value)?;
        }
        Ok(dict)
    }

    /// Recursively convert raw nested data into a container.
    pub fn from_dict(raw: &RawMap) -> Result<Self> {
        crate::convert::from_dict::<AttrDict>(raw, false)
    }

    /// Like [`AttrDict::from_dict`], for a JSON value that must be an object.
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(raw) => Self::from_dict(raw),
            _ => Err(Error::Config(
                "a config literal must be a mapping".to_string(),
            )),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Attribute-style access. Fails with `KeyNotFound` for a missing key.
    pub fn attr(&self, key: &str) -> Result<&Value> {
        self.entries
            .get(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    /// Insert a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<Option<Value>> {
        let key = key.into();
        check_key(&key)?;
        Ok(self.entries.insert(key, value.into()))
    }

    /// Insert without the reserved-key check; callers have already validated.
    pub(crate) fn insert_unchecked(&mut self, key: String, value: Value) {
        self.entries.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Merge `other` into this container.
    ///
    /// When both sides hold a container under the same key the two are
    /// merged recursively; any other collision is overwritten by `other`.
    pub fn merge(&mut self, other: AttrDict) {
        for (key, incoming) in other.entries {
            if let Some(existing) = self.entries.get_mut(&key) {
                if existing.is_container() && incoming.is_container() {
                    if let (Some(target), Some(source)) = (existing.as_dict_mut(), incoming.into_dict()) {
                        target.merge(source);
                    }
                    continue;
                }
            }
            self.entries.insert(key, incoming);
        }
    }

    /// Resolve a dotted path, stepping into the first element of any list
    /// met along the way.
    ///
    /// ```
    /// # use pc_config::AttrDict;
    /// # use serde_json::json;
    /// let d = AttrDict::from_json(&json!({"a": [{"b": 1}, {"b": 2}]})).unwrap();
    /// assert_eq!(d.get_nested("a.b").unwrap().as_i64(), Some(1));
    /// ```
    pub fn get_nested(&self, path: &str) -> Result<&Value> {
        self.get_nested_with(path, Some(0))
    }

    /// Resolve a dotted path, selecting `list_item` from intermediate lists.
    /// `None` disables list stepping, so a path through a list fails.
    pub fn get_nested_with(&self, path: &str, list_item: Option<usize>) -> Result<&Value> {
        let missing = || Error::KeyNotFound(path.to_string());
        if path.is_empty() {
            return Err(missing());
        }

        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let mut current = self.entries.get(first).ok_or_else(missing)?;
        for segment in segments {
            if let Value::List(items) = current {
                let idx = list_item.ok_or_else(missing)?;
                current = items.get(idx).ok_or_else(missing)?;
            }
            current = current
                .as_dict()
                .and_then(|d| d.get(segment))
                .ok_or_else(missing)?;
        }
        Ok(current)
    }

    /// Resolve a dotted path, falling back to `default` when any segment is
    /// missing. An empty path is still an error.
    pub fn get_nested_or<'a>(
        &'a self,
        path: &str,
        default: &'a Value,
        list_item: Option<usize>,
    ) -> Result<&'a Value> {
        match self.get_nested_with(path, list_item) {
            Ok(value) => Ok(value),
            Err(_) if !path.is_empty() => Ok(default),
            Err(e) => Err(e),
        }
    }

    /// Render back into raw JSON.
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl Index<&str> for AttrDict {
    type Output = Value;

    /// Missing keys index to `Null`, as with `serde_json::Value`.
    fn index(&self, key: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.entries.get(key).unwrap_or(&NULL)
    }
}

impl<'a> IntoIterator for &'a AttrDict {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for AttrDict {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for AttrDict {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}
