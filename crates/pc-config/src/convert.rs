//! Recursive conversion from raw nested data into containers.
//!
//! Two policies, chosen per call with `same_class`:
//! - uniform (`false`): the root is built as `C`, everything below it as a
//!   plain [`AttrDict`].
//! - same-class (`true`): every nested mapping is built as `C` too, so a
//!   tracked root yields tracked children with their own ledger entries.
//!
//! Lists are walked element by element; mapping elements are converted with
//! the same policy and scalars pass through.

use crate::attr_dict::{check_key, AttrDict};
use crate::value::Value;
use pc_codec::RawMap;
use pc_common::Result;
use serde_json::Value as JsonValue;

/// A container type that can be built over converted entries.
pub trait Container: Sized + Into<Value> {
    /// Wrap an already-converted mapping.
    fn build(entries: AttrDict) -> Self;
}

impl Container for AttrDict {
    fn build(entries: AttrDict) -> Self {
        entries
    }
}

/// Convert a raw mapping into `C`, recursing with the chosen policy.
pub fn from_dict<C: Container>(raw: &RawMap, same_class: bool) -> Result<C> {
    let mut entries = AttrDict::new();
    for (key, value) in raw {
        check_key(key)?;
        entries.insert_unchecked(key.clone(), convert_value::<C>(value, same_class)?);
    }
    Ok(C::build(entries))
}

pub(crate) fn convert_value<C: Container>(value: &JsonValue, same_class: bool) -> Result<Value> {
    Ok(match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::List(
            items
                .iter()
                .map(|item| convert_value::<C>(item, same_class))
                .collect::<Result<Vec<_>>>()?,
        ),
        JsonValue::Object(map) if same_class => from_dict::<C>(map, true)?.into(),
        JsonValue::Object(map) => Value::Dict(from_dict::<AttrDict>(map, false)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pc_common::Error;
    use serde_json::json;

    fn raw(value: JsonValue) -> RawMap {
        match value {
            JsonValue::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_list_of_dicts() {
        let d: AttrDict = from_dict(&raw(json!({"a": 1, "b": [{"c": 2}, {"d": 3}]})), false).unwrap();
        assert_eq!(d["a"].as_i64(), Some(1));
        assert!(matches!(d["b"][0], Value::Dict(_)));
        assert_eq!(d["b"][0]["c"].as_i64(), Some(2));
        assert_eq!(d["b"][1]["d"].as_i64(), Some(3));
    }

    #[test]
    fn test_nested_lists_pass_scalars_through() {
        let d: AttrDict = from_dict(&raw(json!({"m": [[1, {"x": true}], "s"]})), false).unwrap();
        assert_eq!(d["m"][0][0].as_i64(), Some(1));
        assert_eq!(d["m"][0][1]["x"].as_bool(), Some(true));
        assert_eq!(d["m"][1].as_str(), Some("s"));
    }

    #[test]
    fn test_large_unsigned_becomes_float() {
        let d: AttrDict = from_dict(&raw(json!({"big": u64::MAX})), false).unwrap();
        assert!(matches!(d["big"], Value::Float(_)));
    }

    #[test]
    fn test_reserved_key_in_list_element() {
        let err = from_dict::<AttrDict>(&raw(json!({"a": [{"keys": 1}]})), false).unwrap_err();
        assert!(matches!(err, Error::ReservedKey(ref k) if k == "keys"));
    }
}
