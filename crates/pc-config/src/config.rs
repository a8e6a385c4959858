//! Provenance-tracked configs.

use crate::attr_dict::AttrDict;
use crate::convert::Container;
use crate::loader::{load_config, ConfigSource, LoadOptions};
use crate::provenance::{ledger, Provenance, ProvenanceOp};
use crate::value::Value;
use pc_codec::RawMap;
use pc_common::{ConfigId, Error, Result};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// A nested config container that remembers where its contents came from.
///
/// Reads go through [`Deref`] to the underlying [`AttrDict`]. Direct writes
/// (`insert`, `remove`, `merge`) are not recorded; [`Config::update`] and the
/// loading entry points are.
///
/// Dropping a config removes its history from the ledger.
#[derive(Debug)]
pub struct Config {
    id: ConfigId,
    dict: AttrDict,
}

impl Config {
    /// An empty tracked config with a single `set` record from `"dict"`.
    pub fn new() -> Self {
        Self::with_provenance(AttrDict::new(), true)
    }

    /// Wrap an already-built container, registering it with the ledger.
    pub fn with_provenance(dict: AttrDict, enable_provenance: bool) -> Self {
        let id = ConfigId::next();
        let ledger = ledger();
        ledger.set_enabled(id, enable_provenance);
        ledger.append(id, Provenance::dict(ProvenanceOp::Set));
        Self { id, dict }
    }

    /// Build from already-typed top-level entries, provenance enabled.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::from_entries_with(entries, true)
    }

    pub fn from_entries_with<I, K, V>(entries: I, enable_provenance: bool) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let dict = AttrDict::from_entries(entries)?;
        Ok(Self::with_provenance(dict, enable_provenance))
    }

    /// Recursively convert raw nested data.
    ///
    /// With `same_class` every nested mapping becomes a tracked `Config` of
    /// its own; otherwise nested mappings are plain [`AttrDict`]s.
    pub fn from_dict(raw: &RawMap, same_class: bool) -> Result<Self> {
        crate::convert::from_dict::<Config>(raw, same_class)
    }

    pub fn from_json(value: &JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(raw) => Self::from_dict(raw, false),
            _ => Err(Error::Config(
                "a config literal must be a mapping".to_string(),
            )),
        }
    }

    /// Build from any serializable value whose serialized form is a mapping,
    /// e.g. a settings struct with defaults.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self> {
        Self::from_json(&serde_json::to_value(value)?)
    }

    pub fn id(&self) -> ConfigId {
        self.id
    }

    pub fn dict(&self) -> &AttrDict {
        &self.dict
    }

    pub fn dict_mut(&mut self) -> &mut AttrDict {
        &mut self.dict
    }

    /// The recorded history, oldest first. Empty when tracking is disabled.
    pub fn provenance(&self) -> Vec<Provenance> {
        ledger().get(self.id)
    }

    pub fn is_provenance_enabled(&self) -> bool {
        ledger().is_enabled(self.id)
    }

    /// Merge `other` in and record an `update` from `"dict"`.
    pub fn update(&mut self, other: impl Into<AttrDict>) {
        self.update_with(other, true);
    }

    pub fn update_with(&mut self, other: impl Into<AttrDict>, add_to_provenance: bool) {
        self.dict.merge(other.into());
        if add_to_provenance {
            ledger().append(self.id, Provenance::dict(ProvenanceOp::Update));
        }
    }

    /// Drop every key and the recorded history.
    pub fn clear(&mut self) {
        ledger().clear(self.id);
        self.dict.clear();
    }

    /// Load another config and absorb it, keeping its history.
    pub fn load(&mut self, source: impl Into<ConfigSource>, options: &LoadOptions) -> Result<()> {
        let loaded = load_config(source, options)?;
        self.absorb(loaded);
        Ok(())
    }

    /// Merge `other` into this config and append its history to ours.
    pub fn absorb(&mut self, other: Config) {
        let history = other.provenance();
        debug!(into = %self.id, from = %other.id, records = history.len(), "absorbing config");
        self.dict.merge(other.into_dict());
        ledger().extend(self.id, history);
    }

    /// Deserialize the whole config into a typed value.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_json())?)
    }

    /// Deserialize one top-level section into a typed value.
    pub fn extract_section<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        Ok(serde_json::from_value(self.dict.attr(key)?.to_json())?)
    }

    /// Give up tracking and return the plain container.
    pub fn into_dict(mut self) -> AttrDict {
        std::mem::take(&mut self.dict)
    }

    pub fn to_json(&self) -> JsonValue {
        self.dict.to_json()
    }
}

impl Container for Config {
    fn build(entries: AttrDict) -> Self {
        Config::with_provenance(entries, true)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Config {
    type Target = AttrDict;

    fn deref(&self) -> &AttrDict {
        &self.dict
    }
}

impl DerefMut for Config {
    fn deref_mut(&mut self) -> &mut AttrDict {
        &mut self.dict
    }
}

impl Drop for Config {
    fn drop(&mut self) {
        ledger().delete(self.id);
    }
}

/// A clone is a new config: fresh identity, same contents, same history.
impl Clone for Config {
    fn clone(&self) -> Self {
        let id = ConfigId::next();
        let ledger = ledger();
        let enabled = ledger.is_enabled(self.id);
        ledger.set_enabled(id, enabled);
        ledger.extend(id, ledger.get(self.id));
        Self {
            id,
            dict: self.dict.clone(),
        }
    }
}

/// Configs compare by contents; identity and history are ignored.
impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.dict == other.dict
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.dict.serialize(serializer)
    }
}

impl From<Config> for AttrDict {
    fn from(config: Config) -> Self {
        config.into_dict()
    }
}
