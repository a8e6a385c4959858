//! The process-wide default config.
//!
//! One [`Config`] lives for the whole process. [`set_config`] and
//! [`update_config`] mutate it in place, so its identity and ledger entry
//! never change. Neither keeps the lock once it returns: the
//! [`GlobalConfig`] handle they give back reads the current contents on
//! every call, so it observes later loads.

use crate::config::Config;
use crate::loader::{ConfigSource, LoadOptions};
use crate::provenance::Provenance;
use crate::search::{find_config, has_extension, system_config_dir};
use crate::value::Value;
use pc_codec::ConfigFormat;
use pc_common::{ConfigId, Result};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::fs;
use std::path::PathBuf;
use std::sync::{LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

static GLOBAL_CONFIG: LazyLock<RwLock<Config>> = LazyLock::new(|| RwLock::new(Config::new()));

fn read_lock() -> RwLockReadGuard<'static, Config> {
    GLOBAL_CONFIG.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock() -> RwLockWriteGuard<'static, Config> {
    GLOBAL_CONFIG.write().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to the process-wide config.
///
/// Holds no lock. Each accessor locks for the duration of the call only,
/// except [`GlobalConfig::read`], whose guard blocks writers until dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalConfig;

impl GlobalConfig {
    /// Borrow the config until the guard is dropped.
    pub fn read(&self) -> RwLockReadGuard<'static, Config> {
        read_lock()
    }

    /// Run `f` against the current contents.
    pub fn with<R>(&self, f: impl FnOnce(&Config) -> R) -> R {
        f(&read_lock())
    }

    pub fn id(&self) -> ConfigId {
        self.with(Config::id)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.with(|config| config.get(key).cloned())
    }

    pub fn get_nested(&self, path: &str) -> Result<Value> {
        self.with(|config| config.get_nested(path).cloned())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.with(|config| config.contains_key(key))
    }

    pub fn len(&self) -> usize {
        self.with(|config| config.len())
    }

    pub fn is_empty(&self) -> bool {
        self.with(|config| config.is_empty())
    }

    pub fn provenance(&self) -> Vec<Provenance> {
        self.with(Config::provenance)
    }

    pub fn extract<T: DeserializeOwned>(&self) -> Result<T> {
        self.with(|config| config.extract())
    }

    pub fn to_json(&self) -> JsonValue {
        self.with(Config::to_json)
    }

    /// A detached copy with its own id and a copy of the history.
    pub fn snapshot(&self) -> Config {
        self.with(Config::clone)
    }
}

/// Handle to the process-wide config.
pub fn global_config() -> GlobalConfig {
    GlobalConfig
}

/// Run `f` against the process-wide config.
pub fn with_global_config<R>(f: impl FnOnce(&Config) -> R) -> R {
    GlobalConfig.with(f)
}

/// Replace the contents of the global config with `source`.
///
/// With `create_if_missing`, a file name or app name that cannot be found
/// gets an empty config file created for it first.
pub fn set_config(
    source: impl Into<ConfigSource>,
    options: &LoadOptions,
) -> Result<GlobalConfig> {
    let source = source.into();
    let mut options = options.clone();
    if let ConfigSource::Name(name) = &source {
        if options.create_if_missing && find_config(name, options.directories()).is_none() {
            let search_dir = create_config_file(name, &options)?;
            options.directories = Some(vec![search_dir]);
        }
    }

    let mut config = write_lock();
    config.clear();
    config.load(source, &options)?;
    Ok(GlobalConfig)
}

/// Merge `source` into the global config.
pub fn update_config(
    source: impl Into<ConfigSource>,
    options: &LoadOptions,
) -> Result<GlobalConfig> {
    write_lock().load(source, options)?;
    Ok(GlobalConfig)
}

/// Create an empty config file for `name` and return the directory the
/// loader should search to find it.
fn create_config_file(name: &str, options: &LoadOptions) -> Result<PathBuf> {
    let named_file = has_extension(name);
    let base = match options.directories().and_then(|dirs| dirs.first()) {
        Some(dir) => dir.clone(),
        None if named_file => PathBuf::from("."),
        None => system_config_dir(None),
    };

    let (path, search_dir) = if named_file {
        (base.join(name), base)
    } else {
        let app_dir = base.join(name);
        let file = format!("config.{}", options.create_format.extension());
        (app_dir.join(file), app_dir)
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = ConfigFormat::from_path(&path)
        .unwrap_or(options.create_format)
        .empty_document();
    fs::write(&path, contents)?;
    info!(path = %path.display(), name, "created config file");
    Ok(search_dir)
}
