//! Loading configs from mappings, paths and app names.

use crate::config::Config;
use crate::provenance::{ledger, Provenance, ProvenanceOp};
use crate::search::{expand_tilde, find_config, find_config_from_appname, system_config_dir};
use pc_codec::{parse_file, ConfigFormat, RawMap};
use pc_common::{Error, Result};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Source used when none is given.
pub const DEFAULT_CONFIG_NAME: &str = ".config.toml";

/// Where a config comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// In-memory nested data.
    Dict(RawMap),
    /// A file path, a file name to search for, or an app name.
    Name(String),
}

impl ConfigSource {
    /// A mapping literal; anything but a JSON object is rejected.
    pub fn from_json(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(map) => Ok(ConfigSource::Dict(map)),
            _ => Err(Error::Config(
                "a config literal must be a mapping".to_string(),
            )),
        }
    }
}

impl Default for ConfigSource {
    fn default() -> Self {
        ConfigSource::Name(DEFAULT_CONFIG_NAME.to_string())
    }
}

impl From<&str> for ConfigSource {
    fn from(name: &str) -> Self {
        ConfigSource::Name(name.to_string())
    }
}

impl From<String> for ConfigSource {
    fn from(name: String) -> Self {
        ConfigSource::Name(name)
    }
}

impl From<&Path> for ConfigSource {
    fn from(path: &Path) -> Self {
        ConfigSource::Name(path.display().to_string())
    }
}

impl From<PathBuf> for ConfigSource {
    fn from(path: PathBuf) -> Self {
        ConfigSource::from(path.as_path())
    }
}

impl From<RawMap> for ConfigSource {
    fn from(map: RawMap) -> Self {
        ConfigSource::Dict(map)
    }
}

/// Options for loading a config.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// File searched for under an app name instead of `config.<ext>`.
    pub file: Option<String>,
    /// Directories to search instead of the defaults.
    pub directories: Option<Vec<PathBuf>>,
    /// Return an empty config instead of failing when nothing is found.
    pub ignore_missing: bool,
    /// Create a missing file when setting the global config.
    pub create_if_missing: bool,
    /// Format of a created file.
    pub create_format: ConfigFormat,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            file: None,
            directories: None,
            ignore_missing: false,
            create_if_missing: true,
            create_format: ConfigFormat::Toml,
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Search only these directories. A leading `~` is expanded.
    pub fn with_directories<I, P>(mut self, directories: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.directories = Some(
            directories
                .into_iter()
                .map(|d| expand_tilde(d.as_ref()))
                .collect(),
        );
        self
    }

    pub fn with_directory(self, directory: impl AsRef<Path>) -> Self {
        self.with_directories([directory])
    }

    pub fn with_ignore_missing(mut self, ignore: bool) -> Self {
        self.ignore_missing = ignore;
        self
    }

    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn with_create_format(mut self, format: ConfigFormat) -> Self {
        self.create_format = format;
        self
    }

    pub(crate) fn directories(&self) -> Option<&[PathBuf]> {
        self.directories.as_deref()
    }
}

/// Load a config from a mapping, a path or an app name.
///
/// A name that is not found as a path is retried as an app name. With
/// `ignore_missing` a final miss yields an empty config.
pub fn load_config(source: impl Into<ConfigSource>, options: &LoadOptions) -> Result<Config> {
    let name = match source.into() {
        ConfigSource::Dict(raw) => return load_from_dict(&raw),
        ConfigSource::Name(name) => name,
    };

    match load_from_path(&name, options.directories()) {
        Err(e) if e.is_not_found() => {}
        other => return other,
    }

    match load_from_appname(&name, options.file.as_deref(), options.directories()) {
        Err(e) if e.is_not_found() && options.ignore_missing => {
            debug!(name = %name, "no config found, using an empty one");
            Config::from_dict(&RawMap::new(), false)
        }
        other => other,
    }
}

/// Build a config from in-memory data.
pub fn load_from_dict(raw: &RawMap) -> Result<Config> {
    Config::from_dict(raw, false)
}

/// Find and load a config file. Its history is a single `set` from the
/// file's absolute path.
pub fn load_from_path(path: &str, directories: Option<&[PathBuf]>) -> Result<Config> {
    let found = find_config(path, directories).ok_or_else(|| Error::ConfigNotFound {
        name: path.to_string(),
    })?;
    load_found_path(&found)
}

fn load_found_path(found: &Path) -> Result<Config> {
    let config = load_config_file(found)?;
    let absolute = std::path::absolute(found)?;
    ledger().set(config.id(), Provenance::file(&absolute, ProvenanceOp::Set));
    info!(path = %absolute.display(), keys = config.len(), "loaded config");
    Ok(config)
}

/// Find and load the config of an app, optionally a specific file of it.
pub fn load_from_appname(
    appname: &str,
    file: Option<&str>,
    directories: Option<&[PathBuf]>,
) -> Result<Config> {
    match find_config_from_appname(appname, file, directories) {
        Some(path) => load_found_path(&path),
        None => {
            warn!(
                appname,
                file = file.unwrap_or_default(),
                create_at = %system_config_dir(Some(appname)).display(),
                "no config file found for app; one can be created at the system config dir"
            );
            Err(Error::ConfigNotFound {
                name: appname.to_string(),
            })
        }
    }
}

/// Parse one config file into a config with a `"dict"` history.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let (_, raw) = parse_file(path)?;
    Config::from_dict(&raw, false)
}
