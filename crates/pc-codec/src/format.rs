//! Format detection and dispatch.

use pc_common::{Error, Result};
use serde_json::{Map, Number, Value as JsonValue};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Raw nested data produced by every codec.
pub type RawMap = Map<String, JsonValue>;

/// A supported config file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigFormat {
    Toml,
    Json,
    Ini,
    Yaml,
}

impl ConfigFormat {
    /// Formats in the order they are tried when searching by app name.
    pub const SEARCH_ORDER: [ConfigFormat; 4] = [
        ConfigFormat::Toml,
        ConfigFormat::Json,
        ConfigFormat::Ini,
        ConfigFormat::Yaml,
    ];

    /// Canonical file extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
            ConfigFormat::Ini => "ini",
            ConfigFormat::Yaml => "yaml",
        }
    }

    /// Human-readable format name used in errors.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
            ConfigFormat::Ini => "INI",
            ConfigFormat::Yaml => "YAML",
        }
    }

    /// Look up a format by extension. A leading dot is accepted.
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.trim_start_matches('.') {
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            "ini" => Ok(ConfigFormat::Ini),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            other => Err(Error::UnsupportedFormat(format!(".{other}"))),
        }
    }

    /// Look up a format from a file path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))?;
        Self::from_extension(ext)
    }

    /// The content written when a config file of this format is created empty.
    pub fn empty_document(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "{}\n",
            _ => "",
        }
    }

    /// Parse a document into raw nested data.
    pub fn parse(&self, text: &str) -> Result<RawMap> {
        match self {
            ConfigFormat::Toml => parse_toml(text),
            ConfigFormat::Json => parse_json(text),
            ConfigFormat::Ini => crate::ini::parse_ini(text),
            ConfigFormat::Yaml => parse_yaml(text),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Read and parse a config file, dispatching on its extension.
pub fn parse_file(path: &Path) -> Result<(ConfigFormat, RawMap)> {
    let format = ConfigFormat::from_path(path)?;
    // Fail on a missing codec before touching the file.
    if format == ConfigFormat::Yaml && !cfg!(feature = "yaml") {
        return Err(yaml_missing());
    }
    let text = std::fs::read_to_string(path)?;
    let raw = format.parse(&text).map_err(|e| match e {
        Error::Parse {
            format, message, ..
        } => Error::Parse {
            format,
            path: Some(path.to_path_buf()),
            message,
        },
        other => other,
    })?;
    debug!(path = %path.display(), format = %format, keys = raw.len(), "parsed config file");
    Ok((format, raw))
}

fn parse_json(text: &str) -> Result<RawMap> {
    let value: JsonValue = serde_json::from_str(text).map_err(|e| Error::Parse {
        format: "JSON",
        path: None,
        message: e.to_string(),
    })?;
    match value {
        JsonValue::Object(map) => Ok(map),
        JsonValue::Null => Ok(RawMap::new()),
        other => Err(Error::NotAMapping {
            format: "JSON",
            found: json_kind(&other),
        }),
    }
}

fn parse_toml(text: &str) -> Result<RawMap> {
    let table: toml::Table = toml::from_str(text).map_err(|e| Error::Parse {
        format: "TOML",
        path: None,
        message: e.message().trim().to_string(),
    })?;
    Ok(table
        .into_iter()
        .map(|(k, v)| (k, toml_to_json(v)))
        .collect())
}

fn toml_to_json(value: toml::Value) -> JsonValue {
    match value {
        toml::Value::String(s) => JsonValue::String(s),
        toml::Value::Integer(i) => JsonValue::Number(i.into()),
        toml::Value::Float(f) => float_to_json(f),
        toml::Value::Boolean(b) => JsonValue::Bool(b),
        toml::Value::Datetime(dt) => JsonValue::String(dt.to_string()),
        toml::Value::Array(items) => JsonValue::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => JsonValue::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// JSON has no NaN or infinity; keep them as their textual form.
fn float_to_json(f: f64) -> JsonValue {
    Number::from_f64(f)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(f.to_string()))
}

#[cfg(feature = "yaml")]
fn parse_yaml(text: &str) -> Result<RawMap> {
    let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| Error::Parse {
        format: "YAML",
        path: None,
        message: e.to_string(),
    })?;
    match yaml_to_json(value)? {
        JsonValue::Object(map) => Ok(map),
        // An empty document parses as null.
        JsonValue::Null => Ok(RawMap::new()),
        other => Err(Error::NotAMapping {
            format: "YAML",
            found: json_kind(&other),
        }),
    }
}

#[cfg(not(feature = "yaml"))]
fn parse_yaml(_text: &str) -> Result<RawMap> {
    Err(yaml_missing())
}

fn yaml_missing() -> Error {
    Error::MissingDependency {
        format: "YAML",
        feature: "yaml",
    }
}

#[cfg(feature = "yaml")]
fn yaml_to_json(value: serde_yaml::Value) -> Result<JsonValue> {
    use serde_yaml::Value as Y;

    Ok(match value {
        Y::Null => JsonValue::Null,
        Y::Bool(b) => JsonValue::Bool(b),
        Y::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                JsonValue::Number(u.into())
            } else {
                float_to_json(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Y::String(s) => JsonValue::String(s),
        Y::Sequence(items) => JsonValue::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        Y::Mapping(mapping) => {
            let mut map = RawMap::new();
            for (k, v) in mapping {
                map.insert(yaml_key(k)?, yaml_to_json(v)?);
            }
            JsonValue::Object(map)
        }
        Y::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

/// Scalar YAML keys are stringified; compound keys cannot become config keys.
#[cfg(feature = "yaml")]
fn yaml_key(key: serde_yaml::Value) -> Result<String> {
    use serde_yaml::Value as Y;

    match key {
        Y::String(s) => Ok(s),
        Y::Bool(b) => Ok(b.to_string()),
        Y::Number(n) => Ok(n.to_string()),
        Y::Null => Ok("null".to_string()),
        Y::Tagged(tagged) => yaml_key(tagged.value),
        Y::Sequence(_) | Y::Mapping(_) => Err(Error::Parse {
            format: "YAML",
            path: None,
            message: "mapping keys must be scalars".to_string(),
        }),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
