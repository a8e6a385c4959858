//! Exporting configs to process environment variables.
//!
//! Naming: nested containers extend the name with `_<key>`, list elements
//! append their index to the key, so `{"a": [{"b": 1}]}` exports `A0_B=1`.

use crate::attr_dict::AttrDict;
use crate::value::Value;
use pc_common::{Error, Result};
use tracing::debug;

/// Options for [`AttrDict::to_env`].
#[derive(Debug, Clone)]
pub struct EnvExportOptions {
    /// Prepended to every name, joined with `_`.
    pub prefix: String,
    /// Upper-case the final names.
    pub to_upper: bool,
    /// Replace variables that are already set.
    pub overwrite: bool,
    /// Skip values with no text form instead of failing.
    pub ignore_unsupported: bool,
}

impl Default for EnvExportOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            to_upper: true,
            overwrite: false,
            ignore_unsupported: false,
        }
    }
}

impl EnvExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_to_upper(mut self, to_upper: bool) -> Self {
        self.to_upper = to_upper;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_ignore_unsupported(mut self, ignore: bool) -> Self {
        self.ignore_unsupported = ignore;
        self
    }
}

impl AttrDict {
    /// Flatten into `(NAME, value)` pairs without touching the environment.
    pub fn env_pairs(&self, options: &EnvExportOptions) -> Result<Vec<(String, String)>> {
        let mut pairs = Vec::new();
        collect_dict(self, &options.prefix, options, &mut pairs)?;
        Ok(pairs)
    }

    /// Export to the process environment and return the pairs written.
    ///
    /// Names are computed up front, so a failure leaves the environment
    /// untouched.
    pub fn to_env(&self, options: &EnvExportOptions) -> Result<Vec<(String, String)>> {
        let mut written = Vec::new();
        for (name, value) in self.env_pairs(options)? {
            if !options.overwrite && std::env::var_os(&name).is_some() {
                debug!(name = %name, "environment variable already set, skipping");
                continue;
            }
            std::env::set_var(&name, &value);
            written.push((name, value));
        }
        debug!(count = written.len(), "exported config to environment");
        Ok(written)
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}_{key}")
    }
}

fn collect_dict(
    dict: &AttrDict,
    prefix: &str,
    options: &EnvExportOptions,
    out: &mut Vec<(String, String)>,
) -> Result<()> {
    for (key, value) in dict {
        collect_value(value, &join(prefix, key), options, out)?;
    }
    Ok(())
}

fn collect_value(
    value: &Value,
    name: &str,
    options: &EnvExportOptions,
    out: &mut Vec<(String, String)>,
) -> Result<()> {
    match value {
        Value::List(items) => {
            for (idx, item) in items.iter().enumerate() {
                collect_value(item, &format!("{name}{idx}"), options, out)?;
            }
        }
        Value::Dict(_) | Value::Config(_) => {
            if let Some(dict) = value.as_dict() {
                collect_dict(dict, name, options, out)?;
            }
        }
        scalar => match scalar.scalar_text() {
            Some(text) => {
                let name = if options.to_upper {
                    name.to_uppercase()
                } else {
                    name.to_string()
                };
                out.push((name, text));
            }
            None if options.ignore_unsupported => {}
            None => {
                return Err(Error::EnvExport {
                    key: name.to_string(),
                    kind: scalar.kind(),
                })
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dict(value: serde_json::Value) -> AttrDict {
        AttrDict::from_json(&value).unwrap()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_nested_names() {
        let d = dict(json!({"a": {"b": 1, "c": {"d": 2}}}));
        assert_eq!(
            d.env_pairs(&EnvExportOptions::new()).unwrap(),
            pairs(&[("A_B", "1"), ("A_C_D", "2")])
        );
    }

    #[test]
    fn test_list_elements_indexed() {
        let d = dict(json!({"a": [{"b": 1}, {"b": 2}], "l": ["x", true, 1.5]}));
        assert_eq!(
            d.env_pairs(&EnvExportOptions::new()).unwrap(),
            pairs(&[
                ("A0_B", "1"),
                ("A1_B", "2"),
                ("L0", "x"),
                ("L1", "true"),
                ("L2", "1.5"),
            ])
        );
    }

    #[test]
    fn test_list_elements_nest_further() {
        let d = dict(json!({"a": [{"b": 1}, {"b": {"c": 2}}]}));
        assert_eq!(
            d.env_pairs(&EnvExportOptions::new()).unwrap(),
            pairs(&[("A0_B", "1"), ("A1_B_C", "2")])
        );
    }

    #[test]
    fn test_prefix_and_case() {
        let d = dict(json!({"key": "v"}));
        let opts = EnvExportOptions::new().with_prefix("app").with_to_upper(false);
        assert_eq!(d.env_pairs(&opts).unwrap(), pairs(&[("app_key", "v")]));
    }

    #[test]
    fn test_null_leaf() {
        let d = dict(json!({"a": {"b": null}, "c": 1}));
        let err = d.env_pairs(&EnvExportOptions::new()).unwrap_err();
        assert!(matches!(err, Error::EnvExport { ref key, kind: "null" } if key == "a_b"));

        let opts = EnvExportOptions::new().with_ignore_unsupported(true);
        assert_eq!(d.env_pairs(&opts).unwrap(), pairs(&[("C", "1")]));
    }
}
