//! INI codec on top of `rust-ini`.
//!
//! Handles the common INI dialect:
//!
//! ```text
//! [DEFAULT]
//! root = /srv
//!
//! [server]
//! ; `=` or `:` separate keys from values
//! host = localhost
//! # `%(key)s` interpolates within the section
//! data = %(root)s/data
//! # deeper indentation continues the value
//! motd = first line
//!     continued line
//! ```
//!
//! Keys are case-insensitive and stored lowercase. `DEFAULT` entries are
//! inherited by every section and do not appear as a section themselves.
//! Every leaf is a string; no type coercion is attempted. Quotes and
//! backslashes are kept verbatim.

use crate::format::RawMap;
use ::ini::{Ini, ParseOption};
use pc_common::{Error, Result};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

const DEFAULT_SECTION: &str = "DEFAULT";

/// Nested `%(key)s` references are followed at most this deep.
const MAX_INTERPOLATION_DEPTH: usize = 10;

type Section = BTreeMap<String, String>;

fn parse_options() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        enabled_indented_mutiline_value: true,
        ..ParseOption::default()
    }
}

/// Parse INI text into `{section: {key: "value"}}`.
pub fn parse_ini(text: &str) -> Result<RawMap> {
    let ini = Ini::load_from_str_opt(text, parse_options()).map_err(|err| {
        ini_error(format!("line {}, column {}: {}", err.line, err.col, err.msg))
    })?;

    let mut defaults = Section::new();
    let mut sections: Vec<(String, Section)> = Vec::new();
    for (name, properties) in ini.iter() {
        let target = match name.map(str::trim) {
            None if properties.iter().next().is_none() => continue,
            None => return Err(ini_error("entry appears before any section header")),
            Some(DEFAULT_SECTION) => &mut defaults,
            Some(name) => {
                let pos = match sections.iter().position(|(n, _)| n == name) {
                    Some(pos) => pos,
                    None => {
                        sections.push((name.to_string(), Section::new()));
                        sections.len() - 1
                    }
                };
                &mut sections[pos].1
            }
        };
        for (key, value) in properties.iter() {
            let key = key.trim().to_lowercase();
            if key.is_empty() {
                return Err(ini_error(format!("[{}] empty key", name.unwrap_or_default())));
            }
            target.insert(key, value.trim().to_string());
        }
    }

    let mut raw = RawMap::new();
    for (name, entries) in sections {
        let mut merged = defaults.clone();
        merged.extend(entries);
        let mut table = RawMap::new();
        for (key, value) in &merged {
            let value = interpolate(value, &merged, 0)
                .map_err(|msg| ini_error(format!("[{name}] {key}: {msg}")))?;
            table.insert(key.clone(), JsonValue::String(value));
        }
        raw.insert(name, JsonValue::Object(table));
    }
    Ok(raw)
}

/// Expand `%(key)s` references and `%%` escapes.
fn interpolate(
    value: &str,
    section: &Section,
    depth: usize,
) -> std::result::Result<String, String> {
    if depth > MAX_INTERPOLATION_DEPTH {
        return Err("interpolation too deeply nested".to_string());
    }
    if !value.contains('%') {
        return Ok(value.to_string());
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];
        if let Some(after) = rest.strip_prefix('%') {
            out.push('%');
            rest = after;
        } else if let Some(after) = rest.strip_prefix('(') {
            let close = after
                .find(")s")
                .ok_or_else(|| "bad interpolation syntax".to_string())?;
            let name = after[..close].to_lowercase();
            let referenced = section
                .get(&name)
                .ok_or_else(|| format!("bad interpolation reference '{name}'"))?;
            out.push_str(&interpolate(referenced, section, depth + 1)?);
            rest = &after[close + 2..];
        } else {
            return Err("'%' must be followed by '%' or '('".to_string());
        }
    }
    out.push_str(rest);
    Ok(out)
}

fn ini_error(message: impl Into<String>) -> Error {
    Error::Parse {
        format: "INI",
        path: None,
        message: message.into(),
    }
}
