//! provconf format codecs.
//!
//! Every codec turns the text of a config file into the same raw shape: a
//! JSON object (`serde_json::Map`) whose leaves are JSON scalars. The
//! container layer in `pc-config` converts that shape into tracked configs.
//!
//! Supported formats, in search priority order:
//! - TOML (`.toml`)
//! - JSON (`.json`)
//! - INI (`.ini`) via `rust-ini`, string leaves only
//! - YAML (`.yaml`, `.yml`), behind the `yaml` feature

pub mod format;
pub mod ini;

pub use format::{parse_file, ConfigFormat, RawMap};
