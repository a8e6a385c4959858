//! provconf: hierarchical configuration with provenance.
//!
//! Configs are nested string-keyed containers loaded from TOML, JSON, INI or
//! YAML files, from app names resolved against the usual config directories,
//! or from in-memory data. Every tracked [`Config`] keeps an ordered history
//! of where its contents came from:
//!
//! ```
//! use pc_config::{AttrDict, Config, ProvenanceOp};
//!
//! let mut config = Config::from_entries([("a", 1)]).unwrap();
//! config.update(AttrDict::from_entries([("b", 2)]).unwrap());
//!
//! let ops: Vec<_> = config.provenance().iter().map(|p| p.operation).collect();
//! assert_eq!(ops, vec![ProvenanceOp::Set, ProvenanceOp::Update]);
//! ```

pub mod attr_dict;
pub mod config;
pub mod convert;
pub mod env;
pub mod global;
pub mod loader;
pub mod logging;
pub mod provenance;
pub mod search;
pub mod value;

pub use attr_dict::{is_reserved, AttrDict, RESERVED_KEYS};
pub use config::Config;
pub use convert::Container;
pub use env::EnvExportOptions;
pub use global::{global_config, set_config, update_config, with_global_config, GlobalConfig};
pub use loader::{
    load_config, load_config_file, load_from_appname, load_from_dict, load_from_path,
    ConfigSource, LoadOptions, DEFAULT_CONFIG_NAME,
};
pub use logging::{init_logging, LogFormat};
pub use provenance::{ledger, Provenance, ProvenanceLedger, ProvenanceOp};
pub use value::Value;

pub use pc_codec::{ConfigFormat, RawMap};
pub use pc_common::{ConfigId, Error, Result};
