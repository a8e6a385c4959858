//! Loading configs from files, file names and app names.

use pc_config::{load_config, Config, ConfigSource, Error, LoadOptions, ProvenanceOp, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TOML_DOC: &str = "[a]\nb = 1\n";
const JSON_DOC: &str = r#"{"a": {"b": 1}}"#;
const INI_DOC: &str = "[a]\nb = 1\n";
#[cfg(feature = "yaml")]
const YAML_DOC: &str = "a:\n  b: 1\n";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

fn assert_single_file_record(config: &Config, path: &Path) {
    let history = config.provenance();
    assert_eq!(history.len(), 1, "history: {history:?}");
    assert_eq!(history[0].operation, ProvenanceOp::Set);
    assert_eq!(PathBuf::from(&history[0].source), std::path::absolute(path).unwrap());
}

#[test]
fn test_load_toml() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "config.toml", TOML_DOC);
    let config = load_config(path.as_path(), &LoadOptions::new()).unwrap();
    assert_eq!(config["a"]["b"], Value::Integer(1));
    assert_single_file_record(&config, &path);
}

#[test]
fn test_load_json() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "config.json", JSON_DOC);
    let config = load_config(path.as_path(), &LoadOptions::new()).unwrap();
    assert_eq!(config.get_nested("a.b").unwrap().as_i64(), Some(1));
    assert_single_file_record(&config, &path);
}

#[test]
fn test_load_ini_leaves_are_strings() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "config.ini", INI_DOC);
    let config = load_config(path.as_path(), &LoadOptions::new()).unwrap();
    assert_eq!(config["a"]["b"].as_str(), Some("1"));
    assert_single_file_record(&config, &path);
}

#[cfg(feature = "yaml")]
#[test]
fn test_load_yaml() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "config.yaml", YAML_DOC);
    let config = load_config(path.as_path(), &LoadOptions::new()).unwrap();
    assert_eq!(config["a"]["b"].as_i64(), Some(1));
    assert_single_file_record(&config, &path);
}

#[cfg(not(feature = "yaml"))]
#[test]
fn test_load_yaml_without_codec() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "config.yaml", "a: 1\n");
    let err = load_config(path.as_path(), &LoadOptions::new()).unwrap_err();
    assert!(matches!(err, Error::MissingDependency { feature: "yaml", .. }));
}

#[test]
fn test_appname_with_explicit_directory() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "config.toml", TOML_DOC);
    let opts = LoadOptions::new().with_directory(dir.path());
    let config = load_config("myapp", &opts).unwrap();
    assert_eq!(config["a"]["b"], Value::Integer(1));
    assert_single_file_record(&config, &path);
}

#[test]
fn test_appname_prefers_toml() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "config.json", r#"{"from": "json"}"#);
    write(dir.path(), "config.toml", "from = \"toml\"\n");
    write(dir.path(), "config.ini", "[s]\nfrom = ini\n");
    let opts = LoadOptions::new().with_directory(dir.path());
    let config = load_config("myapp", &opts).unwrap();
    assert_eq!(config["from"].as_str(), Some("toml"));
}

#[test]
fn test_alt_filename_in_directory() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "alt.toml", TOML_DOC);
    let opts = LoadOptions::new().with_directories([dir.path()]);
    let config = load_config("alt.toml", &opts).unwrap();
    assert_eq!(config["a"]["b"].as_i64(), Some(1));
    assert_single_file_record(&config, &path);
}

#[test]
fn test_nested_filename_in_directory() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "sub/dir/alt.json", JSON_DOC);
    let opts = LoadOptions::new().with_directory(dir.path());
    let config = load_config("sub/dir/alt.json", &opts).unwrap();
    assert_eq!(config.get_nested("a.b").unwrap().as_i64(), Some(1));
    assert_single_file_record(&config, &path);
}

#[test]
fn test_second_directory_searched() {
    let empty = TempDir::new().unwrap();
    let full = TempDir::new().unwrap();
    write(full.path(), "config.json", JSON_DOC);
    let opts = LoadOptions::new().with_directories([empty.path(), full.path()]);
    let config = load_config("myapp", &opts).unwrap();
    assert_eq!(config["a"]["b"].as_i64(), Some(1));
}

#[test]
fn test_missing_config() {
    let dir = TempDir::new().unwrap();
    let opts = LoadOptions::new().with_directory(dir.path());
    let err = load_config("missing.toml", &opts).unwrap_err();
    assert!(matches!(err, Error::ConfigNotFound { .. }));
    assert_eq!(err.code(), 10);
}

#[test]
fn test_ignore_missing_returns_empty() {
    let dir = TempDir::new().unwrap();
    let opts = LoadOptions::new()
        .with_directory(dir.path())
        .with_ignore_missing(true);
    let config = load_config("missing", &opts).unwrap();
    assert!(config.is_empty());
    assert_eq!(config.provenance().len(), 1);
}

#[test]
fn test_reserved_key_in_file() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "config.toml", "[server]\nkeys = 3\n");
    let err = load_config(path.as_path(), &LoadOptions::new()).unwrap_err();
    assert!(matches!(err, Error::ReservedKey(ref k) if k == "keys"));
}

#[test]
fn test_parse_error_names_file() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "config.json", "{not json");
    let err = load_config(path.as_path(), &LoadOptions::new()).unwrap_err();
    match err {
        Error::Parse { format, path: Some(p), .. } => {
            assert_eq!(format, "JSON");
            assert_eq!(p, path);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_load_into_existing_config() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "extra.toml", "[a]\nc = 2\n");
    let mut config = Config::from_json(&serde_json::json!({"a": {"b": 1}})).unwrap();
    config.load(path.as_path(), &LoadOptions::new()).unwrap();

    assert_eq!(config.get_nested("a.b").unwrap().as_i64(), Some(1));
    assert_eq!(config.get_nested("a.c").unwrap().as_i64(), Some(2));
    let history = config.provenance();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].source, "dict");
    assert_eq!(PathBuf::from(&history[1].source), std::path::absolute(&path).unwrap());
}

#[test]
fn test_dict_source() {
    let source = ConfigSource::from_json(serde_json::json!({"a": [{"b": 1}, {"c": 2}]})).unwrap();
    let config = load_config(source, &LoadOptions::new()).unwrap();
    assert_eq!(config.get_nested("a.b").unwrap().as_i64(), Some(1));
    assert_eq!(config.provenance()[0].source, "dict");
}
