//! Provenance histories across construction, updates, loads and drops.

use pc_config::{ledger, AttrDict, Config, LoadOptions, Provenance, ProvenanceOp, Value};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn raw(value: serde_json::Value) -> pc_config::RawMap {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

#[test]
fn test_list_of_dicts_construction() {
    let config = Config::from_dict(&raw(json!({"a": 1, "b": [{"c": 2}, {"d": 3}]})), false).unwrap();
    assert_eq!(config["a"].as_i64(), Some(1));
    assert!(config["b"][0].is_container());
    assert_eq!(config["b"][0]["c"].as_i64(), Some(2));
    assert_eq!(config["b"][1]["d"].as_i64(), Some(3));
    assert_eq!(config.provenance(), vec![Provenance::dict(ProvenanceOp::Set)]);
}

#[test]
fn test_update_appends_one_record() {
    let mut config = Config::from_dict(&raw(json!({"a": 1})), false).unwrap();
    config.update(AttrDict::from_entries([("a", 2)]).unwrap());
    assert_eq!(config["a"], Value::Integer(2));
    assert_eq!(
        config.provenance(),
        vec![
            Provenance::dict(ProvenanceOp::Set),
            Provenance::dict(ProvenanceOp::Update),
        ]
    );
}

#[test]
fn test_history_length_counts_operations() {
    let mut config = Config::new();
    for i in 0..5 {
        config.update(AttrDict::from_entries([(format!("k{i}"), i)]).unwrap());
    }
    assert_eq!(config.provenance().len(), 6);
    assert_eq!(config.len(), 5);
}

#[test]
fn test_disabled_history_stays_empty() {
    let mut config = Config::from_entries_with([("a", 1)], false).unwrap();
    config.update(AttrDict::from_entries([("b", 2)]).unwrap());
    config.clear();
    config.update(AttrDict::from_entries([("c", 3)]).unwrap());
    assert!(config.provenance().is_empty());
    assert_eq!(config["c"].as_i64(), Some(3));
}

#[test]
fn test_drop_removes_ledger_entry() {
    let config = Config::from_entries([("a", 1)]).unwrap();
    let id = config.id();
    assert!(ledger().contains(id));
    drop(config);
    assert!(!ledger().contains(id));
    assert!(ledger().get(id).is_empty());
}

#[test]
fn test_disabled_config_leaves_no_trace_on_drop() {
    let config = Config::from_entries_with([("a", 1)], false).unwrap();
    let id = config.id();
    assert!(ledger().contains(id));
    drop(config);
    assert!(!ledger().contains(id));
}

#[test]
fn test_distinct_configs_have_distinct_histories() {
    let mut first = Config::new();
    let second = Config::new();
    first.update(AttrDict::new());
    assert_eq!(first.provenance().len(), 2);
    assert_eq!(second.provenance().len(), 1);
}

#[test]
fn test_load_extends_history_with_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("override.json");
    fs::write(&path, r#"{"db": {"port": 5433}}"#).unwrap();

    let mut config = Config::from_json(&json!({"db": {"host": "localhost", "port": 5432}})).unwrap();
    config.update(AttrDict::from_entries([("debug", true)]).unwrap());
    config.load(path.as_path(), &LoadOptions::new()).unwrap();

    assert_eq!(config.get_nested("db.port").unwrap().as_i64(), Some(5433));
    assert_eq!(config.get_nested("db.host").unwrap().as_str(), Some("localhost"));
    let ops: Vec<_> = config.provenance().iter().map(|p| p.operation).collect();
    assert_eq!(ops, vec![ProvenanceOp::Set, ProvenanceOp::Update, ProvenanceOp::Set]);
}

#[test]
fn test_provenance_serializes() {
    let config = Config::new();
    let json = serde_json::to_value(config.provenance()).unwrap();
    assert_eq!(json, json!([{"source": "dict", "operation": "set"}]));
}

#[test]
fn test_concurrent_build_update_drop() {
    const THREADS: usize = 8;
    const UPDATES: usize = 25;

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            std::thread::spawn(move || {
                let mut kept = Config::from_entries([("thread", t as i64)]).unwrap();
                let mut dropped_ids = Vec::new();
                for i in 0..UPDATES {
                    kept.update(AttrDict::from_entries([(format!("k{i}"), i as i64)]).unwrap());

                    let mut scratch = Config::from_entries([("scratch", i as i64)]).unwrap();
                    scratch.update(AttrDict::from_entries([("more", 1)]).unwrap());
                    dropped_ids.push(scratch.id());
                }
                (kept, dropped_ids)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (kept, dropped_ids) in &results {
        let history = kept.provenance();
        assert_eq!(history.len(), 1 + UPDATES);
        assert_eq!(history[0].operation, ProvenanceOp::Set);
        assert!(history[1..].iter().all(|p| p.operation == ProvenanceOp::Update));
        assert_eq!(kept.len(), 1 + UPDATES);
        for id in dropped_ids {
            assert!(!ledger().contains(*id));
        }
    }
}
