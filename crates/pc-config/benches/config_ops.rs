//! Criterion benchmarks for config conversion, lookup and provenance churn.
//!
//! Everything runs on in-memory data so results don't depend on the disk.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pc_config::{AttrDict, Config, RawMap};
use serde_json::{json, Value as JsonValue};

fn make_raw(sections: usize, keys: usize) -> RawMap {
    let mut raw = RawMap::new();
    for s in 0..sections {
        let mut section = serde_json::Map::new();
        for k in 0..keys {
            section.insert(format!("key{k}"), json!({"value": k, "tags": ["a", "b"]}));
        }
        raw.insert(format!("section{s}"), JsonValue::Object(section));
    }
    raw
}

fn bench_from_dict(c: &mut Criterion) {
    let raw = make_raw(50, 50);
    c.bench_function("from_dict_uniform_2500", |b| {
        b.iter(|| black_box(Config::from_dict(black_box(&raw), false)))
    });
    c.bench_function("from_dict_same_class_2500", |b| {
        b.iter(|| black_box(Config::from_dict(black_box(&raw), true)))
    });
}

fn bench_get_nested(c: &mut Criterion) {
    let dict = AttrDict::from_dict(&make_raw(50, 50)).unwrap_or_default();
    c.bench_function("get_nested_depth_3", |b| {
        b.iter(|| black_box(dict.get_nested(black_box("section25.key25.value")).is_ok()))
    });
}

fn bench_update(c: &mut Criterion) {
    let patch = AttrDict::from_dict(&make_raw(5, 5)).unwrap_or_default();
    c.bench_function("update_with_provenance", |b| {
        b.iter(|| {
            let mut config = Config::new();
            config.update(patch.clone());
            black_box(config.provenance().len())
        })
    });
}

criterion_group!(benches, bench_from_dict, bench_get_nested, bench_update);
criterion_main!(benches);
