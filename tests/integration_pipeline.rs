//! Integration tests for the comparison engine.
//!
//! These tests verify end-to-end engine behavior including:
//! - Identical output for any worker count
//! - Exactly one result per key
//! - Both sinks
//! - Distance properties over generated hashes

use assert_fs::prelude::*;
use near_duplicate_finder::core::comparator::{
    distance, find_all_matches, PrefixMismatch, ThresholdStrategy,
};
use near_duplicate_finder::core::encoder::HashEncoder;
use near_duplicate_finder::core::input::{load_table, HashTable};
use near_duplicate_finder::core::pipeline::Pipeline;
use near_duplicate_finder::core::sink::{AggregateSink, PerFileSink};
use predicates::prelude::*;
use std::collections::BTreeMap;

/// Deterministic pseudo-random 24-bit hashes, with a near copy of every
/// fifth one so that some keys have matches.
fn generated_hashes(count: usize) -> BTreeMap<String, String> {
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut hashes = BTreeMap::new();

    for i in 0..count {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let value = (state >> 40) & 0xFF_FFFF;
        hashes.insert(format!("img_{i:04}"), format!("{value:06X}"));
        if i % 5 == 0 {
            hashes.insert(format!("img_{i:04}_copy"), format!("{:06X}", value ^ 0b101));
        }
    }

    hashes.insert("broken".to_string(), "not-a-hash".to_string());
    hashes
}

fn generated_table() -> HashTable {
    HashTable::encode(generated_hashes(150), &HashEncoder::default())
}

fn aggregate_json(table: &HashTable, workers: usize, threshold: u32) -> String {
    let result = Pipeline::builder()
        .workers(workers)
        .threshold(threshold)
        .build()
        .run(table, AggregateSink::new())
        .unwrap();
    serde_json::to_string(result.sink.report()).unwrap()
}

#[test]
fn spec_example_produces_expected_aggregate() {
    let raw = [("a", "F0F0F0"), ("b", "F0F0F1"), ("c", "000000")]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()));
    let table = HashTable::encode(raw, &HashEncoder::default());

    let json = aggregate_json(&table, 4, 1);
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(
        parsed,
        serde_json::json!({"a": {"b": 1}, "b": {"a": 1}, "c": {}})
    );
}

#[test]
fn output_is_independent_of_worker_count() {
    let table = generated_table();

    let single = aggregate_json(&table, 1, 6);
    let four = aggregate_json(&table, 4, 6);
    let sixteen = aggregate_json(&table, 16, 6);

    assert_eq!(single, four);
    assert_eq!(single, sixteen);
}

#[test]
fn concurrent_engine_matches_sequential_reference() {
    let table = generated_table();
    let reference = find_all_matches(&table, &PrefixMismatch, &ThresholdStrategy::new(6));

    let result = Pipeline::builder()
        .workers(8)
        .threshold(6)
        .build()
        .run(&table, AggregateSink::new())
        .unwrap();

    assert_eq!(result.sink.report(), &reference);
    assert!(reference.keys_with_matches() >= 60);
}

#[test]
fn repeated_runs_are_identical() {
    let table = generated_table();
    assert_eq!(aggregate_json(&table, 4, 20), aggregate_json(&table, 4, 20));
}

#[test]
fn one_result_per_key_and_no_self_matches() {
    let table = generated_table();
    let result = Pipeline::builder()
        .workers(3)
        .threshold(24)
        .build()
        .run(&table, AggregateSink::new())
        .unwrap();

    let report = result.sink.report();
    assert_eq!(result.total_keys, table.len());
    assert_eq!(report.len(), table.len());
    assert_eq!(result.jobs_per_worker.iter().sum::<usize>(), table.len());

    for (key, matches) in report.iter() {
        assert!(!matches.contains_key(key), "{key} matched itself");
        for (other, distance) in matches {
            assert!(*distance <= 24);
            // Matching is mutual because the distance is symmetric
            assert_eq!(report.get(other).unwrap().get(key), Some(distance));
        }
    }
}

#[test]
fn unparsable_hash_never_matches_at_default_threshold() {
    let table = generated_table();
    let result = Pipeline::builder()
        .build()
        .run(&table, AggregateSink::new())
        .unwrap();

    assert!(result.sink.report().get("broken").unwrap().is_empty());
    assert_eq!(
        distance(
            table.get("broken").unwrap(),
            table.get("img_0000").unwrap()
        ),
        24
    );
}

#[test]
fn distance_properties_hold_for_generated_hashes() {
    let table = generated_table();
    let hashes: Vec<_> = table.iter().map(|(_, hash)| hash).take(60).collect();

    for a in &hashes {
        assert_eq!(distance(a, a), 0);
        for b in &hashes {
            assert_eq!(distance(a, b), distance(b, a));
            if a.len() == b.len() {
                let mismatches = a
                    .as_str()
                    .chars()
                    .zip(b.as_str().chars())
                    .filter(|(x, y)| x != y)
                    .count() as u32;
                assert_eq!(distance(a, b), mismatches);
            }
        }
    }
}

#[test]
fn per_file_sink_writes_every_key() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("hashes.json");
    input
        .write_str(r#"{"a": "F0F0F0", "b": "F0F0F1", "c": "000000"}"#)
        .unwrap();
    let out = temp.child("out");

    let table = load_table(input.path(), &HashEncoder::default()).unwrap();
    let sink = PerFileSink::create(out.path(), false).unwrap();
    let result = Pipeline::builder()
        .workers(2)
        .threshold(1)
        .build()
        .run(&table, sink)
        .unwrap();

    assert_eq!(result.sink.written(), 3);
    assert!(result.output_failures.is_empty());
    out.child("a").assert(r#"{"b":1}"#);
    out.child("b").assert(r#"{"a":1}"#);
    out.child("c").assert("{}");
}

#[test]
fn per_file_sink_skips_unwritable_keys() {
    let temp = assert_fs::TempDir::new().unwrap();
    let out = temp.child("out");

    let raw = [("ok", "ABCDEF"), ("../escape", "ABCDEF"), ("also_ok", "000001")]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()));
    let table = HashTable::encode(raw, &HashEncoder::default());

    let sink = PerFileSink::create(out.path(), true).unwrap();
    let result = Pipeline::builder()
        .threshold(0)
        .build()
        .run(&table, sink)
        .unwrap();

    assert_eq!(result.total_keys, 3);
    assert_eq!(result.sink.written(), 2);
    assert_eq!(result.output_failures.len(), 1);
    assert_eq!(result.output_failures[0].key, "../escape");

    out.child("ok").assert(predicate::str::contains("../escape"));
    out.child("also_ok").assert(predicate::path::exists());
    temp.child("escape").assert(predicate::path::missing());
}
