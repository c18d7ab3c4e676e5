//! # Comparator Module
//!
//! Scores encoded hashes against each other and filters by threshold.
//!
//! ## Distance
//! For encoded hashes `a` and `b`, count the positions of the shared prefix
//! (`0..min(len a, len b)`) where the characters differ, then add the length
//! difference. The score is symmetric and is zero for identical hashes.
//! It is deliberately not a general edit distance.
//!
//! | Pair | Distance |
//! |------|----------|
//! | `1010` / `1010` | 0 |
//! | `1010` / `1000` | 1 |
//! | `1010` / `10` | 2 |
//! | `""` / 24-digit hash | 24 |

mod traits;

pub use traits::{ComparisonStrategy, DistanceMetric, PrefixMismatch, ThresholdStrategy};

use crate::core::encoder::EncodedHash;
use crate::core::input::HashTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Matches for one key: other key -> distance
pub type MatchMap = BTreeMap<String, u32>;

/// Distance between two encoded hashes
pub fn distance(a: &EncodedHash, b: &EncodedHash) -> u32 {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mismatches = a.iter().zip(b).filter(|(x, y)| x != y).count();
    (mismatches + a.len().abs_diff(b.len())) as u32
}

/// Every key near one target key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// The key that was compared against the table
    pub key: String,
    /// Other keys within the threshold, with their distance
    pub matches: MatchMap,
}

impl ComparisonResult {
    pub fn new(key: impl Into<String>, matches: MatchMap) -> Self {
        Self {
            key: key.into(),
            matches,
        }
    }

    /// Whether the key has any near-duplicate
    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }
}

/// Aggregate result of a run: key -> (other key -> distance)
///
/// Holds every compared key, including those without matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimilarityReport {
    entries: BTreeMap<String, MatchMap>,
}

impl SimilarityReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one key's result, replacing any earlier result for that key
    pub fn insert(&mut self, result: ComparisonResult) {
        self.entries.insert(result.key, result.matches);
    }

    /// Matches for `key`, if it was compared
    pub fn get(&self, key: &str) -> Option<&MatchMap> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MatchMap)> {
        self.entries.iter()
    }

    /// Number of keys with at least one match
    pub fn keys_with_matches(&self) -> usize {
        self.entries.values().filter(|m| !m.is_empty()).count()
    }

    /// Number of matches across all keys (each pair counted from both sides)
    pub fn total_matches(&self) -> usize {
        self.entries.values().map(|m| m.len()).sum()
    }
}

/// Compare one key against every other key in the table
///
/// This is the O(n) scan each worker runs per job.
pub fn find_matches(
    key: &str,
    hash: &EncodedHash,
    table: &HashTable,
    metric: &dyn DistanceMetric,
    strategy: &dyn ComparisonStrategy,
) -> ComparisonResult {
    let matches = table
        .iter()
        .filter(|(other, _)| *other != key)
        .filter_map(|(other, other_hash)| {
            let distance = metric.distance(hash, other_hash);
            strategy
                .is_match(distance)
                .then(|| (other.to_string(), distance))
        })
        .collect();

    ComparisonResult::new(key, matches)
}

/// Compare every key against every other key on the calling thread
///
/// Reference for the concurrent engine; both must produce the same report.
pub fn find_all_matches(
    table: &HashTable,
    metric: &dyn DistanceMetric,
    strategy: &dyn ComparisonStrategy,
) -> SimilarityReport {
    let mut report = SimilarityReport::new();
    for (key, hash) in table.iter() {
        report.insert(find_matches(key, hash, table, metric, strategy));
    }
    report
}
