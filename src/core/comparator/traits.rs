//! Trait definitions for distance metrics and match strategies.

use super::distance;
use crate::core::encoder::EncodedHash;

/// Dissimilarity score between two encoded hashes
pub trait DistanceMetric: Send + Sync {
    /// Lower distance = more similar images
    fn distance(&self, a: &EncodedHash, b: &EncodedHash) -> u32;
}

/// Character-wise mismatch count over the shared prefix, plus the
/// length difference.
///
/// Equal to the Hamming distance when both hashes have the same length.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixMismatch;

impl DistanceMetric for PrefixMismatch {
    fn distance(&self, a: &EncodedHash, b: &EncodedHash) -> u32 {
        distance(a, b)
    }
}

/// Strategy trait for deciding whether two hashes match
pub trait ComparisonStrategy: Send + Sync {
    /// Determine if a distance counts as a match
    fn is_match(&self, distance: u32) -> bool;

    /// Get the threshold used
    fn threshold(&self) -> u32;

    /// Human-readable description of the strategy
    fn description(&self) -> String;
}

/// Simple threshold-based comparison strategy
#[derive(Debug, Clone)]
pub struct ThresholdStrategy {
    /// Maximum distance to consider as a match
    threshold: u32,
}

impl ThresholdStrategy {
    /// Create a new threshold strategy
    ///
    /// Deployments of the 24-bit encoding have used 20 and 30.
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }
}

impl Default for ThresholdStrategy {
    fn default() -> Self {
        Self::new(20)
    }
}

impl ComparisonStrategy for ThresholdStrategy {
    fn is_match(&self, distance: u32) -> bool {
        distance <= self.threshold
    }

    fn threshold(&self) -> u32 {
        self.threshold
    }

    fn description(&self) -> String {
        format!(
            "Threshold strategy: hashes with distance <= {} are near-duplicates",
            self.threshold
        )
    }
}
