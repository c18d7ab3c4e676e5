//! # Core Module
//!
//! The near-duplicate detection engine.
//!
//! ## Modules
//! - `encoder` - Renders hexadecimal hashes as binary strings
//! - `comparator` - Distance metric and threshold strategy
//! - `input` - Loads and freezes the key -> hash table
//! - `pipeline` - Producer, workers and merger, and their lifecycle
//! - `sink` - Where merged results go

pub mod comparator;
pub mod encoder;
pub mod input;
pub mod pipeline;
pub mod sink;

// Re-export commonly used types
pub use comparator::{ComparisonResult, SimilarityReport};
pub use encoder::{EncodedHash, HashEncoder};
pub use input::HashTable;
pub use pipeline::{Pipeline, PipelineResult};
pub use sink::{AggregateSink, PerFileSink, ResultSink};
