//! # Sink Module
//!
//! Where merged results go. Exactly one sink is active per run.
//!
//! ## Sinks
//! | Sink | Behaviour |
//! |------|-----------|
//! | [`AggregateSink`] | Collects everything, writes one JSON object at the end |
//! | [`PerFileSink`] | Writes `<dir>/<key>` as each result arrives |
//!
//! Per-key failures returned from [`ResultSink::accept`] are logged and
//! skipped by the merger; only `finish` failures end the run.

mod aggregate;
mod per_file;
mod traits;

pub use aggregate::AggregateSink;
pub use per_file::PerFileSink;
pub use traits::ResultSink;
