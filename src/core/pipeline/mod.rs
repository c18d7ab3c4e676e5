//! # Pipeline Module
//!
//! The concurrent all-pairs comparison engine.
//!
//! ## Stages
//! 1. **Produce** - one [`ComparisonJob`] per key onto the job channel
//! 2. **Compare** - N workers scan the whole table for each job
//! 3. **Merge** - one consumer hands every result to the active sink
//!
//! ## Shutdown
//! The executor joins the producer, closes the job channel, joins the
//! workers, closes the result channel, then joins the merger. Every step
//! waits on a completion signal; nothing waits on a timer.

mod executor;
mod merger;
mod producer;
mod worker;

pub use executor::{
    Pipeline, PipelineBuilder, PipelineConfig, PipelineResult, DEFAULT_THRESHOLD,
    DEFAULT_WORKERS,
};
pub use merger::{run_merger, MergeOutcome, OutputFailure};
pub use producer::{produce_jobs, ComparisonJob};
pub use worker::run_worker;
