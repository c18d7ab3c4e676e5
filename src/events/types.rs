//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};

/// All events emitted by the comparison engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Merge stage events
    Merge(MergeEvent),
    /// Engine-level lifecycle events
    Pipeline(PipelineEvent),
}

/// Events from the result merger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MergeEvent {
    /// One result has been handed to the sink
    Progress(MergeProgress),
    /// A result could not be persisted and was skipped
    OutputFailed { key: String, message: String },
}

/// Progress information while merging results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeProgress {
    /// Number of results merged so far
    pub completed: usize,
    /// Number of results expected (one per input key)
    pub total: usize,
    /// Key of the result just merged
    pub current_key: String,
    /// Number of matches in that result
    pub matches: usize,
}

impl MergeProgress {
    /// Completion as a percentage (0-100)
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 * 100.0 / self.total as f64
    }
}

/// Engine-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Engine has started
    Started { total_keys: usize, workers: usize },
    /// Moving to a new lifecycle state
    PhaseChanged { phase: EnginePhase },
    /// Engine completed successfully
    Completed { summary: PipelineSummary },
    /// Engine encountered a fatal error
    Error { message: String },
}

/// Lifecycle states of a run, in the order they are entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnginePhase {
    Idle,
    ProducerRunning,
    JobsClosed,
    WorkersRunning,
    ResultsClosed,
    MergerRunning,
    Done,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Number of input keys
    pub total_keys: usize,
    /// Number of keys with at least one match
    pub keys_with_matches: usize,
    /// Number of (key, other key) matches, counted in both directions
    pub total_matches: usize,
    /// Results the sink failed to persist
    pub output_failures: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for EnginePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnginePhase::Idle => write!(f, "Idle"),
            EnginePhase::ProducerRunning => write!(f, "Producing jobs"),
            EnginePhase::JobsClosed => write!(f, "Jobs closed"),
            EnginePhase::WorkersRunning => write!(f, "Comparing"),
            EnginePhase::ResultsClosed => write!(f, "Results closed"),
            EnginePhase::MergerRunning => write!(f, "Merging"),
            EnginePhase::Done => write!(f, "Done"),
        }
    }
}
