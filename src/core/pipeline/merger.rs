//! The single consumer of comparison results.

use crate::core::comparator::ComparisonResult;
use crate::core::sink::ResultSink;
use crate::events::{Event, EventSender, MergeEvent, MergeProgress};
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};

/// A result the sink could not persist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFailure {
    pub key: String,
    pub message: String,
}

/// What the merger saw over the whole run
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Results taken off the channel
    pub received: usize,
    /// Keys with at least one match
    pub keys_with_matches: usize,
    /// Matches across all results
    pub total_matches: usize,
    /// Results the sink rejected; they were skipped
    pub failures: Vec<OutputFailure>,
}

/// Drain results until the result channel is closed and empty, handing each
/// one to `sink`.
///
/// Arrival order is irrelevant. Progress is reported for every result; a
/// sink failure for one key is logged and skipped.
pub fn run_merger<S: ResultSink + ?Sized>(
    results: Receiver<ComparisonResult>,
    sink: &mut S,
    total: usize,
    events: &EventSender,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for result in results.iter() {
        outcome.received += 1;
        let key = result.key.clone();
        let matches = result.matches.len();

        if matches > 0 {
            outcome.keys_with_matches += 1;
            outcome.total_matches += matches;
        }

        let progress = MergeProgress {
            completed: outcome.received,
            total,
            current_key: key.clone(),
            matches,
        };
        tracing::debug!(
            "({:.2} %)[{}/{}] processing {}",
            progress.percent(),
            progress.completed,
            progress.total,
            progress.current_key
        );
        events.send(Event::Merge(MergeEvent::Progress(progress)));

        if let Err(e) = sink.accept(result) {
            tracing::warn!(key = %key, sink = sink.name(), error = %e, "skipping result");
            events.send(Event::Merge(MergeEvent::OutputFailed {
                key: key.clone(),
                message: e.to_string(),
            }));
            outcome.failures.push(OutputFailure {
                key,
                message: e.to_string(),
            });
        }
    }

    tracing::info!(received = outcome.received, total, "all results merged");
    outcome
}
