//! Comparison workers.

use super::producer::ComparisonJob;
use crate::core::comparator::{find_matches, ComparisonResult, ComparisonStrategy, DistanceMetric};
use crossbeam_channel::{Receiver, Sender};

/// Drain jobs until the job channel is closed and empty.
///
/// Each job becomes exactly one result, even when nothing matches. Nothing
/// tells a worker to stop; it returns once there is no more work. Returns
/// the number of jobs handled.
pub fn run_worker(
    id: usize,
    jobs: Receiver<ComparisonJob<'_>>,
    results: Sender<ComparisonResult>,
    metric: &dyn DistanceMetric,
    strategy: &dyn ComparisonStrategy,
) -> usize {
    tracing::debug!(worker = id, "worker started");
    let mut handled = 0;

    for job in jobs.iter() {
        let result = find_matches(job.key, job.hash, job.table, metric, strategy);
        if results.send(result).is_err() {
            tracing::warn!(worker = id, key = job.key, "result channel disconnected");
            break;
        }
        handled += 1;
    }

    tracing::debug!(worker = id, handled, "all jobs have been processed");
    handled
}
