//! Job production: one job per key.

use crate::core::encoder::EncodedHash;
use crate::core::input::HashTable;
use crossbeam_channel::Sender;

/// One key to compare against the whole table
///
/// Borrows everything from the frozen table; consumed by exactly one worker.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonJob<'a> {
    pub key: &'a str,
    pub hash: &'a EncodedHash,
    pub table: &'a HashTable,
}

/// Submit one job per key in the table, in unspecified order.
///
/// Blocks while the job channel is full. Returns the number of jobs handed
/// over, which is short of `table.len()` only if every worker has gone away.
pub fn produce_jobs<'a>(table: &'a HashTable, jobs: &Sender<ComparisonJob<'a>>) -> usize {
    let mut submitted = 0;

    for (key, hash) in table.iter() {
        if jobs.send(ComparisonJob { key, hash, table }).is_err() {
            tracing::warn!(
                submitted,
                total = table.len(),
                "job channel disconnected before all jobs were submitted"
            );
            return submitted;
        }
        submitted += 1;
    }

    tracing::info!(submitted, "all jobs submitted");
    submitted
}
