//! Pipeline execution implementation.

use super::merger::{run_merger, MergeOutcome, OutputFailure};
use super::producer::{produce_jobs, ComparisonJob};
use super::worker::run_worker;
use crate::core::comparator::{
    ComparisonResult, ComparisonStrategy, DistanceMetric, PrefixMismatch, ThresholdStrategy,
};
use crate::core::input::HashTable;
use crate::core::sink::ResultSink;
use crate::error::{EngineError, NearDupError};
use crate::events::{
    null_sender, EnginePhase, Event, EventSender, PipelineEvent, PipelineSummary,
};
use crossbeam_channel::bounded;
use std::thread;
use std::time::Instant;

/// Default number of comparison workers
pub const DEFAULT_WORKERS: usize = 4;

/// Default similarity threshold
pub const DEFAULT_THRESHOLD: u32 = 20;

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult<S> {
    /// The sink, after `finish` has run
    pub sink: S,
    /// Number of input keys (and of results merged)
    pub total_keys: usize,
    /// Keys with at least one match
    pub keys_with_matches: usize,
    /// Matches across all keys, each pair counted from both sides
    pub total_matches: usize,
    /// Results the sink failed to persist (non-fatal)
    pub output_failures: Vec<OutputFailure>,
    /// Jobs handled by each worker, indexed by worker id
    pub jobs_per_worker: Vec<usize>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of comparison workers; 1 runs the comparison on one thread
    pub workers: usize,
    /// Maximum distance reported as a match
    pub threshold: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Set the number of comparison workers
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Set the similarity threshold
    pub fn threshold(mut self, threshold: u32) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The all-pairs comparison engine
///
/// One producer, `workers` comparison threads and one merger, connected by
/// two bounded channels whose capacity equals the worker count. Each stage
/// learns that upstream is finished only through channel closure, and the
/// channels are closed only after the upstream stage has been joined.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run<S: ResultSink>(
        &self,
        table: &HashTable,
        sink: S,
    ) -> Result<PipelineResult<S>, NearDupError> {
        self.run_with_events(table, sink, &null_sender())
    }

    /// Run the pipeline with event reporting
    ///
    /// `table` is borrowed for the whole run and therefore cannot change
    /// while any worker reads it.
    pub fn run_with_events<S: ResultSink>(
        &self,
        table: &HashTable,
        mut sink: S,
        events: &EventSender,
    ) -> Result<PipelineResult<S>, NearDupError> {
        let workers = self.config.workers;
        if workers == 0 {
            return Err(EngineError::InvalidWorkerCount { value: workers }.into());
        }

        let start_time = Instant::now();
        let total_keys = table.len();
        let metric = PrefixMismatch;
        let strategy = ThresholdStrategy::new(self.config.threshold);

        events.send(Event::Pipeline(PipelineEvent::Started {
            total_keys,
            workers,
        }));
        enter(events, EnginePhase::Idle);
        tracing::info!(
            keys = total_keys,
            workers,
            strategy = %strategy.description(),
            sink = sink.name(),
            "starting comparison"
        );

        let run = self.execute(table, &mut sink, &metric, &strategy, events);
        let (outcome, jobs_per_worker) = match run {
            Ok(run) => run,
            Err(e) => {
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
                return Err(e.into());
            }
        };

        if let Err(error) = check_complete(total_keys, outcome.received) {
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: error.to_string(),
            }));
            return Err(error.into());
        }

        sink.finish()?;

        let duration_ms = start_time.elapsed().as_millis() as u64;
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_keys,
                keys_with_matches: outcome.keys_with_matches,
                total_matches: outcome.total_matches,
                output_failures: outcome.failures.len(),
                duration_ms,
            },
        }));
        enter(events, EnginePhase::Done);

        Ok(PipelineResult {
            sink,
            total_keys,
            keys_with_matches: outcome.keys_with_matches,
            total_matches: outcome.total_matches,
            output_failures: outcome.failures,
            jobs_per_worker,
            duration_ms,
        })
    }

    /// Start every stage and walk the shutdown protocol
    fn execute<S: ResultSink>(
        &self,
        table: &HashTable,
        sink: &mut S,
        metric: &dyn DistanceMetric,
        strategy: &dyn ComparisonStrategy,
        events: &EventSender,
    ) -> Result<(MergeOutcome, Vec<usize>), EngineError> {
        let workers = self.config.workers;
        let total_keys = table.len();

        let (job_tx, job_rx) = bounded::<ComparisonJob<'_>>(workers);
        let (result_tx, result_rx) = bounded::<ComparisonResult>(workers);

        thread::scope(|scope| -> Result<(MergeOutcome, Vec<usize>), EngineError> {
            let merger = scope.spawn(move || run_merger(result_rx, sink, total_keys, events));

            let worker_handles: Vec<_> = (0..workers)
                .map(|id| {
                    let jobs = job_rx.clone();
                    let results = result_tx.clone();
                    tracing::debug!(worker = id, "starting worker");
                    scope.spawn(move || run_worker(id, jobs, results, metric, strategy))
                })
                .collect();
            // Workers hold the only receivers now
            drop(job_rx);

            let producer = {
                let jobs = job_tx.clone();
                scope.spawn(move || produce_jobs(table, &jobs))
            };
            enter(events, EnginePhase::ProducerRunning);

            let submitted = producer
                .join()
                .map_err(|_| EngineError::StagePanicked { stage: "producer" })?;
            tracing::debug!(submitted, "producer finished");

            // Last sender: workers see the closure once the queue is empty
            drop(job_tx);
            enter(events, EnginePhase::JobsClosed);
            enter(events, EnginePhase::WorkersRunning);

            let mut jobs_per_worker = Vec::with_capacity(workers);
            let mut worker_panicked = false;
            for handle in worker_handles {
                match handle.join() {
                    Ok(handled) => jobs_per_worker.push(handled),
                    Err(_) => {
                        worker_panicked = true;
                        jobs_per_worker.push(0);
                    }
                }
            }

            drop(result_tx);
            enter(events, EnginePhase::ResultsClosed);
            enter(events, EnginePhase::MergerRunning);

            let outcome = merger
                .join()
                .map_err(|_| EngineError::StagePanicked { stage: "merger" })?;

            if worker_panicked {
                return Err(EngineError::StagePanicked { stage: "worker" });
            }

            Ok((outcome, jobs_per_worker))
        })
    }
}

/// The merger must have seen exactly one result per key
fn check_complete(expected: usize, received: usize) -> Result<(), EngineError> {
    if received == expected {
        Ok(())
    } else {
        Err(EngineError::IncompleteResults { expected, received })
    }
}

fn enter(events: &EventSender, phase: EnginePhase) {
    tracing::info!(%phase, "engine state changed");
    events.send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoder::{EncodedHash, HashEncoder};
    use crate::core::sink::AggregateSink;
    use crate::error::OutputError;
    use crate::events::EventChannel;

    /// Sink that blows up on the first result
    struct PanickingSink;

    impl ResultSink for PanickingSink {
        fn accept(&mut self, _result: ComparisonResult) -> Result<(), OutputError> {
            panic!("sink failure");
        }

        fn name(&self) -> &'static str {
            "panicking"
        }
    }

    /// Metric that blows up on every comparison
    struct PanickingMetric;

    impl DistanceMetric for PanickingMetric {
        fn distance(&self, _a: &EncodedHash, _b: &EncodedHash) -> u32 {
            panic!("metric failure");
        }
    }

    fn many_keys(count: usize) -> HashTable {
        HashTable::encode(
            (0..count).map(|i| (format!("k{i}"), format!("{i:06X}"))),
            &HashEncoder::default(),
        )
    }

    fn table(pairs: &[(&str, &str)]) -> HashTable {
        HashTable::encode(
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())),
            &HashEncoder::default(),
        )
    }

    #[test]
    fn pipeline_builder_creates_pipeline() {
        let pipeline = Pipeline::builder().workers(8).threshold(30).build();

        assert_eq!(pipeline.config().workers, 8);
        assert_eq!(pipeline.config().threshold, 30);
    }

    #[test]
    fn default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.workers, 4);
        assert_eq!(config.threshold, 20);
    }

    #[test]
    fn pipeline_handles_empty_table() {
        let pipeline = Pipeline::builder().build();
        let result = pipeline.run(&table(&[]), AggregateSink::new()).unwrap();

        assert_eq!(result.total_keys, 0);
        assert!(result.sink.report().is_empty());
        assert_eq!(result.jobs_per_worker, vec![0, 0, 0, 0]);
    }

    #[test]
    fn pipeline_rejects_zero_workers() {
        let pipeline = Pipeline::builder().workers(0).build();
        let result = pipeline.run(&table(&[("a", "1")]), AggregateSink::new());

        assert!(matches!(
            result,
            Err(NearDupError::Engine(EngineError::InvalidWorkerCount { value: 0 }))
        ));
    }

    #[test]
    fn pipeline_finds_mutual_match() {
        let table = table(&[("a", "F0F0F0"), ("b", "F0F0F1"), ("c", "000000")]);
        let pipeline = Pipeline::builder().threshold(1).build();

        let result = pipeline.run(&table, AggregateSink::new()).unwrap();
        let report = result.sink.into_report();

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({"a": {"b": 1}, "b": {"a": 1}, "c": {}})
        );
        assert_eq!(result.keys_with_matches, 2);
        assert_eq!(result.jobs_per_worker.iter().sum::<usize>(), 3);
    }

    #[test]
    fn phases_are_entered_in_order() {
        let table = table(&[("a", "F0F0F0"), ("b", "F0F0F1")]);
        let (sender, receiver) = EventChannel::new();

        Pipeline::builder()
            .workers(2)
            .build()
            .run_with_events(&table, AggregateSink::new(), &sender)
            .unwrap();
        drop(sender);

        let phases: Vec<EnginePhase> = receiver
            .iter()
            .filter_map(|event| match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => Some(phase),
                _ => None,
            })
            .collect();

        assert_eq!(
            phases,
            vec![
                EnginePhase::Idle,
                EnginePhase::ProducerRunning,
                EnginePhase::JobsClosed,
                EnginePhase::WorkersRunning,
                EnginePhase::ResultsClosed,
                EnginePhase::MergerRunning,
                EnginePhase::Done,
            ]
        );
    }

    #[test]
    fn completion_summary_is_emitted() {
        let table = table(&[("a", "F0F0F0"), ("b", "F0F0F0"), ("c", "xyz")]);
        let (sender, receiver) = EventChannel::new();

        Pipeline::builder()
            .threshold(0)
            .build()
            .run_with_events(&table, AggregateSink::new(), &sender)
            .unwrap();
        drop(sender);

        let summary = receiver
            .iter()
            .find_map(|event| match event {
                Event::Pipeline(PipelineEvent::Completed { summary }) => Some(summary),
                _ => None,
            })
            .expect("completed event");

        assert_eq!(summary.total_keys, 3);
        assert_eq!(summary.keys_with_matches, 2);
        assert_eq!(summary.total_matches, 2);
        assert_eq!(summary.output_failures, 0);
    }

    #[test]
    fn panicking_merger_is_an_engine_error() {
        let table = many_keys(200);
        let result = Pipeline::builder()
            .workers(2)
            .build()
            .run(&table, PanickingSink);

        assert!(matches!(
            result,
            Err(NearDupError::Engine(EngineError::StagePanicked { stage: "merger" }))
        ));
    }

    #[test]
    fn panicking_workers_are_an_engine_error() {
        let table = many_keys(50);
        let pipeline = Pipeline::builder().workers(3).build();
        let mut sink = AggregateSink::new();

        let result = pipeline.execute(
            &table,
            &mut sink,
            &PanickingMetric,
            &ThresholdStrategy::default(),
            &null_sender(),
        );

        assert!(matches!(
            result,
            Err(EngineError::StagePanicked { stage: "worker" })
        ));
        assert!(sink.report().is_empty());
    }

    #[test]
    fn result_shortfall_is_an_engine_error() {
        assert!(check_complete(3, 3).is_ok());
        assert!(matches!(
            check_complete(5, 4),
            Err(EngineError::IncompleteResults {
                expected: 5,
                received: 4
            })
        ));
    }
}
