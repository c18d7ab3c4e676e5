//! Accumulate every result, then serialize once.

use super::ResultSink;
use crate::core::comparator::{ComparisonResult, SimilarityReport};
use crate::error::OutputError;
use std::io::Write;

/// Collects results into a [`SimilarityReport`]
///
/// With a writer attached, `finish` writes the report as one JSON object.
pub struct AggregateSink {
    report: SimilarityReport,
    writer: Option<Box<dyn Write + Send>>,
    pretty: bool,
}

impl AggregateSink {
    /// Keep the report in memory only
    pub fn new() -> Self {
        Self {
            report: SimilarityReport::new(),
            writer: None,
            pretty: false,
        }
    }

    /// Write the report to `writer` when the run finishes
    pub fn to_writer<W: Write + Send + 'static>(writer: W, pretty: bool) -> Self {
        Self {
            report: SimilarityReport::new(),
            writer: Some(Box::new(writer)),
            pretty,
        }
    }

    pub fn report(&self) -> &SimilarityReport {
        &self.report
    }

    pub fn into_report(self) -> SimilarityReport {
        self.report
    }
}

impl Default for AggregateSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultSink for AggregateSink {
    fn accept(&mut self, result: ComparisonResult) -> Result<(), OutputError> {
        self.report.insert(result);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), OutputError> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &self.report)?;
        } else {
            serde_json::to_writer(&mut *writer, &self.report)?;
        }
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "aggregate"
    }
}
