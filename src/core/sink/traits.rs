//! Output sink trait definition.

use crate::core::comparator::ComparisonResult;
use crate::error::OutputError;

/// Destination for comparison results
///
/// The merger is the only caller, so implementations need no locking.
pub trait ResultSink: Send {
    /// Take one key's result.
    ///
    /// An error here is a per-key failure: the merger logs it and carries on.
    fn accept(&mut self, result: ComparisonResult) -> Result<(), OutputError>;

    /// Called once after the last result, to flush any aggregate output
    fn finish(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    /// Short name for logs
    fn name(&self) -> &'static str;
}

impl<S: ResultSink + ?Sized> ResultSink for Box<S> {
    fn accept(&mut self, result: ComparisonResult) -> Result<(), OutputError> {
        (**self).accept(result)
    }

    fn finish(&mut self) -> Result<(), OutputError> {
        (**self).finish()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
