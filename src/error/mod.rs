//! # Error Module
//!
//! Error types for the near-duplicate finder.
//!
//! ## Design Principles
//! - **Startup failures are fatal** - bad input never reaches the engine
//! - **Include context** - paths, keys, what went wrong
//! - **Per-key output failures are not errors** - sinks log and skip them

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum NearDupError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while loading the key -> hash input
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to open input file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path} as a JSON object of string hashes: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse input as a JSON object of string hashes: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors raised by the comparison engine itself
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid worker count: {value} (must be at least 1)")]
    InvalidWorkerCount { value: usize },

    #[error("The {stage} stage panicked")]
    StagePanicked { stage: &'static str },

    #[error("Merger received {received} of {expected} results")]
    IncompleteResults { expected: usize, received: usize },
}

/// Errors that occur while emitting results
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Key {key:?} cannot be used as a file name")]
    UnsafeFileName { key: String },

    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write results: {0}")]
    Write(#[from] std::io::Error),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, NearDupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_error_includes_path() {
        let error = InputError::Open {
            path: PathBuf::from("/data/hashes.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let message = error.to_string();
        assert!(message.contains("/data/hashes.json"));
        assert!(message.contains("missing"));
    }

    #[test]
    fn incomplete_results_reports_counts() {
        let error = EngineError::IncompleteResults {
            expected: 10,
            received: 7,
        };
        let message = error.to_string();
        assert!(message.contains("7 of 10"));
    }

    #[test]
    fn engine_error_converts_to_top_level() {
        let error: NearDupError = EngineError::InvalidWorkerCount { value: 0 }.into();
        assert!(error.to_string().starts_with("Engine error"));
    }
}
