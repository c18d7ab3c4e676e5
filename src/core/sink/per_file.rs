//! Write one JSON file per key.

use super::ResultSink;
use crate::core::comparator::ComparisonResult;
use crate::error::OutputError;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Persists each result's matches to `<directory>/<key>`
///
/// Files are written as results arrive, so a failed run leaves the
/// results merged so far on disk.
#[derive(Debug)]
pub struct PerFileSink {
    directory: PathBuf,
    pretty: bool,
    written: usize,
}

impl PerFileSink {
    /// Create the output directory (and parents) and return a sink for it
    pub fn create(directory: impl Into<PathBuf>, pretty: bool) -> Result<Self, OutputError> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(|source| OutputError::CreateDirectory {
            path: directory.clone(),
            source,
        })?;

        Ok(Self {
            directory,
            pretty,
            written: 0,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Number of files written so far
    pub fn written(&self) -> usize {
        self.written
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, OutputError> {
        // Exactly one plain component, so keys cannot escape the directory
        let mut components = Path::new(key).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == key => Ok(self.directory.join(key)),
            _ => Err(OutputError::UnsafeFileName {
                key: key.to_string(),
            }),
        }
    }
}

impl ResultSink for PerFileSink {
    fn accept(&mut self, result: ComparisonResult) -> Result<(), OutputError> {
        let path = self.path_for(&result.key)?;

        let contents = if self.pretty {
            serde_json::to_vec_pretty(&result.matches)?
        } else {
            serde_json::to_vec(&result.matches)?
        };

        fs::write(&path, contents).map_err(|source| OutputError::WriteFile {
            path: path.clone(),
            source,
        })?;

        self.written += 1;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "per-file"
    }
}
