//! # Input Module
//!
//! Loads the `{ "<image id>": "<hex hash>" }` input and freezes it into a
//! [`HashTable`].
//!
//! ## Freezing
//! The table is encoded once, before any engine thread exists, and exposes
//! no way to modify it afterwards. Workers share it through `&HashTable`
//! inside a thread scope, so the borrow checker guarantees there is no
//! writer while they read. No lock is involved.

use crate::core::encoder::{EncodedHash, HashEncoder};
use crate::error::InputError;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Raw input as read from JSON: image id -> hexadecimal hash
pub type RawHashes = BTreeMap<String, String>;

/// Immutable key -> encoded hash mapping shared by all workers
#[derive(Debug, Clone, Default)]
pub struct HashTable {
    entries: HashMap<String, EncodedHash>,
    unparsable: usize,
}

impl HashTable {
    /// Encode raw hashes in parallel and freeze the result
    pub fn encode<I>(raw: I, encoder: &HashEncoder) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let raw: Vec<(String, String)> = raw.into_iter().collect();

        let entries: HashMap<String, EncodedHash> = raw
            .into_par_iter()
            .map(|(key, hash)| {
                let encoded = encoder.encode(&hash);
                (key, encoded)
            })
            .collect();

        let unparsable = entries.values().filter(|hash| hash.is_empty()).count();

        tracing::debug!(
            keys = entries.len(),
            unparsable,
            width = encoder.width(),
            "encoded hash table"
        );

        Self {
            entries,
            unparsable,
        }
    }

    /// Encoded hash for `key`
    pub fn get(&self, key: &str) -> Option<&EncodedHash> {
        self.entries.get(key)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EncodedHash)> {
        self.entries.iter().map(|(key, hash)| (key.as_str(), hash))
    }

    /// Keys whose hash did not parse and encoded to the empty hash
    pub fn unparsable_count(&self) -> usize {
        self.unparsable
    }
}

/// Read raw hashes from any JSON reader
pub fn read_raw_hashes<R: Read>(reader: R) -> Result<RawHashes, InputError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Read raw hashes from a JSON file
pub fn load_raw_hashes(path: &Path) -> Result<RawHashes, InputError> {
    let file = File::open(path).map_err(|source| InputError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| InputError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a JSON file and encode it into a frozen table
pub fn load_table(path: &Path, encoder: &HashEncoder) -> Result<HashTable, InputError> {
    let raw = load_raw_hashes(path)?;
    let table = HashTable::encode(raw, encoder);

    tracing::info!(path = %path.display(), keys = table.len(), "loaded hashes");
    if table.unparsable_count() > 0 {
        tracing::warn!(
            count = table.unparsable_count(),
            "some hashes are not valid hexadecimal and will not match anything"
        );
    }

    Ok(table)
}
