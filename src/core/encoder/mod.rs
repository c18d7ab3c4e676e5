//! # Encoder Module
//!
//! Turns raw hexadecimal hash strings into the binary-string form the
//! comparator works on.
//!
//! ## Encoding
//! `"F0F0F1"` parses as the unsigned integer `0xF0F0F1` and renders as
//! `"111100001111000011110001"`. Output is zero-padded to the encoder width
//! (24 by default); the width is a minimum, so wider values keep every bit.
//!
//! Encoding is total. Anything that is not a plain base-16 `u64` (empty,
//! stray characters, a sign, a `0x` prefix, more than 16 digits) encodes to
//! the empty hash. Against a normal hash the empty one scores the other
//! hash's full length, so such keys effectively never match.

use serde::{Deserialize, Serialize};

/// Default zero-padding width, in binary digits
pub const DEFAULT_WIDTH: usize = 24;

/// A hash rendered as a string of `'0'` and `'1'` characters
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedHash(String);

impl EncodedHash {
    /// The value produced for unparsable input
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Number of binary digits
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for EncodedHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encodes hexadecimal hashes into zero-padded binary strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashEncoder {
    width: usize,
}

impl HashEncoder {
    /// Create an encoder padding to `width` binary digits
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    /// Padding width in binary digits
    pub fn width(&self) -> usize {
        self.width
    }

    /// Encode a raw hexadecimal hash.
    ///
    /// Never fails: unparsable input yields [`EncodedHash::empty`].
    pub fn encode(&self, raw: &str) -> EncodedHash {
        match parse_hex(raw) {
            Some(value) => EncodedHash(format!("{:0width$b}", value, width = self.width)),
            None => EncodedHash::empty(),
        }
    }
}

impl Default for HashEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

fn parse_hex(raw: &str) -> Option<u64> {
    // from_str_radix tolerates a leading '+', plain hex digits only here
    if raw.starts_with('+') {
        return None;
    }
    u64::from_str_radix(raw, 16).ok()
}
