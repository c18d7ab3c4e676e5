//! # Near-Duplicate Finder
//!
//! Finds near-duplicate images from a precomputed map of perceptual hashes.
//!
//! ## How It Works
//! Every hash is compared with every other hash. For each image the result
//! lists the other images whose distance is at or below a threshold.
//!
//! ## Architecture
//! - `core` - Encoding, distance, and the concurrent comparison engine
//! - `events` - Progress reporting over a channel
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{NearDupError, Result};

/// Initialize tracing for the library
///
/// Logs go to stderr so stdout stays clean for JSON output. Filtering
/// follows `RUST_LOG`; without it, warnings (skipped output files,
/// unparsable hashes) are still shown.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(console::colors_enabled_stderr())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
