//! # near-dup CLI
//!
//! Command-line interface for the near-duplicate finder.
//!
//! ## Usage
//! ```bash
//! near-dup hashes.json --threshold 20
//! near-dup hashes.json --workers 1 --output-dir results/
//! ```

mod cli;

use near_duplicate_finder::Result;

fn main() -> Result<()> {
    cli::run()
}
