//! # CLI Module
//!
//! Command-line interface for the near-duplicate finder.
//!
//! ## Usage
//! ```bash
//! # Print every image's near-duplicates as one JSON object
//! near-dup hashes.json
//!
//! # Stricter threshold, more workers
//! near-dup hashes.json --threshold 10 --workers 16
//!
//! # One JSON file per image instead of stdout
//! near-dup hashes.json --output-dir results/
//! ```

use clap::Parser;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use near_duplicate_finder::core::encoder::{HashEncoder, DEFAULT_WIDTH};
use near_duplicate_finder::core::input::load_table;
use near_duplicate_finder::core::pipeline::{
    Pipeline, PipelineResult, DEFAULT_THRESHOLD, DEFAULT_WORKERS,
};
use near_duplicate_finder::core::sink::{AggregateSink, PerFileSink, ResultSink};
use near_duplicate_finder::error::Result;
use near_duplicate_finder::events::{Event, EventChannel, MergeEvent, PipelineEvent};
use near_duplicate_finder::NearDupError;
use std::io;
use std::path::PathBuf;
use std::thread;

/// Near-Duplicate Finder - compare every perceptual hash with every other
#[derive(Parser, Debug)]
#[command(name = "near-dup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON file mapping image id to hexadecimal hash
    input: PathBuf,

    /// Maximum distance reported as a match
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: u32,

    /// Number of comparison workers (1 = single-threaded)
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Write one JSON file per image here instead of printing to stdout
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Minimum number of binary digits per encoded hash
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,

    /// No progress bar or summary
    #[arg(short, long)]
    quiet: bool,

    /// Show the current image on the progress bar
    #[arg(short, long)]
    verbose: bool,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    near_duplicate_finder::init_tracing();

    if cli.workers == 0 {
        return Err(NearDupError::Config(
            "--workers must be at least 1".to_string(),
        ));
    }

    let encoder = HashEncoder::new(cli.width);
    let table = load_table(&cli.input, &encoder)?;

    let pretty = !cli.compact;
    let sink: Box<dyn ResultSink> = match &cli.output_dir {
        Some(dir) => Box::new(PerFileSink::create(dir, pretty)?),
        None => Box::new(AggregateSink::to_writer(io::stdout(), pretty)),
    };

    let pipeline = Pipeline::builder()
        .workers(cli.workers)
        .threshold(cli.threshold)
        .build();

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    let progress = if cli.quiet {
        None
    } else {
        let pb = ProgressBar::new(table.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    };

    let progress_clone = progress.clone();
    let verbose = cli.verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    if !verbose {
                        pb.set_message(format!("{}", phase));
                    }
                }
                Event::Merge(MergeEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(p.current_key);
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&table, sink, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let result = result?;

    if !cli.quiet {
        print_summary(&Term::stderr(), &result, table.unparsable_count(), &cli);
    }

    Ok(())
}

fn print_summary(
    term: &Term,
    result: &PipelineResult<Box<dyn ResultSink>>,
    unparsable: usize,
    cli: &Cli,
) {
    term.write_line(&format!(
        "{} Comparison Complete",
        style("✓").green().bold()
    ))
    .ok();

    term.write_line(&format!(
        "  {} images compared in {:.1}s ({} workers, threshold {})",
        style(result.total_keys).cyan(),
        result.duration_ms as f64 / 1000.0,
        cli.workers,
        cli.threshold
    ))
    .ok();

    term.write_line(&format!(
        "  {} images with near-duplicates",
        style(result.keys_with_matches).cyan()
    ))
    .ok();

    if unparsable > 0 {
        term.write_line(&format!(
            "  {} hashes were not valid hexadecimal and match nothing",
            style(unparsable).yellow()
        ))
        .ok();
    }

    if let Some(dir) = &cli.output_dir {
        term.write_line(&format!(
            "  {} files written to {}",
            style(result.total_keys - result.output_failures.len()).cyan(),
            dir.display()
        ))
        .ok();
    }

    if !result.output_failures.is_empty() {
        term.write_line(&format!(
            "  {} results could not be written:",
            style(result.output_failures.len()).red()
        ))
        .ok();
        for failure in &result.output_failures {
            term.write_line(&format!(
                "    {} {}",
                style(&failure.key).dim(),
                failure.message
            ))
            .ok();
        }
    }
}
