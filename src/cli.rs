//! Command-line arguments for the `enqueue` binary.

use crate::constants::DEFAULT_ENVIRONMENT;
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use std::path::PathBuf;

/// Reads items from STDIN (one per line) and adds them to a queue in batches.
///
/// Example: `cat users.txt | enqueue puush staging`
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "enqueue")]
#[command(about = "Read item names from stdin and add them to a tracker queue in batches")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Queue identifier (slug) to enqueue into; `-` maps to `_` in the queue name
    #[arg(value_name = "QUEUE_IDENTIFIER", value_parser = NonEmptyStringValueParser::new())]
    pub queue_identifier: String,

    /// Configuration environment
    #[arg(value_name = "ENVIRONMENT", default_value = DEFAULT_ENVIRONMENT)]
    pub environment: String,

    /// Items per batch (overrides batch.capacity)
    #[arg(short, long, value_parser = parse_batch_size)]
    pub batch_size: Option<usize>,

    /// Configuration directory (default: $ENQUEUE_CONFIG_DIR or ./config)
    #[arg(short, long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Read items from a file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Print batches as JSON lines on stdout instead of enqueueing
    #[arg(long)]
    pub dry_run: bool,

    /// Create the queue if it does not exist
    #[arg(long)]
    pub create_queue: bool,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_batch_size(value: &str) -> Result<usize, String> {
    let size: usize = value
        .parse()
        .map_err(|_| format!("'{value}' is not a positive integer"))?;
    if size == 0 {
        return Err("batch size must be greater than 0".to_string());
    }
    Ok(size)
}
