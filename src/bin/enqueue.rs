//! # Enqueue Binary
//!
//! Reads items from STDIN (one per line) and adds them to a queue.
//!
//! ```text
//! cat users.txt | enqueue puush
//! enqueue puush staging --input users.txt --batch-size 5000
//! ```

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;

use tracker_enqueue::logging::{init_structured_logging, log_error};
use tracker_enqueue::{run_enqueue, Cli, ConfigLoader, EnqueueRequest, QueueResolver};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loader = match &cli.config_dir {
        Some(dir) => ConfigLoader::new(dir),
        None => ConfigLoader::from_env(),
    };
    let config = loader.load(&cli.environment).with_context(|| {
        format!(
            "failed to load configuration for environment '{}' from {}",
            cli.environment,
            loader.config_directory().display()
        )
    })?;

    init_structured_logging(&config.environment, &config.logging, cli.verbose);

    let request = EnqueueRequest {
        queue_identifier: cli.queue_identifier.clone(),
        environment: config.environment.clone(),
        batch_capacity: cli.batch_size.unwrap_or(config.batch.capacity),
    };

    let resolver = QueueResolver::new(config)
        .with_dry_run(cli.dry_run)
        .with_create_if_missing(cli.create_queue);

    let input: Box<dyn AsyncBufRead + Unpin + Send> = match &cli.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open input file {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    match run_enqueue(&resolver, &request, input).await {
        Ok(summary) => {
            info!(
                queue_identifier = %summary.queue_identifier,
                sink = %summary.sink,
                items_enqueued = summary.items_enqueued,
                batches_enqueued = summary.batches_enqueued,
                "Done"
            );
            Ok(())
        }
        Err(e) => {
            if !e.logged_at_source() {
                log_error("enqueue", "run", &e.to_string(), Some(&request.queue_identifier));
            }
            Err(e).with_context(|| {
                format!(
                    "enqueue into '{}' ({}) failed",
                    request.queue_identifier, request.environment
                )
            })
        }
    }
}
